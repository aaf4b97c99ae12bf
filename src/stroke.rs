use egui::Pos2;
use image::Rgba;

use crate::geometry::{self, MIN_COVER_RADIUS};
use crate::surface::Surface;
use crate::tool::{BrushParams, ToolConfig};

/// Pixels already painted by the current stroke session
#[derive(Clone)]
pub struct Coverage {
    width: usize,
    height: usize,
    painted: Vec<bool>,
}

impl std::fmt::Debug for Coverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coverage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("painted", &self.painted_count())
            .finish()
    }
}

impl Coverage {
    pub fn new(size: [usize; 2]) -> Self {
        Self {
            width: size[0],
            height: size[1],
            painted: vec![false; size[0] * size[1]],
        }
    }

    /// Mark a pixel, returning `true` if it was not painted before
    fn mark(&mut self, x: usize, y: usize) -> bool {
        let index = y * self.width + x;
        !std::mem::replace(&mut self.painted[index], true)
    }

    pub fn is_painted(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.painted[y * self.width + x]
    }

    pub fn painted_count(&self) -> usize {
        self.painted.iter().filter(|p| **p).count()
    }
}

/// Lifecycle of one freehand stroke
#[derive(Debug, Clone, Default)]
pub enum StrokeSession {
    #[default]
    Idle,
    Active {
        last_point: Pos2,
        coverage: Coverage,
    },
}

/// Turns pointer motion into rasterized line segments
#[derive(Debug, Default)]
pub struct StrokeRenderer {
    session: StrokeSession,
}

impl StrokeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &StrokeSession {
        &self.session
    }

    pub fn is_active(&self) -> bool {
        matches!(self.session, StrokeSession::Active { .. })
    }

    pub fn last_point(&self) -> Option<Pos2> {
        match &self.session {
            StrokeSession::Active { last_point, .. } => Some(*last_point),
            StrokeSession::Idle => None,
        }
    }

    /// Start a session at `point`. Nothing is painted until the first extension.
    pub fn begin(&mut self, point: Pos2, surface_size: [usize; 2]) {
        if self.is_active() {
            log::debug!("Restarting stroke session at {:?}", point);
        }
        self.session = StrokeSession::Active {
            last_point: point,
            coverage: Coverage::new(surface_size),
        };
    }

    /// Draw a segment from the last point to `point` with the brush of `tools` as it is now.
    ///
    /// Returns `false` without touching anything when no session is active.
    pub fn extend(&mut self, point: Pos2, tools: &ToolConfig, targets: &mut [&mut Surface]) -> bool {
        let StrokeSession::Active { last_point, coverage } = &mut self.session else {
            return false;
        };

        if let Some(brush) = tools.brush() {
            paint_segment(targets, *last_point, point, &brush, coverage);
        }
        *last_point = point;
        true
    }

    /// Terminate the session; later extensions are ignored until the next `begin`
    pub fn end(&mut self) {
        self.session = StrokeSession::Idle;
    }
}

/// Rasterize a round-capped segment into every target.
///
/// A pixel is covered when its center lies within the brush radius of the segment.
/// Translucent brushes skip pixels the session already painted.
pub fn paint_segment(
    targets: &mut [&mut Surface],
    from: Pos2,
    to: Pos2,
    brush: &BrushParams,
    coverage: &mut Coverage,
) {
    let radius = (brush.width / 2.0).max(MIN_COVER_RADIUS);
    let bounds = geometry::calculate_bounds(&[from, to], radius);

    let x0 = (bounds.min.x.floor() as i64).max(0) as usize;
    let y0 = (bounds.min.y.floor() as i64).max(0) as usize;
    let x1 = (bounds.max.x.ceil() as i64).clamp(0, coverage.width as i64) as usize;
    let y1 = (bounds.max.y.ceil() as i64).clamp(0, coverage.height as i64) as usize;

    let color = Rgba([brush.color.r(), brush.color.g(), brush.color.b(), 255]);

    for y in y0..y1 {
        for x in x0..x1 {
            let center = geometry::pixel_center(x as i32, y as i32);
            if geometry::distance_to_line_segment(center, from, to) > radius {
                continue;
            }
            let fresh = coverage.mark(x, y);
            if brush.is_translucent() && !fresh {
                continue;
            }
            for target in targets.iter_mut() {
                target.blend_pixel(x as i32, y as i32, color, brush.opacity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::TRANSPARENT;
    use crate::tool::Tool;
    use egui::Color32;

    fn red_pen(tool: Tool) -> ToolConfig {
        ToolConfig {
            tool,
            color: Color32::RED,
            size: 1.0,
        }
    }

    #[test]
    fn test_extend_without_session_is_noop() {
        let mut surface = Surface::new(10, 10);
        let mut renderer = StrokeRenderer::new();

        assert!(!renderer.extend(Pos2::new(5.0, 5.0), &red_pen(Tool::Draw), &mut [&mut surface]));
        assert_eq!(surface.version(), 0);
    }

    #[test]
    fn test_begin_paints_nothing() {
        let mut surface = Surface::new(10, 10);
        let mut renderer = StrokeRenderer::new();
        renderer.begin(Pos2::new(5.0, 5.0), surface.size());

        assert!(renderer.is_active());
        assert_eq!(renderer.last_point(), Some(Pos2::new(5.0, 5.0)));
        assert!(surface.pixels().pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_extend_updates_last_point() {
        let mut surface = Surface::new(10, 10);
        let mut renderer = StrokeRenderer::new();
        renderer.begin(Pos2::new(1.5, 1.5), surface.size());
        renderer.extend(Pos2::new(8.5, 1.5), &red_pen(Tool::Draw), &mut [&mut surface]);

        assert_eq!(renderer.last_point(), Some(Pos2::new(8.5, 1.5)));
        for x in 1..=8 {
            assert_eq!(surface.pixel(x, 1), Some(Rgba([255, 0, 0, 255])));
        }
        assert_eq!(surface.pixel(5, 5), Some(TRANSPARENT));
    }

    #[test]
    fn test_end_stops_painting() {
        let mut surface = Surface::new(10, 10);
        let mut renderer = StrokeRenderer::new();
        renderer.begin(Pos2::new(1.5, 1.5), surface.size());
        renderer.end();

        assert!(!renderer.extend(Pos2::new(8.5, 8.5), &red_pen(Tool::Draw), &mut [&mut surface]));
        assert!(surface.pixels().pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_fill_tool_advances_without_painting() {
        let mut surface = Surface::new(10, 10);
        let mut renderer = StrokeRenderer::new();
        renderer.begin(Pos2::new(1.5, 1.5), surface.size());

        assert!(renderer.extend(Pos2::new(8.5, 8.5), &red_pen(Tool::Fill), &mut [&mut surface]));
        assert_eq!(renderer.last_point(), Some(Pos2::new(8.5, 8.5)));
        assert!(surface.pixels().pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_highlight_joints_do_not_darken() {
        let mut surface = Surface::new(20, 20);
        let mut renderer = StrokeRenderer::new();
        let tools = red_pen(Tool::Highlight);

        renderer.begin(Pos2::new(2.5, 10.5), surface.size());
        renderer.extend(Pos2::new(10.5, 10.5), &tools, &mut [&mut surface]);
        renderer.extend(Pos2::new(10.5, 2.5), &tools, &mut [&mut surface]);
        renderer.extend(Pos2::new(2.5, 10.5), &tools, &mut [&mut surface]);

        for pixel in surface.pixels().pixels() {
            assert!(pixel[3] == 0 || pixel[3] == 128, "unexpected alpha {}", pixel[3]);
        }
        assert_eq!(surface.pixel(10, 10).map(|p| p[3]), Some(128));

        let StrokeSession::Active { coverage, .. } = renderer.session() else {
            panic!("stroke should still be active");
        };
        assert!(coverage.is_painted(10, 10));
        assert!(!coverage.is_painted(18, 18));
    }

    #[test]
    fn test_paint_into_several_targets() {
        let mut first = Surface::new(10, 10);
        let mut second = Surface::new(10, 10);
        let mut renderer = StrokeRenderer::new();
        renderer.begin(Pos2::new(0.5, 0.5), first.size());
        renderer.extend(Pos2::new(9.5, 9.5), &red_pen(Tool::Draw), &mut [&mut first, &mut second]);

        assert_eq!(first.as_raw(), second.as_raw());
        assert_eq!(first.pixel(5, 5), Some(Rgba([255, 0, 0, 255])));
    }
}
