//! The drawing context every input handler works through.
//!
//! `Whiteboard` owns the surface, the tool configuration, the stroke renderer,
//! the image compositor and the state of the gesture in progress. Hosts feed it
//! pointer, toolbar, paste and resize events with surface-relative coordinates
//! and read the surface back for display.
//!
//! # Gestures
//!
//! A pointer-down starts exactly one gesture:
//! - with the fill tool, a flood fill at the pointer (no gesture remains active)
//! - over a placed image, a drag of the topmost image
//! - anywhere else, a freehand stroke
//!
//! Pointer-up and pointer-leave both end the gesture.

use egui::{Color32, Pos2};
use image::RgbaImage;

use crate::compositor::{ImageCompositor, ImageId};
use crate::error::{ColorParseError, FillError};
use crate::fill::{self, FillReport};
use crate::geometry;
use crate::paste::{ClipboardItem, ClipboardSource, PasteDecoder};
use crate::settings::{InkRetention, Settings};
use crate::stroke::StrokeRenderer;
use crate::surface::Surface;
use crate::tool::{self, CursorHint, Tool, ToolConfig};

/// The pointer interaction currently in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Stroking,
    Dragging(ImageId),
}

#[derive(Debug)]
pub struct Whiteboard {
    surface: Surface,
    /// Persistent ink raster beneath the images, present only with [`InkRetention::Persistent`]
    ink: Option<Surface>,
    tools: ToolConfig,
    strokes: StrokeRenderer,
    images: ImageCompositor,
    gesture: Gesture,
    pastes: PasteDecoder,
    paste_scale: f32,
    paste_offset: Pos2,
}

impl Whiteboard {
    /// A blank whiteboard with default settings
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_settings(width, height, &Settings::default())
    }

    pub fn with_settings(width: u32, height: u32, settings: &Settings) -> Self {
        let ink = match settings.ink_retention {
            InkRetention::Ephemeral => None,
            InkRetention::Persistent => Some(Surface::new(width, height)),
        };
        Self {
            surface: Surface::new(width, height),
            ink,
            tools: settings.tools,
            strokes: StrokeRenderer::new(),
            images: ImageCompositor::new(),
            gesture: Gesture::Idle,
            pastes: PasteDecoder::new(),
            paste_scale: settings.paste_scale,
            paste_offset: settings.paste_offset(),
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Mutable access for hosts and tests that seed the surface directly
    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn ink(&self) -> Option<&Surface> {
        self.ink.as_ref()
    }

    pub fn tools(&self) -> &ToolConfig {
        &self.tools
    }

    pub fn images(&self) -> &ImageCompositor {
        &self.images
    }

    pub fn strokes(&self) -> &StrokeRenderer {
        &self.strokes
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn cursor_hint(&self) -> CursorHint {
        self.tools.tool.cursor_hint()
    }

    // Toolbar inputs

    pub fn select_tool(&mut self, tool: Tool) {
        if self.tools.tool != tool {
            log::info!("Tool selected: {}", tool.name());
            self.tools.tool = tool;
        }
    }

    pub fn set_color(&mut self, color: Color32) {
        if self.tools.color != color {
            log::debug!("Color set to {}", tool::to_hex_color(color));
            self.tools.color = color;
        }
    }

    /// Apply a color from the `#rrggbb` color input. Invalid input keeps the previous color.
    pub fn set_color_hex(&mut self, hex: &str) -> Result<(), ColorParseError> {
        self.tools.set_color_hex(hex).inspect_err(|err| {
            log::warn!("Ignoring color input: {}", err);
        })
    }

    pub fn set_size(&mut self, size: f32) {
        self.tools.set_size(size);
    }

    // Pointer inputs

    pub fn pointer_down(&mut self, pos: Pos2) {
        self.end_gesture();

        if self.tools.tool == Tool::Fill {
            // Failures are reported by fill_at and leave the surface untouched
            let _ = self.fill_at(pos);
            return;
        }

        if let Some(id) = self.images.hit_test(pos) {
            if self.images.begin_drag(id) {
                log::debug!("Dragging image {}", id);
                self.gesture = Gesture::Dragging(id);
            }
            return;
        }

        self.strokes.begin(pos, self.surface.size());
        self.gesture = Gesture::Stroking;
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Stroking => {
                let mut targets: Vec<&mut Surface> = Vec::with_capacity(2);
                targets.push(&mut self.surface);
                if let Some(ink) = self.ink.as_mut() {
                    targets.push(ink);
                }
                self.strokes.extend(pos, &self.tools, &mut targets);
            }
            Gesture::Dragging(id) => {
                let (x, y) = geometry::pixel_at(pos);
                if !self.surface.contains(x, y) {
                    log::debug!("Ignoring drag point {:?} outside the surface", pos);
                    return;
                }
                if self.images.update_drag(id, pos) {
                    self.recomposite();
                }
            }
        }
    }

    pub fn pointer_up(&mut self, _pos: Pos2) {
        self.end_gesture();
    }

    /// Leaving the surface ends the gesture exactly like releasing the pointer
    pub fn pointer_leave(&mut self) {
        self.end_gesture();
    }

    fn end_gesture(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            Gesture::Stroking => self.strokes.end(),
            Gesture::Dragging(id) => self.images.end_drag(id),
        }
    }

    /// Flood fill the region under `pos` with the current color
    pub fn fill_at(&mut self, pos: Pos2) -> Result<FillReport, FillError> {
        let seed = geometry::pixel_at(pos);
        let before = self.ink.is_some().then(|| self.surface.as_raw().to_vec());

        let result = fill::flood_fill(&mut self.surface, seed, self.tools.color);
        match &result {
            Ok(_) => {
                if let (Some(ink), Some(before)) = (self.ink.as_mut(), before) {
                    mirror_changes(&before, &self.surface, ink);
                }
            }
            Err(err @ FillError::SeedOutOfBounds { .. }) => log::warn!("{}", err),
            Err(err @ FillError::NonFillable { .. }) => log::debug!("{}", err),
        }
        result
    }

    // Images

    /// Start decoding the image payloads among `items`. Nothing is placed until
    /// [`Whiteboard::place_ready_pastes`] sees the decode finish.
    pub fn paste(&mut self, items: impl IntoIterator<Item = ClipboardItem>) -> usize {
        let started = self.pastes.submit(items);
        if started > 0 {
            log::info!("Decoding {} pasted image(s)", started);
        }
        started
    }

    /// Place the image currently on `clipboard`, if there is one
    pub fn paste_from(&mut self, clipboard: &mut impl ClipboardSource) -> Option<ImageId> {
        let Some(raster) = clipboard.read_image() else {
            log::debug!("Clipboard holds no image");
            return None;
        };
        Some(self.place_pasted(&raster))
    }

    /// Place every paste whose decode has finished, returning their ids
    pub fn place_ready_pastes(&mut self) -> Vec<ImageId> {
        self.pastes
            .poll_ready()
            .iter()
            .map(|raster| self.place_pasted(raster))
            .collect()
    }

    /// Block until every pending paste is decoded, then place them all
    #[cfg(not(target_arch = "wasm32"))]
    pub fn finish_pastes(&mut self) -> Vec<ImageId> {
        self.pastes
            .wait_all()
            .iter()
            .map(|raster| self.place_pasted(raster))
            .collect()
    }

    pub fn pending_pastes(&self) -> usize {
        self.pastes.pending()
    }

    /// Place a decoded paste at the configured offset and scale, drawn on top of the surface
    pub fn place_pasted(&mut self, pixels: &RgbaImage) -> ImageId {
        let id = self.images.place_scaled(pixels, self.paste_offset, self.paste_scale);
        self.draw_placed(id);
        id
    }

    pub fn place(&mut self, pixels: &RgbaImage, x: f32, y: f32, width: u32, height: u32) -> ImageId {
        let id = self.images.place(pixels, x, y, width, height);
        self.draw_placed(id);
        id
    }

    fn draw_placed(&mut self, id: ImageId) {
        if let Some(image) = self.images.get(id) {
            let (x, y) = image.origin();
            self.surface.draw_image(image.pixels(), x, y);
        }
    }

    /// Redraw the surface from the ink raster (if kept) and the placed images
    pub fn recomposite(&mut self) {
        self.images.recomposite(&mut self.surface, self.ink.as_ref());
    }

    /// Remove every image and all ink
    pub fn clear(&mut self) {
        self.end_gesture();
        self.images.clear();
        self.surface.clear();
        if let Some(ink) = self.ink.as_mut() {
            ink.clear();
        }
        log::info!("Whiteboard cleared");
    }

    /// Swap in a surface of the new size and recomposite onto it
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.surface.width() == width && self.surface.height() == height {
            return;
        }
        log::info!(
            "Resizing surface from {}x{} to {}x{}",
            self.surface.width(),
            self.surface.height(),
            width,
            height
        );

        // Stroke coverage is sized to the old surface
        self.end_gesture();
        self.surface = Surface::new(width, height);
        if let Some(ink) = self.ink.as_mut() {
            let mut resized = Surface::new(width, height);
            resized.copy_from(ink);
            *ink = resized;
        }
        self.recomposite();
    }
}

/// Copy every pixel that differs between `before` and `after` into `ink`
fn mirror_changes(before: &[u8], after: &Surface, ink: &mut Surface) {
    let width = after.width() as usize;
    for (index, (old, new)) in before
        .chunks_exact(4)
        .zip(after.as_raw().chunks_exact(4))
        .enumerate()
    {
        if old != new {
            let x = (index % width) as i32;
            let y = (index / width) as i32;
            ink.put_pixel(x, y, image::Rgba([new[0], new[1], new[2], new[3]]));
        }
    }
}
