use egui::{Pos2, Rect};

/// Smallest radius at which a segment still covers every pixel it passes through
pub const MIN_COVER_RADIUS: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Calculate distance from a point to a line segment
pub fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len = line_vec.length();
    if line_len == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / line_len).clamp(0.0, line_len);
    let projection = line_start + (line_vec * t / line_len);
    (point - projection).length()
}

/// Calculate the bounding box for a set of points
pub fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}

/// Center of the pixel at integer coordinates
pub fn pixel_center(x: i32, y: i32) -> Pos2 {
    Pos2::new(x as f32 + 0.5, y as f32 + 0.5)
}

/// Integer pixel containing `point`
pub fn pixel_at(point: Pos2) -> (i32, i32) {
    (point.x.floor() as i32, point.y.floor() as i32)
}

/// Box test with inclusive min and exclusive max edges, so adjacent boxes never both claim a point
pub fn box_contains(rect: Rect, point: Pos2) -> bool {
    point.x >= rect.min.x && point.y >= rect.min.y && point.x < rect.max.x && point.y < rect.max.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_segment() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert_eq!(distance_to_line_segment(Pos2::new(5.0, 3.0), a, b), 3.0);
        // Beyond the end the distance is to the endpoint
        assert_eq!(distance_to_line_segment(Pos2::new(13.0, 4.0), a, b), 5.0);
        // Degenerate segment
        assert_eq!(distance_to_line_segment(Pos2::new(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn test_bounds_with_padding() {
        let rect = calculate_bounds(&[Pos2::new(1.0, 2.0), Pos2::new(4.0, -1.0)], 1.0);
        assert_eq!(rect.min, Pos2::new(0.0, -2.0));
        assert_eq!(rect.max, Pos2::new(5.0, 3.0));
        assert_eq!(calculate_bounds(&[], 1.0), Rect::NOTHING);
    }

    #[test]
    fn test_box_contains_half_open() {
        let rect = Rect::from_min_size(Pos2::new(10.0, 10.0), egui::vec2(5.0, 5.0));
        assert!(box_contains(rect, Pos2::new(10.0, 10.0)));
        assert!(box_contains(rect, Pos2::new(14.9, 14.9)));
        assert!(!box_contains(rect, Pos2::new(15.0, 12.0)));
    }
}
