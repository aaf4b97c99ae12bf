use egui::{Pos2, Rect, Vec2};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use uuid::Uuid;

use crate::geometry;
use crate::surface::Surface;

/// Fraction of the native size a pasted image is shown at
pub const DEFAULT_PASTE_SCALE: f32 = 0.25;
/// Where pasted images land before they are dragged
pub const DEFAULT_PASTE_OFFSET: Pos2 = Pos2::new(50.0, 50.0);

/// Stable handle to a placed image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(Uuid);

impl ImageId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an image is currently following the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// A pasted raster with its position and display size on the surface
#[derive(Clone)]
pub struct PlacedImage {
    id: ImageId,
    // Pixels already resampled to `width` x `height`
    pixels: RgbaImage,
    x: f32,
    y: f32,
    width: u32,
    height: u32,
    drag: DragState,
}

// Custom Debug implementation to keep pixel data out of logs
impl std::fmt::Debug for PlacedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacedImage")
            .field("id", &self.id)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("drag", &self.drag)
            .finish()
    }
}

impl PlacedImage {
    fn new(source: &RgbaImage, x: f32, y: f32, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let pixels = if source.dimensions() == (width, height) {
            source.clone()
        } else {
            imageops::resize(source, width, height, FilterType::Triangle)
        };

        Self {
            id: ImageId::new(),
            pixels,
            x,
            y,
            width,
            height,
            drag: DragState::Idle,
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag == DragState::Dragging
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(
            Pos2::new(self.x, self.y),
            Vec2::new(self.width as f32, self.height as f32),
        )
    }

    /// Top-left pixel the image is drawn at
    pub fn origin(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }

    /// Whether `pos` lies on the pixels this image covers on the surface
    pub fn hit_test(&self, pos: Pos2) -> bool {
        let (x, y) = self.origin();
        let drawn = Rect::from_min_size(
            Pos2::new(x as f32, y as f32),
            Vec2::new(self.width as f32, self.height as f32),
        );
        geometry::box_contains(drawn, pos)
    }

    fn center_on(&mut self, point: Pos2) {
        self.x = point.x - self.width as f32 / 2.0;
        self.y = point.y - self.height as f32 / 2.0;
    }

    fn draw(&self, surface: &mut Surface) {
        let (x, y) = self.origin();
        surface.draw_image(&self.pixels, x, y);
    }
}

/// Display size for a pasted raster: the native size scaled by `scale`, at least one pixel
pub fn scaled_size(native: (u32, u32), scale: f32) -> (u32, u32) {
    let scale_dim = |d: u32| ((d as f32 * scale).round() as u32).max(1);
    (scale_dim(native.0), scale_dim(native.1))
}

/// Ordered list of placed images; later entries are drawn on top
#[derive(Debug, Default)]
pub struct ImageCompositor {
    images: Vec<PlacedImage>,
}

impl ImageCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &[PlacedImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, id: ImageId) -> Option<&PlacedImage> {
        self.images.iter().find(|image| image.id == id)
    }

    fn get_mut(&mut self, id: ImageId) -> Option<&mut PlacedImage> {
        self.images.iter_mut().find(|image| image.id == id)
    }

    /// Append an image at `(x, y)` shown at `width` x `height`
    pub fn place(&mut self, pixels: &RgbaImage, x: f32, y: f32, width: u32, height: u32) -> ImageId {
        let image = PlacedImage::new(pixels, x, y, width, height);
        let id = image.id;
        log::info!(
            "Placed image {} at ({}, {}) as {}x{}",
            id,
            x,
            y,
            image.width,
            image.height
        );
        self.images.push(image);
        id
    }

    /// Append a pasted image at the default offset and scale
    pub fn place_default(&mut self, pixels: &RgbaImage) -> ImageId {
        self.place_scaled(pixels, DEFAULT_PASTE_OFFSET, DEFAULT_PASTE_SCALE)
    }

    pub fn place_scaled(&mut self, pixels: &RgbaImage, at: Pos2, scale: f32) -> ImageId {
        let (width, height) = scaled_size(pixels.dimensions(), scale);
        self.place(pixels, at.x, at.y, width, height)
    }

    /// Topmost image under `pos`
    pub fn hit_test(&self, pos: Pos2) -> Option<ImageId> {
        self.images
            .iter()
            .rev()
            .find(|image| image.hit_test(pos))
            .map(|image| image.id)
    }

    pub fn begin_drag(&mut self, id: ImageId) -> bool {
        match self.get_mut(id) {
            Some(image) => {
                image.drag = DragState::Dragging;
                true
            }
            None => {
                log::warn!("Cannot drag unknown image {}", id);
                false
            }
        }
    }

    /// Center a dragging image on `point`. Images that are not being dragged stay put.
    pub fn update_drag(&mut self, id: ImageId, point: Pos2) -> bool {
        match self.get_mut(id) {
            Some(image) if image.is_dragging() => {
                image.center_on(point);
                true
            }
            _ => false,
        }
    }

    pub fn end_drag(&mut self, id: ImageId) {
        if let Some(image) = self.get_mut(id) {
            image.drag = DragState::Idle;
        }
    }

    /// Clear the surface, lay down `base` if given, then draw every image in z-order
    pub fn recomposite(&self, surface: &mut Surface, base: Option<&Surface>) {
        surface.clear();
        if let Some(base) = base {
            surface.copy_from(base);
        }
        for image in &self.images {
            image.draw(surface);
        }
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn test_scaled_size_rounds_and_floors_at_one() {
        assert_eq!(scaled_size((100, 100), 0.25), (25, 25));
        assert_eq!(scaled_size((10, 2), 0.25), (3, 1));
        assert_eq!(scaled_size((1, 1), 0.25), (1, 1));
    }

    #[test]
    fn test_place_default_uses_paste_offset_and_scale() {
        let mut compositor = ImageCompositor::new();
        let id = compositor.place_default(&solid(100, 60, [0, 0, 0, 255]));
        let image = compositor.get(id).unwrap();
        assert_eq!((image.x(), image.y()), (50.0, 50.0));
        assert_eq!((image.width(), image.height()), (25, 15));
        assert_eq!(image.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_place_resamples_pixels() {
        let mut compositor = ImageCompositor::new();
        let id = compositor.place(&solid(40, 20, [1, 2, 3, 255]), 0.0, 0.0, 10, 5);
        let image = compositor.get(id).unwrap();
        assert_eq!(image.pixels().dimensions(), (10, 5));
        let pixel = image.pixels().get_pixel(4, 2);
        for (got, want) in pixel.0.iter().zip([1u8, 2, 3, 255]) {
            assert!((*got as i32 - want as i32).abs() <= 1);
        }
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut compositor = ImageCompositor::new();
        let bottom = compositor.place(&solid(10, 10, [255, 0, 0, 255]), 0.0, 0.0, 10, 10);
        let top = compositor.place(&solid(10, 10, [0, 0, 255, 255]), 5.0, 5.0, 10, 10);

        assert_eq!(compositor.hit_test(Pos2::new(7.0, 7.0)), Some(top));
        assert_eq!(compositor.hit_test(Pos2::new(2.0, 2.0)), Some(bottom));
        assert_eq!(compositor.hit_test(Pos2::new(30.0, 30.0)), None);
    }

    #[test]
    fn test_hit_test_matches_drawn_pixels_after_half_pixel_drag() {
        let mut compositor = ImageCompositor::new();
        let id = compositor.place(&solid(25, 25, [0, 200, 0, 255]), 0.0, 0.0, 25, 25);
        compositor.begin_drag(id);
        compositor.update_drag(id, Pos2::new(150.0, 100.0));
        compositor.end_drag(id);

        let image = compositor.get(id).unwrap();
        assert_eq!((image.x(), image.y()), (137.5, 87.5));
        assert_eq!(image.origin(), (138, 88));

        let mut surface = Surface::new(200, 200);
        compositor.recomposite(&mut surface, None);

        // Column 137 is left blank by the draw, so it must not hit either
        assert_eq!(surface.pixel(137, 100).map(|p| p[3]), Some(0));
        assert_eq!(compositor.hit_test(Pos2::new(137.7, 100.0)), None);
        // The last drawn column does hit
        assert_eq!(surface.pixel(162, 100).map(|p| p[3]), Some(255));
        assert_eq!(compositor.hit_test(Pos2::new(162.5, 100.0)), Some(id));
    }

    #[test]
    fn test_update_drag_requires_dragging() {
        let mut compositor = ImageCompositor::new();
        let id = compositor.place(&solid(4, 4, [0, 0, 0, 255]), 0.0, 0.0, 4, 4);

        assert!(!compositor.update_drag(id, Pos2::new(20.0, 20.0)));
        assert_eq!(compositor.get(id).unwrap().x(), 0.0);

        assert!(compositor.begin_drag(id));
        assert!(compositor.update_drag(id, Pos2::new(20.0, 20.0)));
        let image = compositor.get(id).unwrap();
        assert_eq!((image.x(), image.y()), (18.0, 18.0));
        assert!(image.is_dragging());

        compositor.end_drag(id);
        assert_eq!(compositor.get(id).unwrap().drag_state(), DragState::Idle);
    }

    #[test]
    fn test_recomposite_draws_in_insertion_order() {
        let mut compositor = ImageCompositor::new();
        compositor.place(&solid(4, 4, [255, 0, 0, 255]), 0.0, 0.0, 4, 4);
        compositor.place(&solid(4, 4, [0, 0, 255, 255]), 2.0, 2.0, 4, 4);

        let mut surface = Surface::new(8, 8);
        surface.put_pixel(7, 7, Rgba([9, 9, 9, 255]));
        compositor.recomposite(&mut surface, None);

        assert_eq!(surface.pixel(0, 0), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(surface.pixel(3, 3), Some(Rgba([0, 0, 255, 255])));
        assert_eq!(surface.pixel(7, 7), Some(Rgba([0, 0, 0, 0])));
    }
}
