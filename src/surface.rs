use egui::ColorImage;
use image::{Rgba, RgbaImage};

/// Color of a freshly created or cleared surface
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// The single mutable raster everything draws into.
///
/// Pixels are straight (unpremultiplied) RGBA8. Every mutation bumps
/// [`Surface::version`] so a host only re-uploads changed content.
#[derive(Clone)]
pub struct Surface {
    pixels: RgbaImage,
    version: u64,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .field("version", &self.version)
            .finish()
    }
}

impl Surface {
    /// Create a fully transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    /// Create a surface where every pixel is `color`
    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, color),
            version: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `[width, height]`, the layout egui uses for image sizes
    pub fn size(&self) -> [usize; 2] {
        [self.width() as usize, self.height() as usize]
    }

    /// Incremented on every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    /// Read a pixel, `None` outside the surface
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        self.contains(x, y)
            .then(|| *self.pixels.get_pixel(x as u32, y as u32))
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// The flat RGBA byte buffer, row-major
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Replace the whole pixel buffer in one step.
    ///
    /// A buffer of the wrong length is rejected and the surface is left as is.
    pub fn commit_raw(&mut self, data: Vec<u8>) -> bool {
        match RgbaImage::from_raw(self.width(), self.height(), data) {
            Some(pixels) => {
                self.pixels = pixels;
                self.touch();
                true
            }
            None => {
                log::error!(
                    "Refusing to commit a pixel buffer that does not match {}x{}",
                    self.width(),
                    self.height()
                );
                false
            }
        }
    }

    /// Overwrite a pixel. Out-of-range coordinates are ignored.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if self.contains(x, y) {
            self.pixels.put_pixel(x as u32, y as u32, color);
            self.touch();
        }
    }

    /// Composite `color` over the pixel at `opacity`. Out-of-range coordinates are ignored.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba<u8>, opacity: f32) {
        if !self.contains(x, y) {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        *dst = blend_over(*dst, color, opacity);
        self.touch();
    }

    /// Reset every pixel to transparent
    pub fn clear(&mut self) {
        self.fill_with(TRANSPARENT);
    }

    pub fn fill_with(&mut self, color: Rgba<u8>) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = color;
        }
        self.touch();
    }

    /// Draw `image` with its top-left corner at `(x, y)`, clipped to the surface
    pub fn draw_image(&mut self, image: &RgbaImage, x: i32, y: i32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x as i64 + image.width() as i64).min(self.width() as i64) as i32;
        let y1 = (y as i64 + image.height() as i64).min(self.height() as i64) as i32;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for dy in y0..y1 {
            for dx in x0..x1 {
                let src = *image.get_pixel((dx - x) as u32, (dy - y) as u32);
                let dst = self.pixels.get_pixel_mut(dx as u32, dy as u32);
                *dst = blend_over(*dst, src, 1.0);
            }
        }
        self.touch();
    }

    /// Copy the overlapping region of another surface into this one, pixel for pixel
    pub fn copy_from(&mut self, other: &Surface) {
        let width = self.width().min(other.width());
        let height = self.height().min(other.height());
        for y in 0..height {
            for x in 0..width {
                self.pixels.put_pixel(x, y, *other.pixels.get_pixel(x, y));
            }
        }
        self.touch();
    }

    /// Snapshot for uploading to an egui texture
    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(self.size(), self.as_raw())
    }

    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

/// Straight-alpha source-over compositing of `src` onto `dst`.
///
/// An opaque source at full opacity replaces the destination exactly.
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let opacity = opacity.clamp(0.0, 1.0);
    let src_a = src[3] as f32 / 255.0 * opacity;
    if src_a <= 0.0 {
        return dst;
    }
    if src_a >= 1.0 {
        return Rgba([src[0], src[1], src[2], 255]);
    }

    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    let channel = |s: u8, d: u8| -> u8 {
        ((s as f32 * src_a + d as f32 * dst_a * (1.0 - src_a)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
