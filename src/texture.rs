use egui::{Context, TextureHandle, TextureId, TextureOptions};

use crate::surface::Surface;

/// GPU copy of the surface, re-uploaded only when the surface version moves
#[derive(Default)]
pub struct SurfaceTexture {
    handle: Option<TextureHandle>,
    uploaded_version: Option<u64>,
    uploaded_size: [usize; 2],
}

// Custom Debug implementation since TextureHandle carries a texture manager
impl std::fmt::Debug for SurfaceTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceTexture")
            .field("loaded", &self.handle.is_some())
            .field("uploaded_version", &self.uploaded_version)
            .field("uploaded_size", &self.uploaded_size)
            .finish()
    }
}

impl SurfaceTexture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the surface changed since the last upload
    pub fn is_stale(&self, surface: &Surface) -> bool {
        self.uploaded_version != Some(surface.version()) || self.uploaded_size != surface.size()
    }

    /// Upload the surface if needed and return the texture to paint
    pub fn sync(&mut self, ctx: &Context, surface: &Surface) -> TextureId {
        let stale = self.is_stale(surface);
        self.uploaded_version = Some(surface.version());
        self.uploaded_size = surface.size();

        if let Some(handle) = &mut self.handle {
            if stale {
                handle.set(surface.to_color_image(), TextureOptions::NEAREST);
            }
            return handle.id();
        }

        let handle = ctx.load_texture("whiteboard_surface", surface.to_color_image(), TextureOptions::NEAREST);
        let id = handle.id();
        self.handle = Some(handle);
        id
    }
}
