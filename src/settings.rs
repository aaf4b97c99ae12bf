use serde::{Deserialize, Serialize};

use crate::compositor::{DEFAULT_PASTE_OFFSET, DEFAULT_PASTE_SCALE};
use crate::error::SettingsError;
use crate::tool::ToolConfig;

/// What happens to freehand ink when the surface is recomposited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InkRetention {
    /// Strokes and fills live only on the surface and vanish on recomposite
    #[default]
    Ephemeral,
    /// Strokes and fills are mirrored into an ink raster drawn beneath the images
    Persistent,
}

/// User-tunable behaviour. Drawing content is never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old settings
pub struct Settings {
    /// Horizontal and vertical space subtracted from the viewport to size the surface
    pub margins: [u32; 2],
    pub tools: ToolConfig,
    pub ink_retention: InkRetention,
    pub paste_scale: f32,
    pub paste_offset: [f32; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            margins: [40, 100],
            tools: ToolConfig::default(),
            ink_retention: InkRetention::default(),
            paste_scale: DEFAULT_PASTE_SCALE,
            paste_offset: [DEFAULT_PASTE_OFFSET.x, DEFAULT_PASTE_OFFSET.y],
        }
    }
}

impl Settings {
    /// Environment variable naming a JSON settings file
    pub const ENV_VAR: &'static str = "WHITEBOARD_SETTINGS";

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.paste_scale.is_finite() && self.paste_scale > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "paste_scale must be positive, got {}",
                self.paste_scale
            )));
        }
        if !self.paste_offset.iter().all(|v| v.is_finite()) {
            return Err(SettingsError::Invalid("paste_offset must be finite".to_owned()));
        }
        Ok(())
    }

    /// Read the file named by [`Settings::ENV_VAR`], if the variable is set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_override() -> Result<Option<Self>, SettingsError> {
        let Ok(path) = std::env::var(Self::ENV_VAR) else {
            return Ok(None);
        };
        log::info!("Loading settings from {}", path);
        let text = std::fs::read_to_string(&path)?;
        Self::from_json(&text).map(Some)
    }

    /// Surface dimensions for a viewport, never smaller than one pixel
    pub fn surface_size(&self, viewport: egui::Vec2) -> (u32, u32) {
        let dim = |extent: f32, margin: u32| ((extent.max(0.0) as u32).saturating_sub(margin)).max(1);
        (dim(viewport.x, self.margins[0]), dim(viewport.y, self.margins[1]))
    }

    pub fn paste_offset(&self) -> egui::Pos2 {
        egui::pos2(self.paste_offset[0], self.paste_offset[1])
    }
}
