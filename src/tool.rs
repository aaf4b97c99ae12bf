use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::ColorParseError;

/// Width bounds accepted from the size input
pub const MIN_SIZE: f32 = 1.0;
pub const MAX_SIZE: f32 = 100.0;

/// Opacity of the highlighter relative to a normal stroke
pub const HIGHLIGHT_OPACITY: f32 = 0.5;

/// The active drawing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Draw,
    Highlight,
    Erase,
    Fill,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Draw, Tool::Highlight, Tool::Erase, Tool::Fill];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Draw => "Draw",
            Tool::Highlight => "Highlight",
            Tool::Erase => "Erase",
            Tool::Fill => "Fill",
        }
    }

    /// Glyph shown on the toolbar button
    pub fn icon(self) -> &'static str {
        match self {
            Tool::Draw => "✏",
            Tool::Highlight => "🖊",
            Tool::Erase => "⌫",
            Tool::Fill => "💧",
        }
    }

    /// What the pointer should look like over the canvas while this tool is active
    pub fn cursor_hint(self) -> CursorHint {
        match self {
            Tool::Draw => CursorHint::Crosshair,
            other => CursorHint::Icon(other.icon()),
        }
    }
}

/// Cursor presentation requested from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Crosshair,
    /// Hide the system cursor and draw this glyph at the pointer
    Icon(&'static str),
}

/// How a brush lays paint down on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushParams {
    pub color: Color32,
    pub width: f32,
    pub opacity: f32,
}

impl BrushParams {
    pub fn is_translucent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Tool choice plus color and size, as set from the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub tool: Tool,
    pub color: Color32,
    pub size: f32,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tool: Tool::Draw,
            color: Color32::BLACK,
            size: 2.0,
        }
    }
}

impl ToolConfig {
    /// Brush for the current tool, `None` for tools that do not paint strokes
    pub fn brush(&self) -> Option<BrushParams> {
        match self.tool {
            Tool::Draw => Some(BrushParams {
                color: self.color,
                width: self.size,
                opacity: 1.0,
            }),
            Tool::Highlight => Some(BrushParams {
                color: self.color,
                width: self.size * 2.0,
                opacity: HIGHLIGHT_OPACITY,
            }),
            Tool::Erase => Some(BrushParams {
                color: Color32::WHITE,
                width: self.size,
                opacity: 1.0,
            }),
            Tool::Fill => None,
        }
    }

    pub fn set_size(&mut self, size: f32) {
        if size.is_finite() {
            self.size = size.clamp(MIN_SIZE, MAX_SIZE);
        } else {
            log::warn!("Ignoring non-finite tool size {}", size);
        }
    }

    pub fn set_color_hex(&mut self, hex: &str) -> Result<(), ColorParseError> {
        self.color = parse_hex_color(hex)?;
        Ok(())
    }
}

/// Parse an opaque `#rrggbb` color
pub fn parse_hex_color(hex: &str) -> Result<Color32, ColorParseError> {
    let digits = hex
        .trim()
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.is_ascii())
        .ok_or_else(|| ColorParseError::InvalidFormat(hex.to_owned()))?;

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| ColorParseError::InvalidDigits(hex.to_owned()))
    };

    Ok(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Format a color as `#rrggbb`, dropping alpha
pub fn to_hex_color(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}
