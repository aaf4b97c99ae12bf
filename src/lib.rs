#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod components;
pub mod compositor;
pub mod error;
pub mod fill;
pub mod geometry;
pub mod input;
pub mod panels;
pub mod paste;
pub mod settings;
pub mod stroke;
pub mod surface;
pub mod texture;
pub mod tool;
pub mod whiteboard;

pub use app::{PasteIntake, WhiteboardApp, intake_pastes};
pub use compositor::{DragState, ImageCompositor, ImageId, PlacedImage};
pub use error::{ColorParseError, FillError, PasteError, SettingsError};
pub use fill::{FillReport, flood_fill};
pub use input::{InputEvent, InputHandler};
pub use paste::{ClipboardItem, ClipboardSource, PasteDecoder, SystemClipboard};
pub use settings::{InkRetention, Settings};
pub use stroke::{StrokeRenderer, StrokeSession};
pub use surface::Surface;
pub use tool::{BrushParams, Tool, ToolConfig};
pub use whiteboard::{Gesture, Whiteboard};
