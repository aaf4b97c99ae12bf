use thiserror::Error;

/// Reasons a flood fill leaves the surface untouched
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillError {
    #[error("Fill seed ({x}, {y}) lies outside the {width}x{height} surface")]
    SeedOutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    #[error("Fill seed ({x}, {y}) is on a fully transparent pixel")]
    NonFillable { x: i32, y: i32 },
}

/// Errors raised while turning a pasted payload into a raster
#[derive(Error, Debug)]
pub enum PasteError {
    #[error("Clipboard item is not an image (mime: {0:?})")]
    NotAnImage(String),
    #[error("Clipboard item carries no data")]
    Empty,
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Decoder worker went away before finishing")]
    Canceled,
}

/// Errors from parsing a `#rrggbb` color string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("Color must look like #rrggbb, got {0:?}")]
    InvalidFormat(String),
    #[error("Invalid hex digits in color {0:?}")]
    InvalidDigits(String),
}

/// Errors from loading settings overrides
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}
