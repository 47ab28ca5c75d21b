//! Error types for atlas processing.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for atlas operations.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// I/O error tied to a path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image decode or encode error.
    #[error("image error on {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Invalid JSON.
    #[error("invalid JSON in {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// A regions file that is neither the object nor the list format.
    #[error("unrecognized regions JSON format")]
    RegionsFormat,

    /// A symbol map with the wrong shape.
    #[error("invalid symbol map: {0}")]
    SymbolMap(String),

    /// Card cell does not fit in the atlas even once.
    #[error("card size {card_w}x{card_h} is larger than atlas {atlas_w}x{atlas_h}")]
    CardLargerThanAtlas {
        card_w: u32,
        card_h: u32,
        atlas_w: u32,
        atlas_h: u32,
    },

    /// No card size in the regions file and none given explicitly.
    #[error("card size not found in regions JSON; provide a card width and height")]
    MissingCardSize,

    /// Card index outside the atlas grid.
    #[error("card index {index} out of range (atlas has {len} cards)")]
    CardIndexOutOfRange { index: usize, len: usize },

    /// Region index outside the region set.
    #[error("region index {index} out of range ({len} regions)")]
    RegionIndexOutOfRange { index: usize, len: usize },

    /// Text recognition failure.
    #[error("OCR failed: {0}")]
    Ocr(String),
}

impl AtlasError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap an image error with the path it concerns.
    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.into(),
            source,
        }
    }

    /// Wrap a JSON error with a description of what was being parsed.
    pub fn json(what: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            what: what.into(),
            source,
        }
    }
}

/// Result type alias using [`AtlasError`].
pub type Result<T> = std::result::Result<T, AtlasError>;
