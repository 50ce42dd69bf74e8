//! Store error and image-format types.

use std::fmt;
use thiserror::Error;

/// Encoding used for finished tiles.
///
/// Exactly one format is active per store: a lossless one (PNG) or a lossy
/// one (JPEG). Raw snapshots are always uncompressed and unaffected by this
/// choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileImageFormat {
    /// Lossless PNG output
    #[default]
    Png,
    /// Lossy JPEG output
    Jpeg,
}

impl TileImageFormat {
    /// File extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            TileImageFormat::Png => "png",
            TileImageFormat::Jpeg => "jpg",
        }
    }

    /// The corresponding `image` crate output format.
    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            TileImageFormat::Png => image::ImageFormat::Png,
            TileImageFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

impl fmt::Display for TileImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Tile store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error during store operations
    #[error("tile store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encode failure while writing a finished tile
    #[error("tile encode error: {0}")]
    Encode(#[from] image::ImageError),

    /// Raw snapshot bytes do not match their recorded dimensions
    #[error("corrupt raw snapshot: {0}")]
    CorruptSnapshot(String),
}
