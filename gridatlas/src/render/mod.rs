//! Per-region rendering abstraction.
//!
//! The compositor depends only on the [`RegionRenderer`] trait; concrete
//! renderers are selectable by configuration. The variants shipped here are
//! simple synthetic painters (the full terrain/object renderers live with the
//! simulator, outside this crate); they exist so the pipeline can produce a
//! complete, visually legible pyramid on its own.

mod placeholder;
mod variants;

pub use placeholder::ocean_placeholder;
pub use variants::{FailingRenderer, FlatColorRenderer, GradientRenderer};

use crate::directory::RegionInfo;
use image::RgbaImage;
use thiserror::Error;

/// Render errors.
///
/// A render failure never aborts a generation cycle; the compositor degrades
/// the affected leaf to an ocean placeholder and logs a warning.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Region data could not be obtained
    #[error("region data unavailable for {0}: {1}")]
    DataUnavailable(String, String),

    /// Renderer-internal failure
    #[error("render failed for {0}: {1}")]
    Failed(String, String),
}

/// Per-region renderer seam.
///
/// Given a coordinate-resolved region, produce one square tile image of the
/// requested pixel size.
pub trait RegionRenderer: Send + Sync {
    /// Render one region into a fresh `tile_size` x `tile_size` image.
    fn render(&self, region: &RegionInfo, tile_size: u32) -> Result<RgbaImage, RenderError>;

    /// Short name of this renderer variant, for logs.
    fn name(&self) -> &str;
}
