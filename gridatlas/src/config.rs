//! Generation cycle configuration.

use crate::store::TileImageFormat;
use thiserror::Error;

/// Default finished-tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;
/// Default maximum zoom level of the pyramid.
pub const DEFAULT_MAX_ZOOM: u8 = 8;
/// Default ocean/background fill color (RGB).
pub const DEFAULT_OCEAN_COLOR: [u8; 3] = [29, 71, 95];

/// Highest accepted maximum zoom level.
///
/// A tile at the ceiling zoom spans `2^(MAX_ZOOM_LIMIT-1)` grid cells, which
/// already covers the whole packable coordinate range of
/// [`crate::coord::MAX_COORD`]; beyond it the block-alignment shifts would
/// exceed the 32-bit coordinate width.
pub const MAX_ZOOM_LIMIT: u8 = 28;

/// Configuration errors, reported before a cycle starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Tile size must be a nonzero power of two
    #[error("tile size must be a nonzero power of two, got {0}")]
    InvalidTileSize(u32),

    /// Maximum zoom level must be at least 1
    #[error("maximum zoom level must be at least 1")]
    InvalidMaxZoom,

    /// Maximum zoom level exceeds the supported ceiling
    #[error("maximum zoom level must be at most {MAX_ZOOM_LIMIT}, got {0}")]
    MaxZoomTooLarge(u8),
}

/// Settings for one pyramid generation cycle.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Output tile edge length in pixels (power of two, default 256)
    pub tile_size: u32,
    /// Maximum zoom level of the pyramid (default 8)
    pub max_zoom: u8,
    /// Background/ocean fill color (RGB)
    pub ocean_color: [u8; 3],
    /// Incremental ("server") mode: read and write raw super-tile snapshots
    pub server_mode: bool,
    /// Worker cap for parallel fan-out work: -1 = fully parallel, 1 = serial
    pub workers: i32,
    /// Finished-tile image format
    pub format: TileImageFormat,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            max_zoom: DEFAULT_MAX_ZOOM,
            ocean_color: DEFAULT_OCEAN_COLOR,
            server_mode: false,
            workers: -1,
            format: TileImageFormat::default(),
        }
    }
}

impl GeneratorConfig {
    /// Set the output tile pixel size.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the maximum zoom level.
    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Set the ocean fill color.
    pub fn with_ocean_color(mut self, color: [u8; 3]) -> Self {
        self.ocean_color = color;
        self
    }

    /// Enable or disable incremental server mode.
    pub fn with_server_mode(mut self, server_mode: bool) -> Self {
        self.server_mode = server_mode;
        self
    }

    /// Set the worker cap for parallel fan-out work.
    pub fn with_workers(mut self, workers: i32) -> Self {
        self.workers = workers;
        self
    }

    /// Set the finished-tile image format.
    pub fn with_format(mut self, format: TileImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Validate settings before a cycle starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 || !self.tile_size.is_power_of_two() {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        if self.max_zoom < 1 {
            return Err(ConfigError::InvalidMaxZoom);
        }
        if self.max_zoom > MAX_ZOOM_LIMIT {
            return Err(ConfigError::MaxZoomTooLarge(self.max_zoom));
        }
        Ok(())
    }
}
