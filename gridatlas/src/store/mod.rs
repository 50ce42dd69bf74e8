//! Tile persistence abstraction.
//!
//! The compositor talks to a [`TileStore`] for everything it keeps on disk:
//! finished (encoded) tiles at every zoom level, and raw uncompressed
//! super-tile snapshots used to accelerate incremental regeneration in
//! server mode. Backends are interchangeable behind the trait; the disk
//! backend is the production store, the memory backend serves tests.

mod disk;
mod memory;
mod types;

pub use disk::DiskTileStore;
pub use memory::MemoryTileStore;
pub use types::{StoreError, TileImageFormat};

use crate::coord::TileCoord;
use image::RgbaImage;

/// Tile persistence seam.
///
/// Load operations return `None` for both genuine misses and unreadable
/// entries; an unreadable tile is indistinguishable from an absent one to the
/// caller and is simply regenerated. Save and remove failures are per-key:
/// the caller logs and skips, and the next generation cycle retries.
pub trait TileStore: Send + Sync {
    /// Load a previously finished tile, if present and readable.
    fn load_finished_tile(&self, coord: TileCoord) -> Option<RgbaImage>;

    /// Persist a finished tile in the store's configured image format.
    fn save_finished_tile(&self, coord: TileCoord, image: &RgbaImage) -> Result<(), StoreError>;

    /// Load a raw super-tile snapshot, if present and readable.
    fn load_raw_snapshot(&self, coord: TileCoord) -> Option<RgbaImage>;

    /// Persist a raw (uncompressed, pre-downsample) super-tile snapshot.
    fn save_raw_snapshot(&self, coord: TileCoord, image: &RgbaImage) -> Result<(), StoreError>;

    /// Enumerate the coordinates of all finished tiles currently stored.
    fn list_finished_tiles(&self) -> Result<Vec<TileCoord>, StoreError>;

    /// Delete one finished tile. Removing an entry that does not exist is a
    /// no-op: the desired end state is reached either way.
    fn remove_finished_tile(&self, coord: TileCoord) -> Result<(), StoreError>;

    /// Enumerate the coordinates of all raw snapshots currently stored.
    fn list_raw_snapshots(&self) -> Result<Vec<TileCoord>, StoreError>;

    /// Delete one raw snapshot. Removing an entry that does not exist is a
    /// no-op.
    fn remove_raw_snapshot(&self, coord: TileCoord) -> Result<(), StoreError>;
}
