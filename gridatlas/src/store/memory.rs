//! In-memory tile store for tests and dry runs.

use crate::coord::TileCoord;
use crate::store::{StoreError, TileStore};
use image::RgbaImage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// HashMap-backed store with optional write-failure injection.
///
/// Keeps full images rather than encoded bytes so tests can assert on exact
/// pixels without a decode step.
#[derive(Default)]
pub struct MemoryTileStore {
    finished: Mutex<HashMap<TileCoord, RgbaImage>>,
    raw: Mutex<HashMap<TileCoord, RgbaImage>>,
    fail_saves: AtomicBool,
}

impl MemoryTileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail, simulating locked files.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of finished tiles currently held.
    pub fn finished_count(&self) -> usize {
        self.finished.lock().unwrap().len()
    }

    /// Number of raw snapshots currently held.
    pub fn raw_count(&self) -> usize {
        self.raw.lock().unwrap().len()
    }

    /// Directly seed a finished tile, bypassing failure injection.
    pub fn seed_finished_tile(&self, coord: TileCoord, image: RgbaImage) {
        self.finished.lock().unwrap().insert(coord, image);
    }

    /// Directly seed a raw snapshot, bypassing failure injection.
    pub fn seed_raw_snapshot(&self, coord: TileCoord, image: RgbaImage) {
        self.raw.lock().unwrap().insert(coord, image);
    }

    fn locked_error() -> StoreError {
        StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "simulated locked file",
        ))
    }
}

impl TileStore for MemoryTileStore {
    fn load_finished_tile(&self, coord: TileCoord) -> Option<RgbaImage> {
        self.finished.lock().unwrap().get(&coord).cloned()
    }

    fn save_finished_tile(&self, coord: TileCoord, image: &RgbaImage) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Self::locked_error());
        }
        self.finished.lock().unwrap().insert(coord, image.clone());
        Ok(())
    }

    fn load_raw_snapshot(&self, coord: TileCoord) -> Option<RgbaImage> {
        self.raw.lock().unwrap().get(&coord).cloned()
    }

    fn save_raw_snapshot(&self, coord: TileCoord, image: &RgbaImage) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Self::locked_error());
        }
        self.raw.lock().unwrap().insert(coord, image.clone());
        Ok(())
    }

    fn list_finished_tiles(&self) -> Result<Vec<TileCoord>, StoreError> {
        let mut coords: Vec<TileCoord> = self.finished.lock().unwrap().keys().copied().collect();
        coords.sort();
        Ok(coords)
    }

    fn remove_finished_tile(&self, coord: TileCoord) -> Result<(), StoreError> {
        self.finished.lock().unwrap().remove(&coord);
        Ok(())
    }

    fn list_raw_snapshots(&self) -> Result<Vec<TileCoord>, StoreError> {
        let mut coords: Vec<TileCoord> = self.raw.lock().unwrap().keys().copied().collect();
        coords.sort();
        Ok(coords)
    }

    fn remove_raw_snapshot(&self, coord: TileCoord) -> Result<(), StoreError> {
        self.raw.lock().unwrap().remove(&coord);
        Ok(())
    }
}
