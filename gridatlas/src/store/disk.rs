//! Disk-backed tile store.
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/<zoom>/<x>_<y>.<png|jpg>     finished tiles
//! <root>/raw/<zoom>/<x>_<y>.rgba      raw super-tile snapshots
//! ```
//!
//! Raw snapshots are uncompressed RGBA preceded by an 8-byte header (width
//! then height, little-endian u32), kept deliberately trivial so partial
//! regeneration can slurp them back without codec work.

use crate::coord::TileCoord;
use crate::store::{StoreError, TileImageFormat, TileStore};
use image::RgbaImage;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory name for raw snapshots under the store root.
const RAW_DIR: &str = "raw";
/// File extension for raw snapshots.
const RAW_EXT: &str = "rgba";

/// Disk store for finished tiles and raw snapshots.
pub struct DiskTileStore {
    root: PathBuf,
    format: TileImageFormat,
}

impl DiskTileStore {
    /// Open (or create) a disk store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Failure to create the root directory is fatal: without storage there
    /// is nothing the generation run can produce.
    pub fn new(root: PathBuf, format: TileImageFormat) -> Result<Self, StoreError> {
        fs::create_dir_all(&root)?;
        Ok(Self { root, format })
    }

    /// The configured finished-tile format.
    pub fn format(&self) -> TileImageFormat {
        self.format
    }

    fn finished_path(&self, coord: TileCoord) -> PathBuf {
        self.root
            .join(coord.zoom.to_string())
            .join(format!("{}_{}.{}", coord.x, coord.y, self.format.extension()))
    }

    fn raw_path(&self, coord: TileCoord) -> PathBuf {
        self.root
            .join(RAW_DIR)
            .join(coord.zoom.to_string())
            .join(format!("{}_{}.{}", coord.x, coord.y, RAW_EXT))
    }

    fn write_file(path: &Path, data: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }

    /// Scan one level of `<base>/<zoom>/<x>_<y>.<ext>` files.
    fn scan(base: &Path, ext: &str) -> Result<Vec<TileCoord>, StoreError> {
        let mut coords = Vec::new();
        if !base.exists() {
            return Ok(coords);
        }
        for zoom_entry in fs::read_dir(base)? {
            let zoom_entry = zoom_entry?;
            if !zoom_entry.file_type()?.is_dir() {
                continue;
            }
            let Some(zoom) = zoom_entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u8>().ok())
            else {
                continue;
            };
            for tile_entry in fs::read_dir(zoom_entry.path())? {
                let tile_entry = tile_entry?;
                let name = tile_entry.file_name();
                let Some(name) = name.to_str() else { continue };
                if let Some((x, y)) = parse_tile_filename(name, ext) {
                    coords.push(TileCoord { x, y, zoom });
                }
            }
        }
        Ok(coords)
    }
}

/// Parse an `<x>_<y>.<ext>` tile filename.
fn parse_tile_filename(name: &str, ext: &str) -> Option<(u32, u32)> {
    let stem = name.strip_suffix(ext)?.strip_suffix('.')?;
    let (x, y) = stem.split_once('_')?;
    Some((x.parse().ok()?, y.parse().ok()?))
}

impl TileStore for DiskTileStore {
    fn load_finished_tile(&self, coord: TileCoord) -> Option<RgbaImage> {
        let path = self.finished_path(coord);
        if !path.exists() {
            return None;
        }
        match image::open(&path) {
            Ok(img) => Some(img.to_rgba8()),
            Err(err) => {
                warn!(tile = %coord, path = %path.display(), error = %err,
                      "Unreadable finished tile treated as missing");
                None
            }
        }
    }

    fn save_finished_tile(&self, coord: TileCoord, image: &RgbaImage) -> Result<(), StoreError> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        match self.format {
            TileImageFormat::Png => image.write_to(&mut cursor, image::ImageFormat::Png)?,
            // JPEG has no alpha channel; drop it at encode time
            TileImageFormat::Jpeg => {
                let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
                rgb.write_to(&mut cursor, image::ImageFormat::Jpeg)?;
            }
        }
        let path = self.finished_path(coord);
        Self::write_file(&path, &buffer)?;
        debug!(tile = %coord, bytes = buffer.len(), "Persisted finished tile");
        Ok(())
    }

    fn load_raw_snapshot(&self, coord: TileCoord) -> Option<RgbaImage> {
        let path = self.raw_path(coord);
        let data = fs::read(&path).ok()?;
        match decode_raw(&data) {
            Ok(image) => Some(image),
            Err(err) => {
                warn!(tile = %coord, path = %path.display(), error = %err,
                      "Unreadable raw snapshot treated as missing");
                None
            }
        }
    }

    fn save_raw_snapshot(&self, coord: TileCoord, image: &RgbaImage) -> Result<(), StoreError> {
        let path = self.raw_path(coord);
        Self::write_file(&path, &encode_raw(image))?;
        debug!(tile = %coord, "Persisted raw snapshot");
        Ok(())
    }

    fn list_finished_tiles(&self) -> Result<Vec<TileCoord>, StoreError> {
        Self::scan(&self.root, self.format.extension())
    }

    fn remove_finished_tile(&self, coord: TileCoord) -> Result<(), StoreError> {
        remove_if_present(&self.finished_path(coord))
    }

    fn list_raw_snapshots(&self) -> Result<Vec<TileCoord>, StoreError> {
        Self::scan(&self.root.join(RAW_DIR), RAW_EXT)
    }

    fn remove_raw_snapshot(&self, coord: TileCoord) -> Result<(), StoreError> {
        remove_if_present(&self.raw_path(coord))
    }
}

/// Delete a file, treating an already-missing file as success.
fn remove_if_present(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Encode an image as header + raw RGBA bytes.
fn encode_raw(image: &RgbaImage) -> Vec<u8> {
    let mut data = Vec::with_capacity(8 + image.as_raw().len());
    data.extend_from_slice(&image.width().to_le_bytes());
    data.extend_from_slice(&image.height().to_le_bytes());
    data.extend_from_slice(image.as_raw());
    data
}

/// Decode header + raw RGBA bytes back into an image.
fn decode_raw(data: &[u8]) -> Result<RgbaImage, StoreError> {
    if data.len() < 8 {
        return Err(StoreError::CorruptSnapshot(format!(
            "{} bytes is too short for a snapshot header",
            data.len()
        )));
    }
    let width = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let height = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let expected = (width as usize) * (height as usize) * 4;
    let pixels = &data[8..];
    if pixels.len() != expected {
        return Err(StoreError::CorruptSnapshot(format!(
            "expected {expected} pixel bytes for {width}x{height}, found {}",
            pixels.len()
        )));
    }
    RgbaImage::from_raw(width, height, pixels.to_vec()).ok_or_else(|| {
        StoreError::CorruptSnapshot(format!("dimensions {width}x{height} overflow"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    fn store(dir: &TempDir, format: TileImageFormat) -> DiskTileStore {
        DiskTileStore::new(dir.path().to_path_buf(), format).unwrap()
    }

    fn solid(size: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba(color))
    }

    #[test]
    fn test_finished_tile_round_trip_png() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, TileImageFormat::Png);
        let coord = TileCoord { x: 10, y: 10, zoom: 1 };
        let tile = solid(16, [10, 200, 30, 255]);

        store.save_finished_tile(coord, &tile).unwrap();
        let loaded = store.load_finished_tile(coord).expect("tile present");
        assert_eq!(loaded, tile);
    }

    #[test]
    fn test_finished_tile_jpeg_is_loadable() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, TileImageFormat::Jpeg);
        let coord = TileCoord { x: 2, y: 3, zoom: 2 };
        store.save_finished_tile(coord, &solid(16, [255, 0, 0, 255])).unwrap();

        // Lossy format: assert presence and dimensions, not exact pixels
        let loaded = store.load_finished_tile(coord).expect("tile present");
        assert_eq!(loaded.dimensions(), (16, 16));
    }

    #[test]
    fn test_load_missing_tile_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, TileImageFormat::Png);
        assert!(store
            .load_finished_tile(TileCoord { x: 0, y: 0, zoom: 1 })
            .is_none());
    }

    #[test]
    fn test_raw_snapshot_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, TileImageFormat::Png);
        let coord = TileCoord { x: 4, y: 4, zoom: 2 };
        let mut snapshot = solid(8, [0, 0, 255, 255]);
        snapshot.put_pixel(3, 5, Rgba([9, 9, 9, 255]));

        store.save_raw_snapshot(coord, &snapshot).unwrap();
        let loaded = store.load_raw_snapshot(coord).expect("snapshot present");
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_corrupt_raw_snapshot_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, TileImageFormat::Png);
        let coord = TileCoord { x: 4, y: 4, zoom: 2 };
        store.save_raw_snapshot(coord, &solid(8, [1, 2, 3, 255])).unwrap();

        // Truncate the file behind the store's back
        let path = dir.path().join("raw").join("2").join("4_4.rgba");
        fs::write(&path, b"garbage").unwrap();
        assert!(store.load_raw_snapshot(coord).is_none());
    }

    #[test]
    fn test_list_and_remove_finished_tiles() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, TileImageFormat::Png);
        let coords = [
            TileCoord { x: 0, y: 0, zoom: 1 },
            TileCoord { x: 1, y: 0, zoom: 1 },
            TileCoord { x: 0, y: 0, zoom: 2 },
        ];
        for coord in coords {
            store.save_finished_tile(coord, &solid(4, [5, 5, 5, 255])).unwrap();
        }

        let mut listed = store.list_finished_tiles().unwrap();
        listed.sort();
        let mut expected = coords.to_vec();
        expected.sort();
        assert_eq!(listed, expected);

        store.remove_finished_tile(coords[0]).unwrap();
        assert_eq!(store.list_finished_tiles().unwrap().len(), 2);
        assert!(store.load_finished_tile(coords[0]).is_none());
    }

    #[test]
    fn test_list_raw_snapshots() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, TileImageFormat::Png);
        let coord = TileCoord { x: 8, y: 8, zoom: 3 };
        store.save_raw_snapshot(coord, &solid(4, [1, 1, 1, 255])).unwrap();

        assert_eq!(store.list_raw_snapshots().unwrap(), vec![coord]);
        store.remove_raw_snapshot(coord).unwrap();
        assert!(store.list_raw_snapshots().unwrap().is_empty());
    }

    #[test]
    fn test_remove_missing_entries_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, TileImageFormat::Png);
        let coord = TileCoord { x: 9, y: 9, zoom: 1 };
        assert!(store.remove_finished_tile(coord).is_ok());
        assert!(store.remove_raw_snapshot(coord).is_ok());
    }

    #[test]
    fn test_parse_tile_filename() {
        assert_eq!(parse_tile_filename("10_12.png", "png"), Some((10, 12)));
        assert_eq!(parse_tile_filename("0_0.rgba", "rgba"), Some((0, 0)));
        assert_eq!(parse_tile_filename("10-12.png", "png"), None);
        assert_eq!(parse_tile_filename("10_12.jpg", "png"), None);
        assert_eq!(parse_tile_filename("notatile.png", "png"), None);
    }
}
