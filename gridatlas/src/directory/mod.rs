//! Region directory abstraction.
//!
//! The directory answers two questions for the tile pipeline: which regions
//! exist with resolved grid coordinates, and what region (if any) occupies a
//! given cell. Regions without known coordinates are invisible here and are
//! therefore excluded from tree construction entirely.

use crate::coord::GridCoord;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Opaque region identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct RegionId(String);

impl RegionId {
    /// Create a region id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A coordinate-resolved region known to the directory.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionInfo {
    /// Region identifier
    pub id: RegionId,
    /// Grid position of the region
    pub coord: GridCoord,
    /// Whether the region is currently online. Offline regions stay in the
    /// tile tree; renderers may depict them differently (the built-in
    /// variants dim them).
    #[serde(default = "default_online")]
    pub online: bool,
}

fn default_online() -> bool {
    true
}

/// Region directory seam.
///
/// Implementations resolve region identifiers to grid locations and report
/// cell occupancy. The tile pipeline depends only on this trait, so the
/// backing source (simulator database, static file, test fixture) is
/// interchangeable.
pub trait RegionDirectory: Send + Sync {
    /// All regions with known grid coordinates.
    fn regions(&self) -> Vec<RegionInfo>;

    /// The region occupying a grid cell, if any.
    fn region_at(&self, coord: GridCoord) -> Option<RegionInfo>;
}

/// In-memory region directory backed by a coordinate map.
///
/// Used by the CLI (regions loaded from a file) and by tests. Duplicate
/// coordinates keep the first region seen.
pub struct StaticRegionDirectory {
    by_coord: HashMap<GridCoord, RegionInfo>,
}

impl StaticRegionDirectory {
    /// Build a directory from a list of regions.
    pub fn new(regions: Vec<RegionInfo>) -> Self {
        let mut by_coord = HashMap::with_capacity(regions.len());
        for region in regions {
            by_coord.entry(region.coord).or_insert(region);
        }
        Self { by_coord }
    }

    /// Number of known regions.
    pub fn len(&self) -> usize {
        self.by_coord.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.by_coord.is_empty()
    }
}

impl RegionDirectory for StaticRegionDirectory {
    fn regions(&self) -> Vec<RegionInfo> {
        let mut regions: Vec<RegionInfo> = self.by_coord.values().cloned().collect();
        // Stable output order regardless of map iteration order
        regions.sort_by_key(|r| (r.coord.y, r.coord.x));
        regions
    }

    fn region_at(&self, coord: GridCoord) -> Option<RegionInfo> {
        self.by_coord.get(&coord).cloned()
    }
}
