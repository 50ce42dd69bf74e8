//! Grid and tile coordinate model.
//!
//! All positions are integer region-grid coordinates (X, Y >= 0) where +Y is
//! north. A zoom level Z >= 1 identifies pyramid depth: Z=1 is a base region
//! tile (one grid cell), and each increment of Z doubles the edge length of
//! the block a tile covers. A tile at zoom Z covers a `2^(Z-1)` square block
//! of base cells, aligned to multiples of `2^(Z-1)`.

mod types;

pub use types::{CoordError, GridCoord, NodeId, TileCoord, MAX_COORD, MIN_ZOOM};

/// Computes the origin of the 2x2 first-super-tile block containing a cell.
///
/// This is the zoom-2 block the cell belongs to, truncated to even
/// coordinates. Used to discover sibling cells that share a super tile.
#[inline]
pub fn first_super_origin(coord: GridCoord) -> GridCoord {
    GridCoord {
        x: (coord.x >> 1) << 1,
        y: (coord.y >> 1) << 1,
    }
}
