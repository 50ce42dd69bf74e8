//! Core coordinate types and node identity.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Minimum zoom level. Zoom 1 is a base region tile.
pub const MIN_ZOOM: u8 = 1;

/// Maximum grid coordinate that can be packed into a [`NodeId`] (exclusive).
pub const MAX_COORD: u32 = 1 << 28;

/// Coordinate-related errors.
#[derive(Debug, Error)]
pub enum CoordError {
    /// Grid coordinate exceeds the packable range
    #[error("grid coordinate out of range: {0}")]
    CoordinateOutOfRange(u32),

    /// Zoom level below the minimum
    #[error("invalid zoom level: {0} (minimum {MIN_ZOOM})")]
    InvalidZoom(u8),
}

/// A single region cell on the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub struct GridCoord {
    /// Grid X position in region units
    pub x: u32,
    /// Grid Y position in region units (+Y is north)
    pub y: u32,
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Position of a tile-tree node: block origin plus zoom level.
///
/// The origin of a tile at zoom Z is aligned to multiples of `2^(Z-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Grid-aligned X origin of the covered block
    pub x: u32,
    /// Grid-aligned Y origin of the covered block
    pub y: u32,
    /// Zoom level (>= 1)
    pub zoom: u8,
}

impl TileCoord {
    /// Create a tile coordinate for a base (zoom 1) cell.
    pub fn base(coord: GridCoord) -> Self {
        Self {
            x: coord.x,
            y: coord.y,
            zoom: 1,
        }
    }

    /// Edge length of the covered block, in base cells.
    #[inline]
    pub fn span(&self) -> u32 {
        1 << (self.zoom - 1)
    }

    /// The coordinate of this tile's parent at zoom + 1.
    ///
    /// The parent origin is this origin truncated to the parent's coarser
    /// alignment: `(x >> Z) << Z` at zoom Z.
    #[inline]
    pub fn parent_origin(&self) -> TileCoord {
        let shift = self.zoom;
        TileCoord {
            x: (self.x >> shift) << shift,
            y: (self.y >> shift) << shift,
            zoom: self.zoom + 1,
        }
    }

    /// Whether a base cell falls within this tile's covered block.
    pub fn covers(&self, coord: GridCoord) -> bool {
        let span = self.span();
        coord.x >= self.x
            && coord.x < self.x + span
            && coord.y >= self.y
            && coord.y < self.y + span
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) z{}", self.x, self.y, self.zoom)
    }
}

/// Stable, collision-free node identity derived from `(zoom, x, y)`.
///
/// The packing is a bijection onto tile coordinates with x and y below
/// [`MAX_COORD`], so equal coordinates always produce equal ids and distinct
/// coordinates never collide within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Derive the id for a tile coordinate.
    ///
    /// # Errors
    ///
    /// Returns an error if either coordinate exceeds the packable range or
    /// the zoom level is below [`MIN_ZOOM`].
    pub fn from_coord(coord: TileCoord) -> Result<Self, CoordError> {
        if coord.zoom < MIN_ZOOM {
            return Err(CoordError::InvalidZoom(coord.zoom));
        }
        if coord.x >= MAX_COORD {
            return Err(CoordError::CoordinateOutOfRange(coord.x));
        }
        if coord.y >= MAX_COORD {
            return Err(CoordError::CoordinateOutOfRange(coord.y));
        }
        Ok(Self(
            ((coord.zoom as u64) << 56) | ((coord.x as u64) << 28) | coord.y as u64,
        ))
    }

    /// Recover the tile coordinate this id was derived from.
    pub fn coord(&self) -> TileCoord {
        TileCoord {
            x: ((self.0 >> 28) & (MAX_COORD as u64 - 1)) as u32,
            y: (self.0 & (MAX_COORD as u64 - 1)) as u32,
            zoom: (self.0 >> 56) as u8,
        }
    }

    /// Zoom level encoded in this id.
    #[inline]
    pub fn zoom(&self) -> u8 {
        (self.0 >> 56) as u8
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coord())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_doubles_per_zoom() {
        assert_eq!(TileCoord { x: 0, y: 0, zoom: 1 }.span(), 1);
        assert_eq!(TileCoord { x: 0, y: 0, zoom: 2 }.span(), 2);
        assert_eq!(TileCoord { x: 0, y: 0, zoom: 3 }.span(), 4);
        assert_eq!(TileCoord { x: 0, y: 0, zoom: 8 }.span(), 128);
    }

    #[test]
    fn test_parent_origin_alignment() {
        let leaf = TileCoord { x: 10, y: 10, zoom: 1 };
        let z2 = leaf.parent_origin();
        assert_eq!(z2, TileCoord { x: 10, y: 10, zoom: 2 });
        let z3 = z2.parent_origin();
        assert_eq!(z3, TileCoord { x: 8, y: 8, zoom: 3 });
        let z4 = z3.parent_origin();
        assert_eq!(z4, TileCoord { x: 8, y: 8, zoom: 4 });
    }

    #[test]
    fn test_parent_covers_child_origin() {
        let mut tile = TileCoord { x: 37, y: 129, zoom: 1 };
        let cell = GridCoord { x: 37, y: 129 };
        for _ in 1..8 {
            tile = tile.parent_origin();
            assert!(tile.covers(cell), "zoom {} block must cover the leaf", tile.zoom);
        }
    }

    #[test]
    fn test_covers_boundaries() {
        let tile = TileCoord { x: 4, y: 4, zoom: 2 };
        assert!(tile.covers(GridCoord { x: 4, y: 4 }));
        assert!(tile.covers(GridCoord { x: 5, y: 5 }));
        assert!(!tile.covers(GridCoord { x: 6, y: 4 }));
        assert!(!tile.covers(GridCoord { x: 3, y: 5 }));
    }

    #[test]
    fn test_node_id_round_trip() {
        let coords = [
            TileCoord { x: 0, y: 0, zoom: 1 },
            TileCoord { x: 5, y: 5, zoom: 1 },
            TileCoord { x: 1000, y: 2000, zoom: 4 },
            TileCoord { x: MAX_COORD - 1, y: MAX_COORD - 1, zoom: 8 },
        ];
        for coord in coords {
            let id = NodeId::from_coord(coord).unwrap();
            assert_eq!(id.coord(), coord);
            assert_eq!(id.zoom(), coord.zoom);
        }
    }

    #[test]
    fn test_node_id_distinct_coords_distinct_ids() {
        let a = NodeId::from_coord(TileCoord { x: 1, y: 0, zoom: 1 }).unwrap();
        let b = NodeId::from_coord(TileCoord { x: 0, y: 1, zoom: 1 }).unwrap();
        let c = NodeId::from_coord(TileCoord { x: 0, y: 1, zoom: 2 }).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_node_id_rejects_out_of_range() {
        let result = NodeId::from_coord(TileCoord {
            x: MAX_COORD,
            y: 0,
            zoom: 1,
        });
        assert!(matches!(result, Err(CoordError::CoordinateOutOfRange(_))));
    }

    #[test]
    fn test_node_id_rejects_zoom_zero() {
        let result = NodeId::from_coord(TileCoord { x: 0, y: 0, zoom: 0 });
        assert!(matches!(result, Err(CoordError::InvalidZoom(0))));
    }

    #[test]
    fn test_display() {
        let coord = TileCoord { x: 8, y: 8, zoom: 3 };
        assert_eq!(coord.to_string(), "(8, 8) z3");
        let id = NodeId::from_coord(coord).unwrap();
        assert_eq!(id.to_string(), "(8, 8) z3");
    }
}
