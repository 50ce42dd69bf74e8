//! Child placement arithmetic.
//!
//! Grid coordinates grow northward (+Y up) while image rows grow downward,
//! so the vertical offset is mirrored inside the parent's working buffer.

use crate::coord::TileCoord;

/// Pixel offset of a child tile inside its parent's 2x-size working buffer.
///
/// Horizontal: the grid distance between child and parent origins, scaled to
/// pixels and shifted down by the child's zoom (one child step spans
/// `2^(zoom-1)` grid cells but always one tile of pixels). Vertical: the same
/// magnitude, flipped so that the northern child row lands at the top of the
/// buffer.
pub fn child_offset(child: TileCoord, parent: TileCoord, tile_size: u32) -> (i64, i64) {
    let shift = child.zoom - 1;
    let dx = ((child.x.abs_diff(parent.x) as u64 * tile_size as u64) >> shift) as i64;
    let dy = ((child.y.abs_diff(parent.y) as u64 * tile_size as u64) >> shift) as i64;
    (dx, tile_size as i64 - dy)
}
