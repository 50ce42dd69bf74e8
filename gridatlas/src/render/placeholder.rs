//! Ocean placeholder tile generation.
//!
//! When a leaf has no loadable tile and its render fails, the compositor
//! substitutes a solid tile in the configured ocean color so the map shows
//! water instead of a hole, and the cycle carries on.

use image::{Rgba, RgbaImage};

/// Generate a solid ocean-colored placeholder tile.
///
/// The alpha channel is fully opaque; `color` is the configured background
/// RGB.
pub fn ocean_placeholder(tile_size: u32, color: [u8; 3]) -> RgbaImage {
    RgbaImage::from_pixel(
        tile_size,
        tile_size,
        Rgba([color[0], color[1], color[2], 255]),
    )
}
