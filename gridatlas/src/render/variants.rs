//! Built-in renderer variants.

use crate::directory::RegionInfo;
use crate::render::{RegionRenderer, RenderError};
use image::{Rgba, RgbaImage};

/// Halve each channel of an offline region's color so it reads as grayed
/// out on the finished map.
fn dim_if_offline(color: [u8; 3], online: bool) -> [u8; 3] {
    if online {
        color
    } else {
        [color[0] / 2, color[1] / 2, color[2] / 2]
    }
}

/// Renders each region as a single flat color derived from its id.
///
/// The color is a stable hash of the region id, so a region keeps its color
/// across cycles and two adjacent regions are very likely distinguishable.
/// Offline regions are dimmed.
#[derive(Debug, Default)]
pub struct FlatColorRenderer;

impl FlatColorRenderer {
    /// Create a flat-color renderer.
    pub fn new() -> Self {
        Self
    }

    fn color_for(id: &str) -> [u8; 3] {
        // FNV-1a over the id bytes; stable across runs and platforms
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in id.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        [
            (hash >> 16) as u8,
            (hash >> 8) as u8,
            // Keep some minimum brightness so tiles read against dark ocean
            ((hash as u8) >> 1) | 0x40,
        ]
    }
}

impl RegionRenderer for FlatColorRenderer {
    fn render(&self, region: &RegionInfo, tile_size: u32) -> Result<RgbaImage, RenderError> {
        let [r, g, b] = dim_if_offline(Self::color_for(region.id.as_str()), region.online);
        Ok(RgbaImage::from_pixel(
            tile_size,
            tile_size,
            Rgba([r, g, b, 255]),
        ))
    }

    fn name(&self) -> &str {
        "flat"
    }
}

/// Renders each region as a two-axis gradient anchored at its grid position.
///
/// Neighboring regions produce visibly continuous shading, which makes
/// super-tile seams and quadrant placement easy to eyeball on the finished
/// pyramid.
#[derive(Debug, Default)]
pub struct GradientRenderer;

impl GradientRenderer {
    /// Create a gradient renderer.
    pub fn new() -> Self {
        Self
    }
}

impl RegionRenderer for GradientRenderer {
    fn render(&self, region: &RegionInfo, tile_size: u32) -> Result<RgbaImage, RenderError> {
        let base_r = (region.coord.x.wrapping_mul(37) % 160) as u8;
        let base_g = (region.coord.y.wrapping_mul(59) % 160) as u8;
        let span = tile_size.max(1);
        Ok(RgbaImage::from_fn(tile_size, tile_size, |px, py| {
            let shade_x = (px * 95 / span) as u8;
            let shade_y = (py * 95 / span) as u8;
            let [r, g, b] = dim_if_offline(
                [
                    base_r.saturating_add(shade_x),
                    base_g.saturating_add(shade_y),
                    96,
                ],
                region.online,
            );
            Rgba([r, g, b, 255])
        }))
    }

    fn name(&self) -> &str {
        "gradient"
    }
}

/// Renderer that always fails. Exercises the placeholder fallback path in
/// tests.
#[derive(Debug, Default)]
pub struct FailingRenderer;

impl FailingRenderer {
    /// Create a failing renderer.
    pub fn new() -> Self {
        Self
    }
}

impl RegionRenderer for FailingRenderer {
    fn render(&self, region: &RegionInfo, _tile_size: u32) -> Result<RgbaImage, RenderError> {
        Err(RenderError::Failed(
            region.id.to_string(),
            "renderer configured to fail".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::GridCoord;
    use crate::directory::RegionId;

    fn region(id: &str, x: u32, y: u32) -> RegionInfo {
        RegionInfo {
            id: RegionId::from(id),
            coord: GridCoord { x, y },
            online: true,
        }
    }

    #[test]
    fn test_flat_color_is_stable_per_id() {
        let renderer = FlatColorRenderer::new();
        let a = renderer.render(&region("alpha", 0, 0), 8).unwrap();
        let b = renderer.render(&region("alpha", 5, 5), 8).unwrap();
        assert_eq!(a, b, "color depends on id, not position");
    }

    #[test]
    fn test_flat_color_differs_between_ids() {
        let renderer = FlatColorRenderer::new();
        let a = renderer.render(&region("alpha", 0, 0), 8).unwrap();
        let b = renderer.render(&region("beta", 0, 0), 8).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_flat_color_tile_is_uniform() {
        let renderer = FlatColorRenderer::new();
        let tile = renderer.render(&region("gamma", 1, 2), 16).unwrap();
        let first = *tile.get_pixel(0, 0);
        assert!(tile.pixels().all(|p| *p == first));
    }

    #[test]
    fn test_offline_region_renders_dimmed() {
        let renderer = FlatColorRenderer::new();
        let online = renderer.render(&region("alpha", 0, 0), 4).unwrap();
        let mut offline_region = region("alpha", 0, 0);
        offline_region.online = false;
        let offline = renderer.render(&offline_region, 4).unwrap();

        let bright = online.get_pixel(0, 0).0;
        let dimmed = offline.get_pixel(0, 0).0;
        assert_eq!(dimmed[0], bright[0] / 2);
        assert_eq!(dimmed[1], bright[1] / 2);
        assert_eq!(dimmed[2], bright[2] / 2);
        assert_eq!(dimmed[3], 255);
    }

    #[test]
    fn test_gradient_dims_offline_regions() {
        let renderer = GradientRenderer::new();
        let online = renderer.render(&region("eta", 2, 3), 8).unwrap();
        let mut offline_region = region("eta", 2, 3);
        offline_region.online = false;
        let offline = renderer.render(&offline_region, 8).unwrap();

        let bright = online.get_pixel(4, 4).0;
        let dimmed = offline.get_pixel(4, 4).0;
        assert_eq!(dimmed[0], bright[0] / 2);
        assert_eq!(dimmed[2], bright[2] / 2);
    }

    #[test]
    fn test_gradient_requested_size() {
        let renderer = GradientRenderer::new();
        let tile = renderer.render(&region("delta", 3, 4), 64).unwrap();
        assert_eq!(tile.dimensions(), (64, 64));
    }

    #[test]
    fn test_gradient_varies_within_tile() {
        let renderer = GradientRenderer::new();
        let tile = renderer.render(&region("epsilon", 0, 0), 64).unwrap();
        assert_ne!(tile.get_pixel(0, 0), tile.get_pixel(63, 63));
    }

    #[test]
    fn test_failing_renderer_always_errs() {
        let renderer = FailingRenderer::new();
        let result = renderer.render(&region("zeta", 0, 0), 8);
        assert!(matches!(result, Err(RenderError::Failed(_, _))));
    }
}
