//! Generation cycle orchestration.
//!
//! One cycle: build the tile tree from the region directory, composite and
//! persist the pyramid, then delete tiles no longer referenced by the live
//! node set. Tree state is owned by the cycle and discarded when it returns;
//! nothing is retained between cycles except what the store keeps on disk.

mod cleanup;

pub use cleanup::{remove_stale_tiles, CleanupStats};

use crate::compositor::{CompositeStats, TileCompositor};
use crate::config::{ConfigError, GeneratorConfig};
use crate::coord::TileCoord;
use crate::directory::RegionDirectory;
use crate::render::RegionRenderer;
use crate::store::{StoreError, TileStore};
use crate::tree::TileTreeBuilder;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

/// Fatal generation errors.
///
/// Per-tile failures degrade locally inside the cycle; only infrastructure
/// failures (invalid configuration, unusable store) surface here and abort
/// the run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Configuration rejected before the cycle started
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Store-level failure (not a single locked file)
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Summary of one completed generation cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Coordinate-resolved regions seen by the directory
    pub regions: usize,
    /// Nodes in the tile tree across all zoom levels
    pub nodes: usize,
    /// Final tree roots
    pub roots: usize,
    /// Compositing counters
    pub composite: CompositeStats,
    /// Cleanup counters
    pub cleanup: CleanupStats,
}

/// Runs full pyramid generation cycles over the three collaborator seams.
pub struct PyramidGenerator {
    directory: Arc<dyn RegionDirectory>,
    renderer: Arc<dyn RegionRenderer>,
    store: Arc<dyn TileStore>,
    config: GeneratorConfig,
}

impl PyramidGenerator {
    /// Create a generator.
    pub fn new(
        directory: Arc<dyn RegionDirectory>,
        renderer: Arc<dyn RegionRenderer>,
        store: Arc<dyn TileStore>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            directory,
            renderer,
            store,
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run one full generation cycle.
    ///
    /// Tree construction runs to completion before compositing starts, and
    /// compositing before cleanup; each stage consumes the previous stage's
    /// state. A cycle either completes (possibly with locally degraded
    /// tiles) or fails fatally here.
    pub fn run_cycle(&self) -> Result<CycleReport, GenerateError> {
        self.config.validate()?;
        let started = Instant::now();

        let regions = self.directory.regions().len();
        info!(
            regions,
            max_zoom = self.config.max_zoom,
            tile_size = self.config.tile_size,
            server_mode = self.config.server_mode,
            renderer = self.renderer.name(),
            "Starting map tile generation cycle"
        );

        let mut tree = TileTreeBuilder::new(self.config.max_zoom).build(self.directory.as_ref());
        let nodes = tree.len();
        let roots = tree.roots().count();

        let compositor = TileCompositor::new(
            self.directory.as_ref(),
            self.renderer.as_ref(),
            self.store.as_ref(),
            &self.config,
        );
        let composite = compositor.composite(&mut tree);

        // Live sets for cleanup: every node keeps its finished tile; raw
        // snapshots stay only for super tiles, and only in server mode.
        let live_finished: HashSet<TileCoord> = tree.node_ids().map(|id| id.coord()).collect();
        let live_raw: HashSet<TileCoord> = if self.config.server_mode {
            live_finished
                .iter()
                .copied()
                .filter(|coord| coord.zoom > 1)
                .collect()
        } else {
            HashSet::new()
        };
        let finished_listing = self.store.list_finished_tiles()?;
        let raw_listing = self.store.list_raw_snapshots()?;
        let cleanup = remove_stale_tiles(
            self.store.as_ref(),
            &live_finished,
            &live_raw,
            self.config.workers,
            finished_listing,
            raw_listing,
        );

        let report = CycleReport {
            regions,
            nodes,
            roots,
            composite,
            cleanup,
        };
        info!(
            nodes = report.nodes,
            roots = report.roots,
            tiles_written = report.composite.tiles_written,
            placeholders = report.composite.leaves_placeholder,
            stale_removed = report.cleanup.finished_removed + report.cleanup.raw_removed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generation cycle complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::GridCoord;
    use crate::directory::{RegionId, RegionInfo, StaticRegionDirectory};
    use crate::render::{FlatColorRenderer, GradientRenderer};
    use crate::store::MemoryTileStore;
    use image::RgbaImage;

    fn generator(
        cells: &[(u32, u32)],
        store: Arc<MemoryTileStore>,
        config: GeneratorConfig,
    ) -> PyramidGenerator {
        let regions = cells
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| RegionInfo {
                id: RegionId::new(format!("region-{i}")),
                coord: GridCoord { x, y },
                online: true,
            })
            .collect();
        PyramidGenerator::new(
            Arc::new(StaticRegionDirectory::new(regions)),
            Arc::new(FlatColorRenderer::new()),
            store,
            config,
        )
    }

    fn small_config(max_zoom: u8) -> GeneratorConfig {
        GeneratorConfig::default()
            .with_tile_size(8)
            .with_max_zoom(max_zoom)
            .with_workers(1)
    }

    #[test]
    fn test_cycle_reports_counts() {
        let store = Arc::new(MemoryTileStore::new());
        let generator = generator(&[(10, 10)], store.clone(), small_config(3));
        let report = generator.run_cycle().unwrap();

        assert_eq!(report.regions, 1);
        assert_eq!(report.nodes, 3);
        assert_eq!(report.roots, 1);
        assert_eq!(report.composite.tiles_written, 3);
        assert_eq!(store.finished_count(), 3);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let store = Arc::new(MemoryTileStore::new());
        let generator = generator(&[(0, 0)], store, small_config(3).with_tile_size(100));
        assert!(matches!(
            generator.run_cycle(),
            Err(GenerateError::Config(_))
        ));
    }

    #[test]
    fn test_oversized_max_zoom_fails_before_building() {
        // Deep enough that block-alignment shifts would overflow mid-build;
        // the cycle must reject it up front instead of panicking later.
        let store = Arc::new(MemoryTileStore::new());
        let generator = generator(&[(10, 10)], store.clone(), small_config(40));
        assert!(matches!(
            generator.run_cycle(),
            Err(GenerateError::Config(_))
        ));
        assert_eq!(store.finished_count(), 0);
    }

    #[test]
    fn test_cycle_removes_stale_tiles() {
        let store = Arc::new(MemoryTileStore::new());
        // A tile from a region that no longer exists
        store.seed_finished_tile(TileCoord { x: 50, y: 50, zoom: 1 }, RgbaImage::new(8, 8));

        let generator = generator(&[(0, 0)], store.clone(), small_config(2));
        let report = generator.run_cycle().unwrap();

        assert_eq!(report.cleanup.finished_removed, 1);
        assert!(store
            .load_finished_tile(TileCoord { x: 50, y: 50, zoom: 1 })
            .is_none());
    }

    #[test]
    fn test_full_mode_retires_snapshot_cache() {
        let store = Arc::new(MemoryTileStore::new());
        store.seed_raw_snapshot(TileCoord { x: 0, y: 0, zoom: 2 }, RgbaImage::new(16, 16));

        let generator = generator(&[(0, 0)], store.clone(), small_config(2));
        let report = generator.run_cycle().unwrap();

        assert_eq!(report.cleanup.raw_removed, 1);
        assert_eq!(store.raw_count(), 0);
    }

    #[test]
    fn test_server_mode_keeps_live_snapshots() {
        let store = Arc::new(MemoryTileStore::new());
        let config = small_config(2).with_server_mode(true);
        let generator = generator(&[(0, 0)], store.clone(), config);
        let report = generator.run_cycle().unwrap();

        assert_eq!(report.composite.raw_snapshots_written, 1);
        assert_eq!(report.cleanup.raw_removed, 0);
        assert_eq!(store.raw_count(), 1);
    }

    #[test]
    fn test_second_cycle_reuses_leaves() {
        let store = Arc::new(MemoryTileStore::new());
        let generator = generator(&[(0, 0), (1, 1)], store, small_config(2));

        let first = generator.run_cycle().unwrap();
        assert_eq!(first.composite.leaves_rendered, 2);
        assert_eq!(first.composite.leaves_reused, 0);

        let second = generator.run_cycle().unwrap();
        assert_eq!(second.composite.leaves_rendered, 0);
        assert_eq!(second.composite.leaves_reused, 2);
    }

    #[test]
    fn test_empty_directory_produces_empty_report() {
        let store = Arc::new(MemoryTileStore::new());
        let generator = generator(&[], store, small_config(4));
        let report = generator.run_cycle().unwrap();

        assert_eq!(report.nodes, 0);
        assert_eq!(report.composite, CompositeStats::default());
    }

    #[test]
    fn test_renderer_selection_is_polymorphic() {
        let store = Arc::new(MemoryTileStore::new());
        let regions = vec![RegionInfo {
            id: RegionId::from("solo"),
            coord: GridCoord { x: 2, y: 2 },
            online: true,
        }];
        let generator = PyramidGenerator::new(
            Arc::new(StaticRegionDirectory::new(regions)),
            Arc::new(GradientRenderer::new()),
            store,
            small_config(1),
        );
        let report = generator.run_cycle().unwrap();
        assert_eq!(report.composite.leaves_rendered, 1);
    }
}
