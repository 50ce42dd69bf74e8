//! Post-order tile compositing traversal.
//!
//! Walks the tile tree depth-first without recursion, renders leaves,
//! accumulates children into their parents' double-size working buffers,
//! downsamples and persists super tiles, and releases every image as soon as
//! its parent has consumed it. Traversal is strictly sequential within a
//! cycle: parent buffers are mutated incrementally across multiple child
//! visits and are not safely shareable.

mod offset;

pub use offset::child_offset;

use crate::config::GeneratorConfig;
use crate::coord::{GridCoord, NodeId, TileCoord};
use crate::directory::RegionDirectory;
use crate::render::{ocean_placeholder, RegionRenderer};
use crate::store::TileStore;
use crate::tree::TileTree;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Counters for one compositing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeStats {
    /// Leaves freshly rendered by the region renderer
    pub leaves_rendered: usize,
    /// Leaves reused from previously finished tiles in the store
    pub leaves_reused: usize,
    /// Leaves degraded to the ocean placeholder
    pub leaves_placeholder: usize,
    /// Finished tiles written to the store
    pub tiles_written: usize,
    /// Raw super-tile snapshots written (server mode only)
    pub raw_snapshots_written: usize,
    /// Parent buffers seeded from a prior raw snapshot (server mode only)
    pub snapshots_reused: usize,
    /// Store writes skipped after an error; retried next cycle
    pub write_failures: usize,
}

/// Composites a fully built tile tree and persists the result.
///
/// Holds only borrowed collaborators; all traversal state lives in
/// [`composite`](TileCompositor::composite) and is discarded when it returns.
pub struct TileCompositor<'a> {
    directory: &'a dyn RegionDirectory,
    renderer: &'a dyn RegionRenderer,
    store: &'a dyn TileStore,
    config: &'a GeneratorConfig,
}

impl<'a> TileCompositor<'a> {
    /// Create a compositor over the three collaborator seams.
    pub fn new(
        directory: &'a dyn RegionDirectory,
        renderer: &'a dyn RegionRenderer,
        store: &'a dyn TileStore,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            directory,
            renderer,
            store,
            config,
        }
    }

    /// Composite and persist every subtree, releasing all images by the end.
    ///
    /// Iterative post-order depth-first walk per root: an explicit work stack
    /// plus an expanded-node set distinguish the first visit of a node (push
    /// its children, leftmost on top) from the second (process it). Tree
    /// depth is bounded by the zoom ceiling but breadth is not, and a stack
    /// overflow from hidden recursion must not take the process down.
    pub fn composite(&self, tree: &mut TileTree) -> CompositeStats {
        let mut stats = CompositeStats::default();
        let roots: Vec<NodeId> = tree.roots().collect();

        for root in roots {
            let mut work: Vec<NodeId> = vec![root];
            let mut expanded: HashSet<NodeId> = HashSet::new();

            while let Some(&id) = work.last() {
                let children: Vec<NodeId> = tree
                    .node(id)
                    .map(|node| node.children().to_vec())
                    .unwrap_or_default();

                if !children.is_empty() && !expanded.contains(&id) {
                    expanded.insert(id);
                    for child in children.iter().rev() {
                        work.push(*child);
                    }
                    continue;
                }

                self.process_node(tree, id, &mut stats);
                work.pop();
            }
        }

        debug!(?stats, "Compositing pass complete");
        stats
    }

    /// Second-visit handling: produce or persist this node's image, then
    /// composite it into the parent and release it.
    fn process_node(&self, tree: &mut TileTree, id: NodeId, stats: &mut CompositeStats) {
        let coord = id.coord();
        if coord.zoom == 1 {
            self.produce_leaf(tree, id, stats);
        } else {
            self.persist_super_tile(tree, id, stats);
        }
        self.composite_into_parent(tree, id, stats);
    }

    /// Attach an image to a leaf: previously finished tile if one is stored,
    /// else a fresh render, else the ocean placeholder. Freshly produced
    /// images are persisted; a loaded tile is already on disk.
    fn produce_leaf(&self, tree: &mut TileTree, id: NodeId, stats: &mut CompositeStats) {
        let coord = id.coord();
        let tile_size = self.config.tile_size;

        if let Some(stored) = self.store.load_finished_tile(coord) {
            if stored.dimensions() == (tile_size, tile_size) {
                stats.leaves_reused += 1;
                if let Some(node) = tree.node_mut(id) {
                    node.attach_image(stored);
                }
                return;
            }
            debug!(tile = %coord, "Stored leaf tile has stale dimensions; re-rendering");
        }

        let cell = GridCoord {
            x: coord.x,
            y: coord.y,
        };
        let rendered = self.directory.region_at(cell).and_then(|region| {
            match self.renderer.render(&region, tile_size) {
                Ok(image) => Some(image),
                Err(err) => {
                    warn!(region = %region.id, tile = %coord, error = %err,
                          "Region render failed; substituting ocean placeholder");
                    None
                }
            }
        });

        let image = match rendered {
            Some(image) => {
                stats.leaves_rendered += 1;
                image
            }
            None => {
                stats.leaves_placeholder += 1;
                ocean_placeholder(tile_size, self.config.ocean_color)
            }
        };

        match self.store.save_finished_tile(coord, &image) {
            Ok(()) => stats.tiles_written += 1,
            Err(err) => {
                warn!(tile = %coord, error = %err,
                      "Failed to persist leaf tile; will retry next cycle");
                stats.write_failures += 1;
            }
        }

        if let Some(node) = tree.node_mut(id) {
            node.attach_image(image);
        }
    }

    /// Persist a super tile: raw snapshot of the composed working buffer in
    /// server mode, then the buffer downsampled to tile size as the finished
    /// tile. The downsampled image replaces the working buffer on the node.
    fn persist_super_tile(&self, tree: &mut TileTree, id: NodeId, stats: &mut CompositeStats) {
        let coord = id.coord();
        let Some(working) = tree.node_mut(id).and_then(|node| node.take_image()) else {
            // No child contributed an image; nothing to persist or pass up
            debug!(tile = %coord, "Super tile has no composed image; skipping");
            return;
        };

        if self.config.server_mode {
            match self.store.save_raw_snapshot(coord, &working) {
                Ok(()) => stats.raw_snapshots_written += 1,
                Err(err) => {
                    warn!(tile = %coord, error = %err,
                          "Failed to persist raw snapshot; will retry next cycle");
                    stats.write_failures += 1;
                }
            }
        }

        let tile_size = self.config.tile_size;
        let finished = imageops::resize(&working, tile_size, tile_size, FilterType::Triangle);
        drop(working);

        match self.store.save_finished_tile(coord, &finished) {
            Ok(()) => stats.tiles_written += 1,
            Err(err) => {
                warn!(tile = %coord, error = %err,
                      "Failed to persist super tile; will retry next cycle");
                stats.write_failures += 1;
            }
        }

        if let Some(node) = tree.node_mut(id) {
            node.attach_image(finished);
        }
    }

    /// Blit this node's image into its parent's working buffer and release
    /// it. Roots simply release. The parent buffer is created on first
    /// contribution: seeded from a prior raw snapshot in server mode, or a
    /// fresh ocean-filled canvas at double tile size.
    fn composite_into_parent(&self, tree: &mut TileTree, id: NodeId, stats: &mut CompositeStats) {
        let Some(parent_id) = tree.node(id).and_then(|node| node.parent()) else {
            if let Some(node) = tree.node_mut(id) {
                node.take_image();
            }
            return;
        };

        let Some(image) = tree.node_mut(id).and_then(|node| node.take_image()) else {
            return;
        };

        let tile_size = self.config.tile_size;
        let parent_coord = parent_id.coord();
        let needs_buffer = tree.node(parent_id).map(|n| !n.has_image()).unwrap_or(true);
        if needs_buffer {
            let buffer = self.parent_buffer(parent_coord, stats);
            if let Some(parent) = tree.node_mut(parent_id) {
                parent.attach_image(buffer);
            }
        }

        // Blit at tile-size dimensions into the correct quadrant
        let image = if image.dimensions() == (tile_size, tile_size) {
            image
        } else {
            imageops::resize(&image, tile_size, tile_size, FilterType::Triangle)
        };
        let (offset_x, offset_y) = child_offset(id.coord(), parent_coord, tile_size);
        if let Some(buffer) = tree.node_mut(parent_id).and_then(|node| node.image_mut()) {
            imageops::replace(buffer, &image, offset_x, offset_y);
        }
        // `image` drops here: the child's memory is released as soon as the
        // parent has consumed it
    }

    /// Working buffer for a parent node, at double tile size.
    fn parent_buffer(&self, coord: TileCoord, stats: &mut CompositeStats) -> RgbaImage {
        let buffer_size = self.config.tile_size * 2;
        if self.config.server_mode {
            if let Some(snapshot) = self.store.load_raw_snapshot(coord) {
                if snapshot.dimensions() == (buffer_size, buffer_size) {
                    debug!(tile = %coord, "Seeding parent buffer from raw snapshot");
                    stats.snapshots_reused += 1;
                    return snapshot;
                }
                debug!(tile = %coord, "Raw snapshot has stale dimensions; starting fresh");
            }
        }
        let [r, g, b] = self.config.ocean_color;
        RgbaImage::from_pixel(buffer_size, buffer_size, image::Rgba([r, g, b, 255]))
    }
}
