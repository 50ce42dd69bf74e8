//! Bottom-up quadtree construction from region coordinates.

use crate::coord::{first_super_origin, GridCoord, NodeId, TileCoord};
use crate::directory::RegionDirectory;
use crate::tree::{TileTree, TileTreeNode};
use tracing::{debug, warn};

/// Builds the tile quadtree for one generation cycle.
///
/// Construction is single-threaded and runs to completion before compositing
/// starts. Building twice from the same directory yields an isomorphic tree
/// regardless of region iteration order: block alignment is bitshift
/// truncation, so parent assignment is deterministic, and per-level
/// processing follows sorted node-id order.
pub struct TileTreeBuilder {
    max_zoom: u8,
}

impl TileTreeBuilder {
    /// Create a builder targeting the given maximum zoom level (>= 1).
    pub fn new(max_zoom: u8) -> Self {
        Self { max_zoom }
    }

    /// Construct the quadtree for all coordinate-resolved regions.
    ///
    /// Seeds one zoom-1 root per existing cell of every touched 2x2 first
    /// super-tile block, then iteratively links each level to its parents up
    /// to `max_zoom`. Regions whose coordinates cannot be packed into a node
    /// id are excluded with a warning, matching the treatment of regions
    /// without known coordinates.
    pub fn build(&self, directory: &dyn RegionDirectory) -> TileTree {
        let mut tree = TileTree::new();

        self.seed_leaves(directory, &mut tree);
        debug!(leaves = tree.len(), "Seeded base tile nodes");

        for level in 1..self.max_zoom {
            self.link_level(level, &mut tree);
        }

        debug!(
            nodes = tree.len(),
            roots = tree.roots().count(),
            max_zoom = self.max_zoom,
            "Tile tree construction complete"
        );
        tree
    }

    /// Seed zoom-1 nodes, registered as the initial root set.
    ///
    /// For each region, every cell of its 2x2 first-super-tile block that the
    /// directory resolves to a region gets a leaf, whether or not that
    /// sibling was the region being visited. A super tile touched by any
    /// region is thereby fully populated from its neighbors.
    fn seed_leaves(&self, directory: &dyn RegionDirectory, tree: &mut TileTree) {
        for region in directory.regions() {
            let origin = first_super_origin(region.coord);
            let block = [
                origin,
                GridCoord { x: origin.x + 1, y: origin.y },
                GridCoord { x: origin.x, y: origin.y + 1 },
                GridCoord { x: origin.x + 1, y: origin.y + 1 },
            ];
            for cell in block {
                if directory.region_at(cell).is_none() {
                    continue;
                }
                let coord = TileCoord::base(cell);
                let id = match NodeId::from_coord(coord) {
                    Ok(id) => id,
                    Err(err) => {
                        warn!(%cell, error = %err, "Excluding region outside packable grid range");
                        continue;
                    }
                };
                tree.insert_or_get(TileTreeNode::new(coord, id));
                tree.add_root(id);
            }
        }
    }

    /// Link every node at `level` to its parent at `level + 1`.
    ///
    /// The nodes at `level` are exactly the current root set; their parents
    /// become the next root set.
    fn link_level(&self, level: u8, tree: &mut TileTree) {
        let current = tree.take_roots();
        for id in current {
            let parent_coord = id.coord().parent_origin();
            let Ok(parent_id) = NodeId::from_coord(parent_coord) else {
                // Unreachable for a packable child; a parent origin is never
                // larger than the child origin.
                continue;
            };
            debug_assert_eq!(parent_coord.zoom, level + 1);

            let parent = tree.insert_or_get(TileTreeNode::new(parent_coord, parent_id));
            parent.add_child(id);
            if let Some(child) = tree.node_mut(id) {
                child.set_parent(parent_id);
            }
            tree.add_root(parent_id);
        }
    }
}
