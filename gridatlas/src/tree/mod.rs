//! Tile quadtree construction.
//!
//! Maps a flat set of leaf region coordinates to a deterministic quadtree of
//! tile nodes across zoom levels, bottom-up and breadth-first per level. The
//! tree is cycle-local state: built fresh at the start of each generation
//! cycle, consumed by the compositor, and discarded at cycle end.

mod builder;
mod node;

pub use builder::TileTreeBuilder;
pub use node::TileTreeNode;

use crate::coord::NodeId;
use std::collections::{BTreeSet, HashMap};

/// A fully linked tile quadtree for one generation cycle.
///
/// Roots are kept in a sorted set so that tree shape and traversal order are
/// reproducible regardless of leaf input order.
pub struct TileTree {
    roots: BTreeSet<NodeId>,
    nodes: HashMap<NodeId, TileTreeNode>,
}

impl TileTree {
    pub(crate) fn new() -> Self {
        Self {
            roots: BTreeSet::new(),
            nodes: HashMap::new(),
        }
    }

    /// Insert a node, or fetch the existing one for the same coordinate.
    ///
    /// Duplicate inserts are expected during construction and are resolved by
    /// reusing the existing node rather than creating a second one.
    pub(crate) fn insert_or_get(&mut self, node: TileTreeNode) -> &mut TileTreeNode {
        self.nodes.entry(node.id()).or_insert(node)
    }

    pub(crate) fn add_root(&mut self, id: NodeId) {
        self.roots.insert(id);
    }

    pub(crate) fn take_roots(&mut self) -> BTreeSet<NodeId> {
        std::mem::take(&mut self.roots)
    }

    /// The final root ids, in deterministic order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.iter().copied()
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&TileTreeNode> {
        self.nodes.get(&id)
    }

    /// Look up a node mutably by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TileTreeNode> {
        self.nodes.get_mut(&id)
    }

    /// All node ids in the tree, in no particular order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Total node count across all zoom levels.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
