//! Tile tree node: identity, links, and image ownership.

use crate::coord::{NodeId, TileCoord};
use image::RgbaImage;

/// Maximum children of any tile node (one per quadrant).
const MAX_CHILDREN: usize = 4;

/// A node in the tile quadtree.
///
/// A node at zoom 1 corresponds 1:1 to a region and has no children. A node
/// at zoom Z > 1 has up to four children at zoom Z-1, one per quadrant of its
/// covered block. The node exclusively owns at most one image at a time,
/// attached while its subtree is being composited and released as soon as the
/// parent has consumed it.
pub struct TileTreeNode {
    coord: TileCoord,
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    image: Option<RgbaImage>,
}

impl TileTreeNode {
    /// Create an unlinked node for a tile coordinate.
    ///
    /// The id is derived from the coordinate; construction with a coordinate
    /// that cannot be packed is a caller bug surfaced by the builder, which
    /// validates coordinates before creating nodes.
    pub(crate) fn new(coord: TileCoord, id: NodeId) -> Self {
        Self {
            coord,
            id,
            parent: None,
            children: Vec::new(),
            image: None,
        }
    }

    /// Tile coordinate of this node.
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Stable node identity derived from `(zoom, x, y)`.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Parent id, if this node has been linked upward.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in insertion order (at most four).
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Link this node to its parent. Only the first call sticks.
    pub(crate) fn set_parent(&mut self, parent: NodeId) {
        if self.parent.is_none() {
            self.parent = Some(parent);
        }
    }

    /// Register a child. Duplicates and attempts past four children are
    /// ignored; overflow cannot occur for a correctly aligned tree, so this
    /// is a non-fatal guard rather than an error path.
    pub(crate) fn add_child(&mut self, child: NodeId) {
        if self.children.len() < MAX_CHILDREN && !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    /// Whether an image is currently attached.
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Borrow the attached image, if any.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// Borrow the attached image mutably, if any.
    pub fn image_mut(&mut self) -> Option<&mut RgbaImage> {
        self.image.as_mut()
    }

    /// Attach an image, replacing any previous one.
    pub fn attach_image(&mut self, image: RgbaImage) {
        self.image = Some(image);
    }

    /// Detach and return the attached image, releasing this node's ownership.
    pub fn take_image(&mut self) -> Option<RgbaImage> {
        self.image.take()
    }
}
