use glam::Affine3A;
use smallvec::SmallVec;

use crate::scene::transform::Transform;
use crate::scene::NodeHandle;

/// A joint/bone in the skeleton hierarchy.
///
/// # Design Principles
///
/// - Only keeps the data traversed every frame: hierarchy links and the
///   [`Transform`] pose component.
/// - The parent link is a non-owning handle; the node arena owns all nodes,
///   so no reference cycle exists. Mutation always flows root-to-leaf.
/// - `children` preserves insertion order, which is stable across frames.
///
/// The `id` is the stable integer node id assigned by the asset; it is what
/// animation channels, skins, masks, and the UI address nodes by.
#[derive(Debug, Clone)]
pub struct Node {
    /// Stable asset node id.
    pub(crate) id: usize,
    /// Display name for diagnostic UI.
    pub(crate) name: String,

    /// Parent node handle (`None` for the root).
    pub(crate) parent: Option<NodeHandle>,
    /// Child node handles, insertion order.
    pub(crate) children: SmallVec<[NodeHandle; 4]>,

    /// Pose component, hot data accessed every frame.
    pub transform: Transform,
}

impl Node {
    /// Creates a detached node with an identity pose.
    #[must_use]
    pub fn new(id: usize, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            parent: None,
            children: SmallVec::new(),
            transform: Transform::new(),
        }
    }

    /// The stable asset node id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Display name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent node handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns a read-only slice of child node handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Returns a reference to the world transformation matrix.
    ///
    /// Valid after the transform system has run for the current frame.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}
