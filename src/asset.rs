//! Loader-facing data model.
//!
//! The engine does not parse scene files; an external asset collaborator
//! hands over already-decoded data in the plain structs below: a flat node
//! list, a skin description, and per-clip channel arrays that are already
//! de-interleaved from whatever on-disk buffer layout was used.
//!
//! Validation happens when these are turned into engine types
//! ([`Scene::from_nodes`](crate::scene::Scene::from_nodes),
//! [`Skeleton::from_skin`](crate::scene::Skeleton::from_skin),
//! [`AnimationChannel::from_data`](crate::animation::AnimationChannel::from_data)).

use glam::{Mat4, Quat, Vec3};

use crate::animation::{InterpolationMode, TargetPath};

/// One node of the flat hierarchy list.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Stable asset node id.
    pub id: usize,
    /// Display name.
    pub name: String,
    /// Asset ids of this node's children, in order.
    pub children: Vec<usize>,
    /// Base pose translation.
    pub translation: Vec3,
    /// Base pose rotation.
    pub rotation: Quat,
    /// Base pose scale.
    pub scale: Vec3,
}

impl NodeData {
    /// Convenience constructor with an identity base pose.
    #[must_use]
    pub fn new(id: usize, name: &str, children: Vec<usize>) -> Self {
        Self {
            id,
            name: name.to_string(),
            children,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Skin description: joint-ordered node ids plus inverse bind matrices.
#[derive(Debug, Clone, Default)]
pub struct SkinData {
    /// Node id of each joint; the position in this list is the joint index.
    pub joints: Vec<usize>,
    /// Per-joint inverse bind matrix (bind-pose-to-joint-local transform).
    pub inverse_bind_matrices: Vec<Mat4>,
}

/// De-interleaved keyframe values of one channel.
#[derive(Debug, Clone)]
pub enum ChannelValues {
    /// Translation or scale keyframes.
    Vector3(Vec<Vec3>),
    /// Rotation keyframes.
    Quaternion(Vec<Quat>),
}

/// One animated property track for one target node.
///
/// For cubic-spline interpolation the value array stores
/// `[in-tangent, value, out-tangent]` per keyframe, tripling its length.
#[derive(Debug, Clone)]
pub struct ChannelData {
    /// Asset id of the node this channel animates.
    pub node_id: usize,
    /// Which property of the node is animated.
    pub target: TargetPath,
    /// How keyframes are interpolated.
    pub interpolation: InterpolationMode,
    /// Keyframe times, strictly ascending.
    pub times: Vec<f32>,
    /// Keyframe values.
    pub values: ChannelValues,
}

/// One named animation.
#[derive(Debug, Clone)]
pub struct ClipData {
    pub name: String,
    pub channels: Vec<ChannelData>,
}

/// Everything the loader provides for one model.
#[derive(Debug, Clone, Default)]
pub struct ModelAsset {
    pub nodes: Vec<NodeData>,
    pub skin: Option<SkinData>,
    pub clips: Vec<ClipData>,
}

impl ModelAsset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
