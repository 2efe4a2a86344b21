use glam::{Affine3A, Mat4, Quat, Vec3, Vec4};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::asset::SkinData;
use crate::errors::{ArmatureError, Result};
use crate::scene::node::Node;
use crate::scene::transform::decompose_rigid;
use crate::scene::{NodeHandle, Scene};

/// Rigid-transform encoding as a dual quaternion.
///
/// `real` carries the rotation, `dual` the translation
/// (`dual = 0.5 · q(0, t) · real`). Used as an alternative to matrices for
/// skinning; scale and skew are discarded, skinning assumes rigid joints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualQuat {
    pub real: Quat,
    pub dual: Quat,
}

impl DualQuat {
    pub const IDENTITY: Self = Self {
        real: Quat::IDENTITY,
        dual: Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
    };

    /// Encodes a rotation and a translation.
    #[must_use]
    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        let t = Quat::from_xyzw(translation.x, translation.y, translation.z, 0.0);
        Self {
            real: rotation,
            dual: (t * rotation) * 0.5,
        }
    }

    /// Decomposes an affine transform, discarding scale and skew.
    ///
    /// Returns `None` for a degenerate matrix so the caller can retain its
    /// previous value.
    #[must_use]
    pub fn from_affine(mat: &Affine3A) -> Option<Self> {
        let (rotation, translation) = decompose_rigid(mat)?;
        Some(Self::from_rotation_translation(rotation, translation))
    }

    /// The encoded rotation.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.real
    }

    /// The encoded translation: the vector part of `2 · dual · real⁻¹`.
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        let t = self.dual * self.real.conjugate();
        Vec3::new(t.x, t.y, t.z) * 2.0
    }

    /// Reconstructs the 4x4 matrix form of the encoded transform.
    #[must_use]
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.real, self.translation())
    }

    /// GPU buffer layout: two rows of four floats, real part first.
    #[must_use]
    pub fn to_vec4_pair(&self) -> [Vec4; 2] {
        [Vec4::from(self.real), Vec4::from(self.dual)]
    }
}

/// Skinning computer for one skin.
///
/// Owns the static bind data (joint-ordered node handles and inverse bind
/// matrices) and the per-frame outputs: one matrix and one dual quaternion
/// per joint, fully rebuilt after pose propagation and handed to the render
/// collaborator as opaque arrays.
#[derive(Debug, Clone)]
pub struct Skeleton {
    /// Joint index -> node handle.
    joints: Vec<NodeHandle>,
    /// Joint index -> asset node id.
    joint_node_ids: Vec<usize>,
    /// Asset node id -> joint index.
    node_to_joint: FxHashMap<usize, usize>,

    inverse_bind: Vec<Affine3A>,

    joint_matrices: Vec<Mat4>,
    joint_dual_quats: Vec<DualQuat>,
}

impl Skeleton {
    /// Builds the skinning data from a skin description.
    ///
    /// The joint count is fixed here for the lifetime of the model.
    pub fn from_skin(scene: &Scene, skin: &SkinData) -> Result<Self> {
        if skin.joints.len() != skin.inverse_bind_matrices.len() {
            return Err(ArmatureError::SkinCountMismatch {
                joints: skin.joints.len(),
                matrices: skin.inverse_bind_matrices.len(),
            });
        }

        let mut joints = Vec::with_capacity(skin.joints.len());
        let mut node_to_joint = FxHashMap::default();
        for (joint_index, &node_id) in skin.joints.iter().enumerate() {
            let handle = scene
                .handle_of(node_id)
                .ok_or(ArmatureError::UnknownJointNode {
                    joint: joint_index,
                    node: node_id,
                })?;
            joints.push(handle);
            node_to_joint.insert(node_id, joint_index);
        }

        let inverse_bind = skin
            .inverse_bind_matrices
            .iter()
            .map(|m| Affine3A::from_mat4(*m))
            .collect();

        let count = joints.len();
        Ok(Self {
            joints,
            joint_node_ids: skin.joints.clone(),
            node_to_joint,
            inverse_bind,
            joint_matrices: vec![Mat4::IDENTITY; count],
            joint_dual_quats: vec![DualQuat::IDENTITY; count],
        })
    }

    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Asset node id animated by a joint.
    #[must_use]
    pub fn node_of_joint(&self, joint_index: usize) -> Option<usize> {
        self.joint_node_ids.get(joint_index).copied()
    }

    /// Joint index driven by a node, if that node is a joint.
    #[must_use]
    pub fn joint_of_node(&self, node_id: usize) -> Option<usize> {
        self.node_to_joint.get(&node_id).copied()
    }

    /// Rebuilds every joint's matrix and dual quaternion.
    ///
    /// Must run after world matrices are up to date for the frame.
    pub fn update(&mut self, nodes: &SlotMap<NodeHandle, Node>) {
        for joint_index in 0..self.joints.len() {
            self.update_joint(joint_index, nodes);
        }
    }

    /// Recomputes a single joint: `joint = node_world * inverse_bind`.
    ///
    /// A degenerate result keeps the previous matrix and dual quaternion so
    /// one bad frame cannot poison the skinning buffers with NaNs.
    pub fn update_joint(&mut self, joint_index: usize, nodes: &SlotMap<NodeHandle, Node>) {
        let Some(&handle) = self.joints.get(joint_index) else {
            return;
        };
        let Some(node) = nodes.get(handle) else {
            return;
        };

        let joint = node.transform.world_matrix * self.inverse_bind[joint_index];

        match DualQuat::from_affine(&joint) {
            Some(dq) => {
                self.joint_matrices[joint_index] = Mat4::from(joint);
                self.joint_dual_quats[joint_index] = dq;
            }
            None => {
                log::warn!(
                    "joint {joint_index} (node {}) has a degenerate world transform, keeping previous value",
                    node.id()
                );
            }
        }
    }

    /// Per-joint skinning matrices, consumed as an opaque buffer.
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// Per-joint dual quaternions, consumed as an opaque buffer.
    #[must_use]
    pub fn joint_dual_quats(&self) -> &[DualQuat] {
        &self.joint_dual_quats
    }
}
