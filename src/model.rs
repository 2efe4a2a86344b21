//! Per-instance model facade.
//!
//! Owns one node tree plus its clips, skin, playback controller, and IK
//! solver, and exposes the per-frame surface the outside world talks to:
//! transport/IK setters from the input/UI collaborator and pose/skinning
//! queries for the render collaborator. Setters take effect on the next
//! [`update`](Model::update) tick.

use glam::{Mat4, Vec3};

use crate::animation::{
    AnimationChannel, AnimationClip, AnimationMixer, BlendMode, PlayDirection,
};
use crate::asset::{ModelAsset, NodeData};
use crate::errors::Result;
use crate::ik::{IkMode, IkSolver};
use crate::scene::{DualQuat, Node, Scene, Skeleton};

/// An articulated model instance: skeleton tree, animation state, skin.
pub struct Model {
    scene: Scene,
    clips: Vec<AnimationClip>,
    skeleton: Option<Skeleton>,
    mixer: AnimationMixer,

    ik: IkSolver,
    ik_mode: IkMode,
    ik_target: Vec3,
    ik_effector: usize,
    ik_root: usize,
    ik_chain_dirty: bool,
    ik_solved: bool,

    /// Load-time node data, kept so the bind pose can be restored after
    /// full-override playback has rewritten the per-node base poses.
    bind_pose: Vec<NodeData>,
}

impl Model {
    /// Builds a model from already-parsed asset data.
    pub fn from_asset(asset: &ModelAsset) -> Result<Self> {
        let scene = Scene::from_nodes(&asset.nodes)?;

        let clips = asset
            .clips
            .iter()
            .map(|clip_data| {
                let channels = clip_data
                    .channels
                    .iter()
                    .map(AnimationChannel::from_data)
                    .collect::<Result<Vec<_>>>()?;
                Ok(AnimationClip::new(clip_data.name.clone(), channels))
            })
            .collect::<Result<Vec<_>>>()?;

        let skeleton = asset
            .skin
            .as_ref()
            .map(|skin| Skeleton::from_skin(&scene, skin))
            .transpose()?;

        let mixer = AnimationMixer::new(&scene);

        log::info!(
            "model loaded: {} nodes, {} clips, {} joints",
            scene.node_count(),
            clips.len(),
            skeleton.as_ref().map_or(0, Skeleton::joint_count)
        );

        Ok(Self {
            scene,
            clips,
            skeleton,
            mixer,
            ik: IkSolver::new(),
            ik_mode: IkMode::Off,
            ik_target: Vec3::ZERO,
            ik_effector: 0,
            ik_root: 0,
            ik_chain_dirty: false,
            ik_solved: false,
            bind_pose: asset.nodes.clone(),
        })
    }

    // ========================================================================
    // Frame tick
    // ========================================================================

    /// Advances one frame: clip playback and blending, full matrix
    /// propagation, the optional IK pass (with partial re-propagation), and
    /// the skinning refresh. Everything runs on the calling thread.
    pub fn update(&mut self, dt: f32) {
        self.mixer.update(dt, &mut self.scene, &self.clips);

        match self.ik_mode {
            IkMode::Off => {}
            IkMode::Ccd => {
                if self.ik_chain_dirty {
                    self.rebuild_ik_chain();
                }
                self.ik_solved = self.ik.solve_ccd(&mut self.scene, self.ik_target);
            }
            IkMode::Fabrik => {
                if self.ik_chain_dirty {
                    self.rebuild_ik_chain();
                }
                self.ik_solved = self.ik.solve_fabrik(&mut self.scene, self.ik_target);
            }
        }

        if let Some(skeleton) = &mut self.skeleton {
            skeleton.update(&self.scene.nodes);
        }
    }

    /// Restores the bind pose on every node and recomputes matrices.
    ///
    /// Needed after full-override playback, which rewrites per-node base
    /// poses as it goes.
    pub fn reset_pose(&mut self) {
        for data in &self.bind_pose {
            if let Some(node) = self.scene.node_by_id_mut(data.id) {
                node.transform
                    .set_base_pose(data.scale, data.translation, data.rotation);
            }
        }
        self.scene.update_world_matrices();
    }

    // ========================================================================
    // Playback control (input/UI collaborator; effective next tick)
    // ========================================================================

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        // Full-override playback rewrites base poses, so switching the
        // combination strategy starts from a clean bind pose.
        self.reset_pose();
        self.mixer.set_mode(mode);
    }

    pub fn set_clip(&mut self, index: usize) {
        self.mixer.set_clip(index);
    }

    pub fn set_dest_clip(&mut self, index: usize) {
        self.mixer.set_dest_clip(index);
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.mixer.action.speed = speed;
    }

    pub fn set_direction(&mut self, direction: PlayDirection) {
        self.mixer.action.direction = direction;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.mixer.action.paused = paused;
    }

    pub fn set_blend_factor(&mut self, factor: f32) {
        self.mixer.set_blend_factor(factor);
    }

    pub fn set_cross_fade_factor(&mut self, factor: f32) {
        self.mixer.set_cross_fade_factor(factor);
    }

    pub fn set_split_node(&mut self, split: Option<usize>) {
        self.mixer.set_split_node(&self.scene, split);
    }

    // ========================================================================
    // Instance placement
    // ========================================================================

    /// Places the instance root at a world position.
    pub fn set_world_position(&mut self, position: Vec3) {
        if let Some(&root) = self.scene.roots.first() {
            if let Some(node) = self.scene.get_node_mut(root) {
                node.transform.set_world_position(position);
            }
        }
    }

    /// Orients the instance root from Euler angles in degrees.
    pub fn set_world_rotation_degrees(&mut self, degrees: Vec3) {
        if let Some(&root) = self.scene.roots.first() {
            if let Some(node) = self.scene.get_node_mut(root) {
                node.transform.set_world_rotation_degrees(degrees);
            }
        }
    }

    // ========================================================================
    // Inverse kinematics control
    // ========================================================================

    pub fn set_ik_mode(&mut self, mode: IkMode) {
        self.ik_mode = mode;
    }

    pub fn set_ik_iterations(&mut self, iterations: usize) {
        self.ik.set_iterations(iterations);
    }

    pub fn set_ik_target(&mut self, target: Vec3) {
        self.ik_target = target;
    }

    /// Selects the chain by effector and root node id. The chain itself
    /// (and its cached bone lengths) is rebuilt on the next tick.
    pub fn set_ik_chain(&mut self, effector_id: usize, root_id: usize) {
        self.ik_effector = effector_id;
        self.ik_root = root_id;
        self.ik_chain_dirty = true;
    }

    /// Whether the last IK solve reached the distance threshold.
    #[must_use]
    pub fn ik_solved(&self) -> bool {
        self.ik_solved
    }

    fn rebuild_ik_chain(&mut self) {
        self.ik_chain_dirty = false;

        let (Some(effector), Some(root)) = (
            self.scene.handle_of(self.ik_effector),
            self.scene.handle_of(self.ik_root),
        ) else {
            log::warn!(
                "IK chain endpoints {} / {} not found; chain cleared",
                self.ik_effector,
                self.ik_root
            );
            self.ik.set_chain(&self.scene, Vec::new());
            return;
        };

        // Climb from the effector through the parent links until the chain
        // root is reached.
        let mut chain = Vec::new();
        let mut current = Some(effector);
        while let Some(handle) = current {
            chain.push(handle);
            if handle == root {
                break;
            }
            current = self.scene.get_node(handle).and_then(Node::parent);
        }

        if chain.last() != Some(&root) {
            log::warn!(
                "node {} is not an ancestor of node {}; chain cleared",
                self.ik_root,
                self.ik_effector
            );
            chain.clear();
        }

        self.ik.set_chain(&self.scene, chain);
    }

    // ========================================================================
    // Render/UI queries
    // ========================================================================

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// World matrix of a node by asset id, in 4x4 layout.
    #[must_use]
    pub fn node_world_matrix(&self, id: usize) -> Option<Mat4> {
        self.scene
            .node_by_id(id)
            .map(|node| node.transform.world_matrix_as_mat4())
    }

    /// Display name of a node by asset id.
    #[must_use]
    pub fn node_name(&self, id: usize) -> Option<&str> {
        self.scene.node_name(id)
    }

    /// Display names of all nodes, indexed by asset id.
    #[must_use]
    pub fn node_names(&self) -> Vec<String> {
        self.scene.node_names()
    }

    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn clip_name(&self, index: usize) -> Option<&str> {
        self.clips.get(index).map(AnimationClip::name)
    }

    #[must_use]
    pub fn clip_names(&self) -> Vec<String> {
        self.clips.iter().map(|c| c.name().to_string()).collect()
    }

    #[must_use]
    pub fn clip_duration(&self, index: usize) -> Option<f32> {
        self.clips.get(index).map(AnimationClip::duration)
    }

    /// Name of the active (source) clip, for transport UI.
    #[must_use]
    pub fn current_clip_name(&self) -> Option<&str> {
        self.clip_name(self.mixer.clip().min(self.clips.len().saturating_sub(1)))
    }

    /// End time of the active (source) clip, for transport UI.
    #[must_use]
    pub fn current_clip_duration(&self) -> Option<f32> {
        self.clip_duration(self.mixer.clip().min(self.clips.len().saturating_sub(1)))
    }

    /// Per-joint skinning matrices; empty when the model has no skin.
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        self.skeleton
            .as_ref()
            .map_or(&[], Skeleton::joint_matrices)
    }

    /// Per-joint dual quaternions; empty when the model has no skin.
    #[must_use]
    pub fn joint_dual_quats(&self) -> &[DualQuat] {
        self.skeleton
            .as_ref()
            .map_or(&[], Skeleton::joint_dual_quats)
    }

    #[must_use]
    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut AnimationMixer {
        &mut self.mixer
    }
}
