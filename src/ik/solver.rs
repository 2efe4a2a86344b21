use glam::{Quat, Vec3};

use crate::scene::{NodeHandle, Scene};

/// Which IK algorithm runs each tick, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IkMode {
    #[default]
    Off,
    Ccd,
    Fabrik,
}

/// Iterative IK solver over one bone chain.
///
/// The chain is stored effector-first: `nodes[0]` is the effector,
/// `nodes[len - 1]` the chain root. Per-segment bone lengths are cached from
/// the world positions at chain-assignment time and the FABRIK position
/// buffer is solver-local scratch, resized only when the chain changes.
///
/// Both algorithms only rotate joints, never translate or scale, and only
/// touch nodes within the chain and their descendants. A solve that runs
/// out of iterations keeps its best-effort pose and reports `false`.
#[derive(Debug, Clone)]
pub struct IkSolver {
    nodes: Vec<NodeHandle>,
    iterations: usize,
    threshold: f32,

    bone_lengths: Vec<f32>,
    fabrik_positions: Vec<Vec3>,
}

impl IkSolver {
    pub const DEFAULT_ITERATIONS: usize = 10;
    pub const DEFAULT_THRESHOLD: f32 = 1e-5;

    #[must_use]
    pub fn new() -> Self {
        Self::with_iterations(Self::DEFAULT_ITERATIONS)
    }

    #[must_use]
    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            nodes: Vec::new(),
            iterations,
            threshold: Self::DEFAULT_THRESHOLD,
            bone_lengths: Vec::new(),
            fabrik_positions: Vec::new(),
        }
    }

    pub fn set_iterations(&mut self, iterations: usize) {
        self.iterations = iterations;
    }

    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Assigns the chain, effector first, root last.
    ///
    /// Bone lengths are recomputed from the nodes' current world positions,
    /// so the chain must be re-assigned whenever the node set changes.
    pub fn set_chain(&mut self, scene: &Scene, nodes: Vec<NodeHandle>) {
        self.nodes = nodes;
        for &handle in &self.nodes {
            if let Some(node) = scene.get_node(handle) {
                log::debug!("added node {} to IK chain", node.name());
            }
        }
        self.calculate_bone_lengths(scene);
        self.fabrik_positions.resize(self.nodes.len(), Vec3::ZERO);
    }

    /// The fixed end of the chain.
    #[must_use]
    pub fn chain_root(&self) -> Option<NodeHandle> {
        self.nodes.last().copied()
    }

    /// The node driven toward the target.
    #[must_use]
    pub fn effector(&self) -> Option<NodeHandle> {
        self.nodes.first().copied()
    }

    #[must_use]
    pub fn bone_lengths(&self) -> &[f32] {
        &self.bone_lengths
    }

    fn calculate_bone_lengths(&mut self, scene: &Scene) {
        self.bone_lengths.clear();
        if self.nodes.len() < 2 {
            return;
        }
        for pair in self.nodes.windows(2) {
            let start = global_position(scene, pair[0]);
            let end = global_position(scene, pair[1]);
            self.bone_lengths.push((end - start).length());
        }
    }

    // ========================================================================
    // CCD
    // ========================================================================

    /// Cyclic coordinate descent toward `target`.
    ///
    /// Each pass walks the joints from the chain root toward the effector,
    /// rotating every joint so the effector direction lines up with the
    /// target direction, and propagates the joint's subtree immediately so
    /// later joints in the same pass see updated positions.
    ///
    /// Returns whether the effector ended within the distance threshold.
    pub fn solve_ccd(&self, scene: &mut Scene, target: Vec3) -> bool {
        let Some(&effector_handle) = self.nodes.first() else {
            return false;
        };

        for _ in 0..self.iterations {
            let mut effector = global_position(scene, effector_handle);
            if (target - effector).length() < self.threshold {
                return true;
            }

            for j in (1..self.nodes.len()).rev() {
                let handle = self.nodes[j];
                let Some(node) = scene.get_node(handle) else {
                    continue;
                };
                let position = node.transform.global_position();
                let rotation = node.transform.global_rotation();

                let to_effector = (effector - position).normalize_or_zero();
                let to_target = (target - position).normalize_or_zero();
                if to_effector == Vec3::ZERO || to_target == Vec3::ZERO {
                    continue;
                }

                let arc = Quat::from_rotation_arc(to_effector, to_target);
                let local_arc = (rotation.conjugate() * arc * rotation).normalize();

                let current = node.transform.blend_rotation;
                if let Some(node) = scene.get_node_mut(handle) {
                    node.transform.blend_rotation_toward(current * local_arc, 1.0);
                }
                scene.update_subtree(handle);

                effector = global_position(scene, effector_handle);
                if (target - effector).length() < self.threshold {
                    return true;
                }
            }
        }

        let effector = global_position(scene, effector_handle);
        (target - effector).length() < self.threshold
    }

    // ========================================================================
    // FABRIK
    // ========================================================================

    /// Forward-and-backward reaching IK toward `target`.
    ///
    /// Solves on a buffer of plain positions (forward pass pins the effector
    /// to the target, backward pass pins the root back to its fixed base,
    /// both re-placing positions at the cached bone lengths), then converts
    /// the solved positions into joint rotations.
    ///
    /// Returns whether the effector ended within the distance threshold.
    pub fn solve_fabrik(&mut self, scene: &mut Scene, target: Vec3) -> bool {
        let Some(&effector_handle) = self.nodes.first() else {
            return false;
        };

        for (i, &handle) in self.nodes.iter().enumerate() {
            self.fabrik_positions[i] = global_position(scene, handle);
        }
        let base = self.fabrik_positions[self.nodes.len() - 1];

        let mut solved = false;
        for _ in 0..self.iterations {
            let effector = self.fabrik_positions[0];
            if (target - effector).length() < self.threshold {
                solved = true;
                break;
            }
            self.fabrik_forward(target);
            self.fabrik_backward(base);
        }

        self.adjust_nodes(scene);

        if solved {
            return true;
        }
        let effector = global_position(scene, effector_handle);
        (target - effector).length() < self.threshold
    }

    fn fabrik_forward(&mut self, target: Vec3) {
        self.fabrik_positions[0] = target;

        for i in 1..self.fabrik_positions.len() {
            let direction =
                (self.fabrik_positions[i] - self.fabrik_positions[i - 1]).normalize_or_zero();
            if direction == Vec3::ZERO {
                continue;
            }
            self.fabrik_positions[i] =
                self.fabrik_positions[i - 1] + direction * self.bone_lengths[i - 1];
        }
    }

    fn fabrik_backward(&mut self, base: Vec3) {
        let last = self.fabrik_positions.len() - 1;
        self.fabrik_positions[last] = base;

        for i in (0..last).rev() {
            let direction =
                (self.fabrik_positions[i] - self.fabrik_positions[i + 1]).normalize_or_zero();
            if direction == Vec3::ZERO {
                continue;
            }
            self.fabrik_positions[i] =
                self.fabrik_positions[i + 1] + direction * self.bone_lengths[i];
        }
    }

    /// Converts the solved FABRIK positions back into joint rotations,
    /// walking from the chain root toward the effector and propagating each
    /// joint's subtree immediately so the next joint sees updated positions.
    fn adjust_nodes(&self, scene: &mut Scene) {
        for i in (1..self.nodes.len()).rev() {
            let handle = self.nodes[i];
            let next_handle = self.nodes[i - 1];
            let Some(node) = scene.get_node(handle) else {
                continue;
            };
            let position = node.transform.global_position();
            let rotation = node.transform.global_rotation();
            let next_position = global_position(scene, next_handle);

            let to_next = (next_position - position).normalize_or_zero();
            let to_desired =
                (self.fabrik_positions[i - 1] - self.fabrik_positions[i]).normalize_or_zero();
            if to_next == Vec3::ZERO || to_desired == Vec3::ZERO {
                continue;
            }

            let arc = Quat::from_rotation_arc(to_next, to_desired);
            let local_arc = (rotation.conjugate() * arc * rotation).normalize();

            let current = node.transform.blend_rotation;
            if let Some(node) = scene.get_node_mut(handle) {
                node.transform.blend_rotation_toward(current * local_arc, 1.0);
            }
            scene.update_subtree(handle);
        }
    }
}

impl Default for IkSolver {
    fn default() -> Self {
        Self::new()
    }
}

fn global_position(scene: &Scene, handle: NodeHandle) -> Vec3 {
    scene
        .get_node(handle)
        .map_or(Vec3::ZERO, |node| node.transform.global_position())
}
