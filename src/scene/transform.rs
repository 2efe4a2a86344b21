use glam::{Affine3A, EulerRot, Mat4, Quat, Vec3};

/// Pose component of a skeleton node.
///
/// Holds two poses side by side:
/// - the *base* pose (`position`, `rotation`, `scale`), set once when the
///   model is loaded (the bind/rest pose of the joint);
/// - the *blend* pose (`blend_position`, `blend_rotation`, `blend_scale`),
///   the currently animated pose. Clip playback and IK write here.
///
/// The blend functions mix from the base pose toward a target value, which
/// models how far the animated pose has drifted from the bind pose and
/// enables additive-style partial application.
///
/// A node acting as a free-floating instance root may additionally carry a
/// world-space placement override (`world_position` / `world_rotation`);
/// for every other node these stay identity.
#[derive(Debug, Clone)]
pub struct Transform {
    // === Base pose (set at load) ===
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    // === Blend pose (animated every frame) ===
    pub blend_position: Vec3,
    pub blend_rotation: Quat,
    pub blend_scale: Vec3,

    // === Instance-root world placement ===
    pub world_position: Vec3,
    pub world_rotation: Quat,

    // === Matrix caches ===
    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    // === Shadow state for the dirty check ===
    last_blend_position: Vec3,
    last_blend_rotation: Quat,
    last_blend_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,

            blend_position: Vec3::ZERO,
            blend_rotation: Quat::IDENTITY,
            blend_scale: Vec3::ONE,

            world_position: Vec3::ZERO,
            world_rotation: Quat::IDENTITY,

            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,

            last_blend_position: Vec3::ZERO,
            last_blend_rotation: Quat::IDENTITY,
            last_blend_scale: Vec3::ONE,
            force_update: true,
        }
    }

    /// Replaces the base pose and resets the blend pose to match.
    ///
    /// Used at load time and when the pose is reset before switching
    /// animation modes.
    pub fn set_base_pose(&mut self, scale: Vec3, translation: Vec3, rotation: Quat) {
        self.scale = scale;
        self.position = translation;
        self.rotation = rotation;
        self.reset_pose();
    }

    /// Copies the base pose back into the blend pose.
    pub fn reset_pose(&mut self) {
        self.blend_position = self.position;
        self.blend_rotation = self.rotation;
        self.blend_scale = self.scale;
        self.force_update = true;
    }

    /// Sets the base translation and overrides the blend translation with it.
    ///
    /// This is what full-override playback writes: later blend calls mix
    /// against the value set here.
    pub fn set_position(&mut self, translation: Vec3) {
        self.position = translation;
        self.blend_position = translation;
    }

    /// Sets the base rotation and overrides the blend rotation with it.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.blend_rotation = rotation;
    }

    /// Sets the base scale and overrides the blend scale with it.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.blend_scale = scale;
    }

    // ========================================================================
    // Blending
    // ========================================================================

    /// Mixes the blend translation between the base translation and `target`.
    ///
    /// `factor` is clamped to `[0, 1]`; 0 keeps the base pose, 1 is a full
    /// override.
    pub fn blend_position_toward(&mut self, target: Vec3, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        self.blend_position = self.position.lerp(target, factor);
    }

    /// Mixes the blend scale between the base scale and `target`.
    pub fn blend_scale_toward(&mut self, target: Vec3, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        self.blend_scale = self.scale.lerp(target, factor);
    }

    /// Spherically mixes the blend rotation between the base rotation and
    /// `target`, renormalized.
    pub fn blend_rotation_toward(&mut self, target: Quat, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        self.blend_rotation = self.rotation.slerp(target, factor).normalize();
    }

    // ========================================================================
    // World placement override (instance roots only)
    // ========================================================================

    /// Places the node at a world position, independent of its local pose.
    pub fn set_world_position(&mut self, position: Vec3) {
        self.world_position = position;
        self.force_update = true;
    }

    /// Orients the node in world space from Euler angles in degrees
    /// (XYZ order), matching the transport-UI convention.
    pub fn set_world_rotation_degrees(&mut self, degrees: Vec3) {
        self.world_rotation = Quat::from_euler(
            EulerRot::XYZ,
            degrees.x.to_radians(),
            degrees.y.to_radians(),
            degrees.z.to_radians(),
        );
        self.force_update = true;
    }

    // ========================================================================
    // Matrix updates
    // ========================================================================

    /// Rebuilds the local matrix from the current blend pose if it changed.
    ///
    /// Returns whether a rebuild happened, so the hierarchy walk can skip
    /// world-matrix updates for untouched subtrees.
    pub fn update_local_matrix(&mut self) -> bool {
        let changed = self.blend_position != self.last_blend_position
            || self.blend_rotation != self.last_blend_rotation
            || self.blend_scale != self.last_blend_scale
            || self.force_update;

        if changed {
            let trs = Affine3A::from_scale_rotation_translation(
                self.blend_scale,
                self.blend_rotation,
                self.blend_position,
            );

            // The placement terms are identity for everything but an
            // instance root, so the common case stays a single TRS build.
            self.local_matrix = if self.world_position == Vec3::ZERO
                && self.world_rotation == Quat::IDENTITY
            {
                trs
            } else {
                Affine3A::from_translation(self.world_position)
                    * Affine3A::from_quat(self.world_rotation)
                    * trs
            };

            self.last_blend_position = self.blend_position;
            self.last_blend_rotation = self.blend_rotation;
            self.last_blend_scale = self.blend_scale;
            self.force_update = false;
        }

        changed
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    /// World matrix as a `Mat4`, for consumers that want 4x4 layout.
    #[inline]
    #[must_use]
    pub fn world_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.world_matrix)
    }

    /// Written by the transform system after the hierarchy walk.
    pub fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    /// Forces the next `update_local_matrix` to rebuild.
    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }

    // ========================================================================
    // Derived world-space queries
    // ========================================================================

    /// World-space translation, decomposed from the world matrix.
    ///
    /// A degenerate matrix yields the origin instead of an error.
    #[must_use]
    pub fn global_position(&self) -> Vec3 {
        match decompose_rigid(&self.world_matrix) {
            Some((_, translation)) => translation,
            None => Vec3::ZERO,
        }
    }

    /// World-space rotation, decomposed from the world matrix with scale and
    /// skew discarded.
    ///
    /// A degenerate matrix yields the identity rotation instead of an error.
    #[must_use]
    pub fn global_rotation(&self) -> Quat {
        match decompose_rigid(&self.world_matrix) {
            Some((rotation, _)) => rotation,
            None => Quat::IDENTITY,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Checked rigid decomposition of an affine matrix into rotation and
/// translation. Scale and skew are discarded.
///
/// Returns `None` when the matrix is non-finite or its linear part is not
/// invertible, so callers can fall back to a previous or neutral value.
#[must_use]
pub fn decompose_rigid(mat: &Affine3A) -> Option<(Quat, Vec3)> {
    if !mat.is_finite() {
        return None;
    }
    if mat.matrix3.determinant().abs() < 1e-8 {
        return None;
    }

    let (_, rotation, translation) = mat.to_scale_rotation_translation();
    if !rotation.is_finite() {
        return None;
    }

    Some((rotation.normalize(), translation))
}
