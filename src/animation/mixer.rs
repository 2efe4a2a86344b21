use crate::animation::action::AnimationAction;
use crate::animation::clip::AnimationClip;
use crate::scene::Scene;

/// Per-node inclusion mask, indexed by asset node id.
///
/// Clip application skips nodes whose bit is unset. The mixer keeps a mask
/// and its exact complement in lock-step so a skeleton can be split at a
/// node and play different clips above and below the split.
#[derive(Debug, Clone)]
pub struct NodeMask {
    bits: Vec<bool>,
}

impl NodeMask {
    /// A mask including every node of an id space of the given size.
    #[must_use]
    pub fn all(len: usize) -> Self {
        Self {
            bits: vec![true; len],
        }
    }

    /// A mask excluding every node.
    #[must_use]
    pub fn none(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    /// Whether `node_id` is included. Ids outside the mask are excluded.
    #[inline]
    #[must_use]
    pub fn contains(&self, node_id: usize) -> bool {
        self.bits.get(node_id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, node_id: usize, included: bool) {
        if let Some(bit) = self.bits.get_mut(node_id) {
            *bit = included;
        }
    }

    /// The exact logical complement over the same id space.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            bits: self.bits.iter().map(|&b| !b).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

/// How the active clips are combined into the frame's pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// One clip, faded against the base pose by the blend factor.
    #[default]
    FadeInOut,
    /// Two clips cross-faded, optionally split by skeleton region.
    CrossFade,
}

/// Blend/playback controller.
///
/// The policy layer coordinating clips, masks, and the playback clock:
/// picks clip times and blend factors each tick, runs the clip
/// application sequence, and triggers full-hierarchy matrix propagation
/// before skinning runs. All setters take effect on the next tick.
pub struct AnimationMixer {
    mode: BlendMode,
    source_clip: usize,
    dest_clip: usize,
    blend_factor: f32,
    cross_fade_factor: f32,

    split_node: Option<usize>,
    full_mask: NodeMask,
    mask: NodeMask,
    inverted_mask: NodeMask,

    pub action: AnimationAction,
}

impl AnimationMixer {
    /// Builds a mixer for a scene, with no skeletal split.
    #[must_use]
    pub fn new(scene: &Scene) -> Self {
        let id_space = scene.id_space();
        Self {
            mode: BlendMode::default(),
            source_clip: 0,
            dest_clip: 0,
            blend_factor: 1.0,
            cross_fade_factor: 0.0,
            split_node: None,
            full_mask: NodeMask::all(id_space),
            mask: NodeMask::all(id_space),
            inverted_mask: NodeMask::none(id_space),
            action: AnimationAction::new(),
        }
    }

    // ========================================================================
    // Configuration (effective next tick)
    // ========================================================================

    pub fn set_mode(&mut self, mode: BlendMode) {
        self.mode = mode;
    }

    #[must_use]
    pub fn mode(&self) -> BlendMode {
        self.mode
    }

    /// Selects the primary clip (the source clip when cross-fading).
    pub fn set_clip(&mut self, index: usize) {
        self.source_clip = index;
    }

    #[must_use]
    pub fn clip(&self) -> usize {
        self.source_clip
    }

    /// Selects the cross-fade destination clip.
    pub fn set_dest_clip(&mut self, index: usize) {
        self.dest_clip = index;
    }

    #[must_use]
    pub fn dest_clip(&self) -> usize {
        self.dest_clip
    }

    /// Weight of the single clip against the base pose, clamped to `[0, 1]`.
    pub fn set_blend_factor(&mut self, factor: f32) {
        self.blend_factor = factor.clamp(0.0, 1.0);
    }

    /// Cross-fade weight: 0 is pure source, 1 is pure destination.
    pub fn set_cross_fade_factor(&mut self, factor: f32) {
        self.cross_fade_factor = factor.clamp(0.0, 1.0);
    }

    /// Splits the skeleton at a node: the node itself and everything outside
    /// its subtree stay in the primary mask, its strict descendants move to
    /// the inverted mask. `None` removes the split.
    ///
    /// Rebuilds both masks with a depth-first subtree walk.
    pub fn set_split_node(&mut self, scene: &Scene, split: Option<usize>) {
        self.split_node = split;
        self.mask = NodeMask::all(scene.id_space());

        if let Some(split_id) = split {
            if let Some(handle) = scene.handle_of(split_id) {
                for descendant in scene.collect_subtree(handle) {
                    if let Some(node) = scene.get_node(descendant) {
                        if node.id() != split_id {
                            self.mask.set(node.id(), false);
                        }
                    }
                }
            } else {
                log::warn!("split node id {split_id} not found; mask left whole");
            }
        }

        self.inverted_mask = self.mask.inverted();
        log::debug!(
            "rebuilt split masks (split = {:?}, {} nodes)",
            split,
            self.mask.len()
        );
    }

    #[must_use]
    pub fn split_node(&self) -> Option<usize> {
        self.split_node
    }

    #[must_use]
    pub fn mask(&self) -> &NodeMask {
        &self.mask
    }

    #[must_use]
    pub fn inverted_mask(&self) -> &NodeMask {
        &self.inverted_mask
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Runs one tick: advances the clock, writes the frame's pose into the
    /// scene, and propagates world matrices top-down.
    pub fn update(&mut self, dt: f32, scene: &mut Scene, clips: &[AnimationClip]) {
        if clips.is_empty() {
            scene.update_world_matrices();
            return;
        }

        // Out-of-range indices clamp to the last clip rather than failing;
        // a bad UI selection must not halt playback.
        let source_index = self.source_clip.min(clips.len() - 1);
        let source = &clips[source_index];

        self.action.advance(dt, source.duration());
        let time = self.action.time;

        match self.mode {
            BlendMode::FadeInOut => {
                source.blend_pose(scene, &self.full_mask, time, self.blend_factor);
            }
            BlendMode::CrossFade => {
                let dest_index = self.dest_clip.min(clips.len() - 1);
                let dest = &clips[dest_index];

                // The destination runs on a rescaled clock so both clips
                // complete at the same wall-clock point.
                let scaled_time = if source.duration() > 0.0 {
                    time * (dest.duration() / source.duration())
                } else {
                    0.0
                };

                source.apply_pose(scene, &self.mask, time);
                dest.blend_pose(scene, &self.mask, scaled_time, self.cross_fade_factor);

                // With a split in place the lower skeleton half fades the
                // opposite way; without one the inverted mask is empty and
                // these two calls are no-ops.
                dest.apply_pose(scene, &self.inverted_mask, scaled_time);
                source.blend_pose(scene, &self.inverted_mask, time, self.cross_fade_factor);
            }
        }

        scene.update_world_matrices();
    }
}
