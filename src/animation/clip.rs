use glam::{Quat, Vec3};

use crate::animation::mixer::NodeMask;
use crate::animation::tracks::KeyframeTrack;
use crate::asset::{ChannelData, ChannelValues};
use crate::errors::{ArmatureError, Result};
use crate::scene::Scene;

/// Which node property a channel animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
}

/// Typed keyframe payload of a channel.
#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

/// One animated property track for one target node.
#[derive(Debug, Clone)]
pub struct AnimationChannel {
    node_id: usize,
    target: TargetPath,
    data: TrackData,
}

impl AnimationChannel {
    /// Validates and builds a channel from loader data.
    ///
    /// Rotation channels require quaternion values, translation/scale
    /// channels require vector values.
    pub fn from_data(data: &ChannelData) -> Result<Self> {
        let track = match (&data.values, data.target) {
            (ChannelValues::Vector3(values), TargetPath::Translation | TargetPath::Scale) => {
                TrackData::Vector3(KeyframeTrack::new(
                    data.times.clone(),
                    values.clone(),
                    data.interpolation,
                )?)
            }
            (ChannelValues::Quaternion(values), TargetPath::Rotation) => {
                TrackData::Quaternion(KeyframeTrack::new(
                    data.times.clone(),
                    values.clone(),
                    data.interpolation,
                )?)
            }
            _ => return Err(ArmatureError::ChannelKindMismatch(data.target)),
        };

        Ok(Self {
            node_id: data.node_id,
            target: data.target,
            data: track,
        })
    }

    /// Asset id of the animated node.
    #[must_use]
    pub fn node_id(&self) -> usize {
        self.node_id
    }

    #[must_use]
    pub fn target(&self) -> TargetPath {
        self.target
    }

    /// Time of the last keyframe.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match &self.data {
            TrackData::Vector3(track) => track.end_time(),
            TrackData::Quaternion(track) => track.end_time(),
        }
    }

    /// Samples a vector channel; empty scale tracks yield unit scale,
    /// empty translation tracks the origin.
    #[must_use]
    pub fn sample_vec3(&self, time: f32) -> Option<Vec3> {
        match &self.data {
            TrackData::Vector3(track) => {
                if track.is_empty() && self.target == TargetPath::Scale {
                    return Some(Vec3::ONE);
                }
                Some(track.sample(time))
            }
            TrackData::Quaternion(_) => None,
        }
    }

    /// Samples a rotation channel; empty tracks yield the identity.
    #[must_use]
    pub fn sample_quat(&self, time: f32) -> Option<Quat> {
        match &self.data {
            TrackData::Quaternion(track) => Some(track.sample(time)),
            TrackData::Vector3(_) => None,
        }
    }
}

/// A named set of channels representing one animation.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    channels: Vec<AnimationChannel>,
    duration: f32,
}

impl AnimationClip {
    /// Builds a clip; the duration is the max channel end time.
    #[must_use]
    pub fn new(name: String, channels: Vec<AnimationChannel>) -> Self {
        let duration = channels
            .iter()
            .map(AnimationChannel::end_time)
            .fold(0.0_f32, f32::max);

        Self {
            name,
            channels,
            duration,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Max keyframe time across all channels; playback wraps against this.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[must_use]
    pub fn channels(&self) -> &[AnimationChannel] {
        &self.channels
    }

    /// Samples every masked-in channel at `time` and writes the result as a
    /// full override of the target node's pose component, so that a
    /// following [`blend_pose`](Self::blend_pose) call mixes against it.
    /// Used for primary/base playback.
    ///
    /// Matrix propagation is left to the caller so several clips can write
    /// before one hierarchy walk.
    pub fn apply_pose(&self, scene: &mut Scene, mask: &NodeMask, time: f32) {
        for channel in &self.channels {
            if !mask.contains(channel.node_id) {
                continue;
            }
            let Some(node) = scene.node_by_id_mut(channel.node_id) else {
                continue;
            };

            match channel.target {
                TargetPath::Translation => {
                    if let Some(value) = channel.sample_vec3(time) {
                        node.transform.set_position(value);
                    }
                }
                TargetPath::Scale => {
                    if let Some(value) = channel.sample_vec3(time) {
                        node.transform.set_scale(value);
                    }
                }
                TargetPath::Rotation => {
                    if let Some(value) = channel.sample_quat(time) {
                        node.transform.set_rotation(value);
                    }
                }
            }
        }
    }

    /// Samples every masked-in channel at `time` and blends it against the
    /// node's base pose with `factor` (used to fade a clip in or out).
    pub fn blend_pose(&self, scene: &mut Scene, mask: &NodeMask, time: f32, factor: f32) {
        for channel in &self.channels {
            if !mask.contains(channel.node_id) {
                continue;
            }
            let Some(node) = scene.node_by_id_mut(channel.node_id) else {
                continue;
            };

            match channel.target {
                TargetPath::Translation => {
                    if let Some(value) = channel.sample_vec3(time) {
                        node.transform.blend_position_toward(value, factor);
                    }
                }
                TargetPath::Scale => {
                    if let Some(value) = channel.sample_vec3(time) {
                        node.transform.blend_scale_toward(value, factor);
                    }
                }
                TargetPath::Rotation => {
                    if let Some(value) = channel.sample_quat(time) {
                        node.transform.blend_rotation_toward(value, factor);
                    }
                }
            }
        }
    }
}
