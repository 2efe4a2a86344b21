//! Animation system.
//!
//! Keyframe tracks, channels, clips, and the blend/playback controller.
//! Clips write poses into the scene's nodes; matrix propagation and
//! skinning run afterwards, once per tick.

pub mod action;
pub mod clip;
pub mod mixer;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, PlayDirection};
pub use clip::{AnimationChannel, AnimationClip, TargetPath, TrackData};
pub use mixer::{AnimationMixer, BlendMode, NodeMask};
pub use tracks::{InterpolationMode, KeyframeTrack};
pub use values::Interpolatable;
