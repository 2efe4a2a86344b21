#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod asset;
pub mod errors;
pub mod ik;
pub mod model;
pub mod scene;

pub use animation::{
    AnimationAction, AnimationChannel, AnimationClip, AnimationMixer, BlendMode,
    InterpolationMode, KeyframeTrack, NodeMask, PlayDirection, TargetPath,
};
pub use asset::{ChannelData, ChannelValues, ClipData, ModelAsset, NodeData, SkinData};
pub use errors::{ArmatureError, Result};
pub use ik::{IkMode, IkSolver};
pub use model::Model;
pub use scene::{DualQuat, Node, NodeHandle, Scene, Skeleton, Transform};
