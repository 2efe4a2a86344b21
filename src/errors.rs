//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`ArmatureError`] covers the failure modes that can
//! occur while building engine data from already-parsed asset data:
//! - Node-tree construction errors (unknown ids, duplicate ids)
//! - Keyframe-track validation errors
//! - Skin/joint mapping errors
//!
//! Runtime playback never returns these errors: sampling, blending, skinning
//! and IK degrade to neutral or previous values instead, so that one bad
//! channel cannot halt an otherwise valid animation.
//!
//! # Usage
//!
//! Construction APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, ArmatureError>`.

use thiserror::Error;

/// The main error type for the armature engine.
///
/// Each variant provides specific context about which part of the asset
/// data was malformed.
#[derive(Error, Debug)]
pub enum ArmatureError {
    // ========================================================================
    // Node Tree Errors
    // ========================================================================
    /// A child-id list referenced a node id that is not in the asset.
    #[error("Unknown node id {id} referenced as child of node {parent}")]
    UnknownChildNode {
        /// The missing node id
        id: usize,
        /// The node whose child list referenced it
        parent: usize,
    },

    /// Two nodes in the asset carried the same id.
    #[error("Duplicate node id {0} in asset data")]
    DuplicateNodeId(usize),

    /// A lookup by node id found nothing.
    #[error("Node id {0} not found")]
    NodeNotFound(usize),

    // ========================================================================
    // Animation Data Errors
    // ========================================================================
    /// Keyframe times must be strictly ascending.
    #[error("Keyframe times not strictly ascending at index {0}")]
    NonAscendingKeyframes(usize),

    /// The value array length does not match the time array length
    /// (times 3 for cubic-spline tracks).
    #[error("Keyframe value count {values} does not match {expected} expected for {times} times")]
    KeyframeCountMismatch {
        /// Number of values supplied
        values: usize,
        /// Number of keyframe times supplied
        times: usize,
        /// Expected number of values
        expected: usize,
    },

    /// A channel's target property does not accept its value kind
    /// (e.g. quaternion values on a translation channel).
    #[error("Channel value kind does not match target property {0:?}")]
    ChannelKindMismatch(crate::animation::TargetPath),

    // ========================================================================
    // Skin Errors
    // ========================================================================
    /// The joint list and the inverse-bind-matrix list disagree in length.
    #[error("Skin has {joints} joints but {matrices} inverse bind matrices")]
    SkinCountMismatch {
        /// Number of joints
        joints: usize,
        /// Number of inverse bind matrices
        matrices: usize,
    },

    /// A skin joint referenced a node id that is not in the tree.
    #[error("Skin joint {joint} references unknown node id {node}")]
    UnknownJointNode {
        /// Joint index within the skin
        joint: usize,
        /// The missing node id
        node: usize,
    },
}

/// Alias for `Result<T, ArmatureError>`.
pub type Result<T> = std::result::Result<T, ArmatureError>;
