//! Scene graph.
//!
//! Manages the skeleton hierarchy and per-node pose state:
//! - `Node`: a joint/bone (hierarchy links + transform)
//! - `Transform`: pose component (base pose, blend pose, matrix caches)
//! - `Scene`: node container with id lookup
//! - `Skeleton`: skinning computer (joint matrices / dual quaternions)
//! - `transform_system`: decoupled hierarchical matrix updates

pub mod node;
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use node::Node;
pub use scene::Scene;
pub use skeleton::{DualQuat, Skeleton};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    /// Generational key addressing a [`Node`] in the scene arena.
    pub struct NodeHandle;
}
