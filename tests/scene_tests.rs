//! Scene Graph Tests
//!
//! Tests for:
//! - Scene construction from flat loader node lists
//! - The world-matrix invariant (world = parent world * local)
//! - Partial subtree updates
//! - Transform blend functions and pose resets
//! - Instance-root world placement overrides
//! - Degenerate-matrix decomposition fallbacks

use glam::{Affine3A, Quat, Vec3};

use armature::asset::NodeData;
use armature::errors::ArmatureError;
use armature::scene::Scene;

const EPSILON: f32 = 1e-5;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn approx_affine(a: &Affine3A, b: &Affine3A) -> bool {
    a.abs_diff_eq(*b, EPSILON)
}

/// Root (id 0) with two children (1, 2); node 2 has a child 3.
fn four_node_tree() -> Vec<NodeData> {
    let mut root = NodeData::new(0, "root", vec![1, 2]);
    root.translation = Vec3::new(0.0, 1.0, 0.0);

    let mut left = NodeData::new(1, "arm_left", vec![]);
    left.translation = Vec3::new(-1.0, 0.0, 0.0);

    let mut right = NodeData::new(2, "arm_right", vec![3]);
    right.translation = Vec3::new(1.0, 0.0, 0.0);

    let mut hand = NodeData::new(3, "hand_right", vec![]);
    hand.translation = Vec3::new(0.0, 0.5, 0.0);

    vec![root, left, right, hand]
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn from_nodes_builds_hierarchy() {
    let scene = Scene::from_nodes(&four_node_tree()).unwrap();

    assert_eq!(scene.node_count(), 4);
    assert_eq!(scene.roots.len(), 1);

    let root = scene.get_node(scene.roots[0]).unwrap();
    assert_eq!(root.name(), "root");
    assert_eq!(root.children().len(), 2);

    let hand = scene.node_by_id(3).unwrap();
    assert_eq!(hand.parent(), scene.handle_of(2));
}

#[test]
fn from_nodes_rejects_duplicate_ids() {
    let nodes = vec![NodeData::new(0, "a", vec![]), NodeData::new(0, "b", vec![])];
    let err = Scene::from_nodes(&nodes).unwrap_err();
    assert!(matches!(err, ArmatureError::DuplicateNodeId(0)));
}

#[test]
fn from_nodes_rejects_unknown_child() {
    let nodes = vec![NodeData::new(0, "a", vec![7])];
    let err = Scene::from_nodes(&nodes).unwrap_err();
    assert!(matches!(
        err,
        ArmatureError::UnknownChildNode { id: 7, parent: 0 }
    ));
}

#[test]
fn find_node_by_name_searches_depth_first() {
    let scene = Scene::from_nodes(&four_node_tree()).unwrap();
    assert_eq!(scene.find_node_by_name("hand_right"), scene.handle_of(3));
    assert_eq!(scene.find_node_by_name("missing"), None);
    assert_eq!(scene.node_name(1), Some("arm_left"));
}

#[test]
fn collect_subtree_returns_node_and_descendants() {
    let scene = Scene::from_nodes(&four_node_tree()).unwrap();
    let subtree = scene.collect_subtree(scene.handle_of(2).unwrap());
    assert_eq!(subtree.len(), 2);
    assert!(subtree.contains(&scene.handle_of(3).unwrap()));
}

// ============================================================================
// World-matrix invariant
// ============================================================================

#[test]
fn world_matrix_is_parent_world_times_local() {
    let mut scene = Scene::from_nodes(&four_node_tree()).unwrap();

    // Perturb a pose, then propagate.
    scene.node_by_id_mut(2).unwrap().transform.blend_rotation =
        Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
    scene.update_world_matrices();

    for node in scene.nodes.values() {
        let expected = match node.parent() {
            Some(parent) => *scene.get_node(parent).unwrap().world_matrix()
                * *node.transform.local_matrix(),
            None => *node.transform.local_matrix(),
        };
        assert!(
            approx_affine(node.world_matrix(), &expected),
            "invariant violated for node {}",
            node.id()
        );
    }
}

#[test]
fn world_positions_accumulate_down_the_tree() {
    let scene = Scene::from_nodes(&four_node_tree()).unwrap();

    let hand = scene.node_by_id(3).unwrap();
    // root (0,1,0) + right arm (1,0,0) + hand (0,0.5,0)
    assert!(approx_vec3(
        hand.transform.global_position(),
        Vec3::new(1.0, 1.5, 0.0)
    ));
}

#[test]
fn subtree_update_only_touches_descendants() {
    let mut scene = Scene::from_nodes(&four_node_tree()).unwrap();

    let left_before = *scene.node_by_id(1).unwrap().world_matrix();

    scene.node_by_id_mut(2).unwrap().transform.blend_position = Vec3::new(5.0, 0.0, 0.0);
    let right_handle = scene.handle_of(2).unwrap();
    scene.update_subtree(right_handle);

    assert!(approx_affine(
        scene.node_by_id(1).unwrap().world_matrix(),
        &left_before
    ));
    assert!(approx_vec3(
        scene.node_by_id(3).unwrap().transform.global_position(),
        Vec3::new(5.0, 1.5, 0.0)
    ));
}

// ============================================================================
// Transform blending
// ============================================================================

#[test]
fn blend_position_mixes_from_base_pose() {
    let mut scene = Scene::from_nodes(&four_node_tree()).unwrap();
    let node = scene.node_by_id_mut(1).unwrap();

    let target = Vec3::new(3.0, 0.0, 0.0);
    node.transform.blend_position_toward(target, 0.5);
    assert!(approx_vec3(
        node.transform.blend_position,
        Vec3::new(1.0, 0.0, 0.0)
    ));

    // Factor is clamped to [0, 1].
    node.transform.blend_position_toward(target, 7.0);
    assert!(approx_vec3(node.transform.blend_position, target));
    node.transform.blend_position_toward(target, -2.0);
    assert!(approx_vec3(
        node.transform.blend_position,
        Vec3::new(-1.0, 0.0, 0.0)
    ));
}

#[test]
fn blend_rotation_slerps_from_base_pose() {
    let mut scene = Scene::from_nodes(&four_node_tree()).unwrap();
    let node = scene.node_by_id_mut(0).unwrap();

    let target = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
    node.transform.blend_rotation_toward(target, 0.0);
    assert!(node.transform.blend_rotation.dot(Quat::IDENTITY).abs() > 1.0 - EPSILON);

    node.transform.blend_rotation_toward(target, 1.0);
    assert!(node.transform.blend_rotation.dot(target).abs() > 1.0 - EPSILON);

    let half = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
    node.transform.blend_rotation_toward(target, 0.5);
    assert!(node.transform.blend_rotation.dot(half).abs() > 1.0 - EPSILON);
}

#[test]
fn reset_poses_restores_blend_pose() {
    let mut scene = Scene::from_nodes(&four_node_tree()).unwrap();

    scene.node_by_id_mut(1).unwrap().transform.blend_position = Vec3::splat(9.0);
    scene.reset_poses();

    let node = scene.node_by_id(1).unwrap();
    assert!(approx_vec3(
        node.transform.blend_position,
        Vec3::new(-1.0, 0.0, 0.0)
    ));
}

// ============================================================================
// Instance placement override
// ============================================================================

#[test]
fn world_placement_override_moves_whole_tree() {
    let mut scene = Scene::from_nodes(&four_node_tree()).unwrap();

    let root_handle = scene.roots[0];
    scene
        .get_node_mut(root_handle)
        .unwrap()
        .transform
        .set_world_position(Vec3::new(10.0, 0.0, 0.0));
    scene.update_world_matrices();

    assert!(approx_vec3(
        scene.node_by_id(3).unwrap().transform.global_position(),
        Vec3::new(11.0, 1.5, 0.0)
    ));
}

#[test]
fn world_rotation_override_uses_degrees() {
    let mut scene = Scene::from_nodes(&four_node_tree()).unwrap();

    let root_handle = scene.roots[0];
    scene
        .get_node_mut(root_handle)
        .unwrap()
        .transform
        .set_world_rotation_degrees(Vec3::new(0.0, 90.0, 0.0));
    scene.update_world_matrices();

    // Left arm at (-1, 1, 0) rotates about Y onto the z axis.
    assert!(approx_vec3(
        scene.node_by_id(1).unwrap().transform.global_position(),
        Vec3::new(0.0, 1.0, 1.0)
    ));
}

// ============================================================================
// Degenerate decomposition fallback
// ============================================================================

#[test]
fn degenerate_world_matrix_yields_neutral_queries() {
    let mut scene = Scene::from_nodes(&four_node_tree()).unwrap();

    let node = scene.node_by_id_mut(0).unwrap();
    node.transform.blend_scale = Vec3::ZERO;
    scene.update_world_matrices();

    let node = scene.node_by_id(0).unwrap();
    assert_eq!(node.transform.global_position(), Vec3::ZERO);
    assert_eq!(node.transform.global_rotation(), Quat::IDENTITY);
}
