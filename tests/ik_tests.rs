//! IK Solver Tests
//!
//! Tests for:
//! - Chain assignment and bone-length caching
//! - CCD and FABRIK convergence on reachable targets
//! - Failure semantics (empty chain, unreachable target, best-effort pose)
//! - FABRIK bone-length preservation
//! - Rotation-only guarantee
//! - Model-level IK wiring

use glam::Vec3;

use armature::asset::{ModelAsset, NodeData};
use armature::ik::{IkMode, IkSolver};
use armature::model::Model;
use armature::scene::Scene;

const EPSILON: f32 = 1e-5;

/// Straight three-node chain along +Y: root at the origin, joints one unit
/// apart. World positions: (0,0,0), (0,1,0), (0,2,0).
fn chain_scene() -> Scene {
    let mut root = NodeData::new(0, "chain_root", vec![1]);
    root.translation = Vec3::ZERO;
    let mut mid = NodeData::new(1, "mid", vec![2]);
    mid.translation = Vec3::new(0.0, 1.0, 0.0);
    let mut tip = NodeData::new(2, "tip", vec![]);
    tip.translation = Vec3::new(0.0, 1.0, 0.0);

    Scene::from_nodes(&[root, mid, tip]).unwrap()
}

/// Chain handles effector-first: tip, mid, root.
fn chain_solver(scene: &Scene, iterations: usize) -> IkSolver {
    let mut solver = IkSolver::with_iterations(iterations);
    let handles = vec![
        scene.handle_of(2).unwrap(),
        scene.handle_of(1).unwrap(),
        scene.handle_of(0).unwrap(),
    ];
    solver.set_chain(scene, handles);
    solver
}

fn effector_position(scene: &Scene) -> Vec3 {
    scene.node_by_id(2).unwrap().transform.global_position()
}

// ============================================================================
// Chain construction
// ============================================================================

#[test]
fn bone_lengths_are_cached_from_world_positions() {
    let scene = chain_scene();
    let solver = chain_solver(&scene, 10);

    let lengths = solver.bone_lengths();
    assert_eq!(lengths.len(), 2);
    assert!((lengths[0] - 1.0).abs() < EPSILON);
    assert!((lengths[1] - 1.0).abs() < EPSILON);
}

#[test]
fn empty_chain_fails_immediately() {
    let mut scene = chain_scene();
    let mut solver = IkSolver::new();
    solver.set_chain(&scene, Vec::new());

    assert!(!solver.solve_ccd(&mut scene, Vec3::new(0.0, 2.0, 0.0)));
    assert!(!solver.solve_fabrik(&mut scene, Vec3::new(0.0, 2.0, 0.0)));
}

// ============================================================================
// Convergence on reachable targets
// ============================================================================

#[test]
fn solvers_succeed_on_target_along_rest_direction() {
    // Target two units up the chain's rest direction: already in reach.
    let target = Vec3::new(0.0, 2.0, 0.0);

    let mut scene = chain_scene();
    let solver = chain_solver(&scene, 10);
    assert!(solver.solve_ccd(&mut scene, target));
    assert!((effector_position(&scene) - target).length() < EPSILON);

    let mut scene = chain_scene();
    let mut solver = chain_solver(&scene, 10);
    assert!(solver.solve_fabrik(&mut scene, target));
    assert!((effector_position(&scene) - target).length() < EPSILON);
}

#[test]
fn fabrik_reaches_bent_target() {
    // Distance sqrt(2) from the root: reachable, requires bending.
    let target = Vec3::new(1.0, 1.0, 0.0);

    let mut scene = chain_scene();
    let mut solver = chain_solver(&scene, 50);
    solver.set_threshold(1e-4);

    assert!(solver.solve_fabrik(&mut scene, target));
    assert!((effector_position(&scene) - target).length() < 1e-3);
}

/// Like [`chain_scene`] but with the middle joint pre-bent a quarter turn,
/// so the chain starts at root (0,0,0), mid (0,1,0), tip (-1,1,0).
///
/// CCD cannot bend a perfectly straight chain toward a collinear target (the
/// per-joint rotation arcs all degenerate to the identity), which is why the
/// convergence fixture starts from a bent pose, as an animated
/// skeleton would.
fn bent_chain_scene() -> Scene {
    let root = NodeData::new(0, "chain_root", vec![1]);
    let mut mid = NodeData::new(1, "mid", vec![2]);
    mid.translation = Vec3::new(0.0, 1.0, 0.0);
    mid.rotation = glam::Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
    let mut tip = NodeData::new(2, "tip", vec![]);
    tip.translation = Vec3::new(0.0, 1.0, 0.0);

    Scene::from_nodes(&[root, mid, tip]).unwrap()
}

#[test]
fn ccd_reaches_bent_target() {
    // Reachable: 1.44 units from the root, inside the chain's reach of 2.
    let target = Vec3::new(1.2, 0.8, 0.0);

    let mut scene = bent_chain_scene();
    let mut solver = chain_solver(&scene, 100);
    solver.set_threshold(1e-3);

    assert!(solver.solve_ccd(&mut scene, target));
    assert!((effector_position(&scene) - target).length() < 1e-2);
}

#[test]
fn ccd_preserves_bone_lengths() {
    let target = Vec3::new(1.2, 0.8, 0.0);

    let mut scene = bent_chain_scene();
    let mut solver = chain_solver(&scene, 100);
    solver.set_threshold(1e-3);
    solver.solve_ccd(&mut scene, target);

    let p0 = scene.node_by_id(0).unwrap().transform.global_position();
    let p1 = scene.node_by_id(1).unwrap().transform.global_position();
    let p2 = scene.node_by_id(2).unwrap().transform.global_position();

    assert!(((p1 - p0).length() - 1.0).abs() < 1e-3);
    assert!(((p2 - p1).length() - 1.0).abs() < 1e-3);
}

#[test]
fn fabrik_preserves_bone_lengths() {
    let target = Vec3::new(1.0, 1.0, 0.0);

    let mut scene = chain_scene();
    let mut solver = chain_solver(&scene, 50);
    solver.set_threshold(1e-4);
    solver.solve_fabrik(&mut scene, target);

    let p0 = scene.node_by_id(0).unwrap().transform.global_position();
    let p1 = scene.node_by_id(1).unwrap().transform.global_position();
    let p2 = scene.node_by_id(2).unwrap().transform.global_position();

    assert!(((p1 - p0).length() - 1.0).abs() < 1e-3);
    assert!(((p2 - p1).length() - 1.0).abs() < 1e-3);
}

// ============================================================================
// Failure semantics
// ============================================================================

#[test]
fn unreachable_target_reports_failure_and_keeps_pose() {
    // Five units up: past the chain's total reach of two.
    let target = Vec3::new(0.0, 5.0, 0.0);

    let mut scene = chain_scene();
    let mut solver = chain_solver(&scene, 20);

    assert!(!solver.solve_fabrik(&mut scene, target));

    // The best-effort pose is kept, not rolled back: the chain stretches
    // toward the target and the effector stays at full extension.
    let effector = effector_position(&scene);
    assert!(effector.is_finite());
    assert!((effector - target).length() < 3.5);

    let mut scene = chain_scene();
    let solver = chain_solver(&scene, 20);
    assert!(!solver.solve_ccd(&mut scene, target));
    assert!(effector_position(&scene).is_finite());
}

#[test]
fn solvers_only_rotate_joints() {
    let target = Vec3::new(1.0, 1.0, 0.0);

    let mut scene = chain_scene();
    let mut solver = chain_solver(&scene, 50);
    solver.solve_fabrik(&mut scene, target);

    // Local translations and scales are untouched; only rotations moved.
    for id in 0..3 {
        let node = scene.node_by_id(id).unwrap();
        let expected = if id == 0 {
            Vec3::ZERO
        } else {
            Vec3::new(0.0, 1.0, 0.0)
        };
        assert!((node.transform.blend_position - expected).length() < EPSILON);
        assert!((node.transform.blend_scale - Vec3::ONE).length() < EPSILON);
    }

    let mut scene = chain_scene();
    let solver = chain_solver(&scene, 50);
    solver.solve_ccd(&mut scene, target);
    for id in 0..3 {
        let node = scene.node_by_id(id).unwrap();
        assert!((node.transform.blend_scale - Vec3::ONE).length() < EPSILON);
    }
}

// ============================================================================
// Model-level wiring
// ============================================================================

#[test]
fn model_solves_ik_chain_by_node_ids() {
    let asset = ModelAsset {
        nodes: vec![
            {
                let mut n = NodeData::new(0, "chain_root", vec![1]);
                n.translation = Vec3::ZERO;
                n
            },
            {
                let mut n = NodeData::new(1, "mid", vec![2]);
                n.translation = Vec3::new(0.0, 1.0, 0.0);
                n
            },
            {
                let mut n = NodeData::new(2, "tip", vec![]);
                n.translation = Vec3::new(0.0, 1.0, 0.0);
                n
            },
        ],
        skin: None,
        clips: Vec::new(),
    };

    let mut model = Model::from_asset(&asset).unwrap();
    model.set_ik_mode(IkMode::Fabrik);
    model.set_ik_iterations(50);
    model.set_ik_chain(2, 0);
    model.set_ik_target(Vec3::new(0.0, 2.0, 0.0));

    model.update(0.016);
    assert!(model.ik_solved());
}

#[test]
fn model_clears_chain_when_root_is_not_an_ancestor() {
    let asset = ModelAsset {
        nodes: vec![
            NodeData::new(0, "root", vec![1, 2]),
            NodeData::new(1, "a", vec![]),
            NodeData::new(2, "b", vec![]),
        ],
        skin: None,
        clips: Vec::new(),
    };

    let mut model = Model::from_asset(&asset).unwrap();
    model.set_ik_mode(IkMode::Ccd);
    // Node 2 is a sibling of node 1, not an ancestor.
    model.set_ik_chain(1, 2);
    model.set_ik_target(Vec3::new(1.0, 0.0, 0.0));

    model.update(0.016);
    assert!(!model.ik_solved());
}
