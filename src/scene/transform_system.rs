//! Transform system.
//!
//! Hierarchical world-matrix updates for the node tree, decoupled from
//! [`Scene`](crate::scene::Scene) so it only borrows the node storage.
//! Must run parent-before-children after any pose change.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::node::Node;
use crate::scene::NodeHandle;

/// Updates world matrices for the whole hierarchy.
///
/// Local matrices are rebuilt only where the blend pose changed; world
/// matrices are rebuilt where the local matrix or any ancestor changed.
pub fn update_hierarchy(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    for &root in roots {
        update_recursive(nodes, root, Affine3A::IDENTITY, false);
    }
}

/// Recomputes a node and all of its descendants, unconditionally.
///
/// Used after IK adjusts a joint so that the joint's subtree sees the new
/// pose immediately, without touching the rest of the skeleton.
pub fn update_subtree(nodes: &mut SlotMap<NodeHandle, Node>, start: NodeHandle) {
    let parent_world = match nodes.get(start) {
        Some(node) => match node.parent {
            Some(parent) => nodes
                .get(parent)
                .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix),
            None => Affine3A::IDENTITY,
        },
        None => return,
    };

    update_recursive(nodes, start, parent_world, true);
}

fn update_recursive(
    nodes: &mut SlotMap<NodeHandle, Node>,
    handle: NodeHandle,
    parent_world: Affine3A,
    parent_changed: bool,
) {
    let (world, children, changed) = {
        let Some(node) = nodes.get_mut(handle) else {
            return;
        };

        let local_changed = node.transform.update_local_matrix();
        let needs_update = local_changed || parent_changed;

        if needs_update {
            let world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(world);
        }

        (
            node.transform.world_matrix,
            node.children.clone(),
            needs_update,
        )
    };

    for child in children {
        update_recursive(nodes, child, world, changed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn child_world_matrix_includes_parent_translation() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();

        let mut parent = Node::new(0, "parent");
        parent.transform.set_base_pose(Vec3::ONE, Vec3::new(1.0, 0.0, 0.0), glam::Quat::IDENTITY);
        let parent_handle = nodes.insert(parent);

        let mut child = Node::new(1, "child");
        child.transform.set_base_pose(Vec3::ONE, Vec3::new(0.0, 1.0, 0.0), glam::Quat::IDENTITY);
        child.parent = Some(parent_handle);
        let child_handle = nodes.insert(child);

        nodes
            .get_mut(parent_handle)
            .unwrap()
            .children
            .push(child_handle);

        update_hierarchy(&mut nodes, &[parent_handle]);

        let world_pos = nodes[child_handle].transform.world_matrix.translation;
        assert!((world_pos.x - 1.0).abs() < 1e-5);
        assert!((world_pos.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn subtree_update_leaves_siblings_untouched() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();

        let root = nodes.insert(Node::new(0, "root"));
        let a = nodes.insert(Node::new(1, "a"));
        let b = nodes.insert(Node::new(2, "b"));
        nodes[a].parent = Some(root);
        nodes[b].parent = Some(root);
        nodes[root].children.push(a);
        nodes[root].children.push(b);

        update_hierarchy(&mut nodes, &[root]);

        nodes[a].transform.blend_position = Vec3::new(0.0, 2.0, 0.0);
        let before = nodes[b].transform.world_matrix;
        update_subtree(&mut nodes, a);

        assert_eq!(nodes[b].transform.world_matrix, before);
        assert!((nodes[a].transform.world_matrix.translation.y - 2.0).abs() < 1e-5);
    }
}
