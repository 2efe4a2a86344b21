use glam::Affine3A;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::asset::NodeData;
use crate::errors::{ArmatureError, Result};
use crate::scene::node::Node;
use crate::scene::transform_system;
use crate::scene::NodeHandle;

/// The skeleton node tree of one model.
///
/// `Scene` is a pure data layer: it owns the node arena and the root list,
/// and keeps the asset-id lookup table. Matrix propagation lives in
/// [`transform_system`] and is invoked through the update methods here.
///
/// The tree is built once from loader data and is structurally immutable
/// afterwards; only poses and matrices change frame to frame.
#[derive(Debug)]
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub roots: Vec<NodeHandle>,

    /// Asset node id -> arena handle.
    by_id: FxHashMap<usize, NodeHandle>,
    /// Highest asset node id + 1; masks are sized to this.
    id_space: usize,
}

impl Scene {
    /// Builds the node tree from a flat loader node list.
    ///
    /// Each entry carries its own id, its children's ids, and its base TRS.
    /// Nodes referenced by no child list become roots. Unknown child ids and
    /// duplicate ids are construction errors.
    pub fn from_nodes(node_data: &[NodeData]) -> Result<Self> {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let mut by_id: FxHashMap<usize, NodeHandle> = FxHashMap::default();

        for data in node_data {
            let mut node = Node::new(data.id, &data.name);
            node.transform
                .set_base_pose(data.scale, data.translation, data.rotation);

            let handle = nodes.insert(node);
            if by_id.insert(data.id, handle).is_some() {
                return Err(ArmatureError::DuplicateNodeId(data.id));
            }
        }

        // Second pass: wire up the hierarchy from the child-id lists.
        for data in node_data {
            let parent_handle = by_id[&data.id];
            for &child_id in &data.children {
                let child_handle =
                    *by_id
                        .get(&child_id)
                        .ok_or(ArmatureError::UnknownChildNode {
                            id: child_id,
                            parent: data.id,
                        })?;

                nodes[child_handle].parent = Some(parent_handle);
                nodes[parent_handle].children.push(child_handle);
            }
        }

        let roots = node_data
            .iter()
            .map(|data| by_id[&data.id])
            .filter(|&handle| nodes[handle].parent.is_none())
            .collect();

        let id_space = node_data.iter().map(|n| n.id + 1).max().unwrap_or(0);

        let mut scene = Self {
            nodes,
            roots,
            by_id,
            id_space,
        };
        scene.update_world_matrices();
        Ok(scene)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Resolves an asset node id to its arena handle.
    #[must_use]
    pub fn handle_of(&self, id: usize) -> Option<NodeHandle> {
        self.by_id.get(&id).copied()
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Node lookup by asset id.
    #[must_use]
    pub fn node_by_id(&self, id: usize) -> Option<&Node> {
        self.handle_of(id).and_then(|h| self.nodes.get(h))
    }

    pub fn node_by_id_mut(&mut self, id: usize) -> Option<&mut Node> {
        let handle = self.handle_of(id)?;
        self.nodes.get_mut(handle)
    }

    /// Display name of a node, for diagnostic UI.
    #[must_use]
    pub fn node_name(&self, id: usize) -> Option<&str> {
        self.node_by_id(id).map(Node::name)
    }

    /// World matrix of a node by asset id.
    #[must_use]
    pub fn node_world_matrix(&self, id: usize) -> Option<&Affine3A> {
        self.node_by_id(id).map(Node::world_matrix)
    }

    /// Depth-first search for a node by display name.
    #[must_use]
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeHandle> {
        fn search(scene: &Scene, current: NodeHandle, name: &str) -> Option<NodeHandle> {
            let node = scene.get_node(current)?;
            if node.name() == name {
                return Some(current);
            }
            for &child in node.children() {
                if let Some(found) = search(scene, child, name) {
                    return Some(found);
                }
            }
            None
        }

        self.roots
            .iter()
            .find_map(|&root| search(self, root, name))
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Size of the asset node-id space (max id + 1). Masks are sized to this.
    #[must_use]
    pub fn id_space(&self) -> usize {
        self.id_space
    }

    /// Display names of all nodes, indexed by asset id (empty string for
    /// unassigned ids).
    #[must_use]
    pub fn node_names(&self) -> Vec<String> {
        let mut names = vec![String::new(); self.id_space];
        for node in self.nodes.values() {
            names[node.id()] = node.name().to_string();
        }
        names
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Collects `start` and all of its descendants, depth-first.
    #[must_use]
    pub fn collect_subtree(&self, start: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            out.push(handle);
            for &child in node.children().iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    // ========================================================================
    // Matrix pipeline
    // ========================================================================

    /// Recomputes world matrices for the whole tree, parent before children.
    ///
    /// Must run after all pose writes for the frame and before skinning.
    pub fn update_world_matrices(&mut self) {
        transform_system::update_hierarchy(&mut self.nodes, &self.roots);
    }

    /// Recomputes world matrices for one subtree only.
    pub fn update_subtree(&mut self, start: NodeHandle) {
        transform_system::update_subtree(&mut self.nodes, start);
    }

    /// Resets every node's blend pose back to its base pose.
    pub fn reset_poses(&mut self) {
        for node in self.nodes.values_mut() {
            node.transform.reset_pose();
        }
        self.update_world_matrices();
    }

    /// Dumps the tree structure to the debug log.
    pub fn log_tree(&self) {
        fn log_node(scene: &Scene, handle: NodeHandle, depth: usize) {
            if let Some(node) = scene.get_node(handle) {
                log::debug!(
                    "{:indent$}- {} ({})",
                    "",
                    node.id(),
                    node.name(),
                    indent = depth * 2
                );
                for &child in node.children() {
                    log_node(scene, child, depth + 1);
                }
            }
        }

        log::debug!("---- node tree ----");
        for &root in &self.roots {
            log_node(self, root, 0);
        }
        log::debug!("-- end node tree --");
    }
}
