//! Pure derived views over the flat node map.
//!
//! None of these functions mutate; all tree shape is recomputed from
//! `parent_id` links on every call.

use crate::structs::node::{TreeNode, TreeNodeMap};
use uuid::Uuid;

/// All nodes whose parent is `parent_id`, ordered by `created_at`
/// ascending. Equal timestamps tie-break on id so the order is stable.
pub fn children(nodes: &TreeNodeMap, parent_id: Uuid) -> Vec<&TreeNode> {
    let mut out: Vec<&TreeNode> = nodes
        .values()
        .filter(|node| node.parent_id == Some(parent_id))
        .collect();
    out.sort_by_key(|node| (node.created_at, node.id));
    out
}

/// Walk `parent_id` links from `node_id` up to the root. Returns
/// root-first, target-last. A dangling parent reference stops the walk
/// without failing, so the result may not reach a null-parent root.
pub fn ancestors(nodes: &TreeNodeMap, node_id: Uuid) -> Vec<&TreeNode> {
    let mut chain = Vec::new();
    let mut current = nodes.get(&node_id);

    while let Some(node) = current {
        chain.push(node);
        current = match node.parent_id {
            Some(parent_id) => nodes.get(&parent_id),
            None => None,
        };
    }

    chain.reverse();
    chain
}

/// All nodes reachable from `node_id` via repeated child lookups.
/// Traversal pops parents before their children, but consumers should only
/// rely on "all descendants present".
pub fn descendants(nodes: &TreeNodeMap, node_id: Uuid) -> Vec<&TreeNode> {
    let mut out = Vec::new();
    let mut stack = children(nodes, node_id);

    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(children(nodes, node.id));
    }

    out
}

/// Children of the node's parent, excluding the node itself. Empty when
/// the node is missing or has no parent.
pub fn siblings(nodes: &TreeNodeMap, node_id: Uuid) -> Vec<&TreeNode> {
    let Some(parent_id) = nodes.get(&node_id).and_then(|node| node.parent_id) else {
        return Vec::new();
    };
    children(nodes, parent_id)
        .into_iter()
        .filter(|node| node.id != node_id)
        .collect()
}

/// Full path from the root to `node_id`. Alias of [`ancestors`].
pub fn path(nodes: &TreeNodeMap, node_id: Uuid) -> Vec<&TreeNode> {
    ancestors(nodes, node_id)
}

pub fn has_children(nodes: &TreeNodeMap, node_id: Uuid) -> bool {
    nodes
        .values()
        .any(|node| node.parent_id == Some(node_id))
}
