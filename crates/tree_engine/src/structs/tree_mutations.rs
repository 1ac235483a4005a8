//! Structural mutations.
//!
//! Every operation here updates the node map atomically, records one
//! history entry tagged with a full snapshot of the resulting map, and
//! marks the state dirty for the persistence layer. Operations on ids not
//! present in the map are silent no-ops.

use crate::history::TreeAction;
use crate::structs::node::{NodeOptions, NodeSource, TreeNode, TreeNodeMap};
use crate::structs::tree::{SiblingSpec, TreeState};
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

impl TreeState {
    /// Create a child of `parent_id` and select it. A `None` parent claims
    /// the root slot when no root exists yet; root uniqueness for further
    /// null-parent inserts is the caller's responsibility.
    pub fn create_child_node(
        &mut self,
        parent_id: Option<Uuid>,
        text: impl Into<String>,
        source: NodeSource,
        options: NodeOptions,
    ) -> Uuid {
        let node = TreeNode::new(parent_id, text, source, options);
        let node_id = node.id;

        if parent_id.is_none() && self.root_id.is_none() {
            self.root_id = Some(node_id);
        }

        tracing::info!(
            node_id = %node_id,
            parent_id = ?parent_id,
            source = ?source,
            "TreeState: created node"
        );

        self.nodes.insert(node_id, node);
        self.selected_node_id = Some(node_id);
        self.history
            .record(TreeAction::CreateNode { node_id }, &self.nodes);
        self.mark_dirty();

        node_id
    }

    /// Shorthand for creating an empty human-authored child.
    pub fn add_empty_child(&mut self, parent_id: Uuid) -> Uuid {
        self.create_child_node(Some(parent_id), "", NodeSource::Human, NodeOptions::default())
    }

    /// Update a node's text, or fork when the node has children.
    ///
    /// A node with children is a committed branch point: its text is never
    /// rewritten in place, so already-generated children keep the exact
    /// content they continued from. Returns the id of the node that ended
    /// up holding `text` (the node itself, or the fork).
    pub fn update_node_text(&mut self, node_id: Uuid, text: impl Into<String>) -> Option<Uuid> {
        let text = text.into();
        if !self.nodes.contains_key(&node_id) {
            tracing::warn!(node_id = %node_id, "TreeState: update_node_text on unknown node");
            return None;
        }

        if self.has_children(node_id) {
            return self.fork_node(node_id, text);
        }

        let node = self.nodes.get_mut(&node_id)?;
        let old_text = std::mem::replace(&mut node.text, text);
        node.updated_at = Utc::now();

        tracing::info!(node_id = %node_id, "TreeState: edited node text");

        self.history
            .record(TreeAction::EditNode { node_id, old_text }, &self.nodes);
        self.mark_dirty();

        Some(node_id)
    }

    /// Create a sibling of `node_id` holding `new_text`, tagged with
    /// `forked_from`. The original node is left untouched.
    pub fn fork_node(&mut self, node_id: Uuid, new_text: impl Into<String>) -> Option<Uuid> {
        let original = self.nodes.get(&node_id)?;
        let forked = TreeNode::new(
            original.parent_id,
            new_text,
            NodeSource::Human,
            NodeOptions {
                forked_from: Some(node_id),
                ..NodeOptions::default()
            },
        );
        let new_id = forked.id;

        tracing::info!(
            original_id = %node_id,
            new_id = %new_id,
            "TreeState: forked node"
        );

        self.nodes.insert(new_id, forked);
        self.selected_node_id = Some(new_id);
        self.history.record(
            TreeAction::ForkNode {
                original_id: node_id,
                new_id,
            },
            &self.nodes,
        );
        self.mark_dirty();

        Some(new_id)
    }

    /// Duplicate a single node's content as a new sibling. Children are
    /// not duplicated.
    pub fn clone_node(&mut self, node_id: Uuid) -> Option<Uuid> {
        let original = self.nodes.get(&node_id)?;
        let cloned = TreeNode::new(
            original.parent_id,
            original.text.clone(),
            original.source,
            NodeOptions {
                role: original.role,
                metadata: Some(original.metadata.clone()),
                ..NodeOptions::default()
            },
        );
        let cloned_id = cloned.id;

        tracing::info!(node_id = %node_id, cloned_id = %cloned_id, "TreeState: cloned node");

        self.nodes.insert(cloned_id, cloned);
        self.selected_node_id = Some(cloned_id);
        self.history
            .record(TreeAction::CreateNode { node_id: cloned_id }, &self.nodes);
        self.mark_dirty();

        Some(cloned_id)
    }

    /// Duplicate a node and its entire descendant subtree as a sibling
    /// branch. Every original id is remapped to a fresh one, so the clone
    /// mirrors the source subtree's shape without aliasing a single node.
    pub fn clone_branch(&mut self, node_id: Uuid) -> Option<Uuid> {
        let original_root = self.nodes.get(&node_id).cloned()?;

        // Owned copies first; descendants() yields parents before children.
        let subtree: Vec<TreeNode> = self
            .descendants(node_id)
            .into_iter()
            .cloned()
            .collect();

        let mut id_mapping: std::collections::HashMap<Uuid, Uuid> = std::collections::HashMap::new();

        let cloned_root = TreeNode::new(
            original_root.parent_id,
            original_root.text.clone(),
            original_root.source,
            NodeOptions {
                role: original_root.role,
                metadata: Some(original_root.metadata.clone()),
                ..NodeOptions::default()
            },
        );
        let cloned_root_id = cloned_root.id;
        id_mapping.insert(node_id, cloned_root_id);
        self.nodes.insert(cloned_root_id, cloned_root);

        for desc in &subtree {
            let new_parent_id = desc
                .parent_id
                .and_then(|parent_id| id_mapping.get(&parent_id).copied());
            let cloned_desc = TreeNode::new(
                new_parent_id,
                desc.text.clone(),
                desc.source,
                NodeOptions {
                    role: desc.role,
                    metadata: Some(desc.metadata.clone()),
                    ..NodeOptions::default()
                },
            );
            id_mapping.insert(desc.id, cloned_desc.id);
            self.nodes.insert(cloned_desc.id, cloned_desc);
        }

        tracing::info!(
            node_id = %node_id,
            cloned_root_id = %cloned_root_id,
            subtree_size = subtree.len() + 1,
            "TreeState: cloned branch"
        );

        self.selected_node_id = Some(cloned_root_id);
        self.history.record(
            TreeAction::CreateNode {
                node_id: cloned_root_id,
            },
            &self.nodes,
        );
        self.mark_dirty();

        Some(cloned_root_id)
    }

    /// Remove a node and all of its descendants atomically. The root is
    /// never deletable. When the selection pointed into the deleted
    /// subtree it moves to the deleted node's parent.
    pub fn delete_node(&mut self, node_id: Uuid) -> bool {
        let Some(node) = self.nodes.get(&node_id) else {
            return false;
        };
        if Some(node_id) == self.root_id {
            tracing::warn!(node_id = %node_id, "TreeState: refusing to delete root");
            return false;
        }

        let parent_id = node.parent_id;
        let mut deleted_nodes: Vec<TreeNode> = vec![node.clone()];
        deleted_nodes.extend(self.descendants(node_id).into_iter().cloned());
        let deleted_ids: HashSet<Uuid> = deleted_nodes.iter().map(|n| n.id).collect();

        self.nodes.retain(|id, _| !deleted_ids.contains(id));

        if let Some(selected) = self.selected_node_id {
            if deleted_ids.contains(&selected) {
                self.selected_node_id = parent_id;
            }
        }

        tracing::info!(
            node_id = %node_id,
            removed = deleted_nodes.len(),
            "TreeState: deleted subtree"
        );

        self.history.record(
            TreeAction::DeleteNode {
                node_id,
                deleted_nodes,
            },
            &self.nodes,
        );
        self.mark_dirty();

        true
    }

    /// Discard all nodes, create a single empty root, and reset history to
    /// one Initial entry. Prior history for the document is superseded,
    /// not migrated. Returns the new root id.
    pub fn clear_tree(&mut self) -> Uuid {
        let root = TreeNode::new(None, "", NodeSource::Human, NodeOptions::default());
        let root_id = root.id;

        tracing::info!(
            discarded = self.nodes.len(),
            root_id = %root_id,
            "TreeState: cleared tree"
        );

        self.nodes = TreeNodeMap::new();
        self.nodes.insert(root_id, root);
        self.root_id = Some(root_id);
        self.selected_node_id = Some(root_id);
        self.history = crate::history::HistoryLog::new();
        self.history
            .record(TreeAction::Initial { node_id: root_id }, &self.nodes);
        self.mark_dirty();

        root_id
    }

    /// Batch-create siblings under one parent, as one Generate history
    /// entry. Used for multi-completion generation; selection moves to the
    /// first created node.
    pub fn create_sibling_nodes(
        &mut self,
        parent_id: Option<Uuid>,
        specs: Vec<SiblingSpec>,
    ) -> Vec<Uuid> {
        let mut node_ids = Vec::with_capacity(specs.len());

        for spec in specs {
            let node = TreeNode::new(
                parent_id,
                spec.text,
                spec.source,
                NodeOptions {
                    metadata: spec.metadata,
                    ..NodeOptions::default()
                },
            );
            node_ids.push(node.id);
            self.nodes.insert(node.id, node);
        }

        if node_ids.is_empty() {
            return node_ids;
        }

        tracing::info!(
            parent_id = ?parent_id,
            created = node_ids.len(),
            "TreeState: batch-created siblings"
        );

        self.selected_node_id = node_ids.first().copied();
        self.history.record(
            TreeAction::Generate {
                node_ids: node_ids.clone(),
            },
            &self.nodes,
        );
        self.mark_dirty();

        node_ids
    }
}
