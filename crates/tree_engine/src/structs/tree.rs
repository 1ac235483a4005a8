use crate::error::LoadError;
use crate::history::{HistoryEntry, HistoryLog, TreeAction};
use crate::query;
use crate::structs::node::{NodeMetadata, NodeSource, TreeNode, TreeNodeMap};
use uuid::Uuid;

/// Spec for one node in a [`TreeState::create_sibling_nodes`] batch.
#[derive(Clone, Debug)]
pub struct SiblingSpec {
    pub text: String,
    pub source: NodeSource,
    pub metadata: Option<NodeMetadata>,
}

/// The mutable state of one open document: the node map, the derived root
/// and selection cursors, and the history log.
///
/// One `TreeState` per document; callers that need sharing own it behind
/// their own lock. There is a single logical writer, so the engine itself
/// is fully synchronous.
#[derive(Clone, Debug, Default)]
pub struct TreeState {
    pub(crate) nodes: TreeNodeMap,
    pub(crate) root_id: Option<Uuid>,
    pub(crate) selected_node_id: Option<Uuid>,
    pub(crate) history: HistoryLog,
    /// Runtime flag tracking whether the in-memory state has structural
    /// changes not yet handed to persistence.
    dirty: bool,
}

impl TreeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build state from a previously persisted node map.
    ///
    /// This is the map-construction boundary: maps with zero or multiple
    /// null-parent nodes, or with dangling parent references, are rejected
    /// instead of silently taking "first found".
    pub fn from_loaded(nodes: TreeNodeMap) -> Result<Self, LoadError> {
        let roots: Vec<Uuid> = nodes
            .values()
            .filter(|node| node.parent_id.is_none())
            .map(|node| node.id)
            .collect();

        let root_id = match roots.as_slice() {
            [root] => *root,
            [] => return Err(LoadError::MissingRoot),
            _ => return Err(LoadError::MultipleRoots(roots.len())),
        };

        for node in nodes.values() {
            if let Some(parent_id) = node.parent_id {
                if !nodes.contains_key(&parent_id) {
                    return Err(LoadError::DanglingParent {
                        node_id: node.id,
                        parent_id,
                    });
                }
            }
        }

        tracing::info!(
            root_id = %root_id,
            node_count = nodes.len(),
            "TreeState: loaded node map"
        );

        Ok(Self {
            nodes,
            root_id: Some(root_id),
            selected_node_id: Some(root_id),
            history: HistoryLog::new(),
            dirty: false,
        })
    }

    // ---- accessors -------------------------------------------------------

    pub fn nodes(&self) -> &TreeNodeMap {
        &self.nodes
    }

    pub fn root_id(&self) -> Option<Uuid> {
        self.root_id
    }

    pub fn selected_node_id(&self) -> Option<Uuid> {
        self.selected_node_id
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn node(&self, id: Uuid) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    pub fn children(&self, parent_id: Uuid) -> Vec<&TreeNode> {
        query::children(&self.nodes, parent_id)
    }

    pub fn ancestors(&self, node_id: Uuid) -> Vec<&TreeNode> {
        query::ancestors(&self.nodes, node_id)
    }

    pub fn descendants(&self, node_id: Uuid) -> Vec<&TreeNode> {
        query::descendants(&self.nodes, node_id)
    }

    pub fn siblings(&self, node_id: Uuid) -> Vec<&TreeNode> {
        query::siblings(&self.nodes, node_id)
    }

    pub fn path(&self, node_id: Uuid) -> Vec<&TreeNode> {
        query::path(&self.nodes, node_id)
    }

    pub fn has_children(&self, node_id: Uuid) -> bool {
        query::has_children(&self.nodes, node_id)
    }

    pub fn select_node(&mut self, node_id: Option<Uuid>) {
        self.selected_node_id = node_id;
    }

    // ---- history bootstrap ----------------------------------------------

    /// Record the Initial entry for a freshly created or loaded tree.
    pub fn record_initial(&mut self) {
        if let Some(root_id) = self.root_id {
            let action = TreeAction::Initial { node_id: root_id };
            self.history.record(action, &self.nodes);
        }
    }

    /// Record an Import entry after the live map has been replaced.
    pub fn record_import(&mut self, count: usize) {
        self.history.record(TreeAction::Import { count }, &self.nodes);
        self.mark_dirty();
    }

    /// Replace the history log with entries loaded from storage, placing
    /// the cursor on the newest entry.
    pub fn restore_history(&mut self, entries: Vec<HistoryEntry>) {
        self.history = HistoryLog::from_entries(entries);
    }

    // ---- dirty tracking --------------------------------------------------

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
