//! Tree document session

use crate::error::Result;
use crate::outbox::Outbox;
use std::sync::Arc;
use tree_engine::{
    export_to_json, imported_nodes_to_map, parse_imported_json, NodeMetadata, NodeOptions,
    NodeSource, SiblingSpec, TreeState,
};
use tree_storage::TreeStore;
use uuid::Uuid;

/// One open document: in-memory tree state plus ordered background
/// persistence.
///
/// Structural mutations update state synchronously and enqueue their
/// writes; the call returns before anything touches disk. A crash between
/// a mutation and its completed write can lose that mutation on reload,
/// but the in-memory session stays consistent. Must live inside a Tokio
/// runtime.
pub struct TreeSession<S: TreeStore + 'static> {
    document_id: String,
    state: TreeState,
    storage: Arc<S>,
    outbox: Outbox,
}

impl<S: TreeStore + 'static> TreeSession<S> {
    /// Open a document: bulk-load stored nodes, or seed a fresh tree with
    /// a single empty root when the store is empty. The seed write is
    /// awaited so a new document exists durably before the first edit.
    pub async fn initialize(storage: S, document_id: impl Into<String>) -> Result<Self> {
        let document_id = document_id.into();
        let storage = Arc::new(storage);
        let loaded = storage.load_all_nodes().await?;

        let mut state;
        if loaded.is_empty() {
            state = TreeState::new();
            state.clear_tree();
            storage.save_nodes(state.nodes()).await?;
            if let Some(entry) = state.history().current_entry() {
                storage.save_history_entry(&document_id, entry).await?;
            }
            tracing::info!(document_id = %document_id, "TreeSession: seeded new document");
        } else {
            state = TreeState::from_loaded(loaded)?;
            let entries = storage.load_history_entries(&document_id).await?;
            if entries.is_empty() {
                state.record_initial();
                if let Some(entry) = state.history().current_entry() {
                    storage.save_history_entry(&document_id, entry).await?;
                }
            } else {
                state.restore_history(entries);
            }
            tracing::info!(
                document_id = %document_id,
                node_count = state.nodes().len(),
                history_entries = state.history().entries().len(),
                "TreeSession: loaded document"
            );
        }
        state.clear_dirty();

        let outbox = Outbox::spawn(Arc::clone(&storage), document_id.clone());
        Ok(Self {
            document_id,
            state,
            storage,
            outbox,
        })
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn state(&self) -> &TreeState {
        &self.state
    }

    /// Direct handle to the underlying store, for awaited reads outside
    /// the outbox (the mutation path never uses this).
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn select_node(&mut self, node_id: Option<Uuid>) {
        self.state.select_node(node_id);
    }

    // ---- structural mutations (persisted fire-and-forget) ---------------

    pub fn create_child_node(
        &mut self,
        parent_id: Option<Uuid>,
        text: &str,
        source: NodeSource,
        options: NodeOptions,
    ) -> Uuid {
        let id = self.state.create_child_node(parent_id, text, source, options);
        self.persist_after_mutation();
        id
    }

    pub fn add_empty_child(&mut self, parent_id: Uuid) -> Uuid {
        let id = self.state.add_empty_child(parent_id);
        self.persist_after_mutation();
        id
    }

    pub fn update_node_text(&mut self, node_id: Uuid, text: &str) -> Option<Uuid> {
        let result = self.state.update_node_text(node_id, text);
        self.persist_after_mutation();
        result
    }

    pub fn fork_node(&mut self, node_id: Uuid, new_text: &str) -> Option<Uuid> {
        let result = self.state.fork_node(node_id, new_text);
        self.persist_after_mutation();
        result
    }

    pub fn clone_node(&mut self, node_id: Uuid) -> Option<Uuid> {
        let result = self.state.clone_node(node_id);
        self.persist_after_mutation();
        result
    }

    pub fn clone_branch(&mut self, node_id: Uuid) -> Option<Uuid> {
        let result = self.state.clone_branch(node_id);
        self.persist_after_mutation();
        result
    }

    pub fn delete_node(&mut self, node_id: Uuid) -> bool {
        let deleted = self.state.delete_node(node_id);
        self.persist_after_mutation();
        deleted
    }

    pub fn create_sibling_nodes(
        &mut self,
        parent_id: Option<Uuid>,
        specs: Vec<SiblingSpec>,
    ) -> Vec<Uuid> {
        let ids = self.state.create_sibling_nodes(parent_id, specs);
        self.persist_after_mutation();
        ids
    }

    // ---- streaming (no history, no eager persistence) --------------------

    pub fn set_node_streaming(&mut self, node_id: Uuid, is_streaming: bool) -> bool {
        self.state.set_node_streaming(node_id, is_streaming)
    }

    pub fn append_to_node(&mut self, node_id: Uuid, delta: &str) -> bool {
        self.state.append_to_node(node_id, delta)
    }

    pub fn update_node_metadata(&mut self, node_id: Uuid, metadata: NodeMetadata) -> bool {
        self.state.update_node_metadata(node_id, metadata)
    }

    // ---- history ---------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let restored = self.state.undo();
        if restored {
            self.persist_restored_map();
        }
        restored
    }

    pub fn redo(&mut self) -> bool {
        let restored = self.state.redo();
        if restored {
            self.persist_restored_map();
        }
        restored
    }

    pub fn can_undo(&self) -> bool {
        self.state.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.can_redo()
    }

    // ---- destructive / bulk paths ----------------------------------------

    /// Discard every node, seed a fresh empty root, and reset history.
    /// Durable node storage is cleared before the new root is written;
    /// prior history entries for the document are superseded. This waits
    /// for the writes: the operation is destructive and irreversible.
    pub async fn clear_tree(&mut self) -> Result<Uuid> {
        let root_id = self.state.clear_tree();

        self.outbox.clear_nodes();
        self.outbox.save_nodes(self.state.nodes().clone());
        if let Some(entry) = self.state.history().current_entry() {
            self.outbox.save_entry(entry.clone());
        }
        self.outbox.flush().await;
        self.state.clear_dirty();

        tracing::info!(
            document_id = %self.document_id,
            root_id = %root_id,
            "TreeSession: cleared tree"
        );

        Ok(root_id)
    }

    /// Serialize the current node map to the versioned export format.
    pub fn export_json(&self, name: &str) -> Result<String> {
        Ok(export_to_json(self.state.nodes(), name)?)
    }

    /// Replace the live tree with an imported payload. Validation
    /// rejections surface as errors without touching current state.
    pub async fn import_json(&mut self, content: &str) -> Result<usize> {
        let parsed = parse_imported_json(content)?;
        let count = parsed.nodes.len();
        let map = imported_nodes_to_map(parsed.nodes);

        let mut state = TreeState::from_loaded(map)?;
        state.record_import(count);
        self.state = state;

        self.outbox.clear_nodes();
        self.outbox.save_nodes(self.state.nodes().clone());
        if let Some(entry) = self.state.history().current_entry() {
            self.outbox.save_entry(entry.clone());
        }
        self.outbox.flush().await;
        self.state.clear_dirty();

        tracing::info!(
            document_id = %self.document_id,
            imported = count,
            "TreeSession: imported tree"
        );

        Ok(count)
    }

    /// Wait for every queued background write to land. Intended for
    /// shutdown and tests; normal mutations never block on this.
    pub async fn flush(&self) {
        self.outbox.flush().await;
    }

    // ---- internals -------------------------------------------------------

    fn persist_after_mutation(&mut self) {
        if !self.state.is_dirty() {
            return;
        }
        self.outbox.save_nodes(self.state.nodes().clone());
        if let Some(entry) = self.state.history().current_entry() {
            self.outbox.save_entry(entry.clone());
        }
        self.state.clear_dirty();
    }

    fn persist_restored_map(&mut self) {
        self.outbox.save_nodes(self.state.nodes().clone());
        self.state.clear_dirty();
    }
}
