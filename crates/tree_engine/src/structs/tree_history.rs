//! Undo/redo against the history log.
//!
//! A restore replaces the live node map wholesale with a stored snapshot.
//! The snapshot is the sole persisted truth: the root id is recomputed by
//! scanning for the null-parent node rather than stored in the entry.

use crate::structs::node::TreeNodeMap;
use crate::structs::tree::TreeState;

impl TreeState {
    /// Step back to the parent history entry. No-op at the root of
    /// history. Returns whether a restore happened.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().map(|entry| entry.snapshot.clone()) else {
            tracing::debug!("TreeState: undo ignored, at history root");
            return false;
        };
        self.restore_snapshot(snapshot);
        true
    }

    /// Step forward to a child history entry (the newest branch when
    /// history has forked). Returns whether a restore happened.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().map(|entry| entry.snapshot.clone()) else {
            tracing::debug!("TreeState: redo ignored, no entry ahead");
            return false;
        };
        self.restore_snapshot(snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore_snapshot(&mut self, snapshot: TreeNodeMap) {
        self.root_id = snapshot
            .values()
            .find(|node| node.parent_id.is_none())
            .map(|node| node.id);

        // A selection that does not survive the snapshot falls back to root.
        if let Some(selected) = self.selected_node_id {
            if !snapshot.contains_key(&selected) {
                self.selected_node_id = self.root_id;
            }
        }

        tracing::info!(
            entry_id = ?self.history.current_entry_id(),
            node_count = snapshot.len(),
            "TreeState: restored snapshot"
        );

        self.nodes = snapshot;
        self.mark_dirty();
    }
}
