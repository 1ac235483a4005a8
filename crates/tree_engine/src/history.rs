//! Snapshot-based history log.
//!
//! Every structural mutation appends an immutable entry carrying a full
//! snapshot of the node map after the action. Entries link to the entry
//! that was current when they were recorded, so undoing and then mutating
//! creates a *branch* in history rather than truncating it.

use crate::structs::node::{TreeNode, TreeNodeMap};
use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a structural mutation did, carried for audit and display. The
/// entry's snapshot, not the action, is authoritative for restoring state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreeAction {
    CreateNode {
        node_id: Uuid,
    },
    EditNode {
        node_id: Uuid,
        old_text: String,
    },
    DeleteNode {
        node_id: Uuid,
        /// The removed subtree, kept for inspection. Undo relies on the
        /// snapshot, not on this list.
        deleted_nodes: Vec<TreeNode>,
    },
    ForkNode {
        original_id: Uuid,
        new_id: Uuid,
    },
    Generate {
        node_ids: Vec<Uuid>,
    },
    Import {
        count: usize,
    },
    Initial {
        node_id: Uuid,
    },
}

/// One immutable record in the history tree. Never mutated after creation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Monotonic position in the owning log. Disambiguates entries that
    /// land on the same millisecond.
    #[serde(default)]
    pub seq: u64,
    pub action: TreeAction,
    pub snapshot: TreeNodeMap,
    pub parent_entry_id: Option<Uuid>,
}

/// Append-only log of history entries plus a cursor into them.
#[derive(Clone, Debug, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    current_entry_id: Option<Uuid>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the log from previously stored entries. Entries are
    /// re-ordered by their recorded position and the cursor lands on the
    /// most recently recorded one.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.sort_by_key(|entry| (entry.seq, entry.timestamp));
        let current_entry_id = entries.last().map(|entry| entry.id);
        Self {
            entries,
            current_entry_id,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn current_entry_id(&self) -> Option<Uuid> {
        self.current_entry_id
    }

    pub fn current_entry(&self) -> Option<&HistoryEntry> {
        self.current_entry_id.and_then(|id| self.entry(id))
    }

    pub fn entry(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Append an entry for `action`, snapshotting `nodes`, parented on the
    /// current cursor. The cursor moves to the new entry.
    pub fn record(&mut self, action: TreeAction, nodes: &TreeNodeMap) -> &HistoryEntry {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            seq: self.entries.len() as u64,
            action,
            snapshot: nodes.clone(),
            parent_entry_id: self.current_entry_id,
        };

        tracing::debug!(
            entry_id = %entry.id,
            parent_entry_id = ?entry.parent_entry_id,
            total_entries = self.entries.len() + 1,
            "HistoryLog: recorded entry"
        );

        self.current_entry_id = Some(entry.id);
        let index = self.entries.len();
        self.entries.push(entry);
        &self.entries[index]
    }

    /// Step the cursor to the current entry's parent and return that
    /// parent. `None` when already at the root of history.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        let current = self.current_entry()?;
        let parent_id = current.parent_entry_id?;
        self.entry(parent_id)?;

        self.current_entry_id = Some(parent_id);
        self.entry(parent_id)
    }

    /// Step the cursor forward to a child of the current entry and return
    /// it. When history has branched, the most recently created child
    /// wins, so redo deterministically follows the newest branch.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let child_id = self
            .entries
            .iter()
            .rev()
            .find(|entry| entry.parent_entry_id == self.current_entry_id)
            .map(|entry| entry.id)?;

        self.current_entry_id = Some(child_id);
        self.entry(child_id)
    }

    pub fn can_undo(&self) -> bool {
        self.current_entry()
            .map(|entry| entry.parent_entry_id.is_some())
            .unwrap_or(false)
    }

    pub fn can_redo(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.parent_entry_id == self.current_entry_id)
    }
}
