//! Storage trait and the file-backed implementation

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tree_engine::{HistoryEntry, TreeNode, TreeNodeMap};
use uuid::Uuid;

/// Durable key-value storage for one tree document.
#[async_trait]
pub trait TreeStore: Send + Sync {
    /// Upsert every node in the map keyed by id. Nodes stored previously
    /// but absent from `nodes` are pruned, so the store always mirrors
    /// the live map.
    async fn save_nodes(&self, nodes: &TreeNodeMap) -> Result<()>;

    /// Return every stored node as a map. An empty store yields an empty
    /// map, not an error.
    async fn load_all_nodes(&self) -> Result<TreeNodeMap>;

    /// Delete all stored nodes.
    async fn clear_nodes(&self) -> Result<()>;

    /// Durably append one history entry under a document scope.
    async fn save_history_entry(&self, document_id: &str, entry: &HistoryEntry) -> Result<()>;

    /// Return all entries for a document, ordered by timestamp.
    async fn load_history_entries(&self, document_id: &str) -> Result<Vec<HistoryEntry>>;
}

/// File-based tree storage: one JSON file per node under `nodes/` and per
/// history entry under `history/<document_id>/`.
#[derive(Clone)]
pub struct FileTreeStore {
    base_path: PathBuf,
}

impl FileTreeStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn nodes_dir(&self) -> PathBuf {
        self.base_path.join("nodes")
    }

    fn node_path(&self, id: Uuid) -> PathBuf {
        self.nodes_dir().join(format!("{}.json", id))
    }

    fn history_dir(&self, document_id: &str) -> PathBuf {
        self.base_path.join("history").join(document_id)
    }

    fn entry_path(&self, document_id: &str, entry_id: Uuid) -> PathBuf {
        self.history_dir(document_id)
            .join(format!("{}.json", entry_id))
    }

    fn id_from_path(path: &Path) -> Option<Uuid> {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| Uuid::parse_str(stem).ok())
    }
}

#[async_trait]
impl TreeStore for FileTreeStore {
    async fn save_nodes(&self, nodes: &TreeNodeMap) -> Result<()> {
        let dir = self.nodes_dir();
        fs::create_dir_all(&dir).await?;

        for node in nodes.values() {
            let contents = serde_json::to_string_pretty(node)?;
            fs::write(self.node_path(node.id), contents).await?;
        }

        // Prune rows for nodes no longer in the map.
        let mut reader = fs::read_dir(&dir).await?;
        while let Some(dirent) = reader.next_entry().await? {
            let path = dirent.path();
            match Self::id_from_path(&path) {
                Some(id) if nodes.contains_key(&id) => {}
                _ => {
                    tracing::debug!(path = %path.display(), "FileTreeStore: pruning stale node file");
                    fs::remove_file(&path).await?;
                }
            }
        }

        Ok(())
    }

    async fn load_all_nodes(&self) -> Result<TreeNodeMap> {
        let dir = self.nodes_dir();
        if !dir.exists() {
            return Ok(TreeNodeMap::new());
        }

        let mut nodes = TreeNodeMap::new();
        let mut reader = fs::read_dir(&dir).await?;
        while let Some(dirent) = reader.next_entry().await? {
            let path = dirent.path();
            if Self::id_from_path(&path).is_none() {
                tracing::warn!(path = %path.display(), "FileTreeStore: skipping unrecognized file");
                continue;
            }
            let contents = fs::read_to_string(&path).await?;
            let node: TreeNode = serde_json::from_str(&contents)?;
            nodes.insert(node.id, node);
        }

        Ok(nodes)
    }

    async fn clear_nodes(&self) -> Result<()> {
        let dir = self.nodes_dir();
        if dir.exists() {
            fs::remove_dir_all(&dir).await?;
        }
        Ok(())
    }

    async fn save_history_entry(&self, document_id: &str, entry: &HistoryEntry) -> Result<()> {
        let dir = self.history_dir(document_id);
        fs::create_dir_all(&dir).await?;

        let contents = serde_json::to_string_pretty(entry)?;
        fs::write(self.entry_path(document_id, entry.id), contents).await?;

        Ok(())
    }

    async fn load_history_entries(&self, document_id: &str) -> Result<Vec<HistoryEntry>> {
        let dir = self.history_dir(document_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let mut reader = fs::read_dir(&dir).await?;
        while let Some(dirent) = reader.next_entry().await? {
            let path = dirent.path();
            if Self::id_from_path(&path).is_none() {
                continue;
            }
            let contents = fs::read_to_string(&path).await?;
            let entry: HistoryEntry = serde_json::from_str(&contents)?;
            entries.push(entry);
        }

        entries.sort_by_key(|entry| (entry.timestamp, entry.seq));
        Ok(entries)
    }
}
