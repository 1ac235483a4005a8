//! Export/import codec.
//!
//! Wire format: `{ "version": 1, "name": ..., "nodes": [...],
//! "exportedAt": epoch-ms }`. Node fields use camelCase and epoch-ms
//! timestamps.

use crate::error::ImportError;
use crate::structs::node::{TreeNode, TreeNodeMap};
use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const EXPORT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTree {
    pub version: u32,
    pub name: String,
    pub nodes: Vec<TreeNode>,
    #[serde(with = "ts_milliseconds")]
    pub exported_at: DateTime<Utc>,
}

/// Serialize the node map to the versioned export format.
pub fn export_to_json(nodes: &TreeNodeMap, name: &str) -> Result<String, serde_json::Error> {
    let exported = ExportedTree {
        version: EXPORT_VERSION,
        name: name.to_string(),
        nodes: nodes.values().cloned().collect(),
        exported_at: Utc::now(),
    };
    serde_json::to_string_pretty(&exported)
}

/// Parse and validate an exported payload.
///
/// Requires a top-level object with `version == 1`, a `nodes` array, and
/// per-node string `id`/`text` plus a `"human"`/`"ai"` source; any
/// violation rejects the import.
pub fn parse_imported_json(content: &str) -> Result<ExportedTree, ImportError> {
    let parsed: ExportedTree = serde_json::from_str(content)?;
    if parsed.version != EXPORT_VERSION {
        return Err(ImportError::UnsupportedVersion(parsed.version));
    }
    Ok(parsed)
}

/// Convert an imported node array back to a map keyed by id.
pub fn imported_nodes_to_map(nodes: Vec<TreeNode>) -> TreeNodeMap {
    nodes.into_iter().map(|node| (node.id, node)).collect()
}
