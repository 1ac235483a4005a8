//! `tree_engine` is the core of a branching-document editor: a flat map of
//! text nodes whose tree shape is derived on demand, structural mutations
//! that fork instead of overwriting committed branch points, and a
//! snapshot-based history log that itself forms a tree of states.

// Declare the modules
pub mod error;
pub mod export;
pub mod history;
pub mod query;
pub mod structs;

// Re-export the public API
pub use error::{ImportError, LoadError};
pub use export::{export_to_json, imported_nodes_to_map, parse_imported_json, ExportedTree};
pub use history::{HistoryEntry, HistoryLog, TreeAction};
pub use structs::node::{
    GenerationMode, GenerationParams, NodeMetadata, NodeOptions, NodeRole, NodeSource, TokenUsage,
    TreeNode, TreeNodeMap,
};
pub use structs::tree::{SiblingSpec, TreeState};
