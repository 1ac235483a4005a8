//! Durable storage for tree documents: the current node map plus the
//! append-only history entries, consumed by the session layer as
//! fire-and-forget writes and one bulk load on initialization.

pub mod error;
pub mod store;

pub use error::{Result, StorageError};
pub use store::{FileTreeStore, TreeStore};
