//! Session error types

use thiserror::Error;
use tree_engine::{ImportError, LoadError};
use tree_storage::StorageError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Import rejected: {0}")]
    Import(#[from] ImportError),

    #[error("Invalid node map: {0}")]
    Load(#[from] LoadError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
