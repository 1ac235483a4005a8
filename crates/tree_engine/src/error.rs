use thiserror::Error;
use uuid::Uuid;

/// Rejections produced when validating an imported tree payload. A value,
/// not a panic: callers surface the message without special-casing.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("invalid import payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported export version {0}")]
    UnsupportedVersion(u32),
}

/// Rejections produced at the map-construction boundary when building
/// state from a stored or imported node map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("node map has no null-parent root")]
    MissingRoot,

    #[error("node map has {0} null-parent roots, expected exactly one")]
    MultipleRoots(usize),

    #[error("node {node_id} references missing parent {parent_id}")]
    DanglingParent { node_id: Uuid, parent_id: Uuid },
}
