//! One open document: a [`tree_engine::TreeState`] plus background
//! persistence. Mutations apply to in-memory state synchronously and hand
//! their writes to an ordered outbox queue, so callers never wait on disk.

pub mod error;
mod outbox;
pub mod session;

pub use error::{Result, SessionError};
pub use session::TreeSession;
