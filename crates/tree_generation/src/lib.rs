//! Generation adapter contract for tree sessions.
//!
//! Concrete providers (network transport, response parsing) live outside
//! this workspace; this crate fixes the shape of what they hand the core —
//! a cancellable stream of text chunks — and drives those chunks into a
//! session's streaming mutation surface.

pub mod driver;
pub mod provider;
pub mod request;

pub use driver::{stream_completion, stream_completions, GenerationOutcome};
pub use provider::{
    GenerationChunk, GenerationError, GenerationProvider, GenerationStream, Result,
};
pub use request::{context_messages, ContextMessage, GenerateRequest};
