use crate::request::GenerateRequest;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;
use tree_engine::TokenUsage;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GenerationError>;

/// One item of an in-flight generation.
#[derive(Debug, Clone)]
pub enum GenerationChunk {
    /// Incremental text delta.
    Delta(String),
    /// Terminal marker carrying whatever the provider knows about the
    /// finished response.
    Done {
        token_usage: Option<TokenUsage>,
        raw_response: Option<serde_json::Value>,
    },
}

pub type GenerationStream = Pin<Box<dyn Stream<Item = Result<GenerationChunk>> + Send>>;

/// A source of streamed completions. Implementations own transport and
/// parsing; the core only consumes chunks.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Provider name recorded into node metadata.
    fn name(&self) -> &str;

    /// Open a chunk stream for the request.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerationStream>;
}
