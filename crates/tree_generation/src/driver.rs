//! Drives provider chunk streams into a session.
//!
//! Appends from a single generation are strictly ordered because each
//! chunk takes the session lock in turn; generations targeting different
//! nodes interleave freely with no cross-node guarantee.

use crate::provider::{GenerationChunk, GenerationProvider, Result};
use crate::request::GenerateRequest;
use futures::StreamExt;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tree_engine::{NodeMetadata, NodeSource, SiblingSpec, TokenUsage};
use tree_session::TreeSession;
use tree_storage::TreeStore;
use uuid::Uuid;

/// What one finished (or cancelled) completion produced.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub node_id: Uuid,
    pub text: String,
    pub token_usage: Option<TokenUsage>,
    pub latency_ms: u64,
    pub cancelled: bool,
}

/// Stream one completion into a fresh child of `parent_id`.
///
/// The placeholder node is created up front (one Generate history entry),
/// each delta is appended without further history, and final metadata
/// lands once the stream settles. Cancellation is one-shot: in-flight
/// reads stop, the streaming flag clears, and partial text is retained.
pub async fn stream_completion<S: TreeStore + 'static>(
    session: &Mutex<TreeSession<S>>,
    provider: &dyn GenerationProvider,
    parent_id: Uuid,
    request: &GenerateRequest,
    cancel: &CancellationToken,
) -> Result<GenerationOutcome> {
    let placeholder_metadata = NodeMetadata {
        model: Some(request.model.clone()),
        provider: Some(provider.name().to_string()),
        generation_params: Some(request.params),
        generation_mode: Some(request.mode),
        ..NodeMetadata::default()
    };

    let node_id = {
        let mut session = session.lock().await;
        let ids = session.create_sibling_nodes(
            Some(parent_id),
            vec![SiblingSpec {
                text: String::new(),
                source: NodeSource::Ai,
                metadata: Some(placeholder_metadata),
            }],
        );
        let node_id = ids[0];
        session.set_node_streaming(node_id, true);
        node_id
    };

    tracing::info!(
        node_id = %node_id,
        parent_id = %parent_id,
        model = %request.model,
        provider = provider.name(),
        "GenerationDriver: streaming completion"
    );

    let started = Instant::now();
    let mut stream = match provider.generate(request).await {
        Ok(stream) => stream,
        Err(err) => {
            session.lock().await.set_node_streaming(node_id, false);
            return Err(err);
        }
    };

    let mut cancelled = false;
    let mut failure = None;
    let mut token_usage = None;
    let mut raw_response = None;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                cancelled = true;
                break;
            }
            chunk = stream.next() => match chunk {
                Some(Ok(GenerationChunk::Delta(delta))) => {
                    session.lock().await.append_to_node(node_id, &delta);
                }
                Some(Ok(GenerationChunk::Done { token_usage: usage, raw_response: raw })) => {
                    token_usage = usage;
                    raw_response = raw;
                    break;
                }
                Some(Err(err)) => {
                    failure = Some(err);
                    break;
                }
                None => break,
            }
        }
    }

    let latency_ms = started.elapsed().as_millis() as u64;

    let mut session = session.lock().await;
    session.set_node_streaming(node_id, false);

    if let Some(err) = failure {
        tracing::warn!(node_id = %node_id, error = %err, "GenerationDriver: stream failed");
        return Err(err);
    }

    let text = session
        .state()
        .node(node_id)
        .map(|node| node.text.clone())
        .unwrap_or_default();

    let settled = session
        .state()
        .node(node_id)
        .map(|node| node.metadata.clone());
    if let Some(mut metadata) = settled {
        metadata.latency_ms = Some(latency_ms);
        metadata.token_usage = token_usage;
        metadata.raw_response = raw_response;
        session.update_node_metadata(node_id, metadata);
    }

    tracing::info!(
        node_id = %node_id,
        latency_ms = latency_ms,
        chars = text.len(),
        cancelled = cancelled,
        "GenerationDriver: completion settled"
    );

    Ok(GenerationOutcome {
        node_id,
        text,
        token_usage,
        latency_ms,
        cancelled,
    })
}

/// Stream `count` completions sequentially under one parent. Stops early
/// once the token is cancelled; outcomes for already-settled completions
/// are kept.
pub async fn stream_completions<S: TreeStore + 'static>(
    session: &Mutex<TreeSession<S>>,
    provider: &dyn GenerationProvider,
    parent_id: Uuid,
    request: &GenerateRequest,
    count: usize,
    cancel: &CancellationToken,
) -> Result<Vec<GenerationOutcome>> {
    let mut outcomes = Vec::with_capacity(count);

    for _ in 0..count {
        if cancel.is_cancelled() {
            break;
        }
        let outcome = stream_completion(session, provider, parent_id, request, cancel).await?;
        let stop = outcome.cancelled;
        outcomes.push(outcome);
        if stop {
            break;
        }
    }

    Ok(outcomes)
}
