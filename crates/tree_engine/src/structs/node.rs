use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Conversational role tag. Advisory only; the engine never interprets it.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    User,
    Assistant,
    System,
}

/// Provenance of a node's text, fixed at creation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeSource {
    Human,
    Ai,
}

/// How the final context message is framed for the generation adapter.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Continue,
    Respond,
}

/// Sampling parameters passed through to the generation adapter.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt: u32,
    pub completion: u32,
}

/// Free-form generation provenance. Opaque to the engine and carried
/// through clones and snapshots unchanged.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_params: Option<GenerationParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_mode: Option<GenerationMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<serde_json::Value>,
}

/// One unit of text content in the tree.
///
/// `id` and `source` are immutable for the node's lifetime; `parent_id` is
/// fixed at creation and never repointed, which makes cycles impossible by
/// construction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<NodeRole>,
    pub source: NodeSource,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: NodeMetadata,
    /// Back-reference to the node this one was forked from. Lookup only,
    /// never ownership.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forked_from: Option<Uuid>,
    /// Transient session flag. Included in snapshots and persisted
    /// opportunistically, but not part of a node's semantic identity.
    #[serde(default)]
    pub is_streaming: bool,
}

/// Optional passthrough fields for [`TreeNode::new`].
#[derive(Clone, Debug, Default)]
pub struct NodeOptions {
    pub role: Option<NodeRole>,
    pub metadata: Option<NodeMetadata>,
    pub forked_from: Option<Uuid>,
}

impl TreeNode {
    /// Construct a new node with a fresh v4 id and `created_at == updated_at`.
    ///
    /// No validation beyond type shape; callers guarantee `parent_id`
    /// existence.
    pub fn new(
        parent_id: Option<Uuid>,
        text: impl Into<String>,
        source: NodeSource,
        options: NodeOptions,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            parent_id,
            text: text.into(),
            role: options.role,
            source,
            created_at: now,
            updated_at: now,
            metadata: options.metadata.unwrap_or_default(),
            forked_from: options.forked_from,
            is_streaming: false,
        }
    }
}

/// The single source of truth for tree shape. Children, ancestors and
/// siblings are always derived from `parent_id` links, never stored.
pub type TreeNodeMap = HashMap<Uuid, TreeNode>;
