//! Streaming mutations.
//!
//! Incremental appends from an in-flight generation are coalesced: none of
//! these operations record a history entry. The next structural action
//! captures the settled state, so only the pre-stream and post-stream
//! states are individually undoable.

use crate::structs::node::NodeMetadata;
use crate::structs::tree::TreeState;
use chrono::Utc;
use uuid::Uuid;

impl TreeState {
    /// Flip a node's transient streaming flag. Returns false for unknown
    /// ids.
    pub fn set_node_streaming(&mut self, node_id: Uuid, is_streaming: bool) -> bool {
        let Some(node) = self.nodes.get_mut(&node_id) else {
            return false;
        };
        node.is_streaming = is_streaming;

        tracing::debug!(
            node_id = %node_id,
            is_streaming = is_streaming,
            "TreeState: streaming flag changed"
        );

        true
    }

    /// Append a streamed text delta to a node and bump `updated_at`.
    pub fn append_to_node(&mut self, node_id: Uuid, delta: &str) -> bool {
        let Some(node) = self.nodes.get_mut(&node_id) else {
            return false;
        };
        node.text.push_str(delta);
        node.updated_at = Utc::now();

        tracing::trace!(
            node_id = %node_id,
            delta_len = delta.len(),
            total_len = node.text.len(),
            "TreeState: appended streamed delta"
        );

        true
    }

    /// Replace a node's metadata wholesale. Used by the generation driver
    /// to attach final latency and token usage once a stream settles.
    pub fn update_node_metadata(&mut self, node_id: Uuid, metadata: NodeMetadata) -> bool {
        let Some(node) = self.nodes.get_mut(&node_id) else {
            return false;
        };
        node.metadata = metadata;
        true
    }
}
