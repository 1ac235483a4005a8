use tree_engine::{query, GenerationMode, GenerationParams, NodeRole, TreeNodeMap};
use uuid::Uuid;

/// One role-tagged message of the conversation context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMessage {
    pub role: NodeRole,
    pub content: String,
}

/// Everything a provider needs to produce completions.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub messages: Vec<ContextMessage>,
    pub model: String,
    pub params: GenerationParams,
    pub mode: GenerationMode,
}

/// Build the ordered context from the ancestor path of `node_id`:
/// root-first, target-last, untagged nodes defaulting to the user role.
pub fn context_messages(nodes: &TreeNodeMap, node_id: Uuid) -> Vec<ContextMessage> {
    query::ancestors(nodes, node_id)
        .into_iter()
        .map(|node| ContextMessage {
            role: node.role.unwrap_or(NodeRole::User),
            content: node.text.clone(),
        })
        .collect()
}
