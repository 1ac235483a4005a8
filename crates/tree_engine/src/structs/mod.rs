pub mod node;
pub mod tree;
pub mod tree_history;
pub mod tree_mutations;
pub mod tree_streaming;
