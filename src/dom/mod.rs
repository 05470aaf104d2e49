//! Element tree: slotmap-backed arena with attribute queries.

pub mod node;
pub mod tree;
pub mod query;

pub use node::{NodeData, NodeId, DOCUMENT_TAG, HIDDEN_CLASS, TEXT_TAG};
pub use tree::Dom;
