pub mod builder;
pub mod node;

pub use builder::{sanitize_id, GraphBuilder};
pub use node::{ExtraData, Graph, Link, Metadata, Node, NodeType};
