//! Core knowledge graph implementation
//!
//! This module implements the typed graph model:
//! - Nodes with a source identifier, display name and kind
//! - Directed edges carrying a whitelisted relation
//! - In-memory storage with adjacency lists and kind/relation indices

pub mod edge;
pub mod metaedge;
pub mod node;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use metaedge::{relation_for, METAEDGES};
pub use node::Node;
pub use store::{GraphError, GraphResult, GraphStatistics, GraphStore};
pub use types::{EdgeId, NodeId, NodeKind, Regulation, Relation};
