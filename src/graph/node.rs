//! Node implementation for the knowledge graph

use super::types::{NodeId, NodeKind};
use serde::{Deserialize, Serialize};

/// A node in the knowledge graph
///
/// Nodes have:
/// - A dense internal ID assigned by the store
/// - The external identifier from nodes.tsv (e.g. `Disease::DOID:1324`)
/// - A display name
/// - A kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Internal identifier for this node
    pub id: NodeId,

    /// Identifier from the source data, unique across all kinds
    pub external_id: String,

    /// Display name
    pub name: String,

    /// Node category
    pub kind: NodeKind,
}

impl Node {
    /// Create a new node
    pub fn new(
        id: NodeId,
        external_id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<NodeKind>,
    ) -> Self {
        Node {
            id,
            external_id: external_id.into(),
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Check if node is of a specific kind
    pub fn is(&self, kind: &NodeKind) -> bool {
        &self.kind == kind
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
