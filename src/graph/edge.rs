//! Edge implementation for the knowledge graph

use super::types::{EdgeId, NodeId, Relation};
use serde::{Deserialize, Serialize};

/// A directed, typed edge
///
/// Edges have:
/// - A unique ID
/// - A source node (edge goes FROM this node)
/// - A target node
/// - The semantic relation and the metaedge code it was loaded from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,

    /// Source node
    pub source: NodeId,

    /// Target node
    pub target: NodeId,

    /// Relation kind
    pub relation: Relation,

    /// Metaedge code from edges.tsv (e.g. "CtD")
    pub metaedge: String,
}

impl Edge {
    /// Create a new directed edge
    pub fn new(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        relation: Relation,
        metaedge: impl Into<String>,
    ) -> Self {
        Edge {
            id,
            source,
            target,
            relation,
            metaedge: metaedge.into(),
        }
    }

    /// Check if this edge carries one of the given relations
    pub fn is_any(&self, relations: &[Relation]) -> bool {
        relations.contains(&self.relation)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_edge() {
        let edge = Edge::new(
            EdgeId::new(1),
            NodeId::new(10),
            NodeId::new(20),
            Relation::Treats,
            "CtD",
        );

        assert_eq!(edge.id, EdgeId::new(1));
        assert_eq!(edge.source, NodeId::new(10));
        assert_eq!(edge.target, NodeId::new(20));
        assert!(edge.is_any(&[Relation::Palliates, Relation::Treats]));
        assert!(!edge.is_any(&[Relation::Binds]));
        assert_eq!(edge.metaedge, "CtD");
    }

    #[test]
    fn test_multiple_edges_between_nodes() {
        let node1 = NodeId::new(100);
        let node2 = NodeId::new(200);

        let edge1 = Edge::new(EdgeId::new(1), node1, node2, Relation::Treats, "CtD");
        let edge2 = Edge::new(EdgeId::new(2), node1, node2, Relation::Palliates, "CpD");
        let edge3 = Edge::new(EdgeId::new(3), node1, node2, Relation::Treats, "CtD");

        assert_ne!(edge1, edge2);
        assert_ne!(edge1, edge3);
        assert!(edge1.is_any(&[Relation::Treats, Relation::Palliates]));
        assert!(edge2.is_any(&[Relation::Treats, Relation::Palliates]));
        assert!(!edge2.is_any(&[Relation::Treats]));
    }
}
