//! In-memory graph storage implementation

use super::edge::Edge;
use super::node::Node;
use super::types::{EdgeId, NodeId, NodeKind, Relation};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} already exists")]
    NodeAlreadyExists(NodeId),

    #[error("Edge {0} already exists")]
    EdgeAlreadyExists(EdgeId),

    #[error("Duplicate node identifier: {0}")]
    DuplicateNode(String),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Node and edge counts broken down by kind and relation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_kind: BTreeMap<String, usize>,
    pub edges_by_relation: BTreeMap<String, usize>,
}

/// In-memory graph storage
///
/// Arena vectors indexed by the dense ids, plus:
/// - outgoing: NodeId -> Vec<EdgeId> (adjacency list for outgoing edges)
/// - incoming: NodeId -> Vec<EdgeId> (adjacency list for incoming edges)
/// - kind_index: NodeKind -> Vec<NodeId>, in insertion order
/// - relation_index: Relation -> Vec<EdgeId>, in insertion order
/// - external_index: source identifier -> NodeId
///
/// The graph is append-only. A reload builds a fresh store.
#[derive(Debug)]
pub struct GraphStore {
    /// Node arena (slot 0 is never used)
    nodes: Vec<Option<Node>>,

    /// Edge arena (slot 0 is never used)
    edges: Vec<Option<Edge>>,

    /// Outgoing edges for each node
    outgoing: Vec<Vec<EdgeId>>,

    /// Incoming edges for each node
    incoming: Vec<Vec<EdgeId>>,

    kind_index: FxHashMap<NodeKind, Vec<NodeId>>,

    relation_index: FxHashMap<Relation, Vec<EdgeId>>,

    external_index: FxHashMap<String, NodeId>,

    /// Next node ID
    next_node_id: u64,

    /// Next edge ID
    next_edge_id: u64,

    node_count: usize,

    edge_count: usize,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        GraphStore {
            nodes: Vec::with_capacity(1024),
            edges: Vec::with_capacity(4096),
            outgoing: Vec::with_capacity(1024),
            incoming: Vec::with_capacity(1024),
            kind_index: FxHashMap::default(),
            relation_index: FxHashMap::default(),
            external_index: FxHashMap::default(),
            next_node_id: 1,
            next_edge_id: 1,
            node_count: 0,
            edge_count: 0,
        }
    }

    /// Create a node with an auto-generated internal ID
    ///
    /// Fails if `external_id` is already taken by a node of any kind.
    pub fn create_node(
        &mut self,
        external_id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<NodeKind>,
    ) -> GraphResult<NodeId> {
        let external_id = external_id.into();
        if self.external_index.contains_key(&external_id) {
            return Err(GraphError::DuplicateNode(external_id));
        }

        let node_id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;

        self.place_node(Node::new(node_id, external_id, name, kind));
        Ok(node_id)
    }

    /// Create an edge between two existing nodes
    pub fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        relation: Relation,
        metaedge: impl Into<String>,
    ) -> GraphResult<EdgeId> {
        if !self.has_node(source) {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if !self.has_node(target) {
            return Err(GraphError::InvalidEdgeTarget(target));
        }

        let edge_id = EdgeId::new(self.next_edge_id);
        self.next_edge_id += 1;

        self.place_edge(Edge::new(edge_id, source, target, relation, metaedge));
        Ok(edge_id)
    }

    fn place_node(&mut self, node: Node) {
        let node_id = node.id;
        let idx = node_id.index();

        // Ensure storage capacity
        if idx >= self.nodes.len() {
            self.nodes.resize(idx + 1, None);
            self.outgoing.resize(idx + 1, Vec::new());
            self.incoming.resize(idx + 1, Vec::new());
        }

        self.kind_index
            .entry(node.kind.clone())
            .or_default()
            .push(node_id);
        self.external_index.insert(node.external_id.clone(), node_id);

        self.nodes[idx] = Some(node);
        self.node_count += 1;
    }

    fn place_edge(&mut self, edge: Edge) {
        let edge_id = edge.id;
        let idx = edge_id.index();

        if idx >= self.edges.len() {
            self.edges.resize(idx + 1, None);
        }

        // Update adjacency lists
        self.outgoing[edge.source.index()].push(edge_id);
        self.incoming[edge.target.index()].push(edge_id);

        self.relation_index
            .entry(edge.relation)
            .or_default()
            .push(edge_id);

        self.edges[idx] = Some(edge);
        self.edge_count += 1;
    }

    /// Get a node by internal ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Get a node by its source identifier
    pub fn get_node_by_external_id(&self, external_id: &str) -> Option<&Node> {
        self.external_index
            .get(external_id)
            .and_then(|&id| self.get_node(id))
    }

    /// Resolve a source identifier to the internal ID
    pub fn resolve(&self, external_id: &str) -> Option<NodeId> {
        self.external_index.get(external_id).copied()
    }

    /// Check if a node exists
    pub fn has_node(&self, id: NodeId) -> bool {
        self.get_node(id).is_some()
    }

    /// Get an edge by ID
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    /// Outgoing edges from a node, in insertion order
    pub fn get_outgoing_edges(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing
            .get(node_id.index())
            .into_iter()
            .flatten()
            .filter_map(|&id| self.get_edge(id))
    }

    /// Incoming edges to a node, in insertion order
    pub fn get_incoming_edges(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.incoming
            .get(node_id.index())
            .into_iter()
            .flatten()
            .filter_map(|&id| self.get_edge(id))
    }

    /// All nodes of a kind, in insertion order
    pub fn get_nodes_by_kind(&self, kind: &NodeKind) -> Vec<&Node> {
        self.kind_index
            .get(kind)
            .map(|node_ids| {
                node_ids
                    .iter()
                    .filter_map(|&id| self.get_node(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All edges with a relation, in insertion order
    pub fn get_edges_by_relation(&self, relation: Relation) -> Vec<&Edge> {
        self.relation_index
            .get(&relation)
            .map(|edge_ids| {
                edge_ids
                    .iter()
                    .filter_map(|&id| self.get_edge(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get total number of nodes
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Get total number of edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// All nodes in ID order
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().flatten()
    }

    /// All edges in ID order
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().flatten()
    }

    /// Counts by kind and relation
    pub fn statistics(&self) -> GraphStatistics {
        let nodes_by_kind = self
            .kind_index
            .iter()
            .map(|(kind, ids)| (kind.to_string(), ids.len()))
            .collect();
        let edges_by_relation = self
            .relation_index
            .iter()
            .map(|(relation, ids)| (relation.to_string(), ids.len()))
            .collect();

        GraphStatistics {
            node_count: self.node_count,
            edge_count: self.edge_count,
            nodes_by_kind,
            edges_by_relation,
        }
    }

    // ============================================================
    // Recovery methods - used to rebuild graph from persisted data
    // ============================================================

    /// Insert a recovered node, keeping its persisted ID
    pub fn insert_recovered_node(&mut self, node: Node) -> GraphResult<()> {
        if self.has_node(node.id) {
            return Err(GraphError::NodeAlreadyExists(node.id));
        }
        if self.external_index.contains_key(&node.external_id) {
            return Err(GraphError::DuplicateNode(node.external_id));
        }

        let node_id = node.id;
        self.place_node(node);

        // Keep next_node_id above every recovered node
        if node_id.as_u64() >= self.next_node_id {
            self.next_node_id = node_id.as_u64() + 1;
        }
        Ok(())
    }

    /// Insert a recovered edge, keeping its persisted ID
    ///
    /// Source and target nodes must already exist.
    pub fn insert_recovered_edge(&mut self, edge: Edge) -> GraphResult<()> {
        if self.get_edge(edge.id).is_some() {
            return Err(GraphError::EdgeAlreadyExists(edge.id));
        }
        if !self.has_node(edge.source) {
            return Err(GraphError::InvalidEdgeSource(edge.source));
        }
        if !self.has_node(edge.target) {
            return Err(GraphError::InvalidEdgeTarget(edge.target));
        }

        let edge_id = edge.id;
        self.place_edge(edge);

        if edge_id.as_u64() >= self.next_edge_id {
            self.next_edge_id = edge_id.as_u64() + 1;
        }
        Ok(())
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get_node() {
        let mut store = GraphStore::new();
        let node_id = store.create_node("Disease::D1", "lung cancer", "Disease").unwrap();

        assert_eq!(store.node_count(), 1);
        let node = store.get_node(node_id).unwrap();
        assert_eq!(node.id, node_id);
        assert_eq!(node.kind, NodeKind::Disease);
        assert_eq!(store.resolve("Disease::D1"), Some(node_id));
        assert_eq!(
            store.get_node_by_external_id("Disease::D1").unwrap().name,
            "lung cancer"
        );
    }

    #[test]
    fn test_duplicate_external_id() {
        let mut store = GraphStore::new();
        store.create_node("X1", "first", "Gene").unwrap();

        // Uniqueness spans kinds
        let result = store.create_node("X1", "second", "Compound");
        assert_eq!(result, Err(GraphError::DuplicateNode("X1".to_string())));
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_create_and_get_edge() {
        let mut store = GraphStore::new();
        let c = store.create_node("C1", "aspirin", "Compound").unwrap();
        let d = store.create_node("D1", "pain", "Disease").unwrap();

        let edge_id = store.create_edge(c, d, Relation::Palliates, "CpD").unwrap();

        assert_eq!(store.edge_count(), 1);
        let edge = store.get_edge(edge_id).unwrap();
        assert_eq!(edge.source, c);
        assert_eq!(edge.target, d);
        assert_eq!(edge.relation, Relation::Palliates);
    }

    #[test]
    fn test_edge_validation() {
        let mut store = GraphStore::new();
        let node1 = store.create_node("G1", "TP53", "Gene").unwrap();
        let invalid_node = NodeId::new(999);

        let result = store.create_edge(invalid_node, node1, Relation::Interacts, "GiG");
        assert_eq!(result, Err(GraphError::InvalidEdgeSource(invalid_node)));

        let result = store.create_edge(node1, invalid_node, Relation::Interacts, "GiG");
        assert_eq!(result, Err(GraphError::InvalidEdgeTarget(invalid_node)));
    }

    #[test]
    fn test_adjacency_lists() {
        let mut store = GraphStore::new();
        let d = store.create_node("D1", "disease", "Disease").unwrap();
        let g = store.create_node("G1", "gene", "Gene").unwrap();
        let a = store.create_node("A1", "anatomy", "Anatomy").unwrap();

        store.create_edge(d, g, Relation::Associates, "DaG").unwrap();
        store.create_edge(d, a, Relation::Localizes, "DlA").unwrap();
        store.create_edge(a, g, Relation::Upregulates, "AuG").unwrap();

        assert_eq!(store.get_outgoing_edges(d).count(), 2);
        assert_eq!(store.get_incoming_edges(d).count(), 0);
        assert_eq!(store.get_outgoing_edges(a).count(), 1);
        assert_eq!(store.get_incoming_edges(a).count(), 1);
        assert_eq!(store.get_incoming_edges(g).count(), 2);
        assert_eq!(store.get_outgoing_edges(NodeId::new(999)).count(), 0);
    }

    #[test]
    fn test_kind_and_relation_index() {
        let mut store = GraphStore::new();
        let c1 = store.create_node("C1", "a", "Compound").unwrap();
        let c2 = store.create_node("C2", "b", "Compound").unwrap();
        let g = store.create_node("G1", "g", "Gene").unwrap();
        store.create_node("P1", "p", "Pathway").unwrap();

        store.create_edge(c1, g, Relation::Upregulates, "CuG").unwrap();
        store.create_edge(c2, g, Relation::Upregulates, "CuG").unwrap();
        store.create_edge(c1, g, Relation::Binds, "CbG").unwrap();

        let compounds = store.get_nodes_by_kind(&NodeKind::Compound);
        assert_eq!(compounds.len(), 2);
        assert_eq!(compounds[0].id, c1);
        assert_eq!(compounds[1].id, c2);
        assert_eq!(store.get_nodes_by_kind(&NodeKind::Other("Pathway".into())).len(), 1);
        assert_eq!(store.get_edges_by_relation(Relation::Upregulates).len(), 2);
        assert_eq!(store.get_edges_by_relation(Relation::Treats).len(), 0);
    }

    #[test]
    fn test_statistics() {
        let mut store = GraphStore::new();
        let c = store.create_node("C1", "a", "Compound").unwrap();
        let d = store.create_node("D1", "d", "Disease").unwrap();
        store.create_edge(c, d, Relation::Treats, "CtD").unwrap();
        store.create_edge(c, d, Relation::Palliates, "CpD").unwrap();

        let stats = store.statistics();
        assert_eq!(stats.node_count, 2);
        assert_eq!(stats.edge_count, 2);
        assert_eq!(stats.nodes_by_kind.get("Compound"), Some(&1));
        assert_eq!(stats.edges_by_relation.get("treats"), Some(&1));
    }

    #[test]
    fn test_arena_resize() {
        let mut store = GraphStore::new();
        for i in 0..1100 {
            store.create_node(format!("G{}", i), "gene", "Gene").unwrap();
        }

        assert_eq!(store.node_count(), 1100);
        assert!(store.has_node(NodeId::new(1100)));
    }

    #[test]
    fn test_recovered_ids_are_preserved() {
        let mut store = GraphStore::new();
        store
            .insert_recovered_node(Node::new(NodeId::new(7), "C7", "c", "Compound"))
            .unwrap();
        store
            .insert_recovered_node(Node::new(NodeId::new(3), "D3", "d", "Disease"))
            .unwrap();
        store
            .insert_recovered_edge(Edge::new(
                EdgeId::new(5),
                NodeId::new(7),
                NodeId::new(3),
                Relation::Treats,
                "CtD",
            ))
            .unwrap();

        assert_eq!(store.resolve("C7"), Some(NodeId::new(7)));
        assert_eq!(store.get_incoming_edges(NodeId::new(3)).count(), 1);

        // New nodes are allocated after the highest recovered id
        let next = store.create_node("G1", "g", "Gene").unwrap();
        assert_eq!(next, NodeId::new(8));
    }

    #[test]
    fn test_recovered_edge_needs_endpoints() {
        let mut store = GraphStore::new();
        store
            .insert_recovered_node(Node::new(NodeId::new(1), "C1", "c", "Compound"))
            .unwrap();

        let edge = Edge::new(EdgeId::new(1), NodeId::new(1), NodeId::new(2), Relation::Treats, "CtD");
        assert_eq!(
            store.insert_recovered_edge(edge),
            Err(GraphError::InvalidEdgeTarget(NodeId::new(2)))
        );

        let dup = Node::new(NodeId::new(1), "C9", "c", "Compound");
        assert_eq!(
            store.insert_recovered_node(dup),
            Err(GraphError::NodeAlreadyExists(NodeId::new(1)))
        );
    }
}
