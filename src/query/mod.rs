//! Query processing module
//!
//! Two fixed read-only queries run against a recovered [`GraphStore`]:
//! - disease profile: compounds, genes and anatomy directly linked to a disease
//! - candidate repurposing: compounds whose gene regulation opposes a
//!   disease's localized anatomy and that do not already treat it

pub mod profile;
pub mod repurpose;

pub use profile::{disease_profile, DiseaseProfile};
pub use repurpose::{candidate_repurposing, candidates_for_disease, RepurposingCandidate};

use crate::graph::{GraphStatistics, GraphStore, Node};
use serde::{Deserialize, Serialize};

/// Id and display name of a node in a query result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: String,
    pub name: String,
}

impl NodeRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<&Node> for NodeRef {
    fn from(node: &Node) -> Self {
        Self::new(node.external_id.clone(), node.name.clone())
    }
}

/// Query engine - high-level interface over one graph
pub struct QueryEngine<'a> {
    store: &'a GraphStore,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Profile of the node with external id `disease_id`
    pub fn disease_profile(&self, disease_id: &str) -> Option<DiseaseProfile> {
        disease_profile(self.store, disease_id)
    }

    /// All repurposing candidates, grouped by compound
    pub fn candidate_repurposing(&self) -> Vec<RepurposingCandidate> {
        candidate_repurposing(self.store)
    }

    /// Repurposing candidates restricted to one disease
    pub fn candidates_for_disease(&self, disease_id: &str) -> Option<Vec<NodeRef>> {
        candidates_for_disease(self.store, disease_id)
    }

    pub fn statistics(&self) -> GraphStatistics {
        self.store.statistics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Relation;

    #[test]
    fn test_engine_delegates() {
        let mut store = GraphStore::new();
        let d = store.create_node("D1", "D1", "Disease").unwrap();
        let c = store.create_node("C1", "C1", "Compound").unwrap();
        let g = store.create_node("G1", "G1", "Gene").unwrap();
        let a = store.create_node("A1", "A1", "Anatomy").unwrap();
        let c2 = store.create_node("C2", "C2", "Compound").unwrap();
        store.create_edge(c, d, Relation::Treats, "CtD").unwrap();
        store.create_edge(d, g, Relation::Associates, "DaG").unwrap();
        store.create_edge(d, a, Relation::Localizes, "DlA").unwrap();
        store.create_edge(a, g, Relation::Downregulates, "AdG").unwrap();
        store.create_edge(c2, g, Relation::Upregulates, "CuG").unwrap();

        let engine = QueryEngine::new(&store);

        let profile = engine.disease_profile("D1").unwrap();
        assert_eq!(profile.compounds, vec!["C1"]);
        assert_eq!(profile.genes, vec!["G1"]);
        assert_eq!(profile.anatomy, vec!["A1"]);

        let candidates = engine.candidate_repurposing();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "C2");
        assert_eq!(candidates[0].diseases, vec![NodeRef::new("D1", "D1")]);

        assert_eq!(engine.candidates_for_disease("D1").unwrap().len(), 1);
        assert_eq!(engine.statistics().node_count, 5);
    }

    #[test]
    fn test_node_ref_from_node() {
        let mut store = GraphStore::new();
        let id = store.create_node("Gene::1017", "CDK2", "Gene").unwrap();
        let node_ref = NodeRef::from(store.get_node(id).unwrap());
        assert_eq!(node_ref, NodeRef::new("Gene::1017", "CDK2"));
    }
}
