//! Disease profile lookup

use crate::graph::{GraphStore, NodeKind, Relation};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Everything directly known about one disease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseProfile {
    pub id: String,
    pub name: String,
    /// Compounds that treat or palliate the disease
    pub compounds: Vec<String>,
    /// Genes associated with the disease
    pub genes: Vec<String>,
    /// Anatomy where the disease localizes
    pub anatomy: Vec<String>,
}

/// Build the profile for `disease_id`, or `None` if no node has that id.
///
/// Names are deduplicated and keep the order in which edges were loaded.
pub fn disease_profile(graph: &GraphStore, disease_id: &str) -> Option<DiseaseProfile> {
    let disease = graph.get_node_by_external_id(disease_id)?;

    let mut compounds = IndexSet::new();
    for edge in graph.get_incoming_edges(disease.id) {
        if !edge.is_any(&[Relation::Treats, Relation::Palliates]) {
            continue;
        }
        if let Some(compound) = graph.get_node(edge.source) {
            if compound.is(&NodeKind::Compound) {
                compounds.insert(compound.name.as_str());
            }
        }
    }

    let mut genes = IndexSet::new();
    let mut anatomy = IndexSet::new();
    for edge in graph.get_outgoing_edges(disease.id) {
        let Some(target) = graph.get_node(edge.target) else {
            continue;
        };
        match (edge.relation, &target.kind) {
            (Relation::Associates, NodeKind::Gene) => {
                genes.insert(target.name.as_str());
            }
            (Relation::Localizes, NodeKind::Anatomy) => {
                anatomy.insert(target.name.as_str());
            }
            _ => {}
        }
    }

    Some(DiseaseProfile {
        id: disease.external_id.clone(),
        name: disease.name.clone(),
        compounds: compounds.into_iter().map(String::from).collect(),
        genes: genes.into_iter().map(String::from).collect(),
        anatomy: anatomy.into_iter().map(String::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_profile() {
        let mut graph = GraphStore::new();
        let d = graph.create_node("D1", "D1", "Disease").unwrap();
        let c = graph.create_node("C1", "C1", "Compound").unwrap();
        let g = graph.create_node("G1", "G1", "Gene").unwrap();
        let a = graph.create_node("A1", "A1", "Anatomy").unwrap();
        graph.create_edge(c, d, Relation::Treats, "CtD").unwrap();
        graph.create_edge(d, g, Relation::Associates, "DaG").unwrap();
        graph.create_edge(d, a, Relation::Localizes, "DlA").unwrap();

        let profile = disease_profile(&graph, "D1").unwrap();
        assert_eq!(profile.name, "D1");
        assert_eq!(profile.compounds, vec!["C1"]);
        assert_eq!(profile.genes, vec!["G1"]);
        assert_eq!(profile.anatomy, vec!["A1"]);
    }

    #[test]
    fn test_treats_and_palliates_are_deduplicated() {
        let mut graph = GraphStore::new();
        let d = graph.create_node("D1", "asthma", "Disease").unwrap();
        let c1 = graph.create_node("C1", "salbutamol", "Compound").unwrap();
        let c2 = graph.create_node("C2", "budesonide", "Compound").unwrap();
        graph.create_edge(c1, d, Relation::Treats, "CtD").unwrap();
        graph.create_edge(c1, d, Relation::Palliates, "CpD").unwrap();
        graph.create_edge(c2, d, Relation::Palliates, "CpD").unwrap();
        graph.create_edge(c2, d, Relation::Palliates, "CpD").unwrap();

        let profile = disease_profile(&graph, "D1").unwrap();
        assert_eq!(profile.compounds, vec!["salbutamol", "budesonide"]);
    }

    #[test]
    fn test_other_relations_are_ignored() {
        let mut graph = GraphStore::new();
        let d = graph.create_node("D1", "d", "Disease").unwrap();
        let d2 = graph.create_node("D2", "d2", "Disease").unwrap();
        let g = graph.create_node("G1", "g", "Gene").unwrap();
        graph.create_edge(d, g, Relation::Upregulates, "DuG").unwrap();
        graph.create_edge(d, d2, Relation::Resembles, "DrD").unwrap();

        let profile = disease_profile(&graph, "D1").unwrap();
        assert!(profile.compounds.is_empty());
        assert!(profile.genes.is_empty());
        assert!(profile.anatomy.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let mut graph = GraphStore::new();
        graph.create_node("Disease::DOID:1324", "lung cancer", "Disease").unwrap();

        let profile = disease_profile(&graph, "Disease::DOID:1324").unwrap();
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "Disease::DOID:1324",
                "name": "lung cancer",
                "compounds": [],
                "genes": [],
                "anatomy": []
            })
        );
    }

    #[test]
    fn test_unknown_id() {
        let graph = GraphStore::new();
        assert!(disease_profile(&graph, "Disease::nope").is_none());
    }
}
