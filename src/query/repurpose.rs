//! Drug repurposing candidates
//!
//! A compound is a candidate for a disease when it regulates a gene in the
//! opposite direction to one of the disease's localized anatomies, and the
//! compound does not already treat that disease:
//!
//! ```text
//! (c:Compound)-[up|down]->(g:Gene)<-[down|up]-(a:Anatomy)<-[localizes]-(d:Disease)
//!     where not (c)-[treats]->(d)
//! ```
//!
//! The join is evaluated per disease, in parallel, and the full result is
//! materialized before it is returned.

use super::NodeRef;
use crate::graph::{GraphStore, Node, NodeId, NodeKind, Relation};
use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A compound and the diseases it is newly proposed for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepurposingCandidate {
    pub id: String,
    pub name: String,
    pub diseases: Vec<NodeRef>,
}

/// Every candidate compound across all diseases, sorted by compound id
pub fn candidate_repurposing(graph: &GraphStore) -> Vec<RepurposingCandidate> {
    let diseases = graph.get_nodes_by_kind(&NodeKind::Disease);
    info!("Evaluating repurposing candidates over {} diseases", diseases.len());

    let per_disease: Vec<(NodeId, Vec<NodeId>)> = diseases
        .par_iter()
        .map(|disease| (disease.id, compounds_for(graph, disease.id)))
        .collect();

    let mut by_compound: IndexMap<NodeId, IndexSet<NodeId>> = IndexMap::new();
    for (disease, compounds) in per_disease {
        for compound in compounds {
            by_compound.entry(compound).or_default().insert(disease);
        }
    }

    let mut candidates: Vec<RepurposingCandidate> = by_compound
        .into_iter()
        .filter_map(|(compound, diseases)| {
            let compound = graph.get_node(compound)?;
            let mut diseases: Vec<NodeRef> = diseases
                .into_iter()
                .filter_map(|d| graph.get_node(d))
                .map(NodeRef::from)
                .collect();
            diseases.sort_by(|a, b| a.id.cmp(&b.id));
            Some(RepurposingCandidate {
                id: compound.external_id.clone(),
                name: compound.name.clone(),
                diseases,
            })
        })
        .collect();
    candidates.sort_by(|a, b| a.id.cmp(&b.id));

    info!("Found {} candidate compounds", candidates.len());
    candidates
}

/// Candidate compounds for one disease, or `None` if no disease has that id
pub fn candidates_for_disease(graph: &GraphStore, disease_id: &str) -> Option<Vec<NodeRef>> {
    let disease = graph
        .get_node_by_external_id(disease_id)
        .filter(|n| n.is(&NodeKind::Disease))?;
    let mut compounds: Vec<NodeRef> = compounds_for(graph, disease.id)
        .into_iter()
        .filter_map(|c| graph.get_node(c))
        .map(NodeRef::from)
        .collect();
    compounds.sort_by(|a, b| a.id.cmp(&b.id));
    Some(compounds)
}

/// Distinct compounds proposed for `disease`, in discovery order
fn compounds_for(graph: &GraphStore, disease: NodeId) -> Vec<NodeId> {
    let already_treats: FxHashSet<NodeId> = graph
        .get_incoming_edges(disease)
        .filter(|e| e.relation == Relation::Treats)
        .map(|e| e.source)
        .collect();

    let mut found = IndexSet::new();
    for localizes in graph.get_outgoing_edges(disease) {
        if localizes.relation != Relation::Localizes || !is_kind(graph, localizes.target, &NodeKind::Anatomy) {
            continue;
        }

        for site_effect in graph.get_outgoing_edges(localizes.target) {
            let Some(direction) = site_effect.relation.regulation() else {
                continue;
            };
            if !is_kind(graph, site_effect.target, &NodeKind::Gene) {
                continue;
            }

            let wanted = direction.opposite();
            for drug_effect in graph.get_incoming_edges(site_effect.target) {
                if drug_effect.relation.regulation() != Some(wanted) {
                    continue;
                }
                let compound = drug_effect.source;
                if is_kind(graph, compound, &NodeKind::Compound) && !already_treats.contains(&compound) {
                    found.insert(compound);
                }
            }
        }
    }

    debug!("{} candidates for {}", found.len(), disease);
    found.into_iter().collect()
}

fn is_kind(graph: &GraphStore, id: NodeId, kind: &NodeKind) -> bool {
    graph.get_node(id).is_some_and(|n: &Node| n.is(kind))
}
