//! Core type definitions for the knowledge graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense internal identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn new(id: u64) -> Self {
        NodeId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id)
    }
}

/// Dense internal identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub fn new(id: u64) -> Self {
        EdgeId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

impl From<u64> for EdgeId {
    fn from(id: u64) -> Self {
        EdgeId(id)
    }
}

/// Category of a node, taken from the `kind` column of nodes.tsv
///
/// The four kinds the queries care about get their own variant. Every other
/// kind in the source data (Side Effect, Pathway, ...) is kept verbatim in
/// `Other` so it still round-trips through storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum NodeKind {
    Compound,
    Gene,
    Disease,
    Anatomy,
    Other(String),
}

impl NodeKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "Compound" => NodeKind::Compound,
            "Gene" => NodeKind::Gene,
            "Disease" => NodeKind::Disease,
            "Anatomy" => NodeKind::Anatomy,
            other => NodeKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Compound => "Compound",
            NodeKind::Gene => "Gene",
            NodeKind::Disease => "Disease",
            NodeKind::Anatomy => "Anatomy",
            NodeKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for NodeKind {
    fn from(s: &str) -> Self {
        NodeKind::parse(s)
    }
}

/// Semantic relation carried by a whitelisted edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Treats,
    Palliates,
    Upregulates,
    Downregulates,
    Associates,
    Localizes,
    Resembles,
    Binds,
    Expresses,
    Regulates,
    Covaries,
    Interacts,
}

impl Relation {
    pub const ALL: [Relation; 12] = [
        Relation::Treats,
        Relation::Palliates,
        Relation::Upregulates,
        Relation::Downregulates,
        Relation::Associates,
        Relation::Localizes,
        Relation::Resembles,
        Relation::Binds,
        Relation::Expresses,
        Relation::Regulates,
        Relation::Covaries,
        Relation::Interacts,
    ];

    /// Human readable label, as stored in document connections
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Treats => "treats",
            Relation::Palliates => "palliates",
            Relation::Upregulates => "upregulates",
            Relation::Downregulates => "downregulates",
            Relation::Associates => "associates",
            Relation::Localizes => "localizes",
            Relation::Resembles => "resembles",
            Relation::Binds => "binds",
            Relation::Expresses => "expresses",
            Relation::Regulates => "regulates",
            Relation::Covaries => "covaries",
            Relation::Interacts => "interacts",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Relation::ALL.iter().copied().find(|r| r.as_str() == label)
    }

    /// Direction of gene regulation, if this relation is one
    pub fn regulation(&self) -> Option<Regulation> {
        match self {
            Relation::Upregulates => Some(Regulation::Up),
            Relation::Downregulates => Some(Regulation::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a regulation edge on a gene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regulation {
    Up,
    Down,
}

impl Regulation {
    pub fn opposite(&self) -> Self {
        match self {
            Regulation::Up => Regulation::Down,
            Regulation::Down => Regulation::Up,
        }
    }
}
