//! biokg - biomedical knowledge graph
//!
//! Loads a heterogeneous network of compounds, genes, diseases and anatomy
//! from `nodes.tsv` / `edges.tsv`, persists it in an embedded RocksDB store
//! and answers two fixed questions over it:
//!
//! - what is directly known about a disease (treating compounds,
//!   associated genes, localized anatomy)
//! - which compounds might be repurposed for a disease they do not yet treat
//!
//! # Architecture
//!
//! ```text
//! TSV files -> loader -> GraphStore -> persistence (RocksDB)
//!                                           |
//!                                        recover
//!                                           v
//!                                      GraphStore -> query
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use biokg::{Loader, QueryEngine};
//!
//! let nodes = "id\tname\tkind\n\
//!              D1\tasthma\tDisease\n\
//!              C1\tsalbutamol\tCompound\n";
//! let edges = "source\tmetaedge\ttarget\n\
//!              C1\tCtD\tD1\n";
//!
//! let loaded = Loader::from_readers(nodes.as_bytes(), edges.as_bytes()).unwrap();
//! let engine = QueryEngine::new(&loaded.store);
//!
//! let profile = engine.disease_profile("D1").unwrap();
//! assert_eq!(profile.compounds, vec!["salbutamol"]);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod graph;
pub mod loader;
pub mod persistence;
pub mod query;

// Re-export main types for convenience
pub use graph::{
    Edge, EdgeId, GraphError, GraphResult, GraphStatistics, GraphStore, Node, NodeId, NodeKind,
    Regulation, Relation,
};

pub use loader::{LoadError, LoadReport, LoadResult, LoadedGraph, Loader};

pub use persistence::{
    IngestOptions, LoadManifest, LoadState, PersistenceError, PersistenceManager,
    PersistenceResult, PersistentStorage, StorageError, StorageLayout, StorageResult,
    DEFAULT_BATCH_SIZE,
};

pub use query::{DiseaseProfile, NodeRef, QueryEngine, RepurposingCandidate};

pub use config::{Config, ConfigError, ConfigResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
