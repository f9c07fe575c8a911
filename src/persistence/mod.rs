//! Persistence layer
//!
//! Owns the on-disk copy of the knowledge graph:
//! - full-replace ingestion of a loaded graph in fixed-size batches
//! - a load manifest guarding against half-written graphs
//! - recovery of an in-memory [`GraphStore`] for querying
//!
//! Ingestion is destructive: whatever graph was persisted before is
//! dropped before the first new batch is written.

pub mod ingest;
pub mod manifest;
pub mod storage;

pub use ingest::{IngestStats, Ingestor, DEFAULT_BATCH_SIZE};
pub use manifest::{LoadManifest, LoadState, StorageLayout};
pub use storage::{PersistentStorage, StorageError, StorageResult};

use crate::graph::{GraphError, GraphStore};
use crate::loader::LoadReport;
use std::path::{Path, PathBuf};
use storage::{StoredDocument, StoredEdge, StoredNode, EDGES_CF, NODES_CF};
use tracing::{info, warn};

/// Options for one ingest run
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub layout: StorageLayout,
    pub batch_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            layout: StorageLayout::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Handle on the persisted graph
///
/// Opened once per command and closed when dropped.
pub struct PersistenceManager {
    base_path: PathBuf,
    storage: PersistentStorage,
}

impl PersistenceManager {
    /// Open (creating if needed) the store under `base_path`
    pub fn open(base_path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;

        info!("Initializing persistence manager at: {:?}", base_path);
        let storage = PersistentStorage::open(&base_path)?;

        Ok(Self { base_path, storage })
    }

    /// Manifest of the last load run, if any
    pub fn manifest(&self) -> Result<Option<LoadManifest>, PersistenceError> {
        Ok(self.storage.get_manifest()?)
    }

    /// Check that a new load may overwrite this store
    ///
    /// A complete graph is only overwritten when `replace` is set. A leftover
    /// incomplete load is always discarded.
    pub fn check_replace(&self, replace: bool) -> Result<(), PersistenceError> {
        let Some(manifest) = self.manifest()? else {
            return Ok(());
        };
        if !manifest.is_complete() {
            warn!("Discarding an incomplete load left in {:?}", self.base_path);
            return Ok(());
        }
        if !replace {
            return Err(PersistenceError::AlreadyLoaded {
                path: self.base_path.clone(),
                nodes: manifest.node_count,
            });
        }
        Ok(())
    }

    /// Replace the persisted graph with `graph`
    ///
    /// Drops all existing data, marks the manifest `Loading`, writes every
    /// batch, flushes, then marks the manifest `Complete`. If any step
    /// fails the manifest stays `Loading` and [`recover`](Self::recover)
    /// refuses the store.
    pub fn ingest(
        &mut self,
        graph: &GraphStore,
        report: &LoadReport,
        options: IngestOptions,
    ) -> Result<LoadManifest, PersistenceError> {
        if self.manifest()?.is_some() {
            warn!("Replacing previously persisted graph at {:?}", self.base_path);
        }
        self.storage.reset()?;

        let mut manifest = LoadManifest::begin(options.layout, options.batch_size, report.clone());
        self.storage.put_manifest(&manifest)?;
        self.storage.flush()?;

        info!(
            "Ingesting {} nodes and {} edges ({} layout, batch size {})",
            graph.node_count(),
            graph.edge_count(),
            options.layout,
            options.batch_size
        );
        let stats = Ingestor::new(&self.storage, options.batch_size).write_graph(graph, options.layout)?;
        self.storage.flush()?;

        manifest.complete(stats.nodes_written, stats.edges_written, stats.batches);
        self.storage.put_manifest(&manifest)?;
        self.storage.flush()?;

        info!("Ingest complete in {} batches", stats.batches);
        Ok(manifest)
    }

    /// Rebuild the in-memory graph from the store
    pub fn recover(&self) -> Result<GraphStore, PersistenceError> {
        let manifest = self.manifest()?.ok_or(PersistenceError::NotLoaded)?;
        if !manifest.is_complete() {
            return Err(PersistenceError::IncompleteLoad);
        }

        info!("Recovering graph ({} layout)", manifest.layout);
        let mut graph = GraphStore::new();

        match manifest.layout {
            StorageLayout::Document => {
                let documents: Vec<StoredDocument> = self.storage.scan(NODES_CF)?;
                let mut edges = Vec::new();
                for doc in documents {
                    let source = doc.node.id;
                    graph.insert_recovered_node(doc.node.into_node())?;
                    for connection in doc.connections {
                        edges.push(connection.into_edge(source)?);
                    }
                }
                // Restore original adjacency order
                edges.sort_by_key(|e| e.id);
                for edge in edges {
                    graph.insert_recovered_edge(edge)?;
                }
            }
            StorageLayout::Graph => {
                let nodes: Vec<StoredNode> = self.storage.scan(NODES_CF)?;
                for node in nodes {
                    graph.insert_recovered_node(node.into_node())?;
                }
                let edges: Vec<StoredEdge> = self.storage.scan(EDGES_CF)?;
                for edge in edges {
                    graph.insert_recovered_edge(edge.into_edge()?)?;
                }
            }
        }

        if graph.node_count() != manifest.node_count || graph.edge_count() != manifest.edge_count {
            return Err(PersistenceError::CountMismatch {
                expected_nodes: manifest.node_count,
                expected_edges: manifest.edge_count,
                nodes: graph.node_count(),
                edges: graph.edge_count(),
            });
        }

        info!(
            "Recovered {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

}

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No graph has been loaded into this store")]
    NotLoaded,

    #[error("The last load did not complete; reload the graph")]
    IncompleteLoad,

    #[error("{path:?} already holds a graph of {nodes} nodes; pass --replace to overwrite it")]
    AlreadyLoaded { path: PathBuf, nodes: usize },

    #[error(
        "Store holds {nodes} nodes / {edges} edges but the manifest records \
         {expected_nodes} / {expected_edges}"
    )]
    CountMismatch {
        expected_nodes: usize,
        expected_edges: usize,
        nodes: usize,
        edges: usize,
    },
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
