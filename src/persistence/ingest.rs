//! Batched writer for the persisted graph
//!
//! Records are encoded one at a time and committed in groups of
//! `batch_size`, so peak memory on the write path is bounded by one batch
//! regardless of graph size.

use super::manifest::StorageLayout;
use super::storage::{
    PersistentStorage, StorageResult, StoredConnection, StoredDocument, StoredEdge, StoredNode,
    EDGES_CF, NODES_CF,
};
use crate::graph::GraphStore;
use tracing::debug;

/// Default number of records per write batch
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// What an ingest run wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub nodes_written: usize,
    pub edges_written: usize,
    pub batches: usize,
}

/// Writes a [`GraphStore`] into storage in fixed-size batches
pub struct Ingestor<'a> {
    storage: &'a PersistentStorage,
    batch_size: usize,
    pending: Vec<(Vec<u8>, Vec<u8>)>,
    stats: IngestStats,
}

impl<'a> Ingestor<'a> {
    /// A batch size of zero is treated as one.
    pub fn new(storage: &'a PersistentStorage, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            storage,
            batch_size,
            pending: Vec::with_capacity(batch_size),
            stats: IngestStats::default(),
        }
    }

    /// Write the whole graph in the given layout
    pub fn write_graph(mut self, graph: &GraphStore, layout: StorageLayout) -> StorageResult<IngestStats> {
        match layout {
            StorageLayout::Document => {
                for node in graph.all_nodes() {
                    let connections: Vec<StoredConnection> = graph
                        .get_outgoing_edges(node.id)
                        .map(StoredConnection::from_edge)
                        .collect();
                    self.stats.edges_written += connections.len();

                    let doc = StoredDocument {
                        node: StoredNode::from_node(node),
                        connections,
                    };
                    self.push(NODES_CF, PersistentStorage::node_key(node.id.as_u64()), &doc)?;
                    self.stats.nodes_written += 1;
                }
                self.commit(NODES_CF)?;
            }
            StorageLayout::Graph => {
                for node in graph.all_nodes() {
                    let stored = StoredNode::from_node(node);
                    self.push(NODES_CF, PersistentStorage::node_key(node.id.as_u64()), &stored)?;
                    self.stats.nodes_written += 1;
                }
                self.commit(NODES_CF)?;

                for edge in graph.all_edges() {
                    let stored = StoredEdge::from_edge(edge);
                    self.push(EDGES_CF, PersistentStorage::edge_key(edge.id.as_u64()), &stored)?;
                    self.stats.edges_written += 1;
                }
                self.commit(EDGES_CF)?;
            }
        }

        Ok(self.stats)
    }

    fn push<T: serde::Serialize>(&mut self, cf: &str, key: Vec<u8>, record: &T) -> StorageResult<()> {
        self.pending.push((key, bincode::serialize(record)?));
        if self.pending.len() >= self.batch_size {
            self.commit(cf)?;
        }
        Ok(())
    }

    fn commit(&mut self, cf: &str) -> StorageResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.storage.write_records(cf, &self.pending)?;
        self.stats.batches += 1;
        debug!("Committed batch {} ({} records)", self.stats.batches, self.pending.len());
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Relation;
    use tempfile::TempDir;

    fn sample_graph(nodes: usize) -> GraphStore {
        let mut graph = GraphStore::new();
        let mut ids = Vec::new();
        for i in 0..nodes {
            ids.push(graph.create_node(format!("G{}", i), format!("gene {}", i), "Gene").unwrap());
        }
        for pair in ids.windows(2) {
            graph.create_edge(pair[0], pair[1], Relation::Interacts, "GiG").unwrap();
        }
        graph
    }

    #[test]
    fn test_document_batches() {
        let temp_dir = TempDir::new().unwrap();
        let storage = PersistentStorage::open(temp_dir.path()).unwrap();
        let graph = sample_graph(25);

        let stats = Ingestor::new(&storage, 10)
            .write_graph(&graph, StorageLayout::Document)
            .unwrap();

        assert_eq!(stats.nodes_written, 25);
        assert_eq!(stats.edges_written, 24);
        // 10 + 10 + 5
        assert_eq!(stats.batches, 3);
        assert_eq!(storage.count(NODES_CF).unwrap(), 25);
        assert_eq!(storage.count(EDGES_CF).unwrap(), 0);
    }

    #[test]
    fn test_graph_batches() {
        let temp_dir = TempDir::new().unwrap();
        let storage = PersistentStorage::open(temp_dir.path()).unwrap();
        let graph = sample_graph(20);

        let stats = Ingestor::new(&storage, 10)
            .write_graph(&graph, StorageLayout::Graph)
            .unwrap();

        // nodes: 10 + 10, edges: 10 + 9
        assert_eq!(stats.batches, 4);
        assert_eq!(stats.edges_written, 19);
        assert_eq!(storage.count(NODES_CF).unwrap(), 20);
        assert_eq!(storage.count(EDGES_CF).unwrap(), 19);
    }

    #[test]
    fn test_zero_batch_size() {
        let temp_dir = TempDir::new().unwrap();
        let storage = PersistentStorage::open(temp_dir.path()).unwrap();
        let graph = sample_graph(3);

        let stats = Ingestor::new(&storage, 0)
            .write_graph(&graph, StorageLayout::Document)
            .unwrap();
        assert_eq!(stats.batches, 3);
    }

    #[test]
    fn test_empty_graph() {
        let temp_dir = TempDir::new().unwrap();
        let storage = PersistentStorage::open(temp_dir.path()).unwrap();

        let stats = Ingestor::new(&storage, DEFAULT_BATCH_SIZE)
            .write_graph(&GraphStore::new(), StorageLayout::Graph)
            .unwrap();
        assert_eq!(stats, IngestStats::default());
    }
}
