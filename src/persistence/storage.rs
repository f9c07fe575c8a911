//! RocksDB storage layer implementation
//!
//! Column families:
//! - `nodes`: node records, or node documents with embedded adjacency
//! - `edges`: relationship records (graph layout only)
//! - `meta`: the load manifest

use super::manifest::LoadManifest;
use crate::graph::{Edge, EdgeId, Node, NodeId, NodeKind, Relation};
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub(crate) const NODES_CF: &str = "nodes";
pub(crate) const EDGES_CF: &str = "edges";
pub(crate) const META_CF: &str = "meta";

const DATA_CFS: [&str; 3] = [NODES_CF, EDGES_CF, META_CF];
const MANIFEST_KEY: &[u8] = b"manifest";

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// RocksDB error
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Column family error
    #[error("Column family error: {0}")]
    ColumnFamily(String),

    /// Record that decodes but does not make sense
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Serialized node for the graph layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredNode {
    pub id: u64,
    pub external_id: String,
    pub name: String,
    pub kind: String,
}

/// One embedded outgoing edge of a node document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredConnection {
    pub edge_id: u64,
    pub target: u64,
    pub relation: String,
    pub metaedge: String,
}

/// Serialized node for the document layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredDocument {
    pub node: StoredNode,
    pub connections: Vec<StoredConnection>,
}

/// Serialized edge for the graph layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredEdge {
    pub id: u64,
    pub source: u64,
    pub target: u64,
    pub relation: String,
    pub metaedge: String,
}

impl StoredNode {
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id.as_u64(),
            external_id: node.external_id.clone(),
            name: node.name.clone(),
            kind: node.kind.as_str().to_string(),
        }
    }

    pub fn into_node(self) -> Node {
        Node::new(
            NodeId::new(self.id),
            self.external_id,
            self.name,
            NodeKind::parse(&self.kind),
        )
    }
}

impl StoredConnection {
    pub fn from_edge(edge: &Edge) -> Self {
        Self {
            edge_id: edge.id.as_u64(),
            target: edge.target.as_u64(),
            relation: edge.relation.as_str().to_string(),
            metaedge: edge.metaedge.clone(),
        }
    }

    pub fn into_edge(self, source: u64) -> StorageResult<Edge> {
        Ok(Edge::new(
            EdgeId::new(self.edge_id),
            NodeId::new(source),
            NodeId::new(self.target),
            parse_relation(&self.relation)?,
            self.metaedge,
        ))
    }
}

impl StoredEdge {
    pub fn from_edge(edge: &Edge) -> Self {
        Self {
            id: edge.id.as_u64(),
            source: edge.source.as_u64(),
            target: edge.target.as_u64(),
            relation: edge.relation.as_str().to_string(),
            metaedge: edge.metaedge.clone(),
        }
    }

    pub fn into_edge(self) -> StorageResult<Edge> {
        Ok(Edge::new(
            EdgeId::new(self.id),
            NodeId::new(self.source),
            NodeId::new(self.target),
            parse_relation(&self.relation)?,
            self.metaedge,
        ))
    }
}

fn parse_relation(label: &str) -> StorageResult<Relation> {
    Relation::from_label(label)
        .ok_or_else(|| StorageError::Corrupt(format!("unknown relation '{}'", label)))
}

/// RocksDB-based persistent storage
pub struct PersistentStorage {
    db: DB,
}

impl PersistentStorage {
    /// Open or create a new persistent storage
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        info!("Opening persistent storage at: {:?}", path);

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        // Bulk-load friendly write buffers
        opts.set_write_buffer_size(64 * 1024 * 1024);
        opts.set_max_write_buffer_number(3);
        opts.set_min_write_buffer_number_to_merge(1);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_wal_recovery_mode(rocksdb::DBRecoveryMode::PointInTime);

        let mut cf_descriptors = vec![ColumnFamilyDescriptor::new("default", Options::default())];
        cf_descriptors.extend(
            DATA_CFS
                .iter()
                .map(|name| ColumnFamilyDescriptor::new(*name, Self::cf_options())),
        );

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;
        info!("Persistent storage opened successfully");

        Ok(Self { db })
    }

    fn cf_options() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf(&self, name: &str) -> StorageResult<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::ColumnFamily(name.to_string()))
    }

    /// Destroy every persisted record by dropping and recreating the column families
    pub fn reset(&mut self) -> StorageResult<()> {
        for name in DATA_CFS {
            if self.db.cf_handle(name).is_some() {
                self.db.drop_cf(name)?;
            }
            self.db.create_cf(name, &Self::cf_options())?;
        }
        info!("Dropped all persisted graph data");
        Ok(())
    }

    /// Atomically write a group of already-encoded records into one column family
    pub fn write_records(&self, cf_name: &str, records: &[(Vec<u8>, Vec<u8>)]) -> StorageResult<()> {
        let cf = self.cf(cf_name)?;
        let mut batch = WriteBatch::default();
        for (key, value) in records {
            batch.put_cf(cf, key, value);
        }
        self.db.write(batch)?;
        debug!("Wrote batch of {} records to {}", records.len(), cf_name);
        Ok(())
    }

    /// Decode every record of a column family, in key order
    pub(crate) fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> StorageResult<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(bincode::deserialize(&value)?);
        }
        Ok(records)
    }

    /// Number of records in a column family
    pub fn count(&self, cf_name: &str) -> StorageResult<usize> {
        let cf = self.cf(cf_name)?;
        let mut count = 0;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    pub fn put_manifest(&self, manifest: &LoadManifest) -> StorageResult<()> {
        let cf = self.cf(META_CF)?;
        self.db.put_cf(cf, MANIFEST_KEY, bincode::serialize(manifest)?)?;
        Ok(())
    }

    pub fn get_manifest(&self) -> StorageResult<Option<LoadManifest>> {
        let cf = self.cf(META_CF)?;
        match self.db.get_cf(cf, MANIFEST_KEY)? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// Flush all data to disk
    pub fn flush(&self) -> StorageResult<()> {
        for name in DATA_CFS {
            self.db.flush_cf(self.cf(name)?)?;
        }
        debug!("Flushed storage to disk");
        Ok(())
    }

    /// Key for a node record
    pub(crate) fn node_key(node_id: u64) -> Vec<u8> {
        format!("n:{:016x}", node_id).into_bytes()
    }

    /// Key for an edge record
    pub(crate) fn edge_key(edge_id: u64) -> Vec<u8> {
        format!("e:{:016x}", edge_id).into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadReport;
    use crate::persistence::manifest::StorageLayout;
    use tempfile::TempDir;

    fn encoded_node(id: u64, kind: &str) -> (Vec<u8>, Vec<u8>) {
        let node = StoredNode {
            id,
            external_id: format!("{}::{}", kind, id),
            name: format!("node {}", id),
            kind: kind.to_string(),
        };
        (PersistentStorage::node_key(id), bincode::serialize(&node).unwrap())
    }

    #[test]
    fn test_storage_open() {
        let temp_dir = TempDir::new().unwrap();
        let storage = PersistentStorage::open(temp_dir.path()).unwrap();
        assert!(storage.get_manifest().unwrap().is_none());
    }

    #[test]
    fn test_write_and_scan_in_key_order() {
        let temp_dir = TempDir::new().unwrap();
        let storage = PersistentStorage::open(temp_dir.path()).unwrap();

        // 0x10 sorts after 0x2 only with zero-padded keys
        let records = vec![encoded_node(16, "Gene"), encoded_node(2, "Disease")];
        storage.write_records(NODES_CF, &records).unwrap();

        let nodes: Vec<StoredNode> = storage.scan(NODES_CF).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, 2);
        assert_eq!(nodes[1].id, 16);
        assert_eq!(storage.count(NODES_CF).unwrap(), 2);
    }

    #[test]
    fn test_reset_drops_everything() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = PersistentStorage::open(temp_dir.path()).unwrap();

        storage.write_records(NODES_CF, &[encoded_node(1, "Gene")]).unwrap();
        storage
            .put_manifest(&LoadManifest::begin(StorageLayout::Document, 10, LoadReport::default()))
            .unwrap();

        storage.reset().unwrap();
        assert_eq!(storage.count(NODES_CF).unwrap(), 0);
        assert!(storage.get_manifest().unwrap().is_none());

        // Still writable after reset
        storage.write_records(NODES_CF, &[encoded_node(1, "Gene")]).unwrap();
        assert_eq!(storage.count(NODES_CF).unwrap(), 1);
    }

    #[test]
    fn test_manifest_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let storage = PersistentStorage::open(temp_dir.path()).unwrap();
            let mut manifest = LoadManifest::begin(StorageLayout::Graph, 100, LoadReport::default());
            manifest.complete(3, 4, 1);
            storage.put_manifest(&manifest).unwrap();
            storage.flush().unwrap();
        }

        let storage = PersistentStorage::open(temp_dir.path()).unwrap();
        let manifest = storage.get_manifest().unwrap().unwrap();
        assert!(manifest.is_complete());
        assert_eq!(manifest.layout, StorageLayout::Graph);
        assert_eq!(manifest.edge_count, 4);
    }

    #[test]
    fn test_stored_edge_with_unknown_relation() {
        let stored = StoredEdge {
            id: 1,
            source: 1,
            target: 2,
            relation: "likes".to_string(),
            metaedge: "XlY".to_string(),
        };
        assert!(matches!(stored.into_edge(), Err(StorageError::Corrupt(_))));
    }
}
