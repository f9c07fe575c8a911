//! Load manifest
//!
//! One record in the `meta` column family describing the last load run.
//! It is written as `Loading` before the first batch and rewritten as
//! `Complete` only after every batch has been flushed, so an interrupted
//! load is never read back as a usable graph.

use crate::loader::LoadReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the graph is laid out in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageLayout {
    /// One record per node, adjacency embedded as a connection list
    #[default]
    Document,
    /// Node records plus one record per typed relationship
    Graph,
}

impl fmt::Display for StorageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageLayout::Document => f.write_str("document"),
            StorageLayout::Graph => f.write_str("graph"),
        }
    }
}

impl FromStr for StorageLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" | "doc" => Ok(StorageLayout::Document),
            "graph" => Ok(StorageLayout::Graph),
            other => Err(format!("unknown storage layout '{}'", other)),
        }
    }
}

/// Progress of the last load run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    Loading,
    Complete,
}

/// Description of the persisted graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadManifest {
    pub state: LoadState,
    pub layout: StorageLayout,
    pub batch_size: usize,
    pub node_count: usize,
    pub edge_count: usize,
    /// Number of write batches committed
    pub batches: usize,
    pub report: LoadReport,
    /// Unix milliseconds
    pub started_at: i64,
    /// Unix milliseconds, set when the load completes
    pub completed_at: Option<i64>,
}

impl LoadManifest {
    pub fn begin(layout: StorageLayout, batch_size: usize, report: LoadReport) -> Self {
        Self {
            state: LoadState::Loading,
            layout,
            batch_size,
            node_count: 0,
            edge_count: 0,
            batches: 0,
            report,
            started_at: chrono::Utc::now().timestamp_millis(),
            completed_at: None,
        }
    }

    pub fn complete(&mut self, node_count: usize, edge_count: usize, batches: usize) {
        self.state = LoadState::Complete;
        self.node_count = node_count;
        self.edge_count = edge_count;
        self.batches = batches;
        self.completed_at = Some(chrono::Utc::now().timestamp_millis());
    }

    pub fn is_complete(&self) -> bool {
        self.state == LoadState::Complete
    }
}
