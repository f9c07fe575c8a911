//! TSV loader for nodes.tsv / edges.tsv
//!
//! Builds a [`GraphStore`] from the two tab-separated inputs:
//! - every node row is loaded, whatever its kind
//! - edge rows with a metaedge outside the whitelist are discarded
//! - edge rows whose source or target is not a known node are dropped
//!
//! Dropped rows are counted in the [`LoadReport`], never raised as errors.

pub mod tsv;

use crate::graph::{metaedge, GraphError, GraphStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, trace, warn};
use tsv::{line_of, locate_columns, required_field, tsv_reader, DigestReader};

/// Loader errors
#[derive(Error, Debug)]
pub enum LoadError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying TSV decoding error
    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Required header absent
    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: &'static str },

    /// Row with an empty or absent required field
    #[error("{file} line {line}: {reason}")]
    MalformedRow {
        file: String,
        line: u64,
        reason: String,
    },

    /// Node identifier seen twice
    #[error("{file} line {line}: duplicate node identifier '{id}'")]
    DuplicateNode { file: String, line: u64, id: String },
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Counters collected during a load run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub nodes_loaded: usize,
    pub edges_loaded: usize,
    /// Edge rows whose metaedge is not whitelisted
    pub skipped_metaedge: usize,
    /// Edge rows whose source id is unknown
    pub missing_source: usize,
    /// Edge rows whose target id is unknown
    pub missing_target: usize,
    /// Discarded metaedge codes and how often each was seen
    pub skipped_codes: BTreeMap<String, usize>,
    /// Hex SHA-256 of the nodes input
    pub nodes_sha256: String,
    /// Hex SHA-256 of the edges input
    pub edges_sha256: String,
}

impl LoadReport {
    /// Total edge rows that did not make it into the graph
    pub fn edges_dropped(&self) -> usize {
        self.skipped_metaedge + self.missing_source + self.missing_target
    }
}

/// A populated graph and the report of how it was built
#[derive(Debug)]
pub struct LoadedGraph {
    pub store: GraphStore,
    pub report: LoadReport,
}

/// Parses the node and edge files into a graph
pub struct Loader;

impl Loader {
    /// Load from two files on disk
    pub fn load_files(nodes: impl AsRef<Path>, edges: impl AsRef<Path>) -> LoadResult<LoadedGraph> {
        let nodes = nodes.as_ref();
        let edges = edges.as_ref();
        info!("Loading graph from {:?} and {:?}", nodes, edges);

        let nodes_file = BufReader::new(File::open(nodes)?);
        let edges_file = BufReader::new(File::open(edges)?);

        Self::load(
            nodes_file,
            &nodes.display().to_string(),
            edges_file,
            &edges.display().to_string(),
        )
    }

    /// Load from any pair of readers
    pub fn from_readers<N: Read, E: Read>(nodes: N, edges: E) -> LoadResult<LoadedGraph> {
        Self::load(nodes, "nodes.tsv", edges, "edges.tsv")
    }

    fn load<N: Read, E: Read>(
        nodes: N,
        nodes_name: &str,
        edges: E,
        edges_name: &str,
    ) -> LoadResult<LoadedGraph> {
        let mut store = GraphStore::new();
        let mut report = LoadReport::default();

        report.nodes_sha256 = Self::load_nodes(&mut store, &mut report, nodes, nodes_name)?;
        info!("Loaded {} nodes", report.nodes_loaded);

        report.edges_sha256 = Self::load_edges(&mut store, &mut report, edges, edges_name)?;
        info!(
            "Loaded {} edges ({} dropped)",
            report.edges_loaded,
            report.edges_dropped()
        );

        if report.missing_source + report.missing_target > 0 {
            warn!(
                "Dropped {} edges with unknown source and {} with unknown target",
                report.missing_source, report.missing_target
            );
        }

        Ok(LoadedGraph { store, report })
    }

    fn load_nodes<R: Read>(
        store: &mut GraphStore,
        report: &mut LoadReport,
        reader: R,
        file: &str,
    ) -> LoadResult<String> {
        let mut reader = tsv_reader(DigestReader::new(reader));
        let headers = reader.headers()?.clone();
        let [id_col, name_col, kind_col] = locate_columns(&headers, file, ["id", "name", "kind"])?;

        let mut record = csv::StringRecord::new();
        while reader.read_record(&mut record)? {
            let id = required_field(&record, id_col, "id", file)?;
            let kind = required_field(&record, kind_col, "kind", file)?;
            let name = record.get(name_col).unwrap_or_default();

            match store.create_node(id, name, kind) {
                Ok(_) => report.nodes_loaded += 1,
                Err(GraphError::DuplicateNode(id)) => {
                    return Err(LoadError::DuplicateNode {
                        file: file.to_string(),
                        line: line_of(&record),
                        id,
                    })
                }
                Err(e) => {
                    return Err(LoadError::MalformedRow {
                        file: file.to_string(),
                        line: line_of(&record),
                        reason: e.to_string(),
                    })
                }
            }
        }

        Ok(reader.into_inner().finalize_hex())
    }

    fn load_edges<R: Read>(
        store: &mut GraphStore,
        report: &mut LoadReport,
        reader: R,
        file: &str,
    ) -> LoadResult<String> {
        let mut reader = tsv_reader(DigestReader::new(reader));
        let headers = reader.headers()?.clone();
        let [source_col, metaedge_col, target_col] =
            locate_columns(&headers, file, ["source", "metaedge", "target"])?;

        let mut record = csv::StringRecord::new();
        while reader.read_record(&mut record)? {
            let code = record.get(metaedge_col).unwrap_or_default();
            let Some(relation) = metaedge::relation_for(code) else {
                report.skipped_metaedge += 1;
                *report.skipped_codes.entry(code.to_string()).or_default() += 1;
                continue;
            };

            let source_id = record.get(source_col).unwrap_or_default();
            let Some(source) = store.resolve(source_id) else {
                trace!("line {}: unknown source '{}'", line_of(&record), source_id);
                report.missing_source += 1;
                continue;
            };

            let target_id = record.get(target_col).unwrap_or_default();
            let Some(target) = store.resolve(target_id) else {
                trace!("line {}: unknown target '{}'", line_of(&record), target_id);
                report.missing_target += 1;
                continue;
            };

            store
                .create_edge(source, target, relation, code)
                .map_err(|e| LoadError::MalformedRow {
                    file: file.to_string(),
                    line: line_of(&record),
                    reason: e.to_string(),
                })?;
            report.edges_loaded += 1;
        }

        debug!("Skipped metaedge codes: {:?}", report.skipped_codes);
        Ok(reader.into_inner().finalize_hex())
    }
}
