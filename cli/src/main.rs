//! biokg CLI - load and query the biomedical knowledge graph
//!
//! Every command opens the local store, does its work and closes it again.

mod output;

use anyhow::Context;
use biokg::{Config, GraphStore, Loader, PersistenceManager, QueryEngine, StorageLayout};
use clap::{Parser, Subcommand};
use output::{emit, join_cell, write_not_found, OutputFormat, ResultSet};
use serde_json::json;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "biokg", version, about = "Biomedical knowledge graph CLI")]
struct Cli {
    /// Store directory (overrides the config file)
    #[arg(long, global = true, env = "BIOKG_DATA")]
    data_dir: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long, global = true, env = "BIOKG_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load nodes.tsv / edges.tsv into the store, replacing its contents
    Load {
        /// Node table (id, name, kind)
        #[arg(long)]
        nodes: Option<PathBuf>,

        /// Edge table (source, metaedge, target)
        #[arg(long)]
        edges: Option<PathBuf>,

        /// Storage layout: document or graph
        #[arg(long)]
        layout: Option<StorageLayout>,

        /// Records per write batch
        #[arg(long)]
        batch_size: Option<usize>,

        /// Overwrite a graph that is already loaded
        #[arg(long)]
        replace: bool,
    },
    /// Show compounds, genes and anatomy linked to a disease
    Profile {
        /// Disease node id, e.g. Disease::DOID:1324
        disease: String,
    },
    /// List compounds that could be repurposed
    Repurpose {
        /// Only candidates for this disease
        #[arg(long)]
        disease: Option<String>,
    },
    /// Show load manifest and graph statistics
    Stats,
    /// Start an interactive shell over the loaded graph
    Shell,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    let format = cli.format;

    match cli.command {
        Commands::Load {
            nodes,
            edges,
            layout,
            batch_size,
            replace,
        } => {
            if let Some(layout) = layout {
                config.layout = layout;
            }
            if let Some(batch_size) = batch_size {
                config.batch_size = batch_size;
            }
            config.validate()?;
            let nodes = nodes
                .or_else(|| config.nodes_path.clone())
                .context("no nodes file given (use --nodes or nodes_path in the config)")?;
            let edges = edges
                .or_else(|| config.edges_path.clone())
                .context("no edges file given (use --edges or edges_path in the config)")?;
            run_load(&config, &nodes, &edges, replace, format)
        }
        Commands::Profile { disease } => {
            let graph = recover(&config)?;
            run_profile(&graph, &disease, format)
        }
        Commands::Repurpose { disease } => {
            let graph = recover(&config)?;
            run_repurpose(&graph, disease.as_deref(), format)
        }
        Commands::Stats => run_stats(&config, format),
        Commands::Shell => {
            let graph = recover(&config)?;
            run_shell(&graph, format)
        }
    }
}

fn recover(config: &Config) -> anyhow::Result<GraphStore> {
    let manager = PersistenceManager::open(&config.data_dir)
        .with_context(|| format!("failed to open store at {:?}", config.data_dir))?;
    Ok(manager.recover()?)
}

fn run_load(
    config: &Config,
    nodes: &Path,
    edges: &Path,
    replace: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut manager = PersistenceManager::open(&config.data_dir)
        .with_context(|| format!("failed to open store at {:?}", config.data_dir))?;

    manager.check_replace(replace)?;

    let loaded = Loader::load_files(nodes, edges)?;
    let manifest = manager.ingest(&loaded.store, &loaded.report, config.ingest_options())?;
    info!("Loaded graph into {:?}", config.data_dir);

    let report = &manifest.report;
    let mut rows = ResultSet::new(vec!["metric", "value"]);
    for (metric, value) in [
        ("nodes", report.nodes_loaded.to_string()),
        ("edges", report.edges_loaded.to_string()),
        ("skipped metaedge", report.skipped_metaedge.to_string()),
        ("missing source", report.missing_source.to_string()),
        ("missing target", report.missing_target.to_string()),
        ("layout", manifest.layout.to_string()),
        ("batches", manifest.batches.to_string()),
    ] {
        rows.push(vec![metric.to_string(), value]);
    }
    emit(&mut std::io::stdout(), format, &manifest, &rows)
}

fn run_profile(graph: &GraphStore, disease: &str, format: OutputFormat) -> anyhow::Result<()> {
    let Some(profile) = QueryEngine::new(graph).disease_profile(disease) else {
        return write_not_found(&mut std::io::stdout(), format);
    };

    let mut rows = ResultSet::new(vec!["id", "name", "compounds", "genes", "anatomy"]);
    rows.push(vec![
        profile.id.clone(),
        profile.name.clone(),
        join_cell(&profile.compounds),
        join_cell(&profile.genes),
        join_cell(&profile.anatomy),
    ]);
    emit(&mut std::io::stdout(), format, &profile, &rows)
}

fn run_repurpose(graph: &GraphStore, disease: Option<&str>, format: OutputFormat) -> anyhow::Result<()> {
    let engine = QueryEngine::new(graph);
    let mut out = std::io::stdout();

    match disease {
        Some(disease) => {
            let Some(compounds) = engine.candidates_for_disease(disease) else {
                return write_not_found(&mut out, format);
            };
            let mut rows = ResultSet::new(vec!["id", "name"]);
            for compound in &compounds {
                rows.push(vec![compound.id.clone(), compound.name.clone()]);
            }
            emit(&mut out, format, &compounds, &rows)
        }
        None => {
            let candidates = engine.candidate_repurposing();
            let mut rows = ResultSet::new(vec!["id", "name", "diseases"]);
            for candidate in &candidates {
                let diseases: Vec<&str> = candidate.diseases.iter().map(|d| d.name.as_str()).collect();
                rows.push(vec![candidate.id.clone(), candidate.name.clone(), join_cell(&diseases)]);
            }
            emit(&mut out, format, &candidates, &rows)
        }
    }
}

fn run_stats(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let manager = PersistenceManager::open(&config.data_dir)
        .with_context(|| format!("failed to open store at {:?}", config.data_dir))?;
    let manifest = manager.manifest()?;
    let statistics = match &manifest {
        Some(m) if m.is_complete() => Some(manager.recover()?.statistics()),
        _ => None,
    };

    let mut rows = ResultSet::new(vec!["metric", "value"]);
    let state = match &manifest {
        None => "empty".to_string(),
        Some(m) => format!("{:?}", m.state).to_lowercase(),
    };
    rows.push(vec!["state".to_string(), state]);
    if let Some(m) = &manifest {
        rows.push(vec!["layout".to_string(), m.layout.to_string()]);
        if let Some(completed) = m.completed_at.and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis) {
            rows.push(vec!["loaded at".to_string(), completed.to_rfc3339()]);
        }
    }
    if let Some(stats) = &statistics {
        rows.push(vec!["nodes".to_string(), stats.node_count.to_string()]);
        rows.push(vec!["edges".to_string(), stats.edge_count.to_string()]);
        for (kind, count) in &stats.nodes_by_kind {
            rows.push(vec![format!("nodes: {}", kind), count.to_string()]);
        }
        for (relation, count) in &stats.edges_by_relation {
            rows.push(vec![format!("edges: {}", relation), count.to_string()]);
        }
    }

    let value = json!({ "manifest": manifest, "statistics": statistics });
    emit(&mut std::io::stdout(), format, &value, &rows)
}

fn run_shell(graph: &GraphStore, format: OutputFormat) -> anyhow::Result<()> {
    println!("biokg interactive shell");
    println!("Type :help for commands. :quit to exit.\n");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock();
    let mut line = String::new();

    loop {
        eprint!("biokg> ");
        std::io::stderr().flush()?;

        line.clear();
        if lines.read_line(&mut line)? == 0 {
            break; // EOF
        }

        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let argument = words.next();

        let result = match (command, argument) {
            (":quit" | ":exit" | ":q", _) => break,
            (":help" | ":h", _) => {
                println!("Commands:");
                println!("  profile <disease-id>     Disease profile");
                println!("  repurpose [disease-id]   Repurposing candidates");
                println!("  :stats                   Graph statistics");
                println!("  :quit                    Exit shell");
                Ok(())
            }
            (":stats", _) => {
                let stats = graph.statistics();
                println!("Nodes: {}", stats.node_count);
                println!("Edges: {}", stats.edge_count);
                Ok(())
            }
            ("profile", Some(disease)) => run_profile(graph, disease, format),
            ("profile", None) => {
                eprintln!("usage: profile <disease-id>");
                Ok(())
            }
            ("repurpose", disease) => run_repurpose(graph, disease, format),
            (other, _) => {
                eprintln!("Unknown command '{}', try :help", other);
                Ok(())
            }
        };

        if let Err(e) = result {
            eprintln!("Error: {:#}", e);
        }
    }

    println!("Bye!");
    Ok(())
}
