//! Result rendering for table, JSON and CSV output

use comfy_table::{ContentArrangement, Table};
use serde::Serialize;
use std::io::Write;

pub const NOT_FOUND: &str = "Disease node not found";

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Rows of already-formatted cells
#[derive(Debug, Default)]
pub struct ResultSet {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl ResultSet {
    pub fn new(columns: Vec<&'static str>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

/// Join list values into one cell
pub fn join_cell<S: AsRef<str>>(values: &[S]) -> String {
    values.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("; ")
}

/// Print `value` as JSON, or `rows` as a table or CSV
pub fn emit<T: Serialize>(
    out: &mut impl Write,
    format: OutputFormat,
    value: &T,
    rows: &ResultSet,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_csv(out, rows)?,
        OutputFormat::Table => write_table(out, rows)?,
    }
    Ok(())
}

/// Report an unknown disease id; JSON output stays machine readable
pub fn write_not_found(out: &mut impl Write, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &serde_json::json!({ "error": NOT_FOUND }))?;
            writeln!(out)?;
        }
        OutputFormat::Table | OutputFormat::Csv => writeln!(out, "{}", NOT_FOUND)?,
    }
    Ok(())
}

pub fn write_table(out: &mut impl Write, rows: &ResultSet) -> anyhow::Result<()> {
    if rows.rows.is_empty() {
        writeln!(out, "(no results)")?;
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(&rows.columns);
    for row in &rows.rows {
        table.add_row(row);
    }

    writeln!(out, "{}", table)?;
    writeln!(out, "{} row(s)", rows.rows.len())?;
    Ok(())
}

pub fn write_csv(out: &mut impl Write, rows: &ResultSet) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&rows.columns)?;
    for row in &rows.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
