use std::path::{Path, PathBuf};

use polars::prelude::*;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::loader::{read_csv_as_strings, require_columns};
use crate::model::{
    buckets_to_frame, edges_to_frame, nodes_to_frame, summaries_to_frame, ActorEdge, ActorNode,
    CategorySummary, TimeBucket,
};
use crate::schema::{edge, node};

pub const MONTHLY_FILE: &str = "monthly_fatalities.csv";
pub const CATEGORY_FILE_SUFFIX: &str = "_summary.csv";

/// A fully serialized table waiting to be moved into place.
pub struct StagedFile {
    temp: NamedTempFile,
    dest: PathBuf,
}

impl StagedFile {
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    fn persist(self) -> Result<PathBuf, PipelineError> {
        self.temp.persist(&self.dest).map_err(|e| e.error)?;
        info!(path = %self.dest.display(), "wrote table");
        Ok(self.dest)
    }
}

/// Move every staged table into place.
///
/// If any rename fails, the tables already moved by this call are removed
/// again, so the caller never sees a partial set of outputs.
pub fn persist_all(staged: Vec<StagedFile>) -> Result<Vec<PathBuf>, PipelineError> {
    let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for file in staged {
        match file.persist() {
            Ok(path) => written.push(path),
            Err(e) => {
                for path in &written {
                    if let Err(cleanup) = std::fs::remove_file(path) {
                        warn!(path = %path.display(), error = %cleanup, "could not roll back output");
                    }
                }
                return Err(e);
            }
        }
    }
    Ok(written)
}

/// Reject values no CSV consumer can read back intact.
fn check_encodable(df: &DataFrame, table: &'static str) -> Result<(), PipelineError> {
    for column in df.get_columns() {
        let Ok(values) = column.str() else {
            continue;
        };
        if let Some(bad) = values.into_iter().flatten().find(|v| v.contains('\0')) {
            return Err(PipelineError::Serialization {
                table,
                reason: format!(
                    "value {bad:?} in column '{}' contains a NUL byte",
                    column.name()
                ),
            });
        }
    }
    Ok(())
}

/// Serialize `df` into a temporary file next to `dest`.
///
/// Fields containing the delimiter, quote character or a newline are quoted.
/// Nothing is visible at `dest` until the returned file is persisted; dropping
/// it removes the temporary file.
fn stage_csv(
    df: &mut DataFrame,
    dest: &Path,
    table: &'static str,
) -> Result<StagedFile, PipelineError> {
    check_encodable(df, table)?;

    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".acled-network-")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    CsvWriter::new(temp.as_file_mut())
        .include_header(true)
        .finish(df)
        .map_err(|e| PipelineError::Serialization {
            table,
            reason: e.to_string(),
        })?;
    temp.as_file_mut().sync_all()?;

    debug!(table, rows = df.height(), temp = %temp.path().display(), "staged table");
    Ok(StagedFile {
        temp,
        dest: dest.to_path_buf(),
    })
}

/// Serialize the edge and node tables without touching their destinations.
pub fn stage_graph(
    edges: &[ActorEdge],
    nodes: &[ActorNode],
    edges_path: &Path,
    nodes_path: &Path,
) -> Result<Vec<StagedFile>, PipelineError> {
    let mut edge_df = edges_to_frame(edges)?;
    let mut node_df = nodes_to_frame(nodes)?;

    Ok(vec![
        stage_csv(&mut edge_df, edges_path, "edges")?,
        stage_csv(&mut node_df, nodes_path, "nodes")?,
    ])
}

/// Write the edge and node tables. Both are serialized before either file is
/// moved into place, so a failure leaves no output behind.
pub fn export_graph(
    edges: &[ActorEdge],
    nodes: &[ActorNode],
    edges_path: &Path,
    nodes_path: &Path,
) -> Result<(), PipelineError> {
    persist_all(stage_graph(edges, nodes, edges_path, nodes_path)?)?;

    info!(
        edges = edges.len(),
        nodes = nodes.len(),
        "exported actor graph"
    );
    Ok(())
}

/// Serialize the chart-ready summary tables for `dir`:
/// `monthly_fatalities.csv` and `<category>_summary.csv`.
pub fn stage_summaries(
    monthly: &[TimeBucket],
    categories: &[CategorySummary],
    category_column: &str,
    dir: &Path,
) -> Result<Vec<StagedFile>, PipelineError> {
    std::fs::create_dir_all(dir)?;

    let monthly_path = dir.join(MONTHLY_FILE);
    let category_path = dir.join(format!("{category_column}{CATEGORY_FILE_SUFFIX}"));

    let mut monthly_df = buckets_to_frame(monthly)?;
    let mut category_df = summaries_to_frame(categories, category_column)?;

    Ok(vec![
        stage_csv(&mut monthly_df, &monthly_path, "monthly")?,
        stage_csv(&mut category_df, &category_path, "category summary")?,
    ])
}

/// Write the summary tables into `dir`, returning their paths.
pub fn export_summaries(
    monthly: &[TimeBucket],
    categories: &[CategorySummary],
    category_column: &str,
    dir: &Path,
) -> Result<Vec<PathBuf>, PipelineError> {
    persist_all(stage_summaries(monthly, categories, category_column, dir)?)
}

// ── Read-back ───────────────────────────────────────────────────────────────

fn parse_count(values: &StringChunked, row: usize, column: &str) -> Result<u64, PipelineError> {
    let raw = values.get(row).unwrap_or("");
    raw.trim().parse::<u64>().map_err(|_| {
        PipelineError::InvalidData(format!(
            "Column '{column}' row {row}: expected a non-negative integer, found '{raw}'"
        ))
    })
}

/// Parse an exported edge file back into edges, in file order.
pub fn read_edges(path: &Path) -> Result<Vec<ActorEdge>, PipelineError> {
    let df = read_csv_as_strings(path, None)?;
    require_columns(&df, &edge::HEADER)?;

    let sources = df.column(edge::SOURCE)?.str()?;
    let targets = df.column(edge::TARGET)?.str()?;
    let weights = df.column(edge::WEIGHT)?.str()?;
    let totals = df.column(edge::TOTAL_FATALITIES)?.str()?;

    let edges = (0..df.height())
        .map(|i| {
            Ok(ActorEdge {
                source: sources.get(i).unwrap_or("").to_string(),
                target: targets.get(i).unwrap_or("").to_string(),
                weight: parse_count(weights, i, edge::WEIGHT)?,
                total_fatalities: parse_count(totals, i, edge::TOTAL_FATALITIES)?,
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;
    Ok(edges)
}

/// Parse an exported node file back into nodes, in file order.
pub fn read_nodes(path: &Path) -> Result<Vec<ActorNode>, PipelineError> {
    let df = read_csv_as_strings(path, None)?;
    require_columns(&df, &node::HEADER)?;

    let ids = df.column(node::ID)?.str()?;
    let labels = df.column(node::LABEL)?.str()?;

    let nodes = (0..df.height())
        .map(|i| ActorNode {
            id: ids.get(i).unwrap_or("").to_string(),
            label: labels.get(i).unwrap_or("").to_string(),
        })
        .collect();
    Ok(nodes)
}
