use std::fmt;

use thiserror::Error;

/// Pipeline stage, used to tag fatal errors for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Project,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Project => "project",
            Stage::Export => "export",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("{} rows rejected during projection: {}", rows.len(), summarize_rows(rows))]
    DateParse { rows: Vec<RowError> },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot serialize {table} table: {reason}")]
    Serialization { table: &'static str, reason: String },

    #[error("InvalidData: {0}")]
    InvalidData(String),

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Tag the error with the stage it escaped from. Already tagged errors keep their stage.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            tagged @ PipelineError::Stage { .. } => tagged,
            other => PipelineError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage the error was raised in, if it was tagged.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Why a single input row was rejected by the projector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowErrorKind {
    Date { value: String },
    Fatalities { value: String },
}

/// A per-row rejection. Collected, never fatal on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// Zero-based data row index in the loaded table.
    pub row: usize,
    pub event_id: Option<String>,
    pub kind: RowErrorKind,
}

impl RowError {
    /// Human-readable row identifier: the event id when present, the row index otherwise.
    pub fn identifier(&self) -> String {
        match &self.event_id {
            Some(id) => format!("{id} (row {})", self.row),
            None => format!("row {}", self.row),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RowErrorKind::Date { value } => {
                write!(f, "{}: unparseable event_date '{value}'", self.identifier())
            }
            RowErrorKind::Fatalities { value } => {
                write!(f, "{}: invalid fatalities '{value}'", self.identifier())
            }
        }
    }
}

const MAX_LISTED_ROWS: usize = 10;

/// Comma-separated identifiers, truncated after the first few.
pub fn summarize_rows(rows: &[RowError]) -> String {
    let mut listed: Vec<String> = rows
        .iter()
        .take(MAX_LISTED_ROWS)
        .map(RowError::identifier)
        .collect();
    if rows.len() > MAX_LISTED_ROWS {
        listed.push(format!("... and {} more", rows.len() - MAX_LISTED_ROWS));
    }
    listed.join(", ")
}
