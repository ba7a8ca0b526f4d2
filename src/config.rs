use std::collections::HashMap;
use std::path::PathBuf;

use crate::categorical::CategoryField;
use crate::graph::AllowList;
use crate::projection::DatePolicy;

pub const DEFAULT_EDGES_FILE: &str = "edges.csv";
pub const DEFAULT_NODES_FILE: &str = "nodes.csv";

/// Parameters for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Delimited event file with a header row.
    pub input: PathBuf,
    /// Destination of the edge table (`Source,Target,Weight,total_fatalities`).
    pub edges_path: PathBuf,
    /// Destination of the node table (`Id,Label`).
    pub nodes_path: PathBuf,
    /// When set, the monthly and categorical summaries are written here too.
    pub summary_dir: Option<PathBuf>,
    /// Event types eligible for graph extraction.
    pub allow_list: AllowList,
    pub date_policy: DatePolicy,
    /// Field for the categorical summary.
    pub category: CategoryField,
    /// Input column renames applied on load (old name -> new name).
    pub rename: HashMap<String, String>,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn with_outputs(mut self, edges: impl Into<PathBuf>, nodes: impl Into<PathBuf>) -> Self {
        self.edges_path = edges.into();
        self.nodes_path = nodes.into();
        self
    }

    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    pub fn with_date_policy(mut self, date_policy: DatePolicy) -> Self {
        self.date_policy = date_policy;
        self
    }

    pub fn with_summary_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.summary_dir = Some(dir.into());
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            edges_path: PathBuf::from(DEFAULT_EDGES_FILE),
            nodes_path: PathBuf::from(DEFAULT_NODES_FILE),
            summary_dir: None,
            allow_list: AllowList::default(),
            date_policy: DatePolicy::default(),
            category: CategoryField::default(),
            rename: HashMap::new(),
        }
    }
}

/// Parse a `old=new` column rename.
pub fn parse_rename(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((old, new)) if !old.trim().is_empty() && !new.trim().is_empty() => {
            Ok((old.trim().to_string(), new.trim().to_string()))
        }
        _ => Err(format!("Invalid rename '{arg}'. Expected OLD=NEW")),
    }
}
