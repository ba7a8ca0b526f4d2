use std::collections::HashMap;
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use crate::error::PipelineError;

/// Read a CSV file with all columns as String dtype.
/// Trims whitespace from column names and applies an optional rename map
/// (old name -> new name), e.g. to adapt older ACLED exports.
pub fn read_csv_as_strings(
    path: &Path,
    rename: Option<&HashMap<String, String>>,
) -> Result<DataFrame, PipelineError> {
    if !path.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input file not found: {}", path.display()),
        )
        .into());
    }

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    if let Some(map) = rename.filter(|m| !m.is_empty()) {
        let old: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
        let new: Vec<&str> = map.values().map(|s| s.as_str()).collect();
        debug!(?map, "renaming input columns");
        // non-strict: a rename for a column this file lacks is not an error
        df = df.lazy().rename(old, new, false).collect()?;
    }

    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded csv table"
    );
    Ok(df)
}

/// Names of `required` columns absent from `df`, in `required` order.
pub fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| df.column(name).is_err())
        .map(|name| name.to_string())
        .collect()
}

pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), PipelineError> {
    let missing = missing_columns(df, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::Schema { missing })
    }
}
