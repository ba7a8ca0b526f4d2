use std::collections::HashMap;
use std::path::Path;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyo3::PyErr;
use pyo3_polars::PyDataFrame;

use crate::categorical::{summarize_by, CategoryField};
use crate::error::{PipelineError, RowError};
use crate::export;
use crate::graph::{ActorGraph, AllowList};
use crate::loader::read_csv_as_strings;
use crate::model::{buckets_to_frame, edges_to_frame, nodes_to_frame, summaries_to_frame, EventTable};
use crate::projection::{project, DatePolicy};
use crate::schema;
use crate::temporal::monthly_fatalities;

impl From<PipelineError> for PyErr {
    fn from(err: PipelineError) -> PyErr {
        PyRuntimeError::new_err(err.to_string())
    }
}

#[pyclass]
pub struct EventPipeline {
    allow_list: AllowList,
    date_policy: DatePolicy,
    events: Option<EventTable>,
    rejected: Vec<RowError>,
}

#[pymethods]
impl EventPipeline {
    #[new]
    #[pyo3(signature = (allow_event_types=None, strict_dates=false))]
    fn new(allow_event_types: Option<Vec<String>>, strict_dates: bool) -> Self {
        Self {
            allow_list: allow_event_types.map(AllowList::new).unwrap_or_default(),
            date_policy: if strict_dates {
                DatePolicy::Abort
            } else {
                DatePolicy::Skip
            },
            events: None,
            rejected: Vec::new(),
        }
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load and project an event CSV. Returns the number of projected events.
    ///
    /// Rows with malformed dates or fatalities are excluded and listed by
    /// `rejected_rows()`, unless the pipeline was built with `strict_dates=True`.
    #[pyo3(signature = (path, rename=None))]
    fn load(&mut self, path: &str, rename: Option<HashMap<String, String>>) -> PyResult<usize> {
        let raw = read_csv_as_strings(Path::new(path), rename.as_ref())?;
        let projection = project(&raw, self.date_policy)?;
        let count = projection.table.len();
        self.events = Some(projection.table);
        self.rejected = projection.rejected;
        Ok(count)
    }

    /// `(row, event_id, message)` for every row excluded during projection.
    fn rejected_rows(&self) -> Vec<(usize, Option<String>, String)> {
        self.rejected
            .iter()
            .map(|r| (r.row, r.event_id.clone(), r.to_string()))
            .collect()
    }

    // ── Summaries for charting ──────────────────────────────────────────────

    fn monthly_fatalities(&self) -> PyResult<PyDataFrame> {
        let df = buckets_to_frame(&monthly_fatalities(self.events()?))?;
        Ok(PyDataFrame(df))
    }

    #[pyo3(signature = (field="event_type"))]
    fn category_summary(&self, field: &str) -> PyResult<PyDataFrame> {
        let field: CategoryField = field.parse().map_err(PyValueError::new_err)?;
        let rows = summarize_by(self.events()?, field);
        Ok(PyDataFrame(summaries_to_frame(&rows, field.column())?))
    }

    // ── Actor graph ─────────────────────────────────────────────────────────

    fn actor_edges(&self) -> PyResult<PyDataFrame> {
        let graph = self.graph()?;
        Ok(PyDataFrame(edges_to_frame(&graph.edges())?))
    }

    fn actor_nodes(&self) -> PyResult<PyDataFrame> {
        let graph = self.graph()?;
        Ok(PyDataFrame(nodes_to_frame(&graph.nodes())?))
    }

    #[pyo3(signature = (edges_path="edges.csv", nodes_path="nodes.csv"))]
    fn export_graph(&self, edges_path: &str, nodes_path: &str) -> PyResult<()> {
        let graph = self.graph()?;
        export::export_graph(
            &graph.edges(),
            &graph.nodes(),
            Path::new(edges_path),
            Path::new(nodes_path),
        )?;
        Ok(())
    }
}

impl EventPipeline {
    fn events(&self) -> PyResult<&EventTable> {
        self.events
            .as_ref()
            .ok_or_else(|| PyRuntimeError::new_err("Data not loaded: call load() first"))
    }

    fn graph(&self) -> PyResult<ActorGraph> {
        Ok(ActorGraph::extract(self.events()?, &self.allow_list))
    }
}

/// Export schema constants as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let event = PyModule::new(m.py(), "event")?;
    for name in schema::event::REQUIRED {
        event.add(name.to_uppercase(), name)?;
    }
    m.add_submodule(&event)?;

    let edge = PyModule::new(m.py(), "edge")?;
    edge.add("SOURCE", schema::edge::SOURCE)?;
    edge.add("TARGET", schema::edge::TARGET)?;
    edge.add("WEIGHT", schema::edge::WEIGHT)?;
    edge.add("TOTAL_FATALITIES", schema::edge::TOTAL_FATALITIES)?;
    m.add_submodule(&edge)?;

    let node = PyModule::new(m.py(), "node")?;
    node.add("ID", schema::node::ID)?;
    node.add("LABEL", schema::node::LABEL)?;
    m.add_submodule(&node)?;

    let bucket = PyModule::new(m.py(), "bucket")?;
    bucket.add("PERIOD_START", schema::bucket::PERIOD_START)?;
    bucket.add("TOTAL_FATALITIES", schema::bucket::TOTAL_FATALITIES)?;
    bucket.add("EVENT_COUNT", schema::bucket::EVENT_COUNT)?;
    m.add_submodule(&bucket)?;

    Ok(())
}

#[pymodule]
#[pyo3(name = "_core")]
fn core_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<EventPipeline>()?;
    add_schema_exports(m)?;
    Ok(())
}
