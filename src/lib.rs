//! Conflict-event pipeline: project an ACLED-style event table, aggregate it
//! over time and category, and export a weighted actor-interaction graph.

pub mod categorical;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod projection;
pub mod schema;
pub mod temporal;

#[cfg(feature = "python")]
mod python;
#[cfg(test)]
mod testing;

pub use categorical::{event_type_summary, summarize_by, CategoryField};
pub use config::PipelineConfig;
pub use error::{PipelineError, RowError, RowErrorKind, Stage};
pub use export::{export_graph, export_summaries, read_edges, read_nodes};
pub use graph::{derive_nodes, ActorGraph, AllowList};
pub use model::{ActorEdge, ActorNode, CategorySummary, Event, EventTable, TimeBucket};
pub use pipeline::{analyze, run, Analysis, PipelineReport};
pub use projection::{parse_event_date, project, DatePolicy, Projection};
pub use temporal::{aggregate_fatalities, monthly_fatalities, yearly_fatalities, Granularity};
