use std::path::PathBuf;

use tracing::{debug, info, info_span};

use crate::categorical::summarize_by;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, RowError, Stage};
use crate::export::{persist_all, stage_graph, stage_summaries};
use crate::graph::ActorGraph;
use crate::loader::read_csv_as_strings;
use crate::model::{ActorEdge, ActorNode, CategorySummary, EventTable, TimeBucket};
use crate::projection::{project, Projection};
use crate::temporal::monthly_fatalities;

/// The three independent derived tables of one projected event table.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub monthly: Vec<TimeBucket>,
    pub categories: Vec<CategorySummary>,
    pub graph: ActorGraph,
}

/// Everything a run produced, including rows it had to exclude.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub input_rows: usize,
    pub events: EventTable,
    pub rejected: Vec<RowError>,
    pub analysis: Analysis,
    pub summary_files: Vec<PathBuf>,
}

/// Load the input file and project it onto the event schema.
pub fn load_events(config: &PipelineConfig) -> Result<(usize, Projection), PipelineError> {
    let raw = read_csv_as_strings(&config.input, Some(&config.rename))
        .map_err(|e| e.in_stage(Stage::Load))?;
    let projection =
        project(&raw, config.date_policy).map_err(|e| e.in_stage(Stage::Project))?;
    Ok((raw.height(), projection))
}

/// Run the temporal, categorical and graph branches over the same snapshot.
pub fn analyze(events: &EventTable, config: &PipelineConfig) -> Analysis {
    Analysis {
        monthly: monthly_fatalities(events),
        categories: summarize_by(events, config.category),
        graph: ActorGraph::extract(events, &config.allow_list),
    }
}

/// Stage every requested table first and persist them only once all of them
/// serialized. Returns the summary file paths.
fn export_outputs(
    config: &PipelineConfig,
    analysis: &Analysis,
    edges: &[ActorEdge],
    nodes: &[ActorNode],
) -> Result<Vec<PathBuf>, PipelineError> {
    let mut staged = stage_graph(edges, nodes, &config.edges_path, &config.nodes_path)?;
    let summary_files: Vec<PathBuf> = match &config.summary_dir {
        Some(dir) => {
            let summaries = stage_summaries(
                &analysis.monthly,
                &analysis.categories,
                config.category.column(),
                dir,
            )?;
            let paths = summaries.iter().map(|f| f.dest().to_path_buf()).collect();
            staged.extend(summaries);
            paths
        }
        None => Vec::new(),
    };
    persist_all(staged)?;
    Ok(summary_files)
}

/// Load → project → aggregate/extract → export.
///
/// Fatal errors come back tagged with their stage and leave no output files.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
    let span = info_span!("pipeline", input = %config.input.display());
    let _enter = span.enter();

    let (input_rows, projection) = load_events(config)?;
    let Projection {
        table: events,
        rejected,
    } = projection;

    let analysis = analyze(&events, config);
    debug!(
        allow_list = ?config.allow_list.iter().collect::<Vec<_>>(),
        "graph allow-list"
    );

    let edges = analysis.graph.edges();
    let nodes = analysis.graph.nodes();
    let summary_files = export_outputs(config, &analysis, &edges, &nodes)
        .map_err(|e| e.in_stage(Stage::Export))?;

    info!(
        input_rows,
        events = events.len(),
        rejected = rejected.len(),
        edges = edges.len(),
        nodes = nodes.len(),
        "pipeline finished"
    );
    Ok(PipelineReport {
        input_rows,
        events,
        rejected,
        analysis,
        summary_files,
    })
}
