use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use acled_network::config::{parse_rename, DEFAULT_EDGES_FILE, DEFAULT_NODES_FILE};
use acled_network::{
    run, AllowList, CategoryField, DatePolicy, PipelineConfig, PipelineError, PipelineReport,
};

#[derive(Parser, Debug)]
#[command(name = "acled-network")]
#[command(
    about = "Aggregate conflict events and export an actor-interaction graph (edges + nodes CSV)"
)]
#[command(version)]
struct Args {
    /// Event CSV with a header row
    input: PathBuf,

    #[arg(long, default_value = DEFAULT_EDGES_FILE, help = "Edge table destination")]
    edges: PathBuf,

    #[arg(long, default_value = DEFAULT_NODES_FILE, help = "Node table destination")]
    nodes: PathBuf,

    #[arg(long, help = "Also write the monthly and categorical summaries to this directory")]
    summary_dir: Option<PathBuf>,

    #[arg(
        long = "allow-event-type",
        value_name = "EVENT_TYPE",
        help = "Event type eligible for graph extraction (repeatable; defaults to Battles and Explosions/Remote violence)"
    )]
    allow_event_types: Vec<String>,

    #[arg(long, help = "Fail the run when any row has an unparseable date or fatality count")]
    strict_dates: bool,

    #[arg(long, default_value = "event_type", help = "Field for the categorical summary")]
    category: CategoryField,

    #[arg(long = "rename", value_name = "OLD=NEW", value_parser = parse_rename, help = "Rename an input column before projection (repeatable)")]
    renames: Vec<(String, String)>,

    #[arg(long, value_enum, help = "Set the logging level")]
    log_level: Option<LogLevel>,

    #[arg(long, default_value_t = 5, help = "Number of most connected actors to log")]
    top_actors: usize,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Args {
    fn into_config(self) -> PipelineConfig {
        let allow_list = if self.allow_event_types.is_empty() {
            AllowList::default()
        } else {
            AllowList::new(self.allow_event_types)
        };
        let date_policy = if self.strict_dates {
            DatePolicy::Abort
        } else {
            DatePolicy::Skip
        };

        let mut config = PipelineConfig::new(self.input)
            .with_outputs(self.edges, self.nodes)
            .with_allow_list(allow_list)
            .with_date_policy(date_policy);
        if let Some(dir) = self.summary_dir {
            config = config.with_summary_dir(dir);
        }
        config.category = self.category;
        config.rename = self.renames.into_iter().collect::<HashMap<_, _>>();
        config
    }
}

fn init_tracing(level: Option<&LogLevel>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print the run's diagnostics to `err` and pick the process exit code.
fn report_outcome(
    outcome: Result<PipelineReport, PipelineError>,
    top_actors: usize,
    err: &mut dyn Write,
) -> ExitCode {
    match outcome {
        Ok(report) => {
            if !report.rejected.is_empty() {
                let _ = writeln!(
                    err,
                    "{} of {} rows excluded from all aggregates:",
                    report.rejected.len(),
                    report.input_rows
                );
                for row in &report.rejected {
                    let _ = writeln!(err, "  {row}");
                }
            }
            for (actor, degree) in report
                .analysis
                .graph
                .weighted_degrees()
                .into_iter()
                .take(top_actors)
            {
                info!(actor = %actor, degree, "top actor");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let _ = writeln!(err, "acled-network: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_level.as_ref());

    let top_actors = args.top_actors;
    let config = args.into_config();

    report_outcome(run(&config), top_actors, &mut std::io::stderr().lock())
}
