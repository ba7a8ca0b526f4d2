use std::path::{Path, PathBuf};

use acled_network::schema::event;
use acled_network::{
    read_edges, read_nodes, run, ActorEdge, ActorNode, AllowList, DatePolicy, PipelineConfig,
    PipelineError, RowErrorKind, Stage,
};
use chrono::NaiveDate;

struct Row<'a> {
    id: &'a str,
    date: &'a str,
    event_type: &'a str,
    actor1: &'a str,
    actor2: &'a str,
    fatalities: &'a str,
}

fn row<'a>(
    id: &'a str,
    date: &'a str,
    event_type: &'a str,
    actor1: &'a str,
    actor2: &'a str,
    fatalities: &'a str,
) -> Row<'a> {
    Row {
        id,
        date,
        event_type,
        actor1,
        actor2,
        fatalities,
    }
}

fn quote(field: &str) -> String {
    if field.contains([',', '"']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_events(dir: &Path, rows: &[Row<'_>]) -> PathBuf {
    let mut text = event::REQUIRED.join(",");
    text.push('\n');
    for r in rows {
        let year = r.date.get(..4).unwrap_or("");
        let fields = [
            r.id,
            r.date,
            year,
            r.event_type,
            "Armed clash",
            r.actor1,
            r.actor2,
            "Borno",
            "Maiduguri",
            "",
            "Maiduguri",
            "11.8333",
            "13.15",
            r.fatalities,
        ];
        let line: Vec<String> = fields.iter().map(|f| quote(f)).collect();
        text.push_str(&line.join(","));
        text.push('\n');
    }
    let path = dir.join("events.csv");
    std::fs::write(&path, text).expect("write events");
    path
}

fn config_in(dir: &Path, input: PathBuf) -> PipelineConfig {
    PipelineConfig::new(input).with_outputs(dir.join("edges.csv"), dir.join("nodes.csv"))
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn battles_scenario_produces_directed_edges_and_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_events(
        dir.path(),
        &[
            row("E1", "2018-01-05", "Battles", "A", "B", "5"),
            row("E2", "2018-01-06", "Battles", "A", "B", "3"),
            row("E3", "2018-01-07", "Battles", "B", "A", "1"),
            row("E4", "2018-01-08", "Protests", "A", "B", "100"),
        ],
    );
    let config = config_in(dir.path(), input).with_allow_list(AllowList::new(["Battles"]));

    let report = run(&config).expect("pipeline run");

    let expected_edges = vec![
        ActorEdge {
            source: "A".into(),
            target: "B".into(),
            weight: 2,
            total_fatalities: 8,
        },
        ActorEdge {
            source: "B".into(),
            target: "A".into(),
            weight: 1,
            total_fatalities: 1,
        },
    ];
    assert_eq!(report.analysis.graph.edges(), expected_edges);
    assert_eq!(read_edges(&config.edges_path).unwrap(), expected_edges);
    assert_eq!(
        read_nodes(&config.nodes_path).unwrap(),
        vec![ActorNode::new("A"), ActorNode::new("B")]
    );

    // Protests still count toward the summaries.
    let protests = report
        .analysis
        .categories
        .iter()
        .find(|r| r.category == "Protests")
        .unwrap();
    assert_eq!(protests.total_fatalities, 100);
    assert_eq!(report.analysis.categories[0].category, "Protests");
}

#[test]
fn monthly_scenario_and_sum_preservation() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_events(
        dir.path(),
        &[
            row("E1", "2018-01-05", "Battles", "A", "B", "10"),
            row("E2", "2018-01-20", "Riots", "C", "", "5"),
            row("E3", "2018-02-01", "Battles", "A", "B", "2"),
        ],
    );
    let report = run(&config_in(dir.path(), input)).unwrap();

    let pairs: Vec<(NaiveDate, u64)> = report
        .analysis
        .monthly
        .iter()
        .map(|b| (b.period_start, b.total_fatalities))
        .collect();
    assert_eq!(pairs, vec![(ymd(2018, 1, 1), 15), (ymd(2018, 2, 1), 2)]);

    let summary_total: u64 = report
        .analysis
        .categories
        .iter()
        .map(|r| r.total_fatalities)
        .sum();
    assert_eq!(summary_total, report.events.total_fatalities());
}

#[test]
fn empty_actor2_is_excluded_from_graph() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_events(
        dir.path(),
        &[
            row("E1", "2018-01-05", "Battles", "A", "", "50"),
            row("E2", "2018-01-05", "Explosions/Remote violence", "C", "D", "1"),
        ],
    );
    let report = run(&config_in(dir.path(), input)).unwrap();

    let edges = report.analysis.graph.edges();
    assert_eq!(edges.len(), 1);
    assert_eq!((edges[0].source.as_str(), edges[0].target.as_str()), ("C", "D"));
    assert!(edges.iter().all(|e| !e.source.is_empty() && !e.target.is_empty()));
    assert!(!report.analysis.graph.contains_actor("A"));
}

#[test]
fn bad_dates_are_reported_and_excluded_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_events(
        dir.path(),
        &[
            row("E1", "2018-01-05", "Battles", "A", "B", "10"),
            row("E2", "05 January 2018", "Battles", "A", "B", "99"),
            row("E3", "2018-02-01", "Battles", "A", "B", "2"),
        ],
    );
    let report = run(&config_in(dir.path(), input)).unwrap();

    assert_eq!(report.input_rows, 3);
    assert_eq!(report.events.len(), 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].event_id.as_deref(), Some("E2"));
    assert!(matches!(report.rejected[0].kind, RowErrorKind::Date { .. }));

    let edges = report.analysis.graph.edges();
    assert_eq!(edges[0].weight, 2);
    assert_eq!(edges[0].total_fatalities, 12);
}

#[test]
fn strict_dates_abort_before_writing_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_events(
        dir.path(),
        &[
            row("E1", "2018-13-05", "Battles", "A", "B", "10"),
            row("E2", "2018-01-05", "Battles", "A", "B", "1"),
        ],
    );
    let config = config_in(dir.path(), input).with_date_policy(DatePolicy::Abort);

    let err = run(&config).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Project));
    assert!(err.to_string().contains("E1 (row 0)"));
    assert!(!config.edges_path.exists());
    assert!(!config.nodes_path.exists());
}

#[test]
fn missing_column_is_a_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("events.csv");
    std::fs::write(&input, "event_id_cnty,event_date,fatalities\nE1,2018-01-05,1\n").unwrap();

    let err = run(&config_in(dir.path(), input)).unwrap_err();
    match err {
        PipelineError::Stage { stage, source } => {
            assert_eq!(stage, Stage::Project);
            assert!(matches!(*source, PipelineError::Schema { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join("edges.csv").exists());
}

#[test]
fn unreadable_input_fails_in_load_stage() {
    let dir = tempfile::tempdir().unwrap();
    let err = run(&config_in(dir.path(), dir.path().join("absent.csv"))).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Load));
}

#[test]
fn actor_names_with_delimiters_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_events(
        dir.path(),
        &[
            row("E1", "2019-03-01", "Battles", "Militia (Jos, Plateau)", "Civilians", "4"),
            row("E2", "2019-03-02", "Battles", "\"Unidentified\" Gang", "Civilians", "1"),
        ],
    );
    let config = config_in(dir.path(), input);
    let report = run(&config).unwrap();

    assert_eq!(read_edges(&config.edges_path).unwrap(), report.analysis.graph.edges());
    assert_eq!(read_nodes(&config.nodes_path).unwrap(), report.analysis.graph.nodes());
}

#[test]
fn summaries_are_exported_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_events(
        dir.path(),
        &[row("E1", "2018-01-05", "Battles", "A", "B", "10")],
    );
    let config = config_in(dir.path(), input).with_summary_dir(dir.path().join("charts"));
    let report = run(&config).unwrap();

    assert_eq!(report.summary_files.len(), 2);
    for path in &report.summary_files {
        assert!(path.exists(), "{} should exist", path.display());
    }
    let category = std::fs::read_to_string(dir.path().join("charts/event_type_summary.csv")).unwrap();
    assert_eq!(
        category.lines().collect::<Vec<_>>(),
        vec!["event_type,total_fatalities,event_count", "Battles,10,1"]
    );
}

#[test]
fn unusable_summary_dir_leaves_no_graph_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_events(
        dir.path(),
        &[row("E1", "2018-01-05", "Battles", "A", "B", "10")],
    );
    let blocker = dir.path().join("charts");
    std::fs::write(&blocker, "not a directory").unwrap();
    let config = config_in(dir.path(), input).with_summary_dir(&blocker);

    let err = run(&config).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Export));
    assert!(!config.edges_path.exists());
    assert!(!config.nodes_path.exists());
}
