use chrono::NaiveDate;
use polars::prelude::*;

use crate::error::PipelineError;
use crate::schema::{bucket, edge, node, summary};

/// One projected conflict event. Immutable once projected.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_id: String,
    pub event_date: NaiveDate,
    pub year: Option<i32>,
    pub event_type: String,
    pub sub_event_type: String,
    pub actor1: String,
    pub actor2: String,
    pub admin1: String,
    pub admin2: String,
    pub admin3: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub fatalities: u64,
}

/// Ordered sequence of projected events. Every event carries a valid date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    events: Vec<Event>,
}

impl EventTable {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn total_fatalities(&self) -> u64 {
        self.events.iter().map(|e| e.fatalities).sum()
    }
}

impl FromIterator<Event> for EventTable {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EventTable {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Fatalities summed over one calendar period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBucket {
    /// First day of the period.
    pub period_start: NaiveDate,
    pub total_fatalities: u64,
    pub event_count: u64,
}

/// One row of a categorical summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: String,
    pub total_fatalities: u64,
    pub event_count: u64,
}

/// Directed, weighted actor-pair edge. (A, B) and (B, A) are distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorEdge {
    pub source: String,
    pub target: String,
    /// Number of filtered events with exactly this ordered pair.
    pub weight: u64,
    pub total_fatalities: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorNode {
    pub id: String,
    pub label: String,
}

impl ActorNode {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
        }
    }
}

// ── DataFrame conversion ────────────────────────────────────────────────────

pub fn buckets_to_frame(buckets: &[TimeBucket]) -> Result<DataFrame, PipelineError> {
    let starts: Vec<NaiveDate> = buckets.iter().map(|b| b.period_start).collect();
    let totals: Vec<u64> = buckets.iter().map(|b| b.total_fatalities).collect();
    let counts: Vec<u64> = buckets.iter().map(|b| b.event_count).collect();

    let df = DataFrame::new(vec![
        Column::new(bucket::PERIOD_START.into(), &starts),
        Column::new(bucket::TOTAL_FATALITIES.into(), &totals),
        Column::new(bucket::EVENT_COUNT.into(), &counts),
    ])?;
    Ok(df)
}

/// `category_column` names the grouping column, e.g. `event_type`.
pub fn summaries_to_frame(
    rows: &[CategorySummary],
    category_column: &str,
) -> Result<DataFrame, PipelineError> {
    let categories: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
    let totals: Vec<u64> = rows.iter().map(|r| r.total_fatalities).collect();
    let counts: Vec<u64> = rows.iter().map(|r| r.event_count).collect();

    let df = DataFrame::new(vec![
        Column::new(category_column.into(), &categories),
        Column::new(summary::TOTAL_FATALITIES.into(), &totals),
        Column::new(summary::EVENT_COUNT.into(), &counts),
    ])?;
    Ok(df)
}

pub fn edges_to_frame(edges: &[ActorEdge]) -> Result<DataFrame, PipelineError> {
    let sources: Vec<&str> = edges.iter().map(|e| e.source.as_str()).collect();
    let targets: Vec<&str> = edges.iter().map(|e| e.target.as_str()).collect();
    let weights: Vec<u64> = edges.iter().map(|e| e.weight).collect();
    let totals: Vec<u64> = edges.iter().map(|e| e.total_fatalities).collect();

    let df = DataFrame::new(vec![
        Column::new(edge::SOURCE.into(), &sources),
        Column::new(edge::TARGET.into(), &targets),
        Column::new(edge::WEIGHT.into(), &weights),
        Column::new(edge::TOTAL_FATALITIES.into(), &totals),
    ])?;
    Ok(df)
}

pub fn nodes_to_frame(nodes: &[ActorNode]) -> Result<DataFrame, PipelineError> {
    let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let labels: Vec<&str> = nodes.iter().map(|n| n.label.as_str()).collect();

    let df = DataFrame::new(vec![
        Column::new(node::ID.into(), &ids),
        Column::new(node::LABEL.into(), &labels),
    ])?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_frame_uses_export_header() {
        let edges = vec![ActorEdge {
            source: "A".into(),
            target: "B".into(),
            weight: 2,
            total_fatalities: 8,
        }];
        let df = edges_to_frame(&edges).unwrap();
        let names: Vec<&str> = df.get_column_names_str();
        assert_eq!(names, edge::HEADER.to_vec());
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn bucket_frame_keeps_row_order() {
        let buckets = vec![
            TimeBucket {
                period_start: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
                total_fatalities: 15,
                event_count: 2,
            },
            TimeBucket {
                period_start: NaiveDate::from_ymd_opt(2018, 2, 1).unwrap(),
                total_fatalities: 2,
                event_count: 1,
            },
        ];
        let df = buckets_to_frame(&buckets).unwrap();
        let totals = df.column(bucket::TOTAL_FATALITIES).unwrap().u64().unwrap();
        assert_eq!(totals.get(0), Some(15));
        assert_eq!(totals.get(1), Some(2));
        assert_eq!(
            df.column(bucket::PERIOD_START).unwrap().dtype(),
            &DataType::Date
        );
    }

    #[test]
    fn node_label_duplicates_id() {
        let node = ActorNode::new("Military Forces of Nigeria");
        assert_eq!(node.id, node.label);
    }
}
