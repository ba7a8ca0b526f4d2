use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::model::{CategorySummary, Event, EventTable};
use crate::schema::event;

/// Categorical field an event table can be grouped by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryField {
    #[default]
    EventType,
    SubEventType,
    Admin1,
}

impl CategoryField {
    /// Column name of the field in the input table.
    pub fn column(self) -> &'static str {
        match self {
            CategoryField::EventType => event::EVENT_TYPE,
            CategoryField::SubEventType => event::SUB_EVENT_TYPE,
            CategoryField::Admin1 => event::ADMIN1,
        }
    }

    fn value(self, event: &Event) -> &str {
        match self {
            CategoryField::EventType => &event.event_type,
            CategoryField::SubEventType => &event.sub_event_type,
            CategoryField::Admin1 => &event.admin1,
        }
    }
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for CategoryField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            event::EVENT_TYPE => Ok(CategoryField::EventType),
            event::SUB_EVENT_TYPE => Ok(CategoryField::SubEventType),
            event::ADMIN1 => Ok(CategoryField::Admin1),
            _ => Err(format!(
                "Invalid category field: '{s}'. Must be 'event_type', 'sub_event_type' or 'admin1'"
            )),
        }
    }
}

#[derive(Default)]
struct CategoryAcc {
    fatalities: u64,
    events: u64,
}

/// Group by `field` (exact, case-sensitive match) and compute sum(fatalities)
/// and count(rows) per group.
///
/// Every distinct value appears exactly once, zero-fatality groups included.
/// Sorted by total fatalities descending, ties by category ascending.
pub fn summarize_by(table: &EventTable, field: CategoryField) -> Vec<CategorySummary> {
    let mut groups: HashMap<&str, CategoryAcc> = HashMap::new();
    for event in table {
        let acc = groups.entry(field.value(event)).or_default();
        acc.fatalities += event.fatalities;
        acc.events += 1;
    }

    let mut rows: Vec<CategorySummary> = groups
        .into_iter()
        .map(|(category, acc)| CategorySummary {
            category: category.to_string(),
            total_fatalities: acc.fatalities,
            event_count: acc.events,
        })
        .collect();
    rows.sort_by(|a, b| {
        Reverse(a.total_fatalities)
            .cmp(&Reverse(b.total_fatalities))
            .then_with(|| a.category.cmp(&b.category))
    });

    info!(%field, groups = rows.len(), "summarized events by category");
    rows
}

pub fn event_type_summary(table: &EventTable) -> Vec<CategorySummary> {
    summarize_by(table, CategoryField::EventType)
}
