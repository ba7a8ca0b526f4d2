use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::info;

use crate::model::{EventTable, TimeBucket};

/// Calendar period used as the grouping key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Granularity {
    #[default]
    Month,
    Year,
}

impl Granularity {
    /// First day of the period containing `date`.
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        let start = match self {
            Granularity::Month => date.with_day(1),
            Granularity::Year => date.with_ordinal(1),
        };
        // day 1 and ordinal 1 exist for every valid date
        start.unwrap_or(date)
    }
}

#[derive(Default)]
struct BucketAcc {
    fatalities: u64,
    events: u64,
}

/// Sum fatalities per period. Only periods present in the data appear;
/// output is sorted by period start ascending.
pub fn aggregate_fatalities(table: &EventTable, granularity: Granularity) -> Vec<TimeBucket> {
    let mut groups: BTreeMap<NaiveDate, BucketAcc> = BTreeMap::new();
    for event in table {
        let acc = groups
            .entry(granularity.period_start(event.event_date))
            .or_default();
        acc.fatalities += event.fatalities;
        acc.events += 1;
    }

    let buckets: Vec<TimeBucket> = groups
        .into_iter()
        .map(|(period_start, acc)| TimeBucket {
            period_start,
            total_fatalities: acc.fatalities,
            event_count: acc.events,
        })
        .collect();

    info!(?granularity, buckets = buckets.len(), "aggregated fatalities over time");
    buckets
}

pub fn monthly_fatalities(table: &EventTable) -> Vec<TimeBucket> {
    aggregate_fatalities(table, Granularity::Month)
}

pub fn yearly_fatalities(table: &EventTable) -> Vec<TimeBucket> {
    aggregate_fatalities(table, Granularity::Year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{event_on as event, ymd};

    #[test]
    fn buckets_by_month_in_ascending_order() {
        let table: EventTable = vec![
            event(ymd(2018, 2, 1), 2),
            event(ymd(2018, 1, 20), 5),
            event(ymd(2018, 1, 5), 10),
        ]
        .into_iter()
        .collect();

        let buckets = monthly_fatalities(&table);
        let pairs: Vec<(NaiveDate, u64)> = buckets
            .iter()
            .map(|b| (b.period_start, b.total_fatalities))
            .collect();
        assert_eq!(pairs, vec![(ymd(2018, 1, 1), 15), (ymd(2018, 2, 1), 2)]);
        assert_eq!(buckets[0].event_count, 2);
    }

    #[test]
    fn empty_months_are_not_synthesized() {
        let table: EventTable = vec![event(ymd(2018, 1, 5), 1), event(ymd(2018, 4, 9), 1)]
            .into_iter()
            .collect();
        let buckets = monthly_fatalities(&table);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[1].period_start, ymd(2018, 4, 1));
    }

    #[test]
    fn bucket_totals_preserve_the_fatality_sum() {
        let table: EventTable = (1..=28)
            .map(|d| event(ymd(2019, (d % 12) + 1, d), u64::from(d)))
            .collect();
        let total: u64 = monthly_fatalities(&table)
            .iter()
            .map(|b| b.total_fatalities)
            .sum();
        assert_eq!(total, table.total_fatalities());
    }

    #[test]
    fn yearly_buckets_start_on_january_first() {
        let table: EventTable = vec![event(ymd(2017, 12, 31), 4), event(ymd(2018, 6, 1), 3)]
            .into_iter()
            .collect();
        let buckets = yearly_fatalities(&table);
        assert_eq!(buckets[0].period_start, ymd(2017, 1, 1));
        assert_eq!(buckets[1].period_start, ymd(2018, 1, 1));
    }

    #[test]
    fn empty_table_yields_no_buckets() {
        assert!(monthly_fatalities(&EventTable::default()).is_empty());
    }
}
