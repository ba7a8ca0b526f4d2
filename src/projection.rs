use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{summarize_rows, PipelineError, RowError, RowErrorKind};
use crate::loader::require_columns;
use crate::model::{Event, EventTable};
use crate::schema::event;

/// What to do with rows whose date (or fatalities) cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatePolicy {
    /// Exclude the rows from every downstream table and report them.
    #[default]
    Skip,
    /// Fail the run before any aggregation.
    Abort,
}

/// Result of projecting a raw table: the typed events plus every rejected row.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub table: EventTable,
    pub rejected: Vec<RowError>,
}

/// Parse `YYYY?MM?DD`, where `?` is one of `-`, `/`, `.`, a space, or nothing,
/// used consistently. Surrounding whitespace is ignored.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim().as_bytes();
    let (year, rest) = take_digits(s, 4)?;

    let sep = match rest.first() {
        Some(b) if b.is_ascii_digit() => None,
        Some(b'-' | b'/' | b'.' | b' ') => Some(rest[0]),
        _ => return None,
    };
    let rest = if sep.is_some() { &rest[1..] } else { rest };

    let (month, rest) = take_digits(rest, 2)?;
    let rest = match sep {
        Some(expected) if rest.first() == Some(&expected) => &rest[1..],
        Some(_) => return None,
        None => rest,
    };
    let (day, rest) = take_digits(rest, 2)?;
    if !rest.is_empty() {
        return None;
    }

    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn take_digits(s: &[u8], n: usize) -> Option<(u32, &[u8])> {
    if s.len() < n || !s[..n].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value = s[..n]
        .iter()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
    Some((value, &s[n..]))
}

/// Parse a fatality count: a non-negative integer, surrounding whitespace allowed.
pub fn parse_fatalities(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

struct RawColumns<'a> {
    event_id: &'a StringChunked,
    event_date: &'a StringChunked,
    year: &'a StringChunked,
    event_type: &'a StringChunked,
    sub_event_type: &'a StringChunked,
    actor1: &'a StringChunked,
    actor2: &'a StringChunked,
    admin1: &'a StringChunked,
    admin2: &'a StringChunked,
    admin3: &'a StringChunked,
    location: &'a StringChunked,
    latitude: &'a StringChunked,
    longitude: &'a StringChunked,
    fatalities: &'a StringChunked,
}

impl<'a> RawColumns<'a> {
    fn from_frame(df: &'a DataFrame) -> Result<Self, PipelineError> {
        Ok(Self {
            event_id: df.column(event::EVENT_ID)?.str()?,
            event_date: df.column(event::EVENT_DATE)?.str()?,
            year: df.column(event::YEAR)?.str()?,
            event_type: df.column(event::EVENT_TYPE)?.str()?,
            sub_event_type: df.column(event::SUB_EVENT_TYPE)?.str()?,
            actor1: df.column(event::ACTOR1)?.str()?,
            actor2: df.column(event::ACTOR2)?.str()?,
            admin1: df.column(event::ADMIN1)?.str()?,
            admin2: df.column(event::ADMIN2)?.str()?,
            admin3: df.column(event::ADMIN3)?.str()?,
            location: df.column(event::LOCATION)?.str()?,
            latitude: df.column(event::LATITUDE)?.str()?,
            longitude: df.column(event::LONGITUDE)?.str()?,
            fatalities: df.column(event::FATALITIES)?.str()?,
        })
    }

    fn project_row(&self, i: usize) -> Result<Event, RowError> {
        let event_id = text(self.event_id, i).trim().to_string();
        let reject = |kind: RowErrorKind| RowError {
            row: i,
            event_id: (!event_id.is_empty()).then(|| event_id.clone()),
            kind,
        };

        let raw_date = text(self.event_date, i);
        let event_date = parse_event_date(&raw_date).ok_or_else(|| {
            reject(RowErrorKind::Date {
                value: raw_date.clone(),
            })
        })?;

        let raw_fatalities = text(self.fatalities, i);
        let fatalities = parse_fatalities(&raw_fatalities).ok_or_else(|| {
            reject(RowErrorKind::Fatalities {
                value: raw_fatalities.clone(),
            })
        })?;

        Ok(Event {
            event_date,
            year: lenient(self.year, i, event::YEAR),
            event_type: text(self.event_type, i),
            sub_event_type: text(self.sub_event_type, i),
            actor1: text(self.actor1, i),
            actor2: text(self.actor2, i),
            admin1: text(self.admin1, i),
            admin2: text(self.admin2, i),
            admin3: text(self.admin3, i),
            location: text(self.location, i),
            latitude: lenient(self.latitude, i, event::LATITUDE),
            longitude: lenient(self.longitude, i, event::LONGITUDE),
            fatalities,
            event_id,
        })
    }
}

/// Null cells read as empty strings.
fn text(ca: &StringChunked, i: usize) -> String {
    ca.get(i).unwrap_or("").to_string()
}

fn lenient<T: std::str::FromStr>(ca: &StringChunked, i: usize, column: &str) -> Option<T> {
    let raw = ca.get(i)?.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = raw.parse::<T>().ok();
    if parsed.is_none() {
        debug!(row = i, column, value = raw, "unparseable optional field, treating as missing");
    }
    parsed
}

/// Project a raw string table onto the fixed event schema.
///
/// Fails with `Schema` before touching any row if a required column is absent.
/// Rows with a malformed date or fatality count are collected in
/// `Projection::rejected`; under `DatePolicy::Abort` any such row fails the
/// projection with `DateParse` instead.
pub fn project(df: &DataFrame, policy: DatePolicy) -> Result<Projection, PipelineError> {
    require_columns(df, &event::REQUIRED)?;
    let columns = RawColumns::from_frame(df)?;

    let mut events = Vec::with_capacity(df.height());
    let mut rejected = Vec::new();
    for i in 0..df.height() {
        match columns.project_row(i) {
            Ok(event) => events.push(event),
            Err(row_error) => rejected.push(row_error),
        }
    }

    if !rejected.is_empty() {
        match policy {
            DatePolicy::Abort => return Err(PipelineError::DateParse { rows: rejected }),
            DatePolicy::Skip => warn!(
                count = rejected.len(),
                rows = %summarize_rows(&rejected),
                "rows excluded from all aggregates"
            ),
        }
    }

    info!(
        input = df.height(),
        projected = events.len(),
        rejected = rejected.len(),
        "projected event table"
    );
    Ok(Projection {
        table: EventTable::new(events),
        rejected,
    })
}
