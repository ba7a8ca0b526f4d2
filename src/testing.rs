//! Event builders shared by the unit tests.

use chrono::{Datelike, NaiveDate};

use crate::model::Event;

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn base_event() -> Event {
    let date = ymd(2018, 1, 1);
    Event {
        event_id: String::new(),
        event_date: date,
        year: Some(date.year()),
        event_type: "Battles".into(),
        sub_event_type: "Armed clash".into(),
        actor1: "A".into(),
        actor2: "B".into(),
        admin1: String::new(),
        admin2: String::new(),
        admin3: String::new(),
        location: String::new(),
        latitude: None,
        longitude: None,
        fatalities: 0,
    }
}

pub fn event_on(date: NaiveDate, fatalities: u64) -> Event {
    Event {
        event_date: date,
        year: Some(date.year()),
        fatalities,
        ..base_event()
    }
}

pub fn typed_event(event_type: &str, fatalities: u64) -> Event {
    Event {
        event_type: event_type.into(),
        fatalities,
        ..base_event()
    }
}

pub fn pair_event(actor1: &str, actor2: &str, event_type: &str, fatalities: u64) -> Event {
    Event {
        actor1: actor1.into(),
        actor2: actor2.into(),
        event_type: event_type.into(),
        fatalities,
        ..base_event()
    }
}
