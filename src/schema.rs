/// Column-name constants for acled-network tables.
/// Single source of truth - shared by the loader, the exporter and the Python bindings.

// ── Event input columns ─────────────────────────────────────────────────────
pub mod event {
    pub const EVENT_ID: &str = "event_id_cnty";
    pub const EVENT_DATE: &str = "event_date";
    pub const YEAR: &str = "year";
    pub const EVENT_TYPE: &str = "event_type";
    pub const SUB_EVENT_TYPE: &str = "sub_event_type";
    pub const ACTOR1: &str = "actor1";
    pub const ACTOR2: &str = "actor2";
    pub const ADMIN1: &str = "admin1";
    pub const ADMIN2: &str = "admin2";
    pub const ADMIN3: &str = "admin3";
    pub const LOCATION: &str = "location";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const FATALITIES: &str = "fatalities";

    /// The projected column subset, in output order.
    pub const REQUIRED: [&str; 14] = [
        EVENT_ID,
        EVENT_DATE,
        YEAR,
        EVENT_TYPE,
        SUB_EVENT_TYPE,
        ACTOR1,
        ACTOR2,
        ADMIN1,
        ADMIN2,
        ADMIN3,
        LOCATION,
        LATITUDE,
        LONGITUDE,
        FATALITIES,
    ];
}

// ── Edge export columns ─────────────────────────────────────────────────────
pub mod edge {
    pub const SOURCE: &str = "Source";
    pub const TARGET: &str = "Target";
    pub const WEIGHT: &str = "Weight";
    pub const TOTAL_FATALITIES: &str = "total_fatalities";

    pub const HEADER: [&str; 4] = [SOURCE, TARGET, WEIGHT, TOTAL_FATALITIES];
}

// ── Node export columns ─────────────────────────────────────────────────────
pub mod node {
    pub const ID: &str = "Id";
    pub const LABEL: &str = "Label";

    pub const HEADER: [&str; 2] = [ID, LABEL];
}

// ── Time bucket columns ─────────────────────────────────────────────────────
pub mod bucket {
    pub const PERIOD_START: &str = "period_start";
    pub const TOTAL_FATALITIES: &str = "total_fatalities";
    pub const EVENT_COUNT: &str = "event_count";
}

// ── Category summary columns ────────────────────────────────────────────────
pub mod summary {
    pub const TOTAL_FATALITIES: &str = "total_fatalities";
    pub const EVENT_COUNT: &str = "event_count";
}

// ── Default allow-list values ───────────────────────────────────────────────
pub mod event_type {
    pub const BATTLES: &str = "Battles";
    pub const EXPLOSIONS: &str = "Explosions/Remote violence";
}
