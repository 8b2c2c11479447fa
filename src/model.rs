use serde::{Deserialize, Serialize};

/// A stop/station from the catalog feed. The directory is replaced wholesale
/// whenever a new catalog message arrives; `id` is always compared as a string
/// because the wire mixes numeric and string identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// One position report for a vehicle, timestamp in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub lat: f64,
    pub lon: f64,
    pub timestamp_ms: i64,
}

/// One scheduled visit of a vehicle to a station.
///
/// `match_key` is the preferred station identifier (`pvID` on the wire) and
/// `alternate_id` a secondary one; prediction matches either against the
/// selected station id, or `title` against its name. Stops without a title or
/// a parseable departure instant are dropped at normalization time, so
/// `departure_ms` is always meaningful here.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledStop {
    pub match_key: String,
    pub alternate_id: String,
    pub title: String,
    pub departure_ms: i64,
    pub coords: Option<(f64, f64)>,
}

/// An upcoming arrival at the selected station, recomputed on every refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub vehicle_id: String,
    pub title: String,
    pub departure_ms: i64,
    pub seconds_until: i64,
}

/// Current epoch time in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
