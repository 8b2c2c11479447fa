//! Normalization of per-vehicle schedule ("back-end") messages.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::model::ScheduledStop;
use crate::normalize::value::{
    coerce_string, display_string, first_present, first_truthy, id_string, is_truthy, lenient_f64,
    tag_equals,
};

/// Replacement stop list for one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleUpdate {
    pub vehicle_id: String,
    pub stops: Vec<ScheduledStop>,
}

/// Extract all per-vehicle schedule replacements carried by a "back-end"
/// message. Vehicles without a truthy id or without a stop array are skipped;
/// stops without a title or a parseable departure instant are dropped.
pub fn normalize_schedules(msg: &Value) -> Vec<ScheduleUpdate> {
    if !tag_equals(msg, "back-end") {
        return Vec::new();
    }
    let Some(items) = first_truthy(msg, &["data", "trains", "returnValue"])
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let mut updates = Vec::new();
    for item in items {
        let vehicle_id = item
            .get("returnValue")
            .and_then(|rv| rv.get("train"))
            .filter(|v| !v.is_null())
            .or_else(|| first_present(item, &["train", "trainId", "id", "tid"]))
            .and_then(id_string);
        let Some(vehicle_id) = vehicle_id else {
            continue;
        };
        let stops_val = item
            .get("returnValue")
            .and_then(|rv| rv.get("stopObjArray"))
            .filter(|v| is_truthy(v))
            .or_else(|| first_truthy(item, &["stopObjArray", "stops", "data"]));
        let Some(raw_stops) = stops_val.and_then(Value::as_array) else {
            continue;
        };

        let stops = raw_stops.iter().filter_map(normalize_stop).collect();
        updates.push(ScheduleUpdate { vehicle_id, stops });
    }
    updates
}

fn normalize_stop(raw: &Value) -> Option<ScheduledStop> {
    let title = first_present(raw, &["title", "name"])
        .and_then(display_string)
        .unwrap_or_default();
    if title.is_empty() {
        return None;
    }

    let departure_ms = first_present(raw, &["departure", "arrival"])
        .and_then(Value::as_str)
        .and_then(parse_schedule_instant)?;

    // Preferred station key is pvID verbatim; otherwise stringify whichever
    // secondary id the stop carries.
    let match_key = match raw.get("pvID").filter(|v| !v.is_null()) {
        Some(v) => coerce_string(v),
        None => first_present(raw, &["id", "gps_id", "routes_id"])
            .map(coerce_string)
            .unwrap_or_default(),
    };
    let alternate_id = first_present(raw, &["id", "_id", "pvID"])
        .map(coerce_string)
        .unwrap_or_default();

    let coords = coord_pair(raw, "coords").or_else(|| coord_pair(raw, "animatedCoord"));

    Some(ScheduledStop {
        match_key,
        alternate_id,
        title,
        departure_ms,
        coords,
    })
}

fn coord_pair(raw: &Value, key: &str) -> Option<(f64, f64)> {
    let arr = raw.get(key)?.as_array()?;
    if arr.len() != 2 {
        return None;
    }
    Some((lenient_f64(&arr[0])?, lenient_f64(&arr[1])?))
}

static SCHEDULE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})-(\d{2})-(\d{2})[ T](\d{2}):(\d{2})(?::(\d{2}))?").unwrap()
});

/// Parse a scheduled departure/arrival into epoch milliseconds.
///
/// The primary pattern `YYYY-MM-DD[ T]HH:MM[:SS]` is searched anywhere in the
/// string and interpreted as a **local** calendar time; anything else falls
/// back to RFC 3339 then RFC 2822. Unparseable values yield `None` and the
/// stop is dropped upstream.
pub fn parse_schedule_instant(raw: &str) -> Option<i64> {
    if let Some(c) = SCHEDULE_PATTERN.captures(raw) {
        let field = |i: usize| c.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        let instant = NaiveDate::from_ymd_opt(field(1)? as i32, field(2)?, field(3)?)
            .and_then(|d| d.and_hms_opt(field(4)?, field(5)?, field(6).unwrap_or(0)))
            .and_then(|ndt| Local.from_local_datetime(&ndt).earliest())
            .map(|dt| dt.timestamp_millis());
        if instant.is_some() {
            return instant;
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.timestamp_millis());
    }
    None
}
