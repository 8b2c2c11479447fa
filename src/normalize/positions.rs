//! Normalization of per-vehicle position updates.
//!
//! Position payloads arrive in more shapes than any other category, and with
//! no reliable type tag, so detection is a fallback chain over the message
//! structure itself.

use serde_json::Value;

use crate::model::PositionSample;
use crate::normalize::value::{first_present, first_truthy, id_string, is_truthy, lenient_f64};

#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub vehicle_id: String,
    pub sample: PositionSample,
}

/// Extract position updates from a message of unknown shape.
///
/// `observed_ms` is the normalizer's observation time, used when an update
/// carries no explicit timestamp. When a timestamp *is* present it is
/// interpreted as epoch seconds and scaled to milliseconds; the absent case
/// is already milliseconds. This asymmetry is a compatibility rule the feed
/// depends on, not something to clean up.
pub fn normalize_positions(msg: &Value, observed_ms: i64) -> Vec<PositionUpdate> {
    let updates: Vec<&Value> = if let Some(arr) = msg.as_array() {
        arr.iter().collect()
    } else if let Some(trains) = msg.get("trains").filter(|v| is_truthy(v)) {
        match trains.as_array() {
            Some(arr) => arr.iter().collect(),
            None => return Vec::new(),
        }
    } else if let Some(train) = msg.get("train").filter(|v| is_truthy(v)) {
        vec![train]
    } else if msg.get("type").and_then(Value::as_str) == Some("position")
        && msg.get("data").map(is_truthy).unwrap_or(false)
    {
        vec![&msg["data"]]
    } else if msg.get("id").map(is_truthy).unwrap_or(false)
        && first_truthy(msg, &["lat", "latitude", "y"]).is_some()
    {
        vec![msg]
    } else {
        return Vec::new();
    };

    updates
        .into_iter()
        .filter_map(|u| normalize_update(u, observed_ms))
        .collect()
}

fn normalize_update(u: &Value, observed_ms: i64) -> Option<PositionUpdate> {
    let vehicle_id =
        first_present(u, &["id", "trainId", "tid", "name", "uid"]).and_then(id_string)?;

    // Array-shaped updates carry [lon, lat] by position.
    let lat = first_present(u, &["lat", "latitude", "y"])
        .or_else(|| u.get(1))
        .and_then(lenient_f64)?;
    let lon = first_present(u, &["lon", "longitude", "x"])
        .or_else(|| u.get(0))
        .and_then(lenient_f64)?;

    let timestamp_ms = match first_truthy(u, &["ts", "timestamp", "time"]).and_then(lenient_f64) {
        Some(secs) => (secs * 1000.0) as i64,
        None => observed_ms,
    };

    Some(PositionUpdate {
        vehicle_id,
        sample: PositionSample {
            lat,
            lon,
            timestamp_ms,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn bare_array_of_updates() {
        let msg = json!([
            {"id": "5", "lat": 56.9, "lon": 24.1, "ts": 1700000100},
            {"id": "6", "latitude": 56.8, "longitude": 24.2},
        ]);
        let updates = normalize_positions(&msg, NOW);
        assert_eq!(updates.len(), 2);
        // Explicit timestamps are seconds and get scaled to ms
        assert_eq!(updates[0].sample.timestamp_ms, 1_700_000_100_000);
        // Missing timestamps use the observation time, already ms
        assert_eq!(updates[1].sample.timestamp_ms, NOW);
    }

    #[test]
    fn trains_field_and_coordinate_aliases() {
        let msg = json!({"trains": [{"tid": 9, "y": "56.90", "x": "24.10"}]});
        let updates = normalize_positions(&msg, NOW);
        assert_eq!(updates[0].vehicle_id, "9");
        assert_eq!(updates[0].sample.lat, 56.90);
        assert_eq!(updates[0].sample.lon, 24.10);
    }

    #[test]
    fn singleton_train_field() {
        let msg = json!({"train": {"uid": "u1", "lat": 1.0, "lon": 2.0, "time": 100}});
        let updates = normalize_positions(&msg, NOW);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].sample.timestamp_ms, 100_000);
    }

    #[test]
    fn tagged_position_singleton() {
        let msg = json!({"type": "position", "data": {"id": "p2", "lat": 3.0, "lon": 4.0}});
        let updates = normalize_positions(&msg, NOW);
        assert_eq!(updates[0].vehicle_id, "p2");
    }

    #[test]
    fn message_itself_as_update() {
        let msg = json!({"id": "p3", "lat": 5.0, "lon": 6.0, "extra": true});
        let updates = normalize_positions(&msg, NOW);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].sample.lat, 5.0);
    }

    #[test]
    fn message_with_zero_latitude_is_not_self_shaped() {
        // A lone `lat: 0` is falsy on the wire, so the self-shaped fallback
        // does not engage.
        let msg = json!({"id": "p4", "lat": 0, "lon": 6.0});
        assert!(normalize_positions(&msg, NOW).is_empty());
    }

    #[test]
    fn discards_updates_without_truthy_id_or_numeric_coords() {
        let msg = json!([
            {"lat": 1.0, "lon": 2.0},
            {"id": 0, "lat": 1.0, "lon": 2.0},
            {"id": "ok", "lat": "garbage", "lon": 2.0},
            {"id": "kept", "lat": 1.0, "lon": 2.0},
        ]);
        let updates = normalize_positions(&msg, NOW);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].vehicle_id, "kept");
    }

    #[test]
    fn non_numeric_timestamp_falls_back_to_observation_time() {
        let msg = json!([{"id": "t", "lat": 1.0, "lon": 2.0, "ts": "soon"}]);
        let updates = normalize_positions(&msg, NOW);
        assert_eq!(updates[0].sample.timestamp_ms, NOW);
    }

    #[test]
    fn unrecognized_shapes_yield_nothing() {
        assert!(normalize_positions(&json!({"hello": "world"}), NOW).is_empty());
        assert!(normalize_positions(&json!("not json object"), NOW).is_empty());
        assert!(normalize_positions(&json!({"trains": "none"}), NOW).is_empty());
    }
}
