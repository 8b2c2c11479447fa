//! Message shape detection and normalization.
//!
//! The feed's wire format is loosely structured: field names have several
//! aliases, nesting varies, and units are inconsistent. Each category module
//! turns an arbitrary decoded message into canonical records via an explicit
//! ordered list of extraction rules. The three classifications are evaluated
//! independently; a single message may contribute to more than one store.

pub mod positions;
pub mod schedules;
pub mod stations;
pub mod value;

use serde_json::Value;

pub use positions::PositionUpdate;
pub use schedules::ScheduleUpdate;

use crate::model::Station;

/// Everything a single feed message contributes to the stores.
#[derive(Debug, Default)]
pub struct NormalizedMessage {
    /// Full-replace station catalog snapshot, when the message is a catalog.
    pub stations: Option<Vec<Station>>,
    pub schedules: Vec<ScheduleUpdate>,
    pub positions: Vec<PositionUpdate>,
}

impl NormalizedMessage {
    /// A message matching no category; not an error, only a diagnostic.
    pub fn is_unrecognized(&self) -> bool {
        self.stations.is_none() && self.schedules.is_empty() && self.positions.is_empty()
    }
}

/// Normalize one decoded message. `observed_ms` is the reception instant,
/// used for position updates lacking an explicit timestamp.
pub fn normalize(msg: &Value, observed_ms: i64) -> NormalizedMessage {
    NormalizedMessage {
        stations: stations::normalize_stations(msg),
        schedules: schedules::normalize_schedules(msg),
        positions: positions::normalize_positions(msg, observed_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn categories_are_evaluated_independently() {
        // A back-end message whose payload also looks like a position list
        let msg = json!({
            "type": "back-end",
            "data": [{"train": "T1", "stops": []}],
            "trains": [{"id": "T1", "lat": 56.9, "lon": 24.1}],
        });
        let n = normalize(&msg, 0);
        assert!(n.stations.is_none());
        assert_eq!(n.schedules.len(), 1);
        assert_eq!(n.positions.len(), 1);
        assert!(!n.is_unrecognized());
    }

    #[test]
    fn unmatched_messages_are_unrecognized() {
        assert!(normalize(&json!({"ping": 1}), 0).is_unrecognized());
        assert!(normalize(&json!(42), 0).is_unrecognized());
    }
}
