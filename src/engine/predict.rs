//! Ranking of upcoming arrivals for the selected station.

use crate::model::{Candidate, Station};
use crate::store::ScheduleStore;

/// How many next arrivals are surfaced.
pub const MAX_NEXT_UP: usize = 3;

/// Join every stored schedule against the selected station and rank the
/// still-future stops.
///
/// A stop matches when its preferred key or alternate id equals the selected
/// station's id, or its title equals the station's name. Stops at or past
/// their departure are excluded; survivors are stable-sorted by departure so
/// ties keep vehicle insertion order, then truncated to [`MAX_NEXT_UP`].
pub fn predict(schedules: &ScheduleStore, selected: &Station, now_ms: i64) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for (vehicle_id, stops) in schedules.iter() {
        for stop in stops {
            let matches = stop.match_key == selected.id
                || stop.alternate_id == selected.id
                || (!selected.name.is_empty() && stop.title == selected.name);
            if !matches {
                continue;
            }
            let seconds_until = ((stop.departure_ms - now_ms) as f64 / 1000.0).round() as i64;
            if seconds_until <= 0 {
                continue;
            }
            candidates.push(Candidate {
                vehicle_id: vehicle_id.to_string(),
                title: stop.title.clone(),
                departure_ms: stop.departure_ms,
                seconds_until,
            });
        }
    }

    candidates.sort_by_key(|c| c.departure_ms);
    candidates.truncate(MAX_NEXT_UP);
    candidates
}
