//! Per-vehicle rolling position window and derived kinematics.

use std::collections::HashMap;

use crate::geo::{distance_meters, initial_bearing_degrees};
use crate::model::PositionSample;

/// Kinematic state for one vehicle: at most the last two position samples,
/// plus speed/heading derived from them. Speed and heading stay unset until
/// two time-ordered samples exist, and go stale (rather than being erased)
/// when delivery regresses.
#[derive(Debug, Clone, Default)]
pub struct KinematicRecord {
    pub previous: Option<PositionSample>,
    pub current: Option<PositionSample>,
    pub speed_mps: Option<f64>,
    pub heading_deg: Option<f64>,
}

/// Store of kinematic records, keyed by vehicle id. Entries live for the
/// process lifetime; the tracked vehicle population is small and stable.
#[derive(Debug, Default)]
pub struct VehicleTracker {
    records: HashMap<String, KinematicRecord>,
}

impl VehicleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a new position sample: the current sample shifts to previous,
    /// the new one becomes current. Speed and heading are recomputed only
    /// when the new sample is strictly newer than the previous one; an
    /// out-of-order or duplicate sample must not corrupt kinematics with a
    /// non-positive time delta.
    pub fn apply(&mut self, vehicle_id: &str, sample: PositionSample) {
        let record = self.records.entry(vehicle_id.to_string()).or_default();

        if record.current.is_some() {
            record.previous = record.current.take();
        }
        record.current = Some(sample);

        if let (Some(prev), Some(curr)) = (record.previous, record.current) {
            let dt_secs = (curr.timestamp_ms - prev.timestamp_ms) as f64 / 1000.0;
            if dt_secs > 0.0 {
                let a = (prev.lat, prev.lon);
                let b = (curr.lat, curr.lon);
                record.speed_mps = Some(distance_meters(a, b) / dt_secs);
                record.heading_deg = Some(initial_bearing_degrees(a, b));
            }
        }
    }

    pub fn get(&self, vehicle_id: &str) -> Option<&KinematicRecord> {
        self.records.get(vehicle_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(lat: f64, lon: f64, timestamp_ms: i64) -> PositionSample {
        PositionSample {
            lat,
            lon,
            timestamp_ms,
        }
    }

    #[test]
    fn first_sample_has_no_derived_kinematics() {
        let mut tracker = VehicleTracker::new();
        tracker.apply("5", sample(56.9, 24.1, 1000));
        let rec = tracker.get("5").unwrap();
        assert!(rec.previous.is_none());
        assert!(rec.speed_mps.is_none());
        assert!(rec.heading_deg.is_none());
    }

    #[test]
    fn speed_and_heading_from_two_ordered_samples() {
        let mut tracker = VehicleTracker::new();
        tracker.apply("5", sample(0.0, 0.0, 1000));
        tracker.apply("5", sample(0.0, 0.01, 2000));

        let rec = tracker.get("5").unwrap();
        let expected = distance_meters((0.0, 0.0), (0.0, 0.01));
        assert_relative_eq!(rec.speed_mps.unwrap(), expected / 1.0, epsilon = 1e-9);
        assert_relative_eq!(rec.heading_deg.unwrap(), 90.0, epsilon = 1e-6);
        assert!(rec.speed_mps.unwrap() >= 0.0);
    }

    #[test]
    fn window_never_exceeds_two_samples() {
        let mut tracker = VehicleTracker::new();
        for i in 0..5 {
            tracker.apply("5", sample(0.0, 0.001 * i as f64, 1000 * i));
        }
        let rec = tracker.get("5").unwrap();
        assert_eq!(rec.previous.unwrap().timestamp_ms, 3000);
        assert_eq!(rec.current.unwrap().timestamp_ms, 4000);
    }

    #[test]
    fn regressed_timestamp_leaves_kinematics_untouched() {
        let mut tracker = VehicleTracker::new();
        tracker.apply("5", sample(0.0, 0.0, 1000));
        tracker.apply("5", sample(0.0, 0.01, 2000));
        let before = tracker.get("5").unwrap().clone();

        // Duplicate delivery: same timestamp
        tracker.apply("5", sample(0.0, 0.02, 2000));
        let rec = tracker.get("5").unwrap();
        assert_eq!(rec.speed_mps, before.speed_mps);
        assert_eq!(rec.heading_deg, before.heading_deg);
        // The window still shifted
        assert_eq!(rec.previous.unwrap().timestamp_ms, 2000);

        // Out-of-order delivery: older timestamp
        tracker.apply("5", sample(0.0, 0.03, 500));
        let rec = tracker.get("5").unwrap();
        assert_eq!(rec.speed_mps, before.speed_mps);
        assert_eq!(rec.heading_deg, before.heading_deg);
    }

    #[test]
    fn vehicles_are_tracked_independently() {
        let mut tracker = VehicleTracker::new();
        tracker.apply("a", sample(0.0, 0.0, 1000));
        tracker.apply("b", sample(1.0, 1.0, 1000));
        assert_eq!(tracker.len(), 2);
        assert!(tracker.get("a").unwrap().current.unwrap().lat == 0.0);
        assert!(tracker.get("b").unwrap().current.unwrap().lat == 1.0);
    }
}
