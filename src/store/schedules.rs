//! Per-vehicle schedule storage.

use crate::model::ScheduledStop;

/// Replace-on-update store of upcoming stops per vehicle.
///
/// Backed by a Vec so vehicles keep their insertion order; prediction relies
/// on that order to break ties stably. The vehicle population is small, so
/// linear lookup is fine.
#[derive(Debug, Default)]
pub struct ScheduleStore {
    entries: Vec<(String, Vec<ScheduledStop>)>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the vehicle's entire stop list.
    pub fn replace(&mut self, vehicle_id: &str, stops: Vec<ScheduledStop>) {
        match self.entries.iter_mut().find(|(id, _)| id == vehicle_id) {
            Some((_, existing)) => *existing = stops,
            None => self.entries.push((vehicle_id.to_string(), stops)),
        }
    }

    pub fn get(&self, vehicle_id: &str) -> Option<&[ScheduledStop]> {
        self.entries
            .iter()
            .find(|(id, _)| id == vehicle_id)
            .map(|(_, stops)| stops.as_slice())
    }

    /// Schedules in vehicle insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ScheduledStop])> {
        self.entries
            .iter()
            .map(|(id, stops)| (id.as_str(), stops.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
