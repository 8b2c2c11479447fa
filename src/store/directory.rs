//! The current known set of stations, with deferred-replacement support.

use crate::model::Station;

/// Full-replace snapshot store of the station catalog.
///
/// While `locked` (the user is interacting with the selector), replacements
/// are buffered instead of applied; only the most recent pending snapshot is
/// kept. The coordinator applies the pending snapshot, with selection
/// restoration, when the lock is released.
#[derive(Debug, Default)]
pub struct StationDirectory {
    stations: Vec<Station>,
    locked: bool,
    pending: Option<Vec<Station>>,
}

impl StationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn find(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.name == name)
    }

    pub fn first(&self) -> Option<&Station> {
        self.stations.first()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Unconditionally replace the catalog. Callers go through
    /// [`StationDirectory::submit`] unless applying a pending snapshot.
    pub fn replace(&mut self, stations: Vec<Station>) {
        self.stations = stations;
    }

    /// Replace the catalog, or defer if locked. Returns `true` when the
    /// snapshot was applied immediately.
    pub fn submit(&mut self, stations: Vec<Station>) -> bool {
        if self.locked {
            self.pending = Some(stations);
            false
        } else {
            self.stations = stations;
            true
        }
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Release the lock, handing back any snapshot that was deferred while it
    /// was held.
    pub fn unlock(&mut self) -> Option<Vec<Station>> {
        self.locked = false;
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str, name: &str) -> Station {
        Station {
            id: id.into(),
            name: name.into(),
            lat: 56.9,
            lon: 24.1,
        }
    }

    #[test]
    fn submit_applies_when_unlocked() {
        let mut dir = StationDirectory::new();
        assert!(dir.submit(vec![station("1", "Centrāls")]));
        assert_eq!(dir.stations().len(), 1);
        assert_eq!(dir.find("1").unwrap().name, "Centrāls");
        assert!(dir.find("2").is_none());
    }

    #[test]
    fn locked_directory_defers_and_keeps_only_latest_snapshot() {
        let mut dir = StationDirectory::new();
        dir.submit(vec![station("1", "Old")]);
        dir.lock();

        assert!(!dir.submit(vec![station("2", "Mid")]));
        assert!(!dir.submit(vec![station("3", "New")]));
        // The visible catalog is untouched while locked
        assert_eq!(dir.stations()[0].id, "1");

        let pending = dir.unlock().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "3");
        assert!(!dir.is_locked());
        // A second unlock has nothing pending
        assert!(dir.unlock().is_none());
    }
}
