//! The coordinator: owns every store, applies normalized messages, resolves
//! the user's selection across catalog replacements, and produces the ranked
//! next-arrivals list plus the live countdown.

pub mod countdown;
pub mod predict;

pub use countdown::Countdown;

use serde_json::Value;
use tracing::{debug, trace};

use crate::geo::angular_difference;
use crate::model::{now_ms, Candidate, Station};
use crate::normalize;
use crate::persist::{KvStore, SELECTED_STATION_KEY, STATIONS_KEY};
use crate::render::{format_eta, Renderer};
use crate::store::{ScheduleStore, StationDirectory, VehicleTracker};

pub struct Engine<R: Renderer, K: KvStore> {
    directory: StationDirectory,
    schedules: ScheduleStore,
    tracker: VehicleTracker,
    /// The station the predictions are for.
    selected: Option<Station>,
    /// The literal value shown in the external selector. Usually equals the
    /// selected id, but external code may move the selector independently,
    /// and restoration deliberately trusts the selector first.
    selector_value: Option<String>,
    next_up: Vec<Candidate>,
    renderer: R,
    kv: K,
}

impl<R: Renderer, K: KvStore> Engine<R, K> {
    /// Build the engine, seeding the station directory and selection from
    /// the cache so the display is not empty before the first catalog
    /// message arrives.
    pub fn new(renderer: R, kv: K) -> Self {
        let mut engine = Self {
            directory: StationDirectory::new(),
            schedules: ScheduleStore::new(),
            tracker: VehicleTracker::new(),
            selected: None,
            selector_value: None,
            next_up: Vec::new(),
            renderer,
            kv,
        };
        engine.restore_from_cache();
        engine
    }

    fn restore_from_cache(&mut self) {
        let Some(raw) = self.kv.get(STATIONS_KEY) else {
            return;
        };
        let stations: Vec<Station> = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                debug!(error = %e, "ignoring unreadable cached station list");
                return;
            }
        };
        if stations.is_empty() {
            return;
        }
        self.directory.replace(stations);

        let selected = self
            .kv
            .get(SELECTED_STATION_KEY)
            .and_then(|id| self.directory.find(&id))
            .or_else(|| self.directory.first())
            .cloned();
        self.selector_value = selected.as_ref().map(|s| s.id.clone());
        self.selected = selected;

        self.renderer
            .stations(self.directory.stations(), self.selected.as_ref());
        self.renderer.status("station list restored from cache");
    }

    /// Process one decoded feed message. `observed_ms` is the reception
    /// instant. Returns whether a non-empty next-arrivals list is current,
    /// which the caller uses to restart the countdown.
    pub fn handle_message(&mut self, msg: &Value, observed_ms: i64) -> bool {
        let normalized = normalize::normalize(msg, observed_ms);
        if normalized.is_unrecognized() {
            trace!("unrecognized message shape");
            return false;
        }

        if let Some(stations) = normalized.stations {
            debug!(count = stations.len(), "station catalog update");
            self.apply_catalog(stations, observed_ms);
        }

        let store_updates = !normalized.schedules.is_empty() || !normalized.positions.is_empty();

        if !normalized.schedules.is_empty() {
            for update in normalized.schedules {
                self.schedules.replace(&update.vehicle_id, update.stops);
            }
            debug!(vehicles = self.schedules.len(), "schedules updated");
        }

        for update in normalized.positions {
            let prior_heading = self
                .tracker
                .get(&update.vehicle_id)
                .and_then(|r| r.heading_deg);
            self.tracker.apply(&update.vehicle_id, update.sample);
            if let Some(record) = self.tracker.get(&update.vehicle_id) {
                if let (Some(speed), Some(heading)) = (record.speed_mps, record.heading_deg) {
                    let turn = prior_heading.map(|h| angular_difference(h, heading));
                    trace!(
                        vehicle = %update.vehicle_id,
                        speed_mps = speed,
                        heading_deg = heading,
                        turn_deg = turn,
                        "kinematics updated"
                    );
                }
            }
        }

        if store_updates {
            self.refresh(observed_ms);
        }
        !self.next_up.is_empty()
    }

    /// Select a station by id, or by exact name when no id matches, and
    /// re-predict. The selection is persisted only when it resolves against
    /// the current directory; the selector value tracks the resolved id so
    /// later restorations work off the id even for a name-based selection.
    pub fn select(&mut self, station: &str) {
        self.selected = self
            .directory
            .find(station)
            .or_else(|| self.directory.find_by_name(station))
            .cloned();
        self.selector_value = match &self.selected {
            Some(s) => Some(s.id.clone()),
            None => Some(station.to_string()),
        };
        if let Some(s) = &self.selected {
            self.kv.set(SELECTED_STATION_KEY, &s.id);
        }
        self.renderer
            .stations(self.directory.stations(), self.selected.as_ref());
        self.refresh(now_ms());
    }

    /// The user started interacting with the selector: catalog replacements
    /// are deferred until [`Engine::unlock`].
    pub fn lock(&mut self) {
        self.directory.lock();
    }

    /// The interaction ended; apply any catalog snapshot deferred meanwhile.
    pub fn unlock(&mut self) {
        if let Some(pending) = self.directory.unlock() {
            self.directory.replace(pending);
            self.after_catalog_replacement(now_ms());
        }
    }

    fn apply_catalog(&mut self, stations: Vec<Station>, observed_ms: i64) {
        // Cache the snapshot even when its application is deferred.
        if let Ok(raw) = serde_json::to_string(&stations) {
            self.kv.set(STATIONS_KEY, &raw);
        }
        if self.directory.submit(stations) {
            self.after_catalog_replacement(observed_ms);
        } else {
            self.renderer
                .status("stations update pending while selector locked");
        }
    }

    fn after_catalog_replacement(&mut self, observed_ms: i64) {
        self.restore_selection();
        self.renderer
            .stations(self.directory.stations(), self.selected.as_ref());
        self.renderer.status("stations updated from feed");
        self.refresh(observed_ms);
    }

    /// Keep the user's selection stable across a catalog replacement.
    /// Strict priority: the literal selector value, the previously selected
    /// id, the persisted id, a name match against the previous selection,
    /// and finally the first station of the new catalog.
    fn restore_selection(&mut self) {
        let previous = self.selected.take();
        let resolved = self
            .selector_value
            .as_deref()
            .and_then(|v| self.directory.find(v))
            .or_else(|| previous.as_ref().and_then(|s| self.directory.find(&s.id)))
            .or_else(|| {
                self.kv
                    .get(SELECTED_STATION_KEY)
                    .and_then(|id| self.directory.find(&id))
            })
            .or_else(|| {
                previous
                    .as_ref()
                    .and_then(|s| self.directory.find_by_name(&s.name))
            })
            .or_else(|| self.directory.first())
            .cloned();
        self.selector_value = resolved.as_ref().map(|s| s.id.clone());
        self.selected = resolved;
    }

    /// Recompute and publish the ranked next arrivals for the current
    /// selection at `now_ms`.
    pub fn refresh(&mut self, now_ms: i64) {
        let Some(selected) = self.selected.clone() else {
            self.next_up.clear();
            self.renderer.arrivals(&[]);
            self.renderer.status("no station selected");
            self.renderer.countdown("–");
            return;
        };

        self.next_up = predict::predict(&self.schedules, &selected, now_ms);
        self.renderer.arrivals(&self.next_up);
        if self.next_up.is_empty() {
            self.renderer.status("no upcoming trains");
        }
        self.tick(now_ms);
    }

    /// One countdown tick. Shows the neutral placeholder when nothing is
    /// upcoming; otherwise shows the live countdown for the top arrival and,
    /// once it has elapsed, re-predicts so the list heals itself.
    pub fn tick(&mut self, now_ms: i64) {
        let Some(top) = self.next_up.first() else {
            self.renderer.countdown("–");
            return;
        };
        let seconds = (((top.departure_ms - now_ms) as f64) / 1000.0)
            .round()
            .max(0.0) as i64;
        self.renderer.countdown(&format_eta(seconds));
        if seconds <= 0 {
            self.refresh(now_ms);
        }
    }

    pub fn set_status(&mut self, text: &str) {
        self.renderer.status(text);
    }

    pub fn next_up(&self) -> &[Candidate] {
        &self.next_up
    }

    #[cfg(test)]
    fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|s| s.id.as_str())
    }
}
