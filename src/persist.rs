//! Best-effort key-value persistence for the station cache and selection.
//!
//! The cache is never authoritative: any I/O or parse failure is logged and
//! swallowed, and the engine carries on with whatever state it has.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::warn;

pub const STATIONS_KEY: &str = "stations";
pub const SELECTED_STATION_KEY: &str = "selectedStationId";

pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// JSON-file-backed store, loaded once at startup and rewritten on each set.
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileKvStore {
    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable cache file");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self { path, entries }
    }

    fn flush(&self) {
        let result = serde_json::to_string_pretty(&self.entries)
            .map_err(std::io::Error::other)
            .and_then(|raw| fs::write(&self.path, raw));
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "failed to write cache file");
        }
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush();
    }
}

/// In-memory store for tests and for running without a cache file.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: HashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}
