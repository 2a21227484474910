// Persisted key-value preferences backed by a JSON file.

use std::fs;
use std::io;
use std::path::PathBuf;

use bevy::prelude::*;
use directories::ProjectDirs;
use serde_json::{Map, Value};

const PREFS_FILE: &str = "prefs.json";

/// String/float key-value store with get/set/save semantics. Values live in
/// memory; `save` writes the whole map through to disk. A missing or
/// unreadable file yields an empty store.
#[derive(Resource)]
pub struct PrefStore {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl PrefStore {
    /// Load from the platform config directory.
    pub fn load_default() -> Self {
        let Some(dirs) = ProjectDirs::from("", "", "gatefall") else {
            warn!("no config directory available, preferences will not persist");
            return Self::in_memory();
        };
        Self::load_from(dirs.config_dir().join(PREFS_FILE))
    }

    /// Load from an explicit path. Used by tests to simulate restarts.
    pub fn load_from(path: PathBuf) -> Self {
        let values = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(values) => values,
                Err(err) => {
                    warn!("unreadable preferences at {}: {err}", path.display());
                    Map::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("no preferences file yet, starting fresh");
                Map::new()
            }
            Err(err) => {
                warn!("failed to read preferences at {}: {err}", path.display());
                Map::new()
            }
        };
        Self {
            path: Some(path),
            values,
        }
    }

    /// A store with no backing file. `save` is a no-op.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Map::new(),
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn set_str(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), Value::from(value));
    }

    pub fn get_f32(&self, key: &str) -> Option<f32> {
        self.values.get(key).and_then(Value::as_f64).map(|v| v as f32)
    }

    pub fn set_f32(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_owned(), Value::from(value as f64));
    }

    /// Write the store through to disk. Failure is logged and the in-memory
    /// state stays authoritative for the session.
    pub fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(err) = self.write_to(path) {
            error!("failed to save preferences to {}: {err}", path.display());
        }
    }

    fn write_to(&self, path: &PathBuf) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, text)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Unique temp path per test so round-trips don't collide.
    pub(crate) fn temp_prefs_path(tag: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "gatefall-test-{}-{tag}.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn missing_file_yields_empty_store() {
        let store = PrefStore::load_from(temp_prefs_path("missing"));
        assert_eq!(store.get_str("UnlockedLevel_1"), None);
        assert_eq!(store.get_f32("MasterVolume"), None);
    }

    #[test]
    fn values_round_trip_through_disk() {
        let path = temp_prefs_path("roundtrip");

        let mut store = PrefStore::load_from(path.clone());
        store.set_str("UnlockedLevel_2", "1");
        store.set_f32("MasterVolume", 0.35);
        store.save();

        let reloaded = PrefStore::load_from(path.clone());
        assert_eq!(reloaded.get_str("UnlockedLevel_2"), Some("1"));
        let volume = reloaded.get_f32("MasterVolume").unwrap();
        assert!((volume - 0.35).abs() < 1e-6);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn in_memory_store_accepts_writes_without_a_file() {
        let mut store = PrefStore::in_memory();
        store.set_str("UnlockedLevel_1", "1");
        store.save();
        assert_eq!(store.get_str("UnlockedLevel_1"), Some("1"));
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let path = temp_prefs_path("corrupt");
        fs::write(&path, "not json").unwrap();
        let store = PrefStore::load_from(path.clone());
        assert_eq!(store.get_str("anything"), None);
        let _ = fs::remove_file(&path);
    }
}
