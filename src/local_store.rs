use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

/// Second tier of the two-tier repositories (venue settings, promotion
/// active keys). Remote-first callers fall back here when the record store
/// is unreachable or returns no row. Reads and writes swallow their own
/// errors: this store is never the source of truth.
pub trait LocalStore: Send + Sync {
    fn get_raw(&self, key: &str) -> Option<String>;
    fn put_raw(&self, key: &str, value: &str);
}

pub fn read_json<T: DeserializeOwned>(store: &dyn LocalStore, key: &str) -> Option<T> {
    let raw = store.get_raw(key)?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(key, error = %e, "local store entry is corrupt; ignoring");
            None
        }
    }
}

pub fn write_json<T: Serialize>(store: &dyn LocalStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.put_raw(key, &raw),
        Err(e) => warn!(key, error = %e, "failed to serialize local store entry"),
    }
}

/// One JSON file per key under a configured directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!(dir = %dir.display(), error = %e, "cannot create local store directory");
        }
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl LocalStore for FileStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Some(raw),
            Err(e) => {
                debug!(key, error = %e, "local store miss");
                None
            }
        }
    }

    fn put_raw(&self, key: &str, value: &str) {
        if let Err(e) = fs::write(self.path_for(key), value) {
            warn!(key, error = %e, "local store write failed");
        }
    }
}

/// In-memory store for unit tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<std::collections::HashMap<String, String>>,
}

impl LocalStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|m| m.get(key).cloned())
    }

    fn put_raw(&self, key: &str, value: &str) {
        if let Ok(mut m) = self.entries.lock() {
            m.insert(key.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::default();
        write_json(&store, "active_promotions", &vec!["happy_hour_beer_5to7"]);
        let keys: Option<Vec<String>> = read_json(&store, "active_promotions");
        assert_eq!(keys, Some(vec!["happy_hour_beer_5to7".to_string()]));
    }

    #[test]
    fn missing_key_reads_none() {
        let store = MemoryStore::default();
        let keys: Option<Vec<String>> = read_json(&store, "nope");
        assert!(keys.is_none());
    }

    #[test]
    fn corrupt_entry_reads_none() {
        let store = MemoryStore::default();
        store.put_raw("venue_settings", "{not json");
        let v: Option<serde_json::Value> = read_json(&store, "venue_settings");
        assert!(v.is_none());
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("barmenu-store-{}", uuid::Uuid::new_v4()));
        let store = FileStore::new(&dir);
        write_json(&store, "venue_settings", &serde_json::json!({"id": "default"}));
        let v: Option<serde_json::Value> = read_json(&store, "venue_settings");
        assert_eq!(v, Some(serde_json::json!({"id": "default"})));
        let _ = std::fs::remove_dir_all(dir);
    }
}
