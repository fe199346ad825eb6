//! Opaque key-value persistence for the session snapshot and statistics.
//!
//! Values are JSON documents. [`FileStore`] keeps one file per key in the data
//! directory and [`MemoryStore`] keeps everything in a map for tests and
//! `--memory` runs.

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const STATS_KEY: &str = "stats";
const APP_DIR_NAME: &str = "termo";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("stored data is malformed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("operation ran out of time after removing {removed} entries")]
    Timeout { removed: usize },
}

pub trait KeyValueStore {
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn store(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be removed.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Key of the session snapshot for `day`.
#[must_use]
pub fn session_key(day: NaiveDate) -> String {
    format!("session-{}", day.format("%Y-%m-%d"))
}

/// Default data directory, e.g. `~/.local/share/termo` on Linux.
#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_DIR_NAME))
}

/// # Errors
///
/// Returns an error if the value cannot be read or does not parse as `T`.
pub fn load_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.load(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// # Errors
///
/// Returns an error if the value cannot be serialized or written.
pub fn save_json<T: Serialize>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value)?;
    store.store(key, &json)
}

/// Write `contents` to a sibling temp file, then rename it over `path`.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        write_atomic(&self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::GameMode;
    use crate::stats::StatsBook;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("termo_persistence_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_session_key_format() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(session_key(day), "session-2024-03-09");
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load("a").unwrap(), None);
        store.store("a", "1").unwrap();
        assert_eq!(store.load("a").unwrap(), Some("1".to_string()));
        store.remove("a").unwrap();
        assert!(!store.contains_key("a"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = temp_dir("round_trip");
        let mut store = FileStore::new(&dir);
        assert_eq!(store.load("stats").unwrap(), None);
        store.store("stats", "{}").unwrap();
        assert_eq!(store.load("stats").unwrap(), Some("{}".to_string()));
        assert!(dir.join("stats.json").exists());
        store.remove("stats").unwrap();
        store.remove("stats").unwrap();
        assert_eq!(store.load("stats").unwrap(), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let store = FileStore::new("/data");
        assert_eq!(store.path_for("../evil key"), PathBuf::from("/data/___evil_key.json"));
    }

    #[test]
    fn test_json_helpers_with_stats() {
        let mut store = MemoryStore::new();
        let mut book = StatsBook::default();
        book.get_mut(GameMode::Double).record_win(5);
        save_json(&mut store, STATS_KEY, &book).unwrap();
        let loaded: StatsBook = load_json(&store, STATS_KEY).unwrap().unwrap();
        assert_eq!(loaded, book);
    }

    #[test]
    fn test_load_json_malformed() {
        let mut store = MemoryStore::new();
        store.store(STATS_KEY, "not json").unwrap();
        let loaded: Result<Option<StatsBook>, _> = load_json(&store, STATS_KEY);
        assert!(matches!(loaded, Err(StoreError::Serde(_))));
    }
}
