//! Daily target words keyed by `(date, mode)`.

use crate::mode::GameMode;
use crate::persistence::{StoreError, write_atomic};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub const DAILY_WORDS_FILE: &str = "daily_words.json";

pub trait WordStore {
    /// Stored words for `(date, mode)`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, date: NaiveDate, mode: GameMode) -> Result<Option<Vec<String>>, StoreError>;

    /// Insert or replace the words for `(date, mode)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn save(&mut self, date: NaiveDate, mode: GameMode, words: &[String]) -> Result<(), StoreError>;

    /// Remove every entry whose date is not `today`, giving up once `budget`
    /// has elapsed. Returns the number of entries removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] when the budget runs out, or an I/O
    /// error if the store cannot be updated.
    fn purge_except(&mut self, today: NaiveDate, budget: Duration) -> Result<usize, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWordRecord {
    pub date: NaiveDate,
    pub mode: GameMode,
    pub words: Vec<String>,
}

fn upsert(records: &mut Vec<DailyWordRecord>, date: NaiveDate, mode: GameMode, words: &[String]) {
    match records.iter_mut().find(|r| r.date == date && r.mode == mode) {
        Some(record) => record.words = words.to_vec(),
        None => records.push(DailyWordRecord {
            date,
            mode,
            words: words.to_vec(),
        }),
    }
}

/// Drop stale records one by one, checking the deadline between removals.
fn retain_today(
    records: &mut Vec<DailyWordRecord>,
    today: NaiveDate,
    budget: Duration,
) -> Result<usize, usize> {
    let deadline = Instant::now() + budget;
    let mut removed = 0;
    while let Some(index) = records.iter().position(|r| r.date != today) {
        if Instant::now() >= deadline {
            return Err(removed);
        }
        records.remove(index);
        removed += 1;
    }
    Ok(removed)
}

#[derive(Debug, Clone, Default)]
pub struct MemoryWordStore {
    records: Vec<DailyWordRecord>,
}

impl MemoryWordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[DailyWordRecord] {
        &self.records
    }
}

impl WordStore for MemoryWordStore {
    fn get(&self, date: NaiveDate, mode: GameMode) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self
            .records
            .iter()
            .find(|r| r.date == date && r.mode == mode)
            .map(|r| r.words.clone()))
    }

    fn save(&mut self, date: NaiveDate, mode: GameMode, words: &[String]) -> Result<(), StoreError> {
        upsert(&mut self.records, date, mode, words);
        Ok(())
    }

    fn purge_except(&mut self, today: NaiveDate, budget: Duration) -> Result<usize, StoreError> {
        retain_today(&mut self.records, today, budget).map_err(|removed| StoreError::Timeout { removed })
    }
}

/// All records in a single JSON file, rewritten atomically on every change.
#[derive(Debug, Clone)]
pub struct FileWordStore {
    path: PathBuf,
}

impl FileWordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A file that does not parse is treated as empty so the next write replaces it.
    fn read_records(&self) -> Result<Vec<DailyWordRecord>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed {}: {e}", self.path.display());
                Vec::new()
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_records(&self, records: &[DailyWordRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }
}

impl WordStore for FileWordStore {
    fn get(&self, date: NaiveDate, mode: GameMode) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self
            .read_records()?
            .into_iter()
            .find(|r| r.date == date && r.mode == mode)
            .map(|r| r.words))
    }

    fn save(&mut self, date: NaiveDate, mode: GameMode, words: &[String]) -> Result<(), StoreError> {
        let mut records = self.read_records()?;
        upsert(&mut records, date, mode, words);
        self.write_records(&records)
    }

    fn purge_except(&mut self, today: NaiveDate, budget: Duration) -> Result<usize, StoreError> {
        let mut records = self.read_records()?;
        let outcome = retain_today(&mut records, today, budget);
        let removed = match outcome {
            Ok(n) | Err(n) => n,
        };
        if removed > 0 {
            self.write_records(&records)?;
        }
        outcome.map_err(|removed| StoreError::Timeout { removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn test_memory_store_get_missing() {
        let store = MemoryWordStore::new();
        assert_eq!(store.get(day(1), GameMode::Normal).unwrap(), None);
    }

    #[test]
    fn test_memory_store_save_is_upsert() {
        let mut store = MemoryWordStore::new();
        store.save(day(1), GameMode::Normal, &words(&["TERMO"])).unwrap();
        store.save(day(1), GameMode::Normal, &words(&["MUNDO"])).unwrap();
        store.save(day(1), GameMode::Double, &words(&["CASAS", "PORTA"])).unwrap();
        assert_eq!(store.records().len(), 2);
        assert_eq!(store.get(day(1), GameMode::Normal).unwrap(), Some(words(&["MUNDO"])));
    }

    #[test]
    fn test_memory_store_purge_keeps_today() {
        let mut store = MemoryWordStore::new();
        store.save(day(1), GameMode::Normal, &words(&["TERMO"])).unwrap();
        store.save(day(2), GameMode::Normal, &words(&["MUNDO"])).unwrap();
        store.save(day(3), GameMode::Double, &words(&["CASAS", "PORTA"])).unwrap();
        let removed = store.purge_except(day(3), Duration::from_secs(5)).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.records().len(), 1);
        // Idempotent
        assert_eq!(store.purge_except(day(3), Duration::from_secs(5)).unwrap(), 0);
    }

    #[test]
    fn test_purge_with_zero_budget_times_out() {
        let mut store = MemoryWordStore::new();
        store.save(day(1), GameMode::Normal, &words(&["TERMO"])).unwrap();
        let result = store.purge_except(day(2), Duration::ZERO);
        assert!(matches!(result, Err(StoreError::Timeout { removed: 0 })));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = std::env::temp_dir().join(format!("termo_word_store_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join(DAILY_WORDS_FILE);

        let mut store = FileWordStore::new(&path);
        assert_eq!(store.get(day(4), GameMode::Normal).unwrap(), None);
        store.save(day(4), GameMode::Normal, &words(&["TERMO"])).unwrap();
        store.save(day(5), GameMode::Normal, &words(&["MUNDO"])).unwrap();

        let mut reopened = FileWordStore::new(&path);
        assert_eq!(reopened.get(day(4), GameMode::Normal).unwrap(), Some(words(&["TERMO"])));
        assert_eq!(reopened.purge_except(day(5), Duration::from_secs(5)).unwrap(), 1);
        assert_eq!(reopened.get(day(4), GameMode::Normal).unwrap(), None);
        assert_eq!(reopened.get(day(5), GameMode::Normal).unwrap(), Some(words(&["MUNDO"])));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_recovers_from_malformed_file() {
        let dir = std::env::temp_dir().join(format!("termo_word_store_bad_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(DAILY_WORDS_FILE);
        fs::write(&path, "{ truncated").unwrap();

        let mut store = FileWordStore::new(&path);
        assert_eq!(store.get(day(6), GameMode::Normal).unwrap(), None);
        assert_eq!(store.purge_except(day(6), Duration::from_secs(5)).unwrap(), 0);
        store.save(day(6), GameMode::Normal, &words(&["TERMO"])).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let records: Vec<DailyWordRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(store.get(day(6), GameMode::Normal).unwrap(), Some(words(&["TERMO"])));

        let _ = fs::remove_dir_all(&dir);
    }
}
