//! Daily target words: read once per `(day, mode)` from the word store,
//! generated and saved on first use, with a built-in list as the last resort.

use crate::mode::GameMode;
use crate::persistence::StoreError;
use crate::word_store::WordStore;
use crate::{debug_log, info_log};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use std::time::Duration;
use thiserror::Error;

/// Draws per word before a suffix is appended to force uniqueness.
pub const MAX_DRAW_ATTEMPTS: usize = 50;
/// Time allowed for purging old entries before giving up.
pub const PURGE_BUDGET: Duration = Duration::from_millis(500);
pub const FALLBACK_WORDS: [&str; 4] = ["TERMO", "MUNDO", "CASAS", "PORTA"];

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("the word list is empty")]
    EmptyWordList,
    #[error("word source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
enum ProvisionError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub trait RandomWordSource {
    /// A single lowercase word drawn uniformly from the list.
    ///
    /// # Errors
    ///
    /// Returns an error if no word can be produced.
    fn random_word(&mut self) -> Result<String, SourceError>;
}

#[must_use]
pub fn fallback_words(mode: GameMode) -> Vec<String> {
    FALLBACK_WORDS
        .iter()
        .take(mode.words_for_mode())
        .map(|w| (*w).to_string())
        .collect()
}

/// Current calendar day in UTC.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Time left until the next UTC midnight, when new words are drawn.
#[must_use]
pub fn time_until_next_word(now: DateTime<Utc>) -> ChronoDuration {
    let Some(midnight) = now.date_naive().succ_opt().and_then(|d| d.and_hms_opt(0, 0, 0)) else {
        return ChronoDuration::zero();
    };
    (midnight.and_utc() - now).max(ChronoDuration::zero())
}

/// `HH:MM:SS` rendering of a countdown.
#[must_use]
pub fn format_countdown(remaining: ChronoDuration) -> String {
    let total = remaining.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

pub struct DailyWordService<W, R> {
    store: W,
    source: R,
}

impl<W: WordStore, R: RandomWordSource> DailyWordService<W, R> {
    pub fn new(store: W, source: R) -> Self {
        Self { store, source }
    }

    #[must_use]
    pub fn store(&self) -> &W {
        &self.store
    }

    /// Target words for `mode` on `today`; never fails.
    pub fn get_target_words(&mut self, mode: GameMode, today: NaiveDate) -> Vec<String> {
        self.purge_old_words(today);
        match self.load_or_generate(mode, today) {
            Ok(words) => words,
            Err(e) => {
                log::warn!("Falling back to built-in words for {mode}: {e}");
                fallback_words(mode)
            }
        }
    }

    fn purge_old_words(&mut self, today: NaiveDate) {
        match self.store.purge_except(today, PURGE_BUDGET) {
            Ok(0) => {}
            Ok(removed) => {
                info_log!("Removed {removed} old daily word entries");
            }
            Err(e) => log::warn!("Could not purge old daily words: {e}"),
        }
    }

    fn load_or_generate(&mut self, mode: GameMode, today: NaiveDate) -> Result<Vec<String>, ProvisionError> {
        match self.store.get(today, mode)? {
            Some(words) if words.len() == mode.words_for_mode() => {
                debug_log!("Using stored words for {mode} on {today}");
                return Ok(words);
            }
            Some(words) => {
                log::warn!(
                    "Stored words for {mode} on {today} have {} entries, expected {}; drawing again",
                    words.len(),
                    mode.words_for_mode()
                );
            }
            None => {}
        }

        let words = self.generate_words(mode)?;
        info_log!("Generated {} new word(s) for {mode} on {today}", words.len());
        self.store.save(today, mode, &words)?;
        Ok(words)
    }

    fn generate_words(&mut self, mode: GameMode) -> Result<Vec<String>, SourceError> {
        let needed = mode.words_for_mode();
        let mut words: Vec<String> = Vec::with_capacity(needed);
        for index in 0..needed {
            let mut attempts = 0;
            let word = loop {
                let candidate = self.source.random_word()?.to_uppercase();
                attempts += 1;
                if !words.contains(&candidate) {
                    break candidate;
                }
                if attempts >= MAX_DRAW_ATTEMPTS {
                    log::warn!("No unique word after {attempts} draws, disambiguating '{candidate}'");
                    break format!("{candidate}_{index}");
                }
            };
            words.push(word);
        }
        Ok(words)
    }
}
