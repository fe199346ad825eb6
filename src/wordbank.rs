use crate::normalize::remove_accents;
use crate::provisioning::{RandomWordSource, SourceError};
use crate::WORD_LENGTH;
use rand::prelude::IndexedRandom;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

pub const EMBEDDED_WORDBANK: &str = include_str!("resources/palavras.txt");

/// Accent- and case-insensitive membership test against the accepted word list.
pub trait DictionaryValidator {
    /// # Errors
    ///
    /// Returns an error when the word list cannot be consulted.
    fn contains(&self, word: &str) -> io::Result<bool>;
}

fn is_valid_word(word: &str) -> bool {
    word.chars().count() == WORD_LENGTH && word.chars().all(char::is_alphabetic)
}

pub fn load_wordbank_from_str(data: &str) -> Vec<String> {
    data.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|word| is_valid_word(word))
        .collect()
}

pub fn load_wordbank_from_file<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut words = Vec::new();
    for line in reader.lines() {
        let word = line?.trim().to_lowercase();
        if is_valid_word(&word) {
            words.push(word);
        }
    }
    Ok(words)
}

/// Lowercase word list with an accent-folded index for lookups.
#[derive(Debug, Clone)]
pub struct WordBank {
    words: Vec<String>,
    normalized: HashSet<String>,
}

impl WordBank {
    #[must_use]
    pub fn new(words: Vec<String>) -> Self {
        let normalized = words.iter().map(|w| remove_accents(w)).collect();
        Self { words, normalized }
    }

    #[must_use]
    pub fn embedded() -> Self {
        Self::new(load_wordbank_from_str(EMBEDDED_WORDBANK))
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        load_wordbank_from_file(path).map(Self::new)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub fn is_accepted(&self, word: &str) -> bool {
        self.normalized.contains(&remove_accents(word.trim()))
    }
}

impl DictionaryValidator for WordBank {
    fn contains(&self, word: &str) -> io::Result<bool> {
        Ok(self.is_accepted(word))
    }
}

impl RandomWordSource for WordBank {
    fn random_word(&mut self) -> Result<String, SourceError> {
        self.words
            .choose(&mut rand::rng())
            .cloned()
            .ok_or(SourceError::EmptyWordList)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_wordbank_from_str_filters_and_lowercases() {
        let words = load_wordbank_from_str("TERMO\n  Sábio \nabc\ntermos\nter1o\n\n");
        assert_eq!(words, vec!["termo".to_string(), "sábio".to_string()]);
    }

    #[test]
    fn test_embedded_wordbank_is_well_formed() {
        let bank = WordBank::embedded();
        assert!(bank.len() > 100);
        assert!(bank.words.iter().all(|w| w.chars().count() == WORD_LENGTH));
        assert!(bank.is_accepted("termo"));
    }

    #[test]
    fn test_is_accepted_ignores_case_and_accents() {
        let bank = WordBank::new(vec!["sábio".to_string(), "termo".to_string()]);
        assert!(bank.is_accepted("SABIO"));
        assert!(bank.is_accepted("Sábio"));
        assert!(bank.is_accepted("TERMO"));
        assert!(!bank.is_accepted("MUNDO"));
    }

    #[test]
    fn test_dictionary_validator_impl() {
        let bank = WordBank::new(vec!["mundo".to_string()]);
        assert!(bank.contains("MUNDO").unwrap());
        assert!(!bank.contains("TERMO").unwrap());
    }

    #[test]
    fn test_random_word_comes_from_bank() {
        let mut bank = WordBank::new(vec!["mundo".to_string(), "termo".to_string()]);
        for _ in 0..20 {
            let word = bank.random_word().unwrap();
            assert!(word == "mundo" || word == "termo");
        }
    }

    #[test]
    fn test_random_word_empty_bank() {
        let mut bank = WordBank::new(Vec::new());
        assert!(bank.is_empty());
        assert!(matches!(bank.random_word(), Err(SourceError::EmptyWordList)));
    }

    #[test]
    fn test_load_wordbank_from_missing_file() {
        let path = std::env::temp_dir().join("termo_missing_wordbank_does_not_exist.txt");
        assert!(load_wordbank_from_file(path).is_err());
    }
}
