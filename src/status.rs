use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-letter feedback. Variants are declared in ascending order of strength so
/// that `Ord` gives `Unused < Absent < Present < Correct`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LetterStatus {
    #[default]
    Unused,
    Absent,
    Present,
    Correct,
}

impl LetterStatus {
    /// Coloured square for the shareable result grid.
    #[must_use]
    pub fn share_square(self) -> char {
        match self {
            Self::Correct => '🟩',
            Self::Present => '🟨',
            Self::Absent | Self::Unused => '⬜',
        }
    }
}

/// Feedback for `guess` against `target`, one status per position.
///
/// Two passes over a multiset of the target's letters: exact matches first,
/// then misplaced letters while the letter still has budget left. Positions
/// beyond the shorter of the two words are `Absent`.
#[must_use]
pub fn calculate_letter_statuses(guess: &str, target: &str) -> Vec<LetterStatus> {
    let guess_chars: Vec<char> = guess.chars().collect();
    let target_chars: Vec<char> = target.chars().collect();
    let mut result = vec![LetterStatus::Absent; guess_chars.len()];

    let mut remaining: HashMap<char, usize> = HashMap::new();
    for &c in &target_chars {
        *remaining.entry(c).or_insert(0) += 1;
    }

    // First pass: greens
    for (i, &g) in guess_chars.iter().enumerate() {
        if target_chars.get(i) == Some(&g) {
            result[i] = LetterStatus::Correct;
            if let Some(count) = remaining.get_mut(&g) {
                *count -= 1;
            }
        }
    }

    // Second pass: yellows
    for (i, &g) in guess_chars.iter().enumerate() {
        if result[i] == LetterStatus::Correct {
            continue;
        }
        if let Some(count) = remaining.get_mut(&g)
            && *count > 0
        {
            result[i] = LetterStatus::Present;
            *count -= 1;
        }
    }

    result
}

/// Best status at `position` across every target word. A `Correct` in any
/// word wins immediately.
#[must_use]
pub fn best_letter_status<S: AsRef<str>>(position: usize, guess: &str, targets: &[S]) -> LetterStatus {
    let mut best = LetterStatus::Absent;
    for target in targets {
        match calculate_letter_statuses(guess, target.as_ref()).get(position) {
            Some(LetterStatus::Correct) => return LetterStatus::Correct,
            Some(LetterStatus::Present) => best = LetterStatus::Present,
            _ => {}
        }
    }
    best
}
