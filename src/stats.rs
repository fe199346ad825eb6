use crate::mode::GameMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub games_played: u32,
    pub games_won: u32,
    pub current_streak: u32,
    pub max_streak: u32,
    /// `guess_distribution[k]` counts wins in exactly `k + 1` attempts.
    pub guess_distribution: Vec<u32>,
}

impl GameStats {
    #[must_use]
    pub fn new(mode: GameMode) -> Self {
        Self {
            games_played: 0,
            games_won: 0,
            current_streak: 0,
            max_streak: 0,
            guess_distribution: vec![0; mode.max_attempts()],
        }
    }

    pub fn record_win(&mut self, attempts: usize) {
        self.games_played += 1;
        self.games_won += 1;
        self.current_streak += 1;
        self.max_streak = self.max_streak.max(self.current_streak);
        if attempts == 0 {
            return;
        }
        if self.guess_distribution.len() < attempts {
            self.guess_distribution.resize(attempts, 0);
        }
        self.guess_distribution[attempts - 1] += 1;
    }

    pub fn record_loss(&mut self) {
        self.games_played += 1;
        self.current_streak = 0;
    }

    /// Whole-number win rate, 0 when nothing has been played.
    #[must_use]
    pub fn win_percentage(&self) -> u32 {
        if self.games_played == 0 {
            0
        } else {
            self.games_won * 100 / self.games_played
        }
    }
}

/// Statistics for every mode, kept apart so one mode never touches another's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsBook {
    modes: BTreeMap<GameMode, GameStats>,
}

impl StatsBook {
    #[must_use]
    pub fn get(&self, mode: GameMode) -> GameStats {
        self.modes.get(&mode).cloned().unwrap_or_else(|| GameStats::new(mode))
    }

    pub fn get_mut(&mut self, mode: GameMode) -> &mut GameStats {
        self.modes.entry(mode).or_insert_with(|| GameStats::new(mode))
    }
}
