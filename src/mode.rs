use serde::{Deserialize, Serialize};
use std::fmt;

/// Game variant: how many target words are guessed at once and the attempt budget.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Normal,
    Double,
    Quadruple,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Normal, GameMode::Double, GameMode::Quadruple];

    #[must_use]
    pub fn words_for_mode(self) -> usize {
        match self {
            Self::Normal => 1,
            Self::Double => 2,
            Self::Quadruple => 4,
        }
    }

    #[must_use]
    pub fn max_attempts(self) -> usize {
        match self {
            Self::Normal => 6,
            Self::Double => 9,
            Self::Quadruple => 10,
        }
    }

    /// Key used by the word store and the session snapshot.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Double => "double",
            Self::Quadruple => "quadruple",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
