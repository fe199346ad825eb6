// Library interface for termo
// This allows integration tests to access internal modules

pub mod cli;
pub mod controller;
pub mod editor;
pub mod game_state;
pub mod logging;
pub mod mode;
pub mod normalize;
pub mod persistence;
pub mod provisioning;
pub mod stats;
pub mod status;
pub mod tui;
pub mod word_store;
pub mod wordbank;

/// Letters in every target word and guess.
pub const WORD_LENGTH: usize = 5;

// Re-export commonly used items for easier testing
pub use controller::{GameController, KeyInput, Notice};
pub use game_state::{Game, GameError, GameSession, GameStatus, SubmitOutcome};
pub use mode::GameMode;
pub use normalize::{add_accents, are_equal, remove_accents};
pub use status::{LetterStatus, calculate_letter_statuses};
pub use wordbank::{WordBank, load_wordbank_from_file, load_wordbank_from_str};
