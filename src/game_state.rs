//! Game state machine.
//!
//! A [`GameSession`] is one mode's board: target words, submitted guesses, the
//! row being typed and the keyboard status map. [`Game`] holds one session per
//! mode plus the statistics book, so switching modes never discards progress.
//!
//! # State Machine
//! `Playing` → `Won` when every target word has been guessed, or `Playing` →
//! `Lost` when the attempt budget runs out. Only [`GameSession::reset`] goes
//! back to `Playing`.

use crate::editor::{Cursor, Direction, GuessBuffer};
use crate::mode::GameMode;
use crate::normalize::{add_accents, are_equal, fold_upper};
use crate::stats::{GameStats, StatsBook};
use crate::status::{LetterStatus, best_letter_status, calculate_letter_statuses};
use crate::wordbank::DictionaryValidator;
use crate::{WORD_LENGTH, debug_log, info_log};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Playing,
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("the game is over")]
    GameOver,
    #[error("incomplete guess: the word must have {WORD_LENGTH} letters")]
    IncompleteGuess,
    #[error("'{0}' is not in the word list")]
    InvalidWord(String),
    #[error("could not check the word list: {0}")]
    DictionaryUnavailable(String),
    #[error("the game changed before the guess was checked")]
    StaleSubmit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Continue,
    Won { attempts: usize },
    Lost,
}

/// Stands in for rows after a grid was solved in the share text.
const SOLVED_FILLER: char = '⬛';

/// Keyboard colouring, keyed by accent-free uppercase letter.
pub type LetterStatusMap = BTreeMap<char, LetterStatus>;

/// A guess that passed the local checks and is waiting for the dictionary.
///
/// Carries the mode and generation it was taken from; completing it after a
/// reset, a mode change or another submit yields [`GameError::StaleSubmit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmit {
    mode: GameMode,
    generation: u64,
    guess: String,
}

impl PendingSubmit {
    #[must_use]
    pub fn word(&self) -> &str {
        &self.guess
    }
}

/// Serialized form of a [`GameSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub target_words: Vec<String>,
    pub guesses: Vec<String>,
    pub current_guess: String,
    pub game_status: GameStatus,
    pub current_row: usize,
    pub letter_statuses: BTreeMap<String, LetterStatus>,
}

/// Serialized form of a [`Game`] (statistics are stored separately).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub game_mode: GameMode,
    pub sessions: BTreeMap<GameMode, SessionState>,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    mode: GameMode,
    target_words: Vec<String>,
    guesses: Vec<String>,
    buffer: GuessBuffer,
    cursors: Vec<Cursor>,
    active_grid: usize,
    status: GameStatus,
    current_row: usize,
    letter_statuses: LetterStatusMap,
    generation: u64,
}

impl GameSession {
    #[must_use]
    pub fn new(mode: GameMode, target_words: Vec<String>) -> Self {
        debug_assert_eq!(target_words.len(), mode.words_for_mode());
        let target_words: Vec<String> = target_words.into_iter().map(|w| w.to_uppercase()).collect();
        let grids = target_words.len().max(1);
        Self {
            mode,
            target_words,
            guesses: Vec::new(),
            buffer: GuessBuffer::new(),
            cursors: vec![Cursor::default(); grids],
            active_grid: 0,
            status: GameStatus::Playing,
            current_row: 0,
            letter_statuses: LetterStatusMap::new(),
            generation: 0,
        }
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub fn target_words(&self) -> &[String] {
        &self.target_words
    }

    #[must_use]
    pub fn guesses(&self) -> &[String] {
        &self.guesses
    }

    #[must_use]
    pub fn buffer(&self) -> &GuessBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub fn current_row(&self) -> usize {
        self.current_row
    }

    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.mode.max_attempts()
    }

    #[must_use]
    pub fn letter_statuses(&self) -> &LetterStatusMap {
        &self.letter_statuses
    }

    #[must_use]
    pub fn letter_status(&self, letter: char) -> LetterStatus {
        self.letter_statuses
            .get(&letter.to_ascii_uppercase())
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn active_grid(&self) -> usize {
        self.active_grid
    }

    #[must_use]
    pub fn grid_count(&self) -> usize {
        self.cursors.len()
    }

    /// Cursor of the active grid.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursors[self.active_grid].position()
    }

    #[must_use]
    pub fn cursor_for(&self, grid: usize) -> Option<usize> {
        self.cursors.get(grid).map(|c| c.position())
    }

    /// Row index of the guess that matched target `grid`, if any.
    #[must_use]
    pub fn solved_at(&self, grid: usize) -> Option<usize> {
        let target = self.target_words.get(grid)?;
        self.guesses.iter().position(|g| are_equal(g.trim(), target))
    }

    #[must_use]
    pub fn is_grid_solved(&self, grid: usize) -> bool {
        self.solved_at(grid).is_some()
    }

    fn all_solved(&self) -> bool {
        (0..self.target_words.len()).all(|grid| self.is_grid_solved(grid))
    }

    /// Whether key input currently reaches the buffer.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.status == GameStatus::Playing && !self.is_grid_solved(self.active_grid)
    }

    pub fn insert_letter(&mut self, letter: char) {
        if !self.can_edit() || !letter.is_alphabetic() {
            return;
        }
        let cursor = &mut self.cursors[self.active_grid];
        self.buffer.insert_letter(cursor, letter);
    }

    pub fn delete_at_cursor(&mut self) {
        if !self.can_edit() {
            return;
        }
        let cursor = &mut self.cursors[self.active_grid];
        self.buffer.delete_at_cursor(cursor);
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        if !self.can_edit() {
            return;
        }
        self.cursors[self.active_grid].move_by(direction);
    }

    pub fn set_cursor(&mut self, position: usize) {
        if !self.can_edit() {
            return;
        }
        self.cursors[self.active_grid].set(position);
    }

    /// Make `grid` the active grid. Solved or unknown grids are refused.
    pub fn select_grid(&mut self, grid: usize) -> bool {
        if self.status != GameStatus::Playing || grid >= self.grid_count() || self.is_grid_solved(grid) {
            return false;
        }
        self.active_grid = grid;
        true
    }

    /// Move to the next unsolved grid, wrapping around.
    pub fn cycle_grid(&mut self) -> bool {
        let count = self.grid_count();
        let next = (1..count)
            .map(|offset| (self.active_grid + offset) % count)
            .find(|&grid| !self.is_grid_solved(grid));
        next.is_some_and(|grid| self.select_grid(grid))
    }

    /// Validate the buffer locally and produce a ticket for the dictionary check.
    ///
    /// # Errors
    ///
    /// [`GameError::GameOver`] once the game has ended and
    /// [`GameError::IncompleteGuess`] while any cell is empty.
    pub fn begin_submit(&self) -> Result<PendingSubmit, GameError> {
        if self.status != GameStatus::Playing {
            return Err(GameError::GameOver);
        }
        if !self.buffer.is_complete() {
            return Err(GameError::IncompleteGuess);
        }
        Ok(PendingSubmit {
            mode: self.mode,
            generation: self.generation,
            guess: self.buffer.word(),
        })
    }

    /// Apply the dictionary verdict for `pending`.
    ///
    /// # Errors
    ///
    /// [`GameError::StaleSubmit`] if the session changed since the ticket was
    /// issued and [`GameError::InvalidWord`] if the dictionary rejected it.
    pub fn complete_submit(&mut self, pending: PendingSubmit, accepted: bool) -> Result<SubmitOutcome, GameError> {
        if pending.mode != self.mode || pending.generation != self.generation {
            debug_log!("Discarding stale submit of '{}'", pending.guess);
            return Err(GameError::StaleSubmit);
        }
        if self.status != GameStatus::Playing {
            return Err(GameError::GameOver);
        }
        if !accepted {
            return Err(GameError::InvalidWord(pending.guess));
        }
        Ok(self.apply_guess(&pending.guess))
    }

    /// Validate and submit the buffer in one call.
    ///
    /// # Errors
    ///
    /// Any of the validation errors of [`Self::begin_submit`] and
    /// [`Self::complete_submit`]; a dictionary failure is reported as
    /// [`GameError::DictionaryUnavailable`] and the guess is not accepted.
    pub fn submit_guess(&mut self, dictionary: &impl DictionaryValidator) -> Result<SubmitOutcome, GameError> {
        let pending = self.begin_submit()?;
        let accepted = dictionary
            .contains(pending.word())
            .map_err(|e| GameError::DictionaryUnavailable(e.to_string()))?;
        self.complete_submit(pending, accepted)
    }

    fn apply_guess(&mut self, word: &str) -> SubmitOutcome {
        let guess = self
            .target_words
            .iter()
            .find(|target| are_equal(word, target))
            .map_or_else(|| word.to_uppercase(), |target| add_accents(word, target));

        self.update_letter_statuses(&guess);
        self.guesses.push(guess);
        let attempts = self.guesses.len();

        let outcome = if self.all_solved() {
            self.status = GameStatus::Won;
            SubmitOutcome::Won { attempts }
        } else if attempts >= self.max_attempts() {
            self.status = GameStatus::Lost;
            SubmitOutcome::Lost
        } else {
            SubmitOutcome::Continue
        };

        self.buffer.clear();
        self.current_row += 1;
        self.cursors.fill(Cursor::default());
        if self.is_grid_solved(self.active_grid) {
            self.cycle_grid();
        }
        self.generation += 1;

        info_log!("Guess {attempts}/{} accepted: {outcome:?}", self.max_attempts());
        outcome
    }

    /// Raise each guessed letter to its best status across all targets; never downgrade.
    fn update_letter_statuses(&mut self, guess: &str) {
        let folded_guess = fold_upper(guess);
        let folded_targets: Vec<String> = self.target_words.iter().map(|t| fold_upper(t)).collect();
        for (position, letter) in folded_guess.chars().enumerate() {
            if letter == ' ' {
                continue;
            }
            let best = best_letter_status(position, &folded_guess, &folded_targets);
            let entry = self.letter_statuses.entry(letter).or_default();
            if best > *entry {
                *entry = best;
            }
        }
    }

    /// Tile colours for submitted `row` in `grid`. Rows after the one that
    /// solved the grid have no feedback.
    #[must_use]
    pub fn row_feedback(&self, row: usize, grid: usize) -> Option<Vec<LetterStatus>> {
        let guess = self.guesses.get(row)?;
        let target = self.target_words.get(grid)?;
        if self.solved_at(grid).is_some_and(|solved| row > solved) {
            return None;
        }
        Some(calculate_letter_statuses(&fold_upper(guess), &fold_upper(target)))
    }

    /// Result grid of a finished game without the letters: a header with the
    /// attempt count (`X` on a loss) and one row of squares per guess, grids side
    /// by side. `None` while the game is still being played.
    #[must_use]
    pub fn share_text(&self) -> Option<String> {
        let attempts = match self.status {
            GameStatus::Playing => return None,
            GameStatus::Won => self.guesses.len().to_string(),
            GameStatus::Lost => "X".to_string(),
        };
        let mut lines = vec![
            format!("TERMO {} {attempts}/{}", self.mode, self.max_attempts()),
            String::new(),
        ];
        for row in 0..self.guesses.len() {
            let grids: Vec<String> = (0..self.grid_count())
                .map(|grid| match self.row_feedback(row, grid) {
                    Some(feedback) => feedback.into_iter().map(LetterStatus::share_square).collect(),
                    None => SOLVED_FILLER.to_string().repeat(WORD_LENGTH),
                })
                .collect();
            lines.push(grids.join(" "));
        }
        Some(lines.join("\n"))
    }

    /// Back to an empty board with the same target words.
    pub fn reset(&mut self) {
        self.guesses.clear();
        self.buffer.clear();
        self.cursors.fill(Cursor::default());
        self.active_grid = 0;
        self.current_row = 0;
        self.letter_statuses.clear();
        self.status = GameStatus::Playing;
        self.generation += 1;
    }

    /// Drop the cursor and grid selection, keeping everything else.
    fn reset_selection(&mut self) {
        self.cursors.fill(Cursor::default());
        self.active_grid = 0;
        if self.is_grid_solved(0) {
            self.cycle_grid();
        }
        self.generation += 1;
    }

    #[must_use]
    pub fn to_state(&self) -> SessionState {
        SessionState {
            target_words: self.target_words.clone(),
            guesses: self.guesses.clone(),
            current_guess: self.buffer.padded(),
            game_status: self.status,
            current_row: self.current_row,
            letter_statuses: self
                .letter_statuses
                .iter()
                .map(|(letter, status)| (letter.to_string(), *status))
                .collect(),
        }
    }

    /// Rebuild a session from saved state, or `None` if it does not fit `mode`.
    #[must_use]
    pub fn from_state(mode: GameMode, state: SessionState) -> Option<Self> {
        let well_formed = state.target_words.len() == mode.words_for_mode()
            && state.guesses.len() <= mode.max_attempts()
            && state.guesses.iter().all(|g| g.chars().count() == WORD_LENGTH);
        if !well_formed {
            log::warn!("Ignoring saved {mode} session that does not match the mode");
            return None;
        }

        let mut session = Self::new(mode, state.target_words);
        session.guesses = state.guesses;
        session.buffer = GuessBuffer::from_padded(&state.current_guess);
        session.current_row = state.current_row.min(mode.max_attempts());
        session.status = state.game_status;
        session.letter_statuses = state
            .letter_statuses
            .into_iter()
            .filter_map(|(key, status)| {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(letter), None) => Some((letter, status)),
                    _ => None,
                }
            })
            .collect();
        if session.is_grid_solved(0) {
            session.cycle_grid();
        }
        Some(session)
    }
}

/// Every mode's session plus per-mode statistics.
#[derive(Debug, Clone)]
pub struct Game {
    mode: GameMode,
    sessions: BTreeMap<GameMode, GameSession>,
    stats: StatsBook,
}

impl Game {
    #[must_use]
    pub fn new(mode: GameMode, target_words: Vec<String>, stats: StatsBook) -> Self {
        let mut sessions = BTreeMap::new();
        sessions.insert(mode, GameSession::new(mode, target_words));
        Self { mode, sessions, stats }
    }

    /// Restore from a snapshot. Returns `None` when the snapshot has no usable
    /// session for its active mode.
    #[must_use]
    pub fn from_snapshot(snapshot: GameSnapshot, stats: StatsBook) -> Option<Self> {
        let sessions: BTreeMap<GameMode, GameSession> = snapshot
            .sessions
            .into_iter()
            .filter_map(|(mode, state)| GameSession::from_state(mode, state).map(|s| (mode, s)))
            .collect();
        if !sessions.contains_key(&snapshot.game_mode) {
            return None;
        }
        Some(Self {
            mode: snapshot.game_mode,
            sessions,
            stats,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            game_mode: self.mode,
            sessions: self
                .sessions
                .iter()
                .map(|(mode, session)| (*mode, session.to_state()))
                .collect(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub fn session(&self) -> &GameSession {
        &self.sessions[&self.mode]
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        self.sessions
            .get_mut(&self.mode)
            .unwrap_or_else(|| unreachable!("the active mode always has a session"))
    }

    #[must_use]
    pub fn has_session(&self, mode: GameMode) -> bool {
        self.sessions.contains_key(&mode)
    }

    #[must_use]
    pub fn stats(&self, mode: GameMode) -> GameStats {
        self.stats.get(mode)
    }

    #[must_use]
    pub fn stats_book(&self) -> &StatsBook {
        &self.stats
    }

    /// Make `mode` active. A mode seen for the first time gets a fresh session
    /// with the words from `provide`; a known mode keeps its board and only
    /// loses its cursor and grid selection.
    pub fn switch_mode(&mut self, mode: GameMode, provide: impl FnOnce(GameMode) -> Vec<String>) {
        if mode == self.mode {
            return;
        }
        match self.sessions.get_mut(&mode) {
            Some(session) => session.reset_selection(),
            None => {
                let words = provide(mode);
                self.sessions.insert(mode, GameSession::new(mode, words));
            }
        }
        info_log!("Switched mode {} -> {mode}", self.mode);
        self.mode = mode;
    }

    /// Submit the active session's buffer and record the result if the game ended.
    ///
    /// # Errors
    ///
    /// See [`GameSession::submit_guess`].
    pub fn submit_guess(&mut self, dictionary: &impl DictionaryValidator) -> Result<SubmitOutcome, GameError> {
        let outcome = self.session_mut().submit_guess(dictionary)?;
        self.record_outcome(outcome);
        Ok(outcome)
    }

    /// # Errors
    ///
    /// See [`GameSession::begin_submit`].
    pub fn begin_submit(&self) -> Result<PendingSubmit, GameError> {
        self.session().begin_submit()
    }

    /// Apply a dictionary verdict obtained outside the game loop.
    ///
    /// # Errors
    ///
    /// [`GameError::StaleSubmit`] when the ticket belongs to another mode or an
    /// older generation; otherwise see [`GameSession::complete_submit`].
    pub fn complete_submit(&mut self, pending: PendingSubmit, accepted: bool) -> Result<SubmitOutcome, GameError> {
        if pending.mode != self.mode {
            return Err(GameError::StaleSubmit);
        }
        let outcome = self.session_mut().complete_submit(pending, accepted)?;
        self.record_outcome(outcome);
        Ok(outcome)
    }

    fn record_outcome(&mut self, outcome: SubmitOutcome) {
        let stats = self.stats.get_mut(self.mode);
        match outcome {
            SubmitOutcome::Continue => {}
            SubmitOutcome::Won { attempts } => stats.record_win(attempts),
            SubmitOutcome::Lost => stats.record_loss(),
        }
    }

    pub fn reset_game(&mut self) {
        self.session_mut().reset();
    }
}
