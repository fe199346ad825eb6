//! Input events in, engine calls and persistence out.
//!
//! The controller owns the [`Game`] and its collaborators. Every event that can
//! change state is followed by a session write, and a finished game also writes
//! the statistics.

use crate::editor::Direction;
use crate::game_state::{Game, GameError, GameSnapshot, GameStatus, SubmitOutcome};
use crate::mode::GameMode;
use crate::persistence::{KeyValueStore, STATS_KEY, load_json, save_json, session_key};
use crate::provisioning::{DailyWordService, RandomWordSource};
use crate::stats::StatsBook;
use crate::word_store::WordStore;
use crate::wordbank::DictionaryValidator;
use crate::{debug_log, info_log};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Letter(char),
    Enter,
    Backspace,
    Left,
    Right,
}

/// What the front end should tell the player after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    None,
    Rejected(GameError),
    Submitted(SubmitOutcome),
}

pub struct GameController<D, W, R, K> {
    game: Game,
    dictionary: D,
    daily_words: DailyWordService<W, R>,
    store: K,
    day: NaiveDate,
}

impl<D, W, R, K> GameController<D, W, R, K>
where
    D: DictionaryValidator,
    W: WordStore,
    R: RandomWordSource,
    K: KeyValueStore,
{
    /// Restore today's session from `store` if there is one, otherwise start
    /// `mode` with freshly provisioned words. An explicit `mode` is switched
    /// to after restoring.
    pub fn new(
        dictionary: D,
        mut daily_words: DailyWordService<W, R>,
        store: K,
        day: NaiveDate,
        mode: Option<GameMode>,
    ) -> Self {
        let stats = load_json::<StatsBook>(&store, STATS_KEY)
            .unwrap_or_else(|e| {
                log::warn!("Could not read statistics, starting fresh: {e}");
                None
            })
            .unwrap_or_default();

        let game = Self::load_or_start(&store, &mut daily_words, day, mode.unwrap_or(GameMode::Normal), stats);

        let mut controller = Self {
            game,
            dictionary,
            daily_words,
            store,
            day,
        };
        if let Some(mode) = mode {
            controller.change_mode(mode);
        }
        controller
    }

    /// Today's saved session, or a fresh game in `start` with provisioned words.
    fn load_or_start(
        store: &K,
        daily_words: &mut DailyWordService<W, R>,
        day: NaiveDate,
        start: GameMode,
        stats: StatsBook,
    ) -> Game {
        let restored = load_json::<GameSnapshot>(store, &session_key(day))
            .unwrap_or_else(|e| {
                log::warn!("Could not read saved session: {e}");
                None
            })
            .and_then(|snapshot| Game::from_snapshot(snapshot, stats.clone()));

        match restored {
            Some(game) => {
                info_log!("Restored session for {day} in {} mode", game.mode());
                game
            }
            None => {
                let words = daily_words.get_target_words(start, day);
                Game::new(start, words, stats)
            }
        }
    }

    #[must_use]
    pub fn game(&self) -> &Game {
        &self.game
    }

    #[must_use]
    pub fn store(&self) -> &K {
        &self.store
    }

    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn handle_key(&mut self, key: KeyInput) -> Notice {
        if self.game.session().status() != GameStatus::Playing {
            return Notice::None;
        }
        let notice = match key {
            KeyInput::Enter => return self.submit(),
            KeyInput::Letter(c) => {
                self.game.session_mut().insert_letter(c);
                Notice::None
            }
            KeyInput::Backspace => {
                self.game.session_mut().delete_at_cursor();
                Notice::None
            }
            KeyInput::Left => {
                self.game.session_mut().move_cursor(Direction::Left);
                Notice::None
            }
            KeyInput::Right => {
                self.game.session_mut().move_cursor(Direction::Right);
                Notice::None
            }
        };
        self.persist_session();
        notice
    }

    pub fn click_tile(&mut self, position: usize) {
        self.game.session_mut().set_cursor(position);
        self.persist_session();
    }

    pub fn click_grid(&mut self, grid: usize) {
        if self.game.session_mut().select_grid(grid) {
            self.persist_session();
        }
    }

    pub fn cycle_grid(&mut self) {
        if self.game.session_mut().cycle_grid() {
            self.persist_session();
        }
    }

    pub fn submit(&mut self) -> Notice {
        match self.game.submit_guess(&self.dictionary) {
            Ok(outcome) => {
                if outcome != SubmitOutcome::Continue {
                    self.persist_stats();
                }
                self.persist_session();
                Notice::Submitted(outcome)
            }
            Err(e) => {
                debug_log!("Guess rejected: {e}");
                Notice::Rejected(e)
            }
        }
    }

    pub fn change_mode(&mut self, mode: GameMode) {
        if mode == self.game.mode() {
            return;
        }
        let day = self.day;
        let daily_words = &mut self.daily_words;
        self.game.switch_mode(mode, |m| daily_words.get_target_words(m, day));
        self.persist_session();
    }

    pub fn reset(&mut self) {
        self.game.reset_game();
        self.persist_session();
    }

    /// Move to `today` once the UTC date has advanced. The previous day's
    /// session is removed and the current mode starts over with the new
    /// day's words; statistics carry over. Returns whether the day changed.
    pub fn refresh_day(&mut self, today: NaiveDate) -> bool {
        if today <= self.day {
            return false;
        }
        info_log!("Day changed from {} to {today}", self.day);
        if let Err(e) = self.store.remove(&session_key(self.day)) {
            log::warn!("Could not remove the session for {}: {e}", self.day);
        }

        let mode = self.game.mode();
        let stats = self.game.stats_book().clone();
        self.day = today;
        self.game = Self::load_or_start(&self.store, &mut self.daily_words, today, mode, stats);
        self.persist_session();
        true
    }

    fn persist_session(&mut self) {
        let key = session_key(self.day);
        if let Err(e) = save_json(&mut self.store, &key, &self.game.snapshot()) {
            log::warn!("Could not save session: {e}");
        }
    }

    fn persist_stats(&mut self) {
        if let Err(e) = save_json(&mut self.store, STATS_KEY, self.game.stats_book()) {
            log::warn!("Could not save statistics: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::provisioning::SourceError;
    use crate::word_store::MemoryWordStore;
    use crate::wordbank::WordBank;

    struct Fixed(Vec<&'static str>, usize);

    impl RandomWordSource for Fixed {
        fn random_word(&mut self) -> Result<String, SourceError> {
            let word = self.0[self.1 % self.0.len()];
            self.1 += 1;
            Ok(word.to_string())
        }
    }

    type TestController = GameController<WordBank, MemoryWordStore, Fixed, MemoryStore>;

    fn bank() -> WordBank {
        WordBank::new(
            ["termo", "mundo", "casas", "porta", "nuvem", "verde"]
                .iter()
                .map(|w| (*w).to_string())
                .collect(),
        )
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()
    }

    fn controller_with(store: MemoryStore, mode: Option<GameMode>) -> TestController {
        let service = DailyWordService::new(MemoryWordStore::new(), Fixed(vec!["termo", "mundo", "casas", "porta"], 0));
        GameController::new(bank(), service, store, day(), mode)
    }

    fn type_and_submit(controller: &mut TestController, word: &str) -> Notice {
        for c in word.chars() {
            controller.handle_key(KeyInput::Letter(c));
        }
        controller.handle_key(KeyInput::Enter)
    }

    #[test]
    fn test_new_controller_provisions_normal_mode() {
        let controller = controller_with(MemoryStore::new(), None);
        assert_eq!(controller.game().mode(), GameMode::Normal);
        assert_eq!(controller.game().session().target_words(), ["TERMO"]);
    }

    #[test]
    fn test_keys_edit_buffer_and_persist() {
        let mut controller = controller_with(MemoryStore::new(), None);
        controller.handle_key(KeyInput::Letter('m'));
        controller.handle_key(KeyInput::Letter('u'));
        controller.handle_key(KeyInput::Left);
        controller.handle_key(KeyInput::Backspace);
        assert_eq!(controller.game().session().buffer().padded(), "M    ");
        assert!(controller.store().contains_key(&session_key(day())));
    }

    #[test]
    fn test_rejected_guess_reports_error() {
        let mut controller = controller_with(MemoryStore::new(), None);
        assert_eq!(
            type_and_submit(&mut controller, "MUN"),
            Notice::Rejected(GameError::IncompleteGuess)
        );
    }

    #[test]
    fn test_win_persists_stats() {
        let mut controller = controller_with(MemoryStore::new(), None);
        assert_eq!(
            type_and_submit(&mut controller, "TERMO"),
            Notice::Submitted(SubmitOutcome::Won { attempts: 1 })
        );
        assert!(controller.store().contains_key(STATS_KEY));
        // Input is ignored once the game is over
        assert_eq!(controller.handle_key(KeyInput::Letter('A')), Notice::None);
    }

    #[test]
    fn test_session_restored_from_store() {
        let mut first = controller_with(MemoryStore::new(), None);
        type_and_submit(&mut first, "MUNDO");
        first.handle_key(KeyInput::Letter('c'));
        let store = first.store().clone();

        let second = controller_with(store, None);
        assert_eq!(second.game().session().guesses(), ["MUNDO"]);
        assert_eq!(second.game().session().buffer().padded(), "C    ");
    }

    #[test]
    fn test_explicit_mode_switches_after_restore() {
        let controller = controller_with(MemoryStore::new(), Some(GameMode::Double));
        assert_eq!(controller.game().mode(), GameMode::Double);
        assert_eq!(controller.game().session().target_words().len(), 2);
    }

    #[test]
    fn test_reset_clears_board() {
        let mut controller = controller_with(MemoryStore::new(), None);
        type_and_submit(&mut controller, "MUNDO");
        controller.reset();
        assert!(controller.game().session().guesses().is_empty());
    }

    #[test]
    fn test_refresh_day_starts_new_board() {
        let mut controller = controller_with(MemoryStore::new(), None);
        type_and_submit(&mut controller, "MUNDO");
        assert!(!controller.refresh_day(day()));
        assert_eq!(controller.game().session().guesses(), ["MUNDO"]);

        let next = day().succ_opt().unwrap();
        assert!(controller.refresh_day(next));
        assert_eq!(controller.day(), next);
        assert!(controller.game().session().guesses().is_empty());
        assert_eq!(controller.game().session().target_words(), ["MUNDO"]);
        assert!(!controller.store().contains_key(&session_key(day())));
        assert!(controller.store().contains_key(&session_key(next)));
    }

    #[test]
    fn test_refresh_day_keeps_mode_and_stats() {
        let mut controller = controller_with(MemoryStore::new(), Some(GameMode::Double));
        // Double drew TERMO and MUNDO, so normal mode gets CASAS
        controller.change_mode(GameMode::Normal);
        type_and_submit(&mut controller, "CASAS");
        controller.change_mode(GameMode::Double);

        assert!(controller.refresh_day(day().succ_opt().unwrap()));
        assert_eq!(controller.game().mode(), GameMode::Double);
        assert_eq!(controller.game().session().target_words().len(), 2);
        assert_eq!(controller.game().stats(GameMode::Normal).games_won, 1);
    }

    #[test]
    fn test_click_tile_and_grid() {
        let mut controller = controller_with(MemoryStore::new(), Some(GameMode::Double));
        controller.click_tile(3);
        assert_eq!(controller.game().session().cursor(), 3);
        controller.click_grid(1);
        assert_eq!(controller.game().session().active_grid(), 1);
        controller.cycle_grid();
        assert_eq!(controller.game().session().active_grid(), 0);
    }
}
