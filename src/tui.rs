//! TUI (Terminal User Interface) for the game
//!
//! Draws one grid per target word, an on-screen keyboard coloured by the
//! letter status map, and an information panel with messages and statistics.
//!
//! # Architecture
//! - `TuiApp`: terminal setup, the event loop and rendering
//! - `map_key_event` / `map_mouse_event`: pure translation from crossterm
//!   events to [`UserAction`]s, kept apart from the terminal so they can be tested

use crate::WORD_LENGTH;
use crate::controller::{GameController, KeyInput, Notice};
use crate::game_state::{GameError, GameSession, GameStatus, SubmitOutcome};
use crate::mode::GameMode;
use crate::persistence::KeyValueStore;
use crate::provisioning::{RandomWordSource, format_countdown, time_until_next_word, today};
use crate::stats::GameStats;
use crate::status::LetterStatus;
use crate::word_store::WordStore;
use crate::wordbank::DictionaryValidator;
use crate::{debug_log, info_log};
use chrono::Utc;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::time::Duration;

const EVENT_POLL_TIMEOUT_MS: u64 = 250;
/// Width of one tile including the gap after it.
const TILE_WIDTH: u16 = 4;
/// Columns before the first tile inside a grid.
const TILE_MARGIN: u16 = 1;
const KEYBOARD_ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ACTIVE_GRID_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Key(KeyInput),
    ClickTile { grid: usize, position: usize },
    ClickGrid(usize),
    CycleGrid,
    ChangeMode(GameMode),
    Reset,
    Exit,
}

/// Background and foreground colours for a tile or key.
fn status_colors(status: LetterStatus) -> (Color, Color) {
    match status {
        LetterStatus::Correct => (Color::Green, Color::Black),
        LetterStatus::Present => (Color::Yellow, Color::Black),
        LetterStatus::Absent => (Color::Gray, Color::White),
        LetterStatus::Unused => (Color::DarkGray, Color::White),
    }
}

#[must_use]
pub fn map_key_event(key: KeyEvent) -> Option<UserAction> {
    // Only process Press events, ignore Release and Repeat to avoid double input
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(UserAction::Exit);
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }

    match key.code {
        KeyCode::Esc => Some(UserAction::Exit),
        KeyCode::Enter => Some(UserAction::Key(KeyInput::Enter)),
        KeyCode::Backspace | KeyCode::Delete => Some(UserAction::Key(KeyInput::Backspace)),
        KeyCode::Left => Some(UserAction::Key(KeyInput::Left)),
        KeyCode::Right => Some(UserAction::Key(KeyInput::Right)),
        KeyCode::Tab => Some(UserAction::CycleGrid),
        KeyCode::F(1) => Some(UserAction::ChangeMode(GameMode::Normal)),
        KeyCode::F(2) => Some(UserAction::ChangeMode(GameMode::Double)),
        KeyCode::F(3) => Some(UserAction::ChangeMode(GameMode::Quadruple)),
        KeyCode::F(5) => Some(UserAction::Reset),
        KeyCode::Char(c) if c.is_alphabetic() => Some(UserAction::Key(KeyInput::Letter(c))),
        _ => None,
    }
}

/// One column per grid across the board.
#[must_use]
pub fn grid_areas(board: Rect, grids: usize) -> Vec<Rect> {
    let grids = u32::try_from(grids.max(1)).unwrap_or(1);
    let constraints: Vec<Constraint> = (0..grids).map(|_| Constraint::Ratio(1, grids)).collect();
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(board)
        .to_vec()
}

fn grid_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

/// Translate a left click on the board into a tile or grid selection.
#[must_use]
pub fn map_mouse_event(mouse: MouseEvent, board: Rect, session: &GameSession) -> Option<UserAction> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }
    let (column, row) = (mouse.column, mouse.row);
    let (grid, area) = grid_areas(board, session.grid_count())
        .into_iter()
        .enumerate()
        .find(|(_, a)| column >= a.x && column < a.x + a.width && row >= a.y && row < a.y + a.height)?;

    let inner = grid_inner(area);
    let current_row_y = u16::try_from(session.current_row())
        .ok()
        .map(|r| inner.y.saturating_add(r));
    if Some(row) == current_row_y && column >= inner.x + TILE_MARGIN {
        let offset = column - inner.x - TILE_MARGIN;
        let position = usize::from(offset / TILE_WIDTH);
        if position < WORD_LENGTH && offset % TILE_WIDTH < TILE_WIDTH - 1 {
            return Some(UserAction::ClickTile { grid, position });
        }
    }
    Some(UserAction::ClickGrid(grid))
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    session: &'a GameSession,
    stats: &'a GameStats,
    message: &'a str,
    error_message: &'a str,
}

/// Main TUI component.
pub struct TuiApp {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    message: String,
    error_message: String,
    board_area: Rect,
}

impl TuiApp {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiApp::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal setup complete: alternate screen, mouse capture, cursor hidden");

        Ok(Self {
            terminal,
            message: "Guess the word of the day!".to_string(),
            error_message: String::new(),
            board_area: Rect::default(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            cursor::Show
        )?;
        Ok(())
    }

    /// Run until the player quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be drawn or read.
    pub fn run<D, W, R, K>(&mut self, controller: &mut GameController<D, W, R, K>) -> Result<(), io::Error>
    where
        D: DictionaryValidator,
        W: WordStore,
        R: RandomWordSource,
        K: KeyValueStore,
    {
        loop {
            if controller.refresh_day(today()) {
                self.message = "A new word is available!".to_string();
                self.error_message.clear();
            }
            self.draw(controller)?;

            if !event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
                // Redraw so the next-word countdown keeps ticking
                continue;
            }
            let action = match event::read()? {
                Event::Key(key) => map_key_event(key),
                Event::Mouse(mouse) => map_mouse_event(mouse, self.board_area, controller.game().session()),
                other => {
                    debug_log!("run() - Ignoring event: {:?}", other);
                    None
                }
            };
            let Some(action) = action else {
                continue;
            };
            debug_log!("run() - Action: {:?}", action);
            if action == UserAction::Exit {
                info_log!("run() - Exit requested");
                return Ok(());
            }
            self.apply(controller, action);
        }
    }

    fn apply<D, W, R, K>(&mut self, controller: &mut GameController<D, W, R, K>, action: UserAction)
    where
        D: DictionaryValidator,
        W: WordStore,
        R: RandomWordSource,
        K: KeyValueStore,
    {
        self.error_message.clear();
        match action {
            UserAction::Key(key) => {
                let notice = controller.handle_key(key);
                self.show_notice(notice, controller.game().session());
            }
            UserAction::ClickTile { grid, position } => {
                controller.click_grid(grid);
                if controller.game().session().active_grid() == grid {
                    controller.click_tile(position);
                }
            }
            UserAction::ClickGrid(grid) => controller.click_grid(grid),
            UserAction::CycleGrid => controller.cycle_grid(),
            UserAction::ChangeMode(mode) => {
                controller.change_mode(mode);
                self.message = format!("{} mode", capitalize(mode.as_str()));
            }
            UserAction::Reset => {
                controller.reset();
                self.message = "New game started.".to_string();
            }
            UserAction::Exit => {}
        }
    }

    fn show_notice(&mut self, notice: Notice, session: &GameSession) {
        match notice {
            Notice::None => {}
            Notice::Rejected(GameError::StaleSubmit | GameError::GameOver) => {}
            Notice::Rejected(e) => self.error_message = capitalize(&e.to_string()),
            Notice::Submitted(SubmitOutcome::Continue) => self.message.clear(),
            Notice::Submitted(SubmitOutcome::Won { attempts }) => {
                let plural = if attempts == 1 { "" } else { "s" };
                self.message = format!("Congratulations! Solved in {attempts} attempt{plural}.");
            }
            Notice::Submitted(SubmitOutcome::Lost) => {
                self.message = format!("Game over. The words were: {}", session.target_words().join(", "));
            }
        }
    }

    fn draw<D, W, R, K>(&mut self, controller: &GameController<D, W, R, K>) -> Result<(), io::Error>
    where
        D: DictionaryValidator,
        W: WordStore,
        R: RandomWordSource,
        K: KeyValueStore,
    {
        let game = controller.game();
        let stats = game.stats(game.mode());
        let ctx = RenderContext {
            session: game.session(),
            stats: &stats,
            message: &self.message,
            error_message: &self.error_message,
        };

        let mut board_area = self.board_area;
        self.terminal.draw(|f| {
            board_area = Self::render_static(f, &ctx);
        })?;
        self.board_area = board_area;
        Ok(())
    }

    /// Render the complete UI layout; returns the board area for hit testing.
    #[allow(clippy::cast_possible_truncation)]
    fn render_static(f: &mut Frame, ctx: &RenderContext) -> Rect {
        let board_height = ctx.session.max_attempts() as u16 + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),            // Title
                Constraint::Length(board_height), // Grids
                Constraint::Length(5),            // Keyboard
                Constraint::Min(6),               // Info panel
                Constraint::Length(3),            // Instructions
            ])
            .split(f.area());

        Self::render_title(f, chunks[0], ctx.session);
        Self::render_board(f, chunks[1], ctx.session);
        Self::render_keyboard(f, chunks[2], ctx.session);
        Self::render_info(f, chunks[3], ctx);
        Self::render_instructions(f, chunks[4]);
        chunks[1]
    }

    fn render_title(f: &mut Frame, area: Rect, session: &GameSession) {
        let title = format!(
            "TERMO - {} ({} word{}, {} attempts)",
            session.mode().as_str().to_uppercase(),
            session.grid_count(),
            if session.grid_count() == 1 { "" } else { "s" },
            session.max_attempts()
        );
        let paragraph = Paragraph::new(title)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_board(f: &mut Frame, area: Rect, session: &GameSession) {
        for (grid, grid_area) in grid_areas(area, session.grid_count()).into_iter().enumerate() {
            Self::render_grid(f, grid_area, session, grid);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_grid(f: &mut Frame, area: Rect, session: &GameSession, grid: usize) {
        let solved = session.is_grid_solved(grid);
        let playing = session.status() == GameStatus::Playing;
        let is_active = playing && grid == session.active_grid();

        let target = session.target_words().get(grid).map_or("", String::as_str);
        let title = if solved || !playing {
            format!(" {target} ")
        } else {
            format!(" Word {} ", grid + 1)
        };
        let border_style = if is_active {
            ACTIVE_GRID_STYLE
        } else if solved {
            SUCCESS_STYLE
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        f.render_widget(block, area);

        for row in 0..session.max_attempts() {
            let y = inner.y + row as u16;
            if y >= inner.y + inner.height {
                break;
            }
            let spans = Self::grid_row_spans(session, grid, row, is_active && !solved);
            Self::render_line(f, inner, y, spans);
        }
    }

    fn grid_row_spans(session: &GameSession, grid: usize, row: usize, show_cursor: bool) -> Vec<Span<'static>> {
        let mut spans = vec![Span::raw(" ".repeat(usize::from(TILE_MARGIN)))];
        let empty_style = Style::default().fg(Color::White).bg(Color::Black);

        if let Some(guess) = session.guesses().get(row) {
            match session.row_feedback(row, grid) {
                Some(feedback) => {
                    for (letter, status) in guess.chars().zip(feedback) {
                        let (bg, fg) = status_colors(status);
                        spans.push(Span::styled(format!(" {letter} "), Style::default().fg(fg).bg(bg)));
                        spans.push(Span::raw(" "));
                    }
                }
                None => {
                    for _ in 0..WORD_LENGTH {
                        spans.push(Span::raw("    "));
                    }
                }
            }
            return spans;
        }

        let is_input_row = row == session.current_row()
            && session.status() == GameStatus::Playing
            && !session.is_grid_solved(grid);
        for position in 0..WORD_LENGTH {
            let (letter, style) = if is_input_row {
                let letter = session.buffer().cell(position).unwrap_or(' ');
                let mut style = Style::default().fg(Color::White).bg(Color::DarkGray);
                if show_cursor && position == session.cursor() {
                    style = style.bg(Color::Blue).add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                }
                (letter, style)
            } else {
                ('·', empty_style)
            };
            spans.push(Span::styled(format!(" {letter} "), style));
            spans.push(Span::raw(" "));
        }
        spans
    }

    fn render_line(f: &mut Frame, area: Rect, y: u16, spans: Vec<Span>) {
        let line = Line::from(spans);
        let paragraph = Paragraph::new(line);
        f.render_widget(
            paragraph,
            Rect {
                x: area.x,
                y,
                width: area.width,
                height: 1,
            },
        );
    }

    fn render_keyboard(f: &mut Frame, area: Rect, session: &GameSession) {
        let lines: Vec<Line> = KEYBOARD_ROWS
            .iter()
            .enumerate()
            .map(|(indent, keys)| {
                let mut spans = vec![Span::raw(" ".repeat(indent * 2))];
                for key in keys.chars() {
                    let (bg, fg) = status_colors(session.letter_status(key));
                    spans.push(Span::styled(format!(" {key} "), Style::default().fg(fg).bg(bg)));
                    spans.push(Span::raw(" "));
                }
                Line::from(spans)
            })
            .collect();
        let paragraph = Paragraph::new(lines).block(Block::default().title("Keyboard").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_info(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let mut lines = Vec::new();

        if !ctx.message.is_empty() {
            lines.push(Line::from(vec![Span::styled(ctx.message, MESSAGE_STYLE)]));
        }
        if !ctx.error_message.is_empty() {
            lines.push(Line::from(vec![Span::styled(ctx.error_message, ERROR_STYLE)]));
        }

        if ctx.session.status() != GameStatus::Playing {
            lines.push(Line::from(""));
            lines.extend(Self::stats_lines(ctx.stats));
            let countdown = format_countdown(time_until_next_word(Utc::now()));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![Span::styled(
                format!("Next word in {countdown}"),
                HEADER_STYLE,
            )]));
            if let Some(share) = ctx.session.share_text() {
                lines.push(Line::from(""));
                lines.extend(share.lines().map(|line| Line::from(line.to_string())));
            }
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Information").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn stats_lines(stats: &GameStats) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(vec![Span::styled("Statistics", HEADER_STYLE)]),
            Line::from(format!(
                "Played: {}  Win %: {}  Streak: {}  Best streak: {}",
                stats.games_played,
                stats.win_percentage(),
                stats.current_streak,
                stats.max_streak
            )),
        ];
        let widest = stats.guess_distribution.iter().copied().max().unwrap_or(0).max(1);
        for (index, count) in stats.guess_distribution.iter().enumerate() {
            let bar_len = (*count as usize * 20) / widest as usize;
            lines.push(Line::from(format!(
                "{:>2} {} {count}",
                index + 1,
                "█".repeat(bar_len.max(1))
            )));
        }
        lines
    }

    fn render_instructions(f: &mut Frame, area: Rect) {
        let text = "Letters: type | ENTER: submit | BACKSPACE: delete | ←/→: move | TAB: next word | \
                    F1/F2/F3: normal/double/quadruple | F5: restart | ESC: quit";
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn session(mode: GameMode) -> GameSession {
        let words = ["TERMO", "MUNDO", "CASAS", "PORTA"]
            .iter()
            .take(mode.words_for_mode())
            .map(|w| (*w).to_string())
            .collect();
        GameSession::new(mode, words)
    }

    #[test]
    fn test_map_letters_and_editing_keys() {
        assert_eq!(map_key_event(key(KeyCode::Char('a'))), Some(UserAction::Key(KeyInput::Letter('a'))));
        assert_eq!(map_key_event(key(KeyCode::Enter)), Some(UserAction::Key(KeyInput::Enter)));
        assert_eq!(map_key_event(key(KeyCode::Backspace)), Some(UserAction::Key(KeyInput::Backspace)));
        assert_eq!(map_key_event(key(KeyCode::Delete)), Some(UserAction::Key(KeyInput::Backspace)));
        assert_eq!(map_key_event(key(KeyCode::Left)), Some(UserAction::Key(KeyInput::Left)));
        assert_eq!(map_key_event(key(KeyCode::Right)), Some(UserAction::Key(KeyInput::Right)));
    }

    #[test]
    fn test_map_commands() {
        assert_eq!(map_key_event(key(KeyCode::Esc)), Some(UserAction::Exit));
        assert_eq!(map_key_event(key(KeyCode::Tab)), Some(UserAction::CycleGrid));
        assert_eq!(map_key_event(key(KeyCode::F(2))), Some(UserAction::ChangeMode(GameMode::Double)));
        assert_eq!(map_key_event(key(KeyCode::F(5))), Some(UserAction::Reset));
        assert_eq!(
            map_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(UserAction::Exit)
        );
    }

    #[test]
    fn test_map_ignores_digits_modifiers_and_releases() {
        assert_eq!(map_key_event(key(KeyCode::Char('3'))), None);
        assert_eq!(map_key_event(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::ALT)), None);
        let mut release = key(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key_event(release), None);
    }

    #[test]
    fn test_click_on_current_row_tile() {
        let board = Rect::new(0, 0, 40, 8);
        let s = session(GameMode::Normal);
        // Inner area starts at (1, 1); tile 2 spans columns 1 + 1 + 8 ..= 1 + 1 + 10
        assert_eq!(
            map_mouse_event(click(11, 1), board, &s),
            Some(UserAction::ClickTile { grid: 0, position: 2 })
        );
        // The gap between tiles selects the grid only
        assert_eq!(map_mouse_event(click(13, 1), board, &s), Some(UserAction::ClickGrid(0)));
    }

    #[test]
    fn test_click_selects_grid_in_double_mode() {
        let board = Rect::new(0, 0, 60, 11);
        let s = session(GameMode::Double);
        assert_eq!(map_mouse_event(click(45, 6), board, &s), Some(UserAction::ClickGrid(1)));
        assert_eq!(map_mouse_event(click(5, 6), board, &s), Some(UserAction::ClickGrid(0)));
    }

    #[test]
    fn test_click_outside_board_ignored() {
        let board = Rect::new(0, 3, 40, 8);
        let s = session(GameMode::Normal);
        assert_eq!(map_mouse_event(click(5, 1), board, &s), None);
        let mut right = click(5, 5);
        right.kind = MouseEventKind::Down(MouseButton::Right);
        assert_eq!(map_mouse_event(right, board, &s), None);
    }

    #[test]
    fn test_grid_areas_split_evenly() {
        let areas = grid_areas(Rect::new(0, 0, 100, 12), 4);
        assert_eq!(areas.len(), 4);
        assert!(areas.iter().all(|a| a.width == 25 && a.height == 12));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("incomplete guess"), "Incomplete guess");
        assert_eq!(capitalize(""), "");
    }
}
