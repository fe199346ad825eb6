//! Fixed-length guess buffer with position-addressable editing.
//!
//! The buffer always holds exactly [`WORD_LENGTH`] cells; an empty cell is the
//! space sentinel. The cursor is clamped to the buffer on every operation.

use crate::WORD_LENGTH;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const EMPTY_CELL: char = ' ';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Cursor position in `[0, WORD_LENGTH - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "usize", into = "usize")]
pub struct Cursor(usize);

impl Cursor {
    #[must_use]
    pub fn new(position: usize) -> Self {
        Self(clamp_position(position))
    }

    #[must_use]
    pub fn position(self) -> usize {
        debug_assert!(self.0 < WORD_LENGTH, "cursor out of bounds: {}", self.0);
        self.0.min(WORD_LENGTH - 1)
    }

    pub fn set(&mut self, position: usize) {
        self.0 = clamp_position(position);
    }

    pub fn move_by(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.0 = self.0.saturating_sub(1),
            Direction::Right if self.0 < WORD_LENGTH - 1 => self.0 += 1,
            Direction::Right => {}
        }
    }

    fn is_at_end(self) -> bool {
        self.0 >= WORD_LENGTH - 1
    }
}

impl From<usize> for Cursor {
    fn from(position: usize) -> Self {
        Self::new(position)
    }
}

impl From<Cursor> for usize {
    fn from(cursor: Cursor) -> Self {
        cursor.0
    }
}

fn clamp_position(position: usize) -> usize {
    position.min(WORD_LENGTH - 1)
}

/// The guess being typed on the current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessBuffer {
    cells: [char; WORD_LENGTH],
}

impl Default for GuessBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl GuessBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: [EMPTY_CELL; WORD_LENGTH],
        }
    }

    /// Rebuild a buffer from its padded string form, e.g. a saved snapshot.
    /// Extra characters are dropped and missing ones are left empty.
    #[must_use]
    pub fn from_padded(text: &str) -> Self {
        let mut buffer = Self::new();
        for (cell, c) in buffer.cells.iter_mut().zip(text.chars()) {
            *cell = c;
        }
        buffer
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<char> {
        self.cells.get(index).copied().filter(|&c| c != EMPTY_CELL)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|&c| c != EMPTY_CELL)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == EMPTY_CELL)
    }

    /// Letters only, with empty cells removed.
    #[must_use]
    pub fn word(&self) -> String {
        self.cells.iter().filter(|&&c| c != EMPTY_CELL).collect()
    }

    /// All cells, empty ones rendered as spaces.
    #[must_use]
    pub fn padded(&self) -> String {
        self.cells.iter().collect()
    }

    pub fn clear(&mut self) {
        self.cells = [EMPTY_CELL; WORD_LENGTH];
    }

    /// Write `letter` at the cursor and advance it, stopping at the last cell.
    pub fn insert_letter(&mut self, cursor: &mut Cursor, letter: char) {
        let position = cursor.position();
        self.cells[position] = letter.to_uppercase().next().unwrap_or(letter);
        if !cursor.is_at_end() {
            cursor.move_by(Direction::Right);
        }
    }

    /// Clear the cell under the cursor in place. On an already empty cell,
    /// step back one cell and clear that one instead.
    pub fn delete_at_cursor(&mut self, cursor: &mut Cursor) {
        let position = cursor.position();
        if self.cells[position] != EMPTY_CELL {
            self.cells[position] = EMPTY_CELL;
        } else if position > 0 {
            cursor.move_by(Direction::Left);
            self.cells[position - 1] = EMPTY_CELL;
        }
    }
}

impl fmt::Display for GuessBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.padded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(word: &str) -> (GuessBuffer, Cursor) {
        let mut buffer = GuessBuffer::new();
        let mut cursor = Cursor::default();
        for c in word.chars() {
            buffer.insert_letter(&mut cursor, c);
        }
        (buffer, cursor)
    }

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer = GuessBuffer::new();
        assert!(buffer.is_empty());
        assert!(!buffer.is_complete());
        assert_eq!(buffer.padded(), "     ");
        assert_eq!(buffer.word(), "");
    }

    #[test]
    fn test_insert_advances_cursor() {
        let (buffer, cursor) = typed("ter");
        assert_eq!(buffer.padded(), "TER  ");
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_insert_never_passes_last_index() {
        let (buffer, cursor) = typed("termos");
        // The sixth letter overwrites the last cell
        assert_eq!(buffer.padded(), "TERMS");
        assert_eq!(cursor.position(), WORD_LENGTH - 1);
        assert!(buffer.is_complete());
    }

    #[test]
    fn test_insert_at_clicked_position() {
        let mut buffer = GuessBuffer::new();
        let mut cursor = Cursor::new(3);
        buffer.insert_letter(&mut cursor, 'M');
        assert_eq!(buffer.padded(), "   M ");
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_delete_clears_in_place_without_shift() {
        let (mut buffer, _) = typed("termo");
        let mut cursor = Cursor::new(1);
        buffer.delete_at_cursor(&mut cursor);
        assert_eq!(buffer.padded(), "T RMO");
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_delete_on_empty_cell_steps_back() {
        let (mut buffer, mut cursor) = typed("te");
        assert_eq!(cursor.position(), 2);
        buffer.delete_at_cursor(&mut cursor);
        assert_eq!(buffer.padded(), "T    ");
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_delete_on_empty_first_cell_is_noop() {
        let mut buffer = GuessBuffer::new();
        let mut cursor = Cursor::default();
        buffer.delete_at_cursor(&mut cursor);
        assert!(buffer.is_empty());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_move_left_at_zero_is_noop() {
        let mut cursor = Cursor::default();
        cursor.move_by(Direction::Left);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_move_right_at_end_is_noop() {
        let mut cursor = Cursor::new(WORD_LENGTH - 1);
        cursor.move_by(Direction::Right);
        assert_eq!(cursor.position(), WORD_LENGTH - 1);
    }

    #[test]
    fn test_set_is_clamped() {
        let mut cursor = Cursor::default();
        cursor.set(99);
        assert_eq!(cursor.position(), WORD_LENGTH - 1);
        assert_eq!(Cursor::from(7).position(), WORD_LENGTH - 1);
    }

    #[test]
    fn test_from_padded_round_trips_partial_guess() {
        let buffer = GuessBuffer::from_padded("T RM");
        assert_eq!(buffer.padded(), "T RM ");
        assert_eq!(buffer.cell(0), Some('T'));
        assert_eq!(buffer.cell(1), None);
        assert_eq!(buffer.word(), "TRM");
    }
}
