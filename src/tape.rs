//! The bounded tape the machine reads and writes.

use crate::types::{Direction, RunError, BLANK_SYMBOL, DEFAULT_TAPE_LENGTH};
use std::fmt;

/// A fixed-capacity row of single-character cells and the head index into it.
///
/// The tape never grows: the head stays within `[0, len)` and moves that would leave this range
/// fail with `TapeUnderflow` or `TapeOverflow`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<char>,
    head: usize,
}

impl Default for Tape {
    fn default() -> Self {
        Self::blank(DEFAULT_TAPE_LENGTH)
    }
}

impl Tape {
    /// Creates a tape of `length` blank cells with the head on the first one.
    /// A length of zero is raised to one cell.
    pub fn blank(length: usize) -> Self {
        Self {
            cells: vec![BLANK_SYMBOL; length.max(1)],
            head: 0,
        }
    }

    /// Creates a tape holding `input`, padded with blanks up to `capacity`.
    ///
    /// Input longer than `capacity` is kept whole and sets the capacity.
    pub fn with_input(input: &str, capacity: usize) -> Self {
        let mut cells: Vec<char> = input.chars().collect();
        if cells.len() < capacity.max(1) {
            cells.resize(capacity.max(1), BLANK_SYMBOL);
        }

        Self { cells, head: 0 }
    }

    /// Creates a tape from stored cells, e.g. a saved tape record.
    pub fn from_cells(cells: Vec<char>) -> Self {
        if cells.is_empty() {
            return Self::blank(1);
        }
        Self { cells, head: 0 }
    }

    /// The number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[char] {
        &self.cells
    }

    pub fn head(&self) -> usize {
        self.head
    }

    /// The symbol under the head.
    pub fn read(&self) -> char {
        self.cells[self.head]
    }

    /// Moves the head to `index`.
    pub fn set_head(&mut self, index: usize) -> Result<(), RunError> {
        self.check(index)?;
        self.head = index;
        Ok(())
    }

    /// Overwrites the cell at `index` without moving the head.
    pub fn set_symbol(&mut self, index: usize, symbol: char) -> Result<(), RunError> {
        self.check(index)?;
        self.cells[index] = symbol;
        Ok(())
    }

    /// Writes `write` (if any) under the head, then moves the head one cell.
    ///
    /// The move is validated first, so a failing call leaves the tape untouched.
    pub fn apply(&mut self, write: Option<char>, direction: Direction) -> Result<(), RunError> {
        let next = match direction {
            Direction::Left => self.head.checked_sub(1).ok_or(RunError::TapeUnderflow)?,
            Direction::Right => self.head + 1,
        };
        self.check(next)?;

        if let Some(symbol) = write {
            self.cells[self.head] = symbol;
        }
        self.head = next;
        Ok(())
    }

    fn check(&self, index: usize) -> Result<(), RunError> {
        if index >= self.cells.len() {
            return Err(RunError::TapeOverflow {
                capacity: self.cells.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.cells.iter().try_for_each(|c| write!(f, "{c}"))
    }
}
