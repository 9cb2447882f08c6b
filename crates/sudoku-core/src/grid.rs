use serde::{Deserialize, Serialize};
use std::fmt;

/// Puzzle difficulty, fixing how many cells are hidden from the solved grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

impl Difficulty {
    /// Number of cells zeroed out of the solved grid at this difficulty
    pub fn cells_to_remove(self) -> usize {
        match self {
            Self::Easy => 35,
            Self::Medium => 45,
            Self::Hard => 55,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        };
        write!(f, "{}", name)
    }
}

/// A cell coordinate on the 9x9 grid, zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        debug_assert!(row < 9 && col < 9, "position out of bounds: ({}, {})", row, col);
        Self { row, col }
    }

    /// Iterate over all 81 positions in row-major order
    pub fn all() -> impl Iterator<Item = Position> {
        (0..81).map(|i| Position::new(i / 9, i % 9))
    }

    /// Top-left corner of the 3x3 box containing this position
    pub fn box_origin(self) -> Position {
        Position::new(self.row / 3 * 3, self.col / 3 * 3)
    }
}

/// A 9x9 Sudoku grid holding digits 1-9, with 0 meaning empty.
///
/// Serializes as a nested 9x9 array of integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    cells: [[u8; 9]; 9],
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// Create an empty grid
    pub fn new() -> Self {
        Self { cells: [[0; 9]; 9] }
    }

    /// Build a grid directly from a nested array of values
    pub fn from_cells(cells: [[u8; 9]; 9]) -> Self {
        Self { cells }
    }

    /// Value at `pos`, 0 if empty
    pub fn get(&self, pos: Position) -> u8 {
        self.cells[pos.row][pos.col]
    }

    /// Write `value` at `pos`; 0 clears the cell
    pub fn set(&mut self, pos: Position, value: u8) {
        debug_assert!(value <= 9, "value out of range: {}", value);
        self.cells[pos.row][pos.col] = value;
    }

    /// Whether the cell at `pos` is empty
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == 0
    }

    /// Number of filled cells
    pub fn filled_count(&self) -> usize {
        Position::all().filter(|&p| !self.is_empty(p)).count()
    }

    /// Number of empty cells
    pub fn empty_count(&self) -> usize {
        81 - self.filled_count()
    }

    /// All empty positions in row-major order
    pub fn empty_positions(&self) -> Vec<Position> {
        Position::all().filter(|&p| self.is_empty(p)).collect()
    }

    /// Check whether `value` can be placed at `pos` without clashing with its
    /// row, column, or 3x3 box. The target cell is expected to be empty.
    pub fn is_valid_placement(&self, pos: Position, value: u8) -> bool {
        if value == 0 || value > 9 {
            return false;
        }
        for i in 0..9 {
            if self.cells[pos.row][i] == value || self.cells[i][pos.col] == value {
                return false;
            }
        }
        let origin = pos.box_origin();
        for row in origin.row..origin.row + 3 {
            for col in origin.col..origin.col + 3 {
                if self.cells[row][col] == value {
                    return false;
                }
            }
        }
        true
    }

    /// Check that no filled cell repeats within its row, column, or 3x3 box.
    /// Empty cells are ignored; values outside 1-9 fail the check.
    pub fn is_consistent(&self) -> bool {
        for row in 0..9 {
            let mut seen = [false; 10];
            for col in 0..9 {
                if !Self::mark(&mut seen, self.cells[row][col]) {
                    return false;
                }
            }
        }
        for col in 0..9 {
            let mut seen = [false; 10];
            for row in 0..9 {
                if !Self::mark(&mut seen, self.cells[row][col]) {
                    return false;
                }
            }
        }
        for box_row in (0..9).step_by(3) {
            for box_col in (0..9).step_by(3) {
                let mut seen = [false; 10];
                for row in box_row..box_row + 3 {
                    for col in box_col..box_col + 3 {
                        if !Self::mark(&mut seen, self.cells[row][col]) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    fn mark(seen: &mut [bool; 10], value: u8) -> bool {
        if value == 0 {
            return true;
        }
        if value > 9 || seen[value as usize] {
            return false;
        }
        seen[value as usize] = true;
        true
    }

    /// Whether every cell is filled and every row, column, and box is a
    /// permutation of 1-9
    pub fn is_complete(&self) -> bool {
        self.empty_count() == 0 && self.is_consistent()
    }

    /// Parse a grid from an 81-character row-major string; `0` or `.` marks an
    /// empty cell. Whitespace is ignored. Returns `None` on bad length or
    /// unexpected characters.
    pub fn from_string(s: &str) -> Option<Self> {
        let mut cells = [[0u8; 9]; 9];
        let mut idx = 0;
        for ch in s.chars().filter(|c| !c.is_whitespace()) {
            if idx >= 81 {
                return None;
            }
            cells[idx / 9][idx % 9] = match ch {
                '.' | '0' => 0,
                '1'..='9' => ch as u8 - b'0',
                _ => return None,
            };
            idx += 1;
        }
        if idx == 81 {
            Some(Self { cells })
        } else {
            None
        }
    }

    /// Render as an 81-character row-major string with `0` for empty cells
    pub fn to_string_compact(&self) -> String {
        let mut out = String::with_capacity(81);
        for row in 0..9 {
            for col in 0..9 {
                out.push((b'0' + self.cells[row][col]) as char);
            }
        }
        out
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..9 {
            if row != 0 && row % 3 == 0 {
                writeln!(f, "------+-------+------")?;
            }
            for col in 0..9 {
                if col != 0 && col % 3 == 0 {
                    write!(f, "| ")?;
                }
                match self.cells[row][col] {
                    0 => write!(f, ". ")?,
                    v => write!(f, "{} ", v)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
