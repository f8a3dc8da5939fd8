//! Cell addressing.
//!
//! Rows are 1-based: row 1 is the tone/header row and data starts at row 2.
//! Columns are 0-based indices into the fixed letter set `A..=Z`.

use serde::{Deserialize, Serialize};

/// Number of rows in a TabTab grid (header row included).
pub const NUM_ROWS: usize = 30;

/// Number of columns in a TabTab grid (A-Z).
pub const NUM_COLS: usize = 26;

/// The row holding per-column tone headers.
pub const HEADER_ROW: usize = 1;

/// First row that "generate row" considers as an output target.
pub const FIRST_OUTPUT_ROW: usize = 3;

/// A (row, col) coordinate in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Key used in transaction maps and diagnostics ("row:col").
    pub fn key(&self) -> String {
        format!("{}:{}", self.row, self.col)
    }

    pub fn is_header(&self) -> bool {
        self.row == HEADER_ROW
    }

    /// A1-style name, e.g. `B3`. Returns `None` for columns past `Z`.
    pub fn to_a1(&self) -> Option<String> {
        col_letter(self.col).map(|c| format!("{}{}", c, self.row))
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_a1() {
            Some(a1) => f.write_str(&a1),
            None => f.write_str(&self.key()),
        }
    }
}

/// Letter for a 0-based column index.
pub fn col_letter(col: usize) -> Option<char> {
    if col < NUM_COLS {
        Some((b'A' + col as u8) as char)
    } else {
        None
    }
}

/// Parse an A1-style reference (`"c12"` and `"C12"` both work).
///
/// Only single-letter columns exist in this grid, so `AA1` is rejected.
pub fn parse_a1(input: &str) -> Option<CellRef> {
    let input = input.trim();
    let mut chars = input.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if !letter.is_ascii_uppercase() {
        return None;
    }
    let digits = chars.as_str();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some(CellRef::new(row, (letter as u8 - b'A') as usize))
}

/// Grid dimensions. Rows are counted 1..=rows, columns 0..cols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub rows: usize,
    pub cols: usize,
}

impl GridDims {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// True if the coordinate addresses an existing cell.
    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row >= 1 && cell.row <= self.rows && cell.col < self.cols
    }

    /// Clamp a signed coordinate into the grid.
    pub fn clamp(&self, row: isize, col: isize) -> CellRef {
        let row = row.clamp(1, self.rows.max(1) as isize) as usize;
        let col = col.clamp(0, self.cols.saturating_sub(1) as isize) as usize;
        CellRef::new(row, col)
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}

impl Default for GridDims {
    fn default() -> Self {
        Self::new(NUM_ROWS, NUM_COLS)
    }
}
