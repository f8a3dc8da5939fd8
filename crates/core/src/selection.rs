use serde::{Deserialize, Serialize};

use crate::cell_ref::{CellRef, GridDims};

/// A rectangular range of cells, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl Range {
    /// Create a new range, automatically normalizing so min <= max.
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self {
            min_row: r1.min(r2),
            min_col: c1.min(c2),
            max_row: r1.max(r2),
            max_col: c1.max(c2),
        }
    }

    /// Range spanning two corner cells, in either order.
    pub fn spanning(a: CellRef, b: CellRef) -> Self {
        Self::new(a.row, a.col, b.row, b.col)
    }

    /// Create a single-cell range.
    pub fn single(cell: CellRef) -> Self {
        Self::spanning(cell, cell)
    }

    /// Check if this range contains a cell.
    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row >= self.min_row && cell.row <= self.max_row &&
        cell.col >= self.min_col && cell.col <= self.max_col
    }

    /// Number of cells in this range.
    pub fn cell_count(&self) -> usize {
        (self.max_row - self.min_row + 1) * (self.max_col - self.min_col + 1)
    }

    pub fn top_left(&self) -> CellRef {
        CellRef::new(self.min_row, self.min_col)
    }

    pub fn bottom_right(&self) -> CellRef {
        CellRef::new(self.max_row, self.max_col)
    }

    /// Iterate over all cells in this range (row-major order).
    pub fn cells(&self) -> impl Iterator<Item = CellRef> {
        let Range { min_row, min_col, max_row, max_col } = *self;
        (min_row..=max_row).flat_map(move |r| {
            (min_col..=max_col).map(move |c| CellRef::new(r, c))
        })
    }

    /// Check if this is a single cell.
    pub fn is_single(&self) -> bool {
        self.min_row == self.max_row && self.min_col == self.max_col
    }
}

/// An active range selection. Keeps the corners it was built from so that
/// repeated shift-extends keep growing from the right corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSelection {
    pub range: Range,
    pub anchor: CellRef,
    pub active: CellRef,
}

/// The selection model: one focused cell plus at most one range.
///
/// Pure state. Side effects such as committing an edit or redrawing the
/// outline belong to whoever owns the selection.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    focused: Option<CellRef>,
    anchor: Option<CellRef>,
    range: Option<RangeSelection>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The focused cell, once the user has interacted with the grid.
    pub fn focused(&self) -> Option<CellRef> {
        self.focused
    }

    /// Anchor used when extending (shift+click/arrow).
    pub fn anchor(&self) -> Option<CellRef> {
        self.anchor
    }

    pub fn range(&self) -> Option<Range> {
        self.range.map(|r| r.range)
    }

    pub fn range_selection(&self) -> Option<&RangeSelection> {
        self.range.as_ref()
    }

    pub fn has_range(&self) -> bool {
        self.range.is_some()
    }

    /// Check if a cell is marked as range-selected.
    pub fn is_range_selected(&self, cell: CellRef) -> bool {
        self.range.map_or(false, |r| r.range.contains(cell))
    }

    /// Cells covered by the selection: the range if one is active, otherwise
    /// the focused cell (row-major).
    pub fn cells(&self) -> Vec<CellRef> {
        match (self.range, self.focused) {
            (Some(sel), _) => sel.range.cells().collect(),
            (None, Some(cell)) => vec![cell],
            (None, None) => Vec::new(),
        }
    }

    pub fn set_focus(&mut self, cell: CellRef) {
        self.focused = Some(cell);
    }

    pub fn set_anchor(&mut self, cell: CellRef) {
        self.anchor = Some(cell);
    }

    /// Replace the range with the rectangle spanning `anchor` and `active`.
    ///
    /// Returns `None` (and leaves the selection untouched) when either corner
    /// lies outside the grid.
    pub fn apply_range(&mut self, dims: &GridDims, anchor: CellRef, active: CellRef) -> Option<Range> {
        if !dims.contains(anchor) || !dims.contains(active) {
            return None;
        }
        let range = Range::spanning(anchor, active);
        self.range = Some(RangeSelection { range, anchor, active });
        Some(range)
    }

    /// Drop the range and the stored anchor.
    pub fn clear_range(&mut self) {
        self.range = None;
        self.anchor = None;
    }

    /// Target of moving the focus by a delta, clamped to the grid.
    pub fn move_target(&self, dims: &GridDims, d_row: isize, d_col: isize) -> Option<CellRef> {
        let focused = self.focused?;
        let row = (focused.row as isize).saturating_add(d_row);
        let col = (focused.col as isize).saturating_add(d_col);
        let target = dims.clamp(row, col);
        dims.contains(target).then_some(target)
    }
}
