//! Navigation and selection operations
//!
//! Contains:
//! - Focus changes (click, arrows)
//! - Range selection (shift+click, shift+arrow, header clicks)
//! - Outline updates that follow the range

use tabtab_core::{CellRef, Range, HEADER_ROW};

use crate::app::TabTab;
use crate::outline::OutlineMode;

impl TabTab {
    // =========================================================================
    // Focus
    // =========================================================================

    /// Focus `cell`. A pending edit on another cell is committed first; the
    /// range is dropped unless `preserve_range` is set or a drag is running.
    pub fn select_cell(&mut self, cell: CellRef, preserve_range: bool) -> bool {
        if !self.sheet.contains(cell) {
            return false;
        }
        if self.edit.as_ref().map_or(false, |e| e.cell != cell) {
            self.stop_edit();
        }
        if !preserve_range && !self.drag.is_dragging() && self.selection.has_range() {
            self.clear_range_selection();
        }
        self.selection.set_focus(cell);
        true
    }

    /// Mouse click. Shift extends from the anchor (or focus); a plain click
    /// moves the anchor to the clicked cell.
    pub fn click_cell(&mut self, cell: CellRef, shift: bool) {
        if !self.sheet.contains(cell) {
            return;
        }
        if shift {
            let anchor = self.selection.anchor().or(self.selection.focused()).unwrap_or(cell);
            self.selection.set_anchor(anchor);
            self.select_cell(cell, true);
            self.apply_range_selection(anchor, cell);
        } else {
            self.select_cell(cell, false);
            self.selection.set_anchor(cell);
        }
    }

    /// Move the focus by a delta, clamped to the grid.
    pub fn move_selection(&mut self, d_row: isize, d_col: isize, preserve_range: bool) -> bool {
        match self.selection.move_target(&self.sheet.dims(), d_row, d_col) {
            Some(target) => self.select_cell(target, preserve_range),
            None => false,
        }
    }

    // =========================================================================
    // Ranges
    // =========================================================================

    /// Select the rectangle spanning `anchor` and `active` and outline it.
    /// Corners outside the grid leave the selection untouched.
    pub fn apply_range_selection(&mut self, anchor: CellRef, active: CellRef) -> Option<Range> {
        let range = self.selection.apply_range(&self.sheet.dims(), anchor, active)?;
        self.outline.show(range, OutlineMode::Final);
        Some(range)
    }

    /// Shift+arrow: grow the range from the anchor to the moved focus.
    pub fn extend_selection(&mut self, d_row: isize, d_col: isize) -> Option<Range> {
        let focused = self.selection.focused()?;
        let anchor = self.selection.anchor().unwrap_or(focused);
        self.selection.set_anchor(anchor);
        self.move_selection(d_row, d_col, true);
        let active = self.selection.focused()?;
        self.apply_range_selection(anchor, active)
    }

    pub fn clear_range_selection(&mut self) {
        self.selection.clear_range();
        self.outline.hide();
    }

    /// Column header click: the whole column, anchored at the header cell.
    pub fn select_column(&mut self, col: usize) -> Option<Range> {
        let dims = self.sheet.dims();
        let top = CellRef::new(HEADER_ROW, col);
        let bottom = CellRef::new(dims.rows, col);
        if !dims.contains(top) {
            return None;
        }
        self.selection.set_anchor(top);
        self.select_cell(top, true);
        self.apply_range_selection(top, bottom)
    }

    /// Row header click: the whole row, anchored at column A.
    pub fn select_row(&mut self, row: usize) -> Option<Range> {
        let dims = self.sheet.dims();
        let left = CellRef::new(row, 0);
        let right = CellRef::new(row, dims.cols.saturating_sub(1));
        if !dims.contains(left) {
            return None;
        }
        self.selection.set_anchor(left);
        self.select_cell(left, true);
        self.apply_range_selection(left, right)
    }
}
