//! Clipboard operations for TabTab.
//!
//! This module contains:
//! - The `Clipboard` seam and an in-process implementation
//! - Copy (focused cell or range as TSV)
//! - Paste (TSV block anchored at the focus)
//! - Delete selection

use std::cell::RefCell;

use tabtab_core::CellRef;
use tabtab_engine::{tsv, CellMeta, CellWrite};

use crate::app::TabTab;

/// System clipboard access.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> bool;
    fn read_text(&self) -> Option<String>;
}

/// Clipboard kept in memory (headless use, tests, CLI).
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: RefCell<Option<String>>,
}

impl MemoryClipboard {
    pub fn with_text(text: &str) -> Self {
        Self {
            contents: RefCell::new(Some(text.to_string())),
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> bool {
        *self.contents.borrow_mut() = Some(text.to_string());
        true
    }

    fn read_text(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl TabTab {
    /// Text a copy would produce: the active range as TSV, else the focused
    /// cell's text.
    pub fn selection_text(&self) -> String {
        if let Some(range) = self.selection.range() {
            return tsv::render(&self.sheet.range_texts(range));
        }
        self.selection
            .focused()
            .map(|cell| self.sheet.text(cell).trim().to_string())
            .unwrap_or_default()
    }

    pub fn copy_selection(&mut self) -> bool {
        let text = self.selection_text();
        let ok = self.clipboard.write_text(&text);
        if !ok {
            log::warn!("clipboard write failed ({} bytes)", text.len());
        }
        ok
    }

    /// Paste from the clipboard at the focused cell.
    pub fn paste(&mut self) -> usize {
        match self.clipboard.read_text() {
            Some(text) => self.paste_text(&text),
            None => 0,
        }
    }

    /// Write a TSV block anchored at the focused cell as one "paste" step.
    ///
    /// Values are trimmed and lose generation metadata. The header row and
    /// cells past the grid edge are skipped. Returns the number of cells
    /// written.
    pub fn paste_text(&mut self, text: &str) -> usize {
        let Some(start) = self.selection.focused() else {
            return 0;
        };
        if text.is_empty() || start.is_header() {
            return 0;
        }

        let mut written = 0;
        let mut tx = self.history.transaction("paste");
        for (row_offset, line) in tsv::parse(text).into_iter().enumerate() {
            for (col_offset, value) in line.into_iter().enumerate() {
                let target = CellRef::new(start.row + row_offset, start.col + col_offset);
                if target.is_header() || !self.sheet.contains(target) {
                    continue;
                }
                let write = CellWrite::text(value.trim()).meta(CellMeta::cleared());
                if tx.apply_cell_change(&mut self.sheet, target, write) {
                    written += 1;
                }
            }
        }
        written
    }

    /// Delete/Backspace: clear the range (or focused cell) as one "clear"
    /// step. Row 1 is never cleared.
    pub fn clear_selection_cells(&mut self) -> usize {
        let targets: Vec<CellRef> = self
            .selection
            .cells()
            .into_iter()
            .filter(|cell| !cell.is_header())
            .collect();
        if targets.is_empty() {
            return 0;
        }

        let mut tx = self.history.transaction("clear");
        for &cell in &targets {
            tx.apply_cell_change(&mut self.sheet, cell, CellWrite::text("").meta(CellMeta::cleared()));
        }
        targets.len()
    }
}
