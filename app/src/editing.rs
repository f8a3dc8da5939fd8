//! In-place cell editing.
//!
//! The edit buffer lives outside the sheet; the cell only changes when the
//! edit is committed, as one "edit" transaction.

use tabtab_core::CellRef;
use tabtab_engine::{CellMeta, CellWrite};

use crate::app::TabTab;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub cell: CellRef,
    pub buffer: String,
}

impl TabTab {
    /// Focus `cell` and open an editor on it. `initial_text` replaces the
    /// cell's content (typing a character over a selected cell); otherwise
    /// the buffer starts from the current text.
    pub fn start_edit(&mut self, cell: CellRef, initial_text: Option<&str>) -> bool {
        if !self.select_cell(cell, false) {
            return false;
        }
        let buffer = match initial_text {
            Some(text) => text.to_string(),
            None => self.sheet.text(cell).to_string(),
        };
        self.edit = Some(EditSession { cell, buffer });
        true
    }

    /// Commit the open edit. Manual edits clear generation metadata.
    /// Returns false when nothing was being edited.
    pub fn stop_edit(&mut self) -> bool {
        let Some(session) = self.edit.take() else {
            return false;
        };
        let sheet = &mut self.sheet;
        self.history.with_transaction("edit", |history| {
            history.apply_cell_change(
                sheet,
                session.cell,
                CellWrite::text(session.buffer).meta(CellMeta::cleared()),
            )
        });
        true
    }

    /// Close the editor without touching the cell.
    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn set_edit_buffer(&mut self, text: &str) {
        if let Some(session) = self.edit.as_mut() {
            session.buffer = text.to_string();
        }
    }

    pub fn insert_text(&mut self, text: &str) {
        if let Some(session) = self.edit.as_mut() {
            session.buffer.push_str(text);
        }
    }

    pub fn delete_backward(&mut self) {
        if let Some(session) = self.edit.as_mut() {
            session.buffer.pop();
        }
    }
}
