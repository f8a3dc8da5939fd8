//! Transactional undo/redo log for cell text + generation metadata.
//!
//! A transaction collects per-cell before/after snapshots. Only the first
//! touch of a cell sets its "before" side; later touches in the same
//! transaction update "after". Committed transactions replay those snapshots
//! on undo/redo.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use tabtab_core::CellRef;

use crate::cell::CellMeta;
use crate::sheet::Sheet;

/// Oldest transactions are dropped beyond this many.
const MAX_ENTRIES: usize = 100;

/// Snapshot of one cell across a transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct CellChange {
    pub cell: CellRef,
    pub before_text: String,
    pub after_text: String,
    pub before_meta: CellMeta,
    pub after_meta: CellMeta,
}

impl CellChange {
    /// True if the cell ends the transaction exactly as it started.
    pub fn is_noop(&self) -> bool {
        self.before_text == self.after_text && self.before_meta == self.after_meta
    }
}

/// One undoable unit of change spanning one or more cells.
#[derive(Clone, Debug)]
pub struct Transaction {
    pub label: String,
    changes: Vec<CellChange>,
    index: HashMap<CellRef, usize>,
}

impl Transaction {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            changes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Merge a change: keep the earliest "before", take the latest "after".
    fn record(&mut self, change: CellChange) {
        match self.index.get(&change.cell) {
            Some(&i) => {
                let existing = &mut self.changes[i];
                existing.after_text = change.after_text;
                existing.after_meta = change.after_meta;
            }
            None => {
                self.index.insert(change.cell, self.changes.len());
                self.changes.push(change);
            }
        }
    }

    /// Changes in first-touch order.
    pub fn changes(&self) -> &[CellChange] {
        &self.changes
    }

    pub fn change_for(&self, cell: CellRef) -> Option<&CellChange> {
        self.index.get(&cell).map(|&i| &self.changes[i])
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// True if no touched cell actually changed.
    pub fn is_noop(&self) -> bool {
        self.changes.iter().all(CellChange::is_noop)
    }
}

/// What the log is doing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogMode {
    Idle,
    /// A transaction is open; `depth` counts nested begin calls.
    Recording { depth: usize },
    /// An undo/redo is writing cells; nothing gets recorded.
    Replaying,
}

#[derive(Debug)]
enum State {
    Idle,
    Recording { tx: Transaction, depth: usize },
    Replaying,
}

/// A cell write routed through the log.
///
/// `before_text`/`before_meta` override the snapshot taken from the sheet,
/// so a flow that showed a transient state (a loading placeholder, an
/// in-place edit) can still record what the user saw before it started.
#[derive(Clone, Debug, Default)]
pub struct CellWrite {
    pub text: String,
    /// `None` keeps the cell's current metadata.
    pub meta: Option<CellMeta>,
    pub before_text: Option<String>,
    pub before_meta: Option<CellMeta>,
}

impl CellWrite {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn meta(mut self, meta: CellMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn before(mut self, text: impl Into<String>, meta: CellMeta) -> Self {
        self.before_text = Some(text.into());
        self.before_meta = Some(meta);
        self
    }
}

#[derive(Debug)]
pub struct History {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    state: State,
    max_entries: usize,
}

impl History {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            state: State::Idle,
            max_entries: MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            ..Self::new()
        }
    }

    pub fn mode(&self) -> LogMode {
        match &self.state {
            State::Idle => LogMode::Idle,
            State::Recording { depth, .. } => LogMode::Recording { depth: *depth },
            State::Replaying => LogMode::Replaying,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, State::Recording { .. })
    }

    /// The transaction currently being built, if any.
    pub fn open_transaction(&self) -> Option<&Transaction> {
        match &self.state {
            State::Recording { tx, .. } => Some(tx),
            _ => None,
        }
    }

    /// Open a transaction. Returns true only when a new top-level transaction
    /// was started; a nested call just deepens the current one and a call
    /// during replay is rejected.
    pub fn begin_transaction(&mut self, label: &str) -> bool {
        match &mut self.state {
            State::Idle => {
                self.state = State::Recording { tx: Transaction::new(label), depth: 1 };
                true
            }
            State::Recording { depth, .. } => {
                *depth += 1;
                false
            }
            State::Replaying => {
                log::debug!("begin_transaction({}) rejected during replay", label);
                false
            }
        }
    }

    /// Close the innermost scope. The outermost close commits the transaction
    /// if it changed anything. Returns true if a transaction was pushed.
    pub fn end_transaction(&mut self) -> bool {
        let depth = match &mut self.state {
            State::Recording { depth, .. } => depth,
            State::Idle | State::Replaying => return false,
        };
        if *depth > 1 {
            *depth -= 1;
            return false;
        }

        let tx = match std::mem::replace(&mut self.state, State::Idle) {
            State::Recording { tx, .. } => tx,
            other => {
                self.state = other;
                return false;
            }
        };
        if tx.is_empty() || tx.is_noop() {
            log::debug!("discarding transaction '{}' (no net change)", tx.label);
            return false;
        }
        log::debug!("committed transaction '{}' ({} cells)", tx.label, tx.len());
        self.push_committed(tx);
        true
    }

    /// Scoped transaction: ends when the returned guard drops, including
    /// during unwinding.
    pub fn transaction(&mut self, label: &str) -> TransactionScope<'_> {
        self.begin_transaction(label);
        TransactionScope { history: self }
    }

    /// Run `f` inside a transaction.
    pub fn with_transaction<R>(&mut self, label: &str, f: impl FnOnce(&mut History) -> R) -> R {
        let mut scope = self.transaction(label);
        f(&mut scope)
    }

    /// Write text/metadata to a cell and record the change.
    ///
    /// Outside any transaction the write is committed on its own as an
    /// implicit "auto" transaction. During replay the write happens but is
    /// not recorded. Returns false if the cell is outside the grid.
    pub fn apply_cell_change(&mut self, sheet: &mut Sheet, cell: CellRef, write: CellWrite) -> bool {
        if !sheet.contains(cell) {
            return false;
        }
        let before_text = write.before_text.unwrap_or_else(|| sheet.text(cell).to_string());
        let before_meta = write.before_meta.unwrap_or_else(|| sheet.meta(cell));

        sheet.set_text(cell, &write.text);
        if let Some(meta) = write.meta {
            sheet.set_meta(cell, meta);
        }

        let change = CellChange {
            cell,
            before_text,
            after_text: sheet.text(cell).to_string(),
            before_meta,
            after_meta: sheet.meta(cell),
        };

        match &mut self.state {
            State::Recording { tx, .. } => tx.record(change),
            State::Replaying => {}
            State::Idle => {
                self.begin_transaction("auto");
                if let State::Recording { tx, .. } = &mut self.state {
                    tx.record(change);
                }
                self.end_transaction();
            }
        }
        true
    }

    fn push_committed(&mut self, tx: Transaction) {
        self.undo_stack.push(tx);
        self.redo_stack.clear();

        // Limit history size
        if self.undo_stack.len() > self.max_entries {
            self.undo_stack.remove(0);
        }
    }

    /// Revert the latest transaction. Refused while a transaction is open.
    pub fn undo(&mut self, sheet: &mut Sheet) -> Option<&Transaction> {
        if !matches!(self.state, State::Idle) {
            return None;
        }
        let tx = self.undo_stack.pop()?;

        self.state = State::Replaying;
        for change in tx.changes.iter().rev() {
            sheet.set_text(change.cell, &change.before_text);
            sheet.set_meta(change.cell, change.before_meta.clone());
        }
        self.state = State::Idle;

        self.redo_stack.push(tx);
        self.redo_stack.last()
    }

    /// Re-apply the latest undone transaction. Refused while a transaction is open.
    pub fn redo(&mut self, sheet: &mut Sheet) -> Option<&Transaction> {
        if !matches!(self.state, State::Idle) {
            return None;
        }
        let tx = self.redo_stack.pop()?;

        self.state = State::Replaying;
        for change in &tx.changes {
            sheet.set_text(change.cell, &change.after_text);
            sheet.set_meta(change.cell, change.after_meta.clone());
        }
        self.state = State::Idle;

        self.undo_stack.push(tx);
        self.undo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Most recently committed transaction.
    pub fn last_committed(&self) -> Option<&Transaction> {
        self.undo_stack.last()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard returned by [`History::transaction`].
pub struct TransactionScope<'a> {
    history: &'a mut History,
}

impl Deref for TransactionScope<'_> {
    type Target = History;

    fn deref(&self) -> &History {
        self.history
    }
}

impl DerefMut for TransactionScope<'_> {
    fn deref_mut(&mut self) -> &mut History {
        self.history
    }
}

impl Drop for TransactionScope<'_> {
    fn drop(&mut self) {
        self.history.end_transaction();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cell(row: usize, col: usize) -> CellRef {
        CellRef::new(row, col)
    }

    fn generated(text: &str, source: &str, tone: &str) -> CellWrite {
        CellWrite::text(text).meta(CellMeta::generated(source, tone))
    }

    #[test]
    fn test_auto_transaction_commits_immediately() {
        let mut sheet = Sheet::default();
        let mut history = History::new();

        history.apply_cell_change(&mut sheet, cell(2, 0), CellWrite::text("Hello"));

        assert_eq!(history.mode(), LogMode::Idle);
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.last_committed().unwrap().label, "auto");
    }

    #[test]
    fn test_batch_is_one_undo_step() {
        let mut sheet = Sheet::default();
        let mut history = History::new();

        history.with_transaction("drag-fill", |h| {
            h.apply_cell_change(&mut sheet, cell(2, 1), generated("Hi!", "Hello", "playful"));
            h.apply_cell_change(&mut sheet, cell(3, 1), generated("Hey", "Hello", "playful"));
        });
        assert_eq!(history.undo_len(), 1);

        let tx = history.undo(&mut sheet).unwrap();
        assert_eq!(tx.label, "drag-fill");
        assert_eq!(sheet.text(cell(2, 1)), "");
        assert_eq!(sheet.text(cell(3, 1)), "");
        assert!(sheet.meta(cell(2, 1)).is_empty());
    }

    #[test]
    fn test_repeated_touch_keeps_first_before() {
        let mut sheet = Sheet::default();
        sheet.set_text(cell(2, 0), "original");
        let mut history = History::new();

        history.with_transaction("edit", |h| {
            h.apply_cell_change(&mut sheet, cell(2, 0), CellWrite::text("first"));
            h.apply_cell_change(&mut sheet, cell(2, 0), CellWrite::text("second"));
        });

        let tx = history.last_committed().unwrap();
        assert_eq!(tx.len(), 1);
        let change = tx.change_for(cell(2, 0)).unwrap();
        assert_eq!(change.before_text, "original");
        assert_eq!(change.after_text, "second");
    }

    #[test]
    fn test_undo_redo_keeps_surrounding_whitespace() {
        let mut sheet = Sheet::default();
        sheet.set_text(cell(2, 0), " padded ");
        let mut history = History::new();

        history.apply_cell_change(&mut sheet, cell(2, 0), CellWrite::text("  Sign in\t"));
        let change = history.last_committed().unwrap().change_for(cell(2, 0)).unwrap();
        assert_eq!(change.before_text, " padded ");
        assert_eq!(change.after_text, "  Sign in\t");

        history.undo(&mut sheet);
        assert_eq!(sheet.text(cell(2, 0)), " padded ");
        history.redo(&mut sheet);
        assert_eq!(sheet.text(cell(2, 0)), "  Sign in\t");
    }

    #[test]
    fn test_supplied_before_skips_placeholder() {
        let mut sheet = Sheet::default();
        sheet.set_text(cell(3, 0), "Writing...");
        let mut history = History::new();

        history.apply_cell_change(
            &mut sheet,
            cell(3, 0),
            generated("Done", "src", "calm").before("", CellMeta::cleared()),
        );
        history.undo(&mut sheet);
        assert_eq!(sheet.text(cell(3, 0)), "");
    }

    #[test]
    fn test_noop_transactions_not_pushed() {
        let mut sheet = Sheet::default();
        sheet.set_text(cell(2, 0), "same");
        let mut history = History::new();

        history.with_transaction("empty", |_| {});
        history.with_transaction("same", |h| {
            h.apply_cell_change(&mut sheet, cell(2, 0), CellWrite::text("same"));
        });
        history.with_transaction("back-and-forth", |h| {
            h.apply_cell_change(&mut sheet, cell(2, 0), CellWrite::text("other"));
            h.apply_cell_change(&mut sheet, cell(2, 0), CellWrite::text("same"));
        });

        assert_eq!(history.undo_len(), 0);
    }

    #[test]
    fn test_nested_begin_joins_outer() {
        let mut sheet = Sheet::default();
        let mut history = History::new();

        assert!(history.begin_transaction("outer"));
        history.with_transaction("inner", |h| {
            assert_eq!(h.mode(), LogMode::Recording { depth: 2 });
            h.apply_cell_change(&mut sheet, cell(2, 0), CellWrite::text("a"));
        });
        // Inner scope closing must not commit the outer transaction
        assert_eq!(history.undo_len(), 0);
        history.apply_cell_change(&mut sheet, cell(2, 1), CellWrite::text("b"));
        assert!(history.end_transaction());

        assert_eq!(history.undo_len(), 1);
        let tx = history.last_committed().unwrap();
        assert_eq!(tx.label, "outer");
        assert_eq!(tx.len(), 2);
    }

    #[test]
    fn test_scope_closes_on_panic() {
        let mut history = History::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            history.with_transaction("boom", |_| panic!("generator blew up"));
        }));
        assert!(result.is_err());
        assert_eq!(history.mode(), LogMode::Idle);
    }

    #[test]
    fn test_new_transaction_clears_redo() {
        let mut sheet = Sheet::default();
        let mut history = History::new();

        history.apply_cell_change(&mut sheet, cell(2, 0), CellWrite::text("one"));
        history.apply_cell_change(&mut sheet, cell(2, 0), CellWrite::text("two"));
        history.undo(&mut sheet);
        history.undo(&mut sheet);
        assert_eq!(history.redo_len(), 2);

        history.apply_cell_change(&mut sheet, cell(3, 0), CellWrite::text("three"));
        assert_eq!(history.redo_len(), 0);
        assert!(history.redo(&mut sheet).is_none());
    }

    #[test]
    fn test_undo_refused_while_recording() {
        let mut sheet = Sheet::default();
        let mut history = History::new();
        history.apply_cell_change(&mut sheet, cell(2, 0), CellWrite::text("one"));

        history.begin_transaction("open");
        assert!(history.undo(&mut sheet).is_none());
        history.end_transaction();
        assert!(history.undo(&mut sheet).is_some());
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut sheet = Sheet::default();
        let mut history = History::new();
        assert!(history.undo(&mut sheet).is_none());
        assert!(history.redo(&mut sheet).is_none());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_max_entries_drops_oldest() {
        let mut sheet = Sheet::default();
        let mut history = History::with_max_entries(2);
        for text in ["a", "b", "c"] {
            history.apply_cell_change(&mut sheet, cell(2, 0), CellWrite::text(text));
        }
        assert_eq!(history.undo_len(), 2);
        history.undo(&mut sheet);
        history.undo(&mut sheet);
        assert_eq!(sheet.text(cell(2, 0)), "a");
    }

    fn arb_write() -> impl Strategy<Value = (usize, usize, String, bool)> {
        (2usize..6, 0usize..4, "[a-z ]{0,4}", any::<bool>())
    }

    proptest! {
        #[test]
        fn prop_undo_redo_round_trip(
            writes in prop::collection::vec(arb_write(), 1..12),
            flips in 1usize..6,
        ) {
            let mut sheet = Sheet::default();
            let mut history = History::new();

            history.with_transaction("batch", |h| {
                for (row, col, text, gen) in &writes {
                    let mut write = CellWrite::text(text.clone());
                    write = if *gen {
                        write.meta(CellMeta::generated("src", "tone"))
                    } else {
                        write.meta(CellMeta::cleared())
                    };
                    h.apply_cell_change(&mut sheet, cell(*row, *col), write);
                }
            });

            let touched: Vec<CellRef> = writes.iter().map(|(r, c, _, _)| cell(*r, *c)).collect();
            let after: Vec<(String, CellMeta)> = touched
                .iter()
                .map(|&c| (sheet.text(c).to_string(), sheet.meta(c)))
                .collect();

            if history.undo_len() == 0 {
                // Only possible when every write left its cell blank
                prop_assert!(after.iter().all(|(t, m)| t.is_empty() && m.is_empty()));
                return Ok(());
            }

            for _ in 0..flips {
                history.undo(&mut sheet);
                for &c in &touched {
                    prop_assert_eq!(sheet.text(c), "");
                    prop_assert!(sheet.meta(c).is_empty());
                }
                history.redo(&mut sheet);
                for (i, &c) in touched.iter().enumerate() {
                    prop_assert_eq!(sheet.text(c), after[i].0.as_str());
                    prop_assert_eq!(&sheet.meta(c), &after[i].1);
                }
            }
        }
    }
}
