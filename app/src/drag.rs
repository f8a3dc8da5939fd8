//! Fill-handle drag.
//!
//! Pressing the fill handle starts a drag from that cell; every pointer move
//! previews the rectangle between the origin and the hovered cell; release
//! generates into the rectangle. Pointer events only reach the controller
//! while a drag is running.

use std::time::{Duration, Instant};

use tabtab_core::{CellRef, Range};

use crate::app::TabTab;
use crate::generation::BatchReport;
use crate::outline::OutlineMode;

/// Time the final outline stays up after release.
pub const AUTO_HIDE_DELAY: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        origin: CellRef,
        /// Last cell the pointer was over, once it has moved
        end: Option<CellRef>,
        /// Cells marked as fill preview (the rectangle minus the origin)
        preview: Vec<CellRef>,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// True while move/up events should be routed to the drag.
    pub fn is_capturing_pointer(&self) -> bool {
        self.is_dragging()
    }

    pub fn origin(&self) -> Option<CellRef> {
        match self {
            DragState::Dragging { origin, .. } => Some(*origin),
            DragState::Idle => None,
        }
    }

    pub fn preview(&self) -> &[CellRef] {
        match self {
            DragState::Dragging { preview, .. } => preview,
            DragState::Idle => &[],
        }
    }

    pub fn is_preview(&self, cell: CellRef) -> bool {
        self.preview().contains(&cell)
    }
}

impl TabTab {
    /// Fill-handle press on `cell`.
    pub fn begin_fill_drag(&mut self, cell: CellRef) -> bool {
        if !self.sheet.contains(cell) {
            return false;
        }
        self.drag = DragState::Dragging {
            origin: cell,
            end: None,
            preview: Vec::new(),
        };
        if self.edit.as_ref().map_or(false, |e| e.cell == cell) {
            self.stop_edit();
        }
        self.select_cell(cell, false);
        self.outline.show(Range::single(cell), OutlineMode::Dragging);
        true
    }

    /// Pointer moved over `cell` during a drag.
    pub fn drag_over(&mut self, cell: CellRef) {
        if !self.sheet.contains(cell) {
            return;
        }
        let DragState::Dragging { origin, end, preview } = &mut self.drag else {
            return;
        };
        if *end == Some(cell) {
            return;
        }
        let origin = *origin;
        let range = Range::spanning(origin, cell);
        *preview = range.cells().filter(|&c| c != origin).collect();
        *end = Some(cell);
        self.outline.show(range, OutlineMode::Dragging);
    }

    /// Pointer released. Generates into the dragged rectangle if the pointer
    /// ever moved; refusals become alerts. The outline hides
    /// [`AUTO_HIDE_DELAY`] later unless something else shows it first.
    pub fn release_drag(&mut self) -> Option<BatchReport> {
        self.release_drag_at(Instant::now())
    }

    pub fn release_drag_at(&mut self, now: Instant) -> Option<BatchReport> {
        let DragState::Dragging { origin, end, .. } = std::mem::take(&mut self.drag) else {
            return None;
        };

        let mut report = None;
        if let Some(end) = end {
            let range = Range::spanning(origin, end);
            self.outline.show(range, OutlineMode::Final);
            if end != origin {
                self.select_cell(end, false);
            }
            match self.fill_dragged_range(origin, range) {
                Ok(batch) if !batch.is_empty() => report = Some(batch),
                Ok(_) => {}
                Err(e) => self.alert(e),
            }
        }

        self.outline.schedule_hide(now, AUTO_HIDE_DELAY);
        report
    }
}
