//! Range outline.
//!
//! A single rectangle drawn around the active range or drag target. Requests
//! are coalesced: any number of `show` calls between two animation frames
//! cost one layout read. Rendering itself is left to the front end; this
//! module only produces the rounded box to draw.

use std::time::{Duration, Instant};

use tabtab_core::{CellRef, GridDims, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineMode {
    /// Live preview while the fill handle is held
    Dragging,
    Final,
}

/// Screen rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Where cells are on screen.
pub trait LayoutSource {
    /// Bounding box of the positioned container the outline lives in.
    fn container_rect(&self) -> Rect;

    /// Bounding box of a cell, `None` if it is not laid out.
    fn cell_rect(&self, cell: CellRef) -> Option<Rect>;
}

/// Fixed-size grid layout: a row-header column on the left, a column-header
/// row on top, then equally sized cells.
#[derive(Debug, Clone, Copy)]
pub struct UniformLayout {
    pub dims: GridDims,
    pub col_width: f64,
    pub row_height: f64,
    pub row_header_width: f64,
    pub col_header_height: f64,
}

impl UniformLayout {
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            col_width: 80.0,
            row_height: 24.0,
            row_header_width: 50.0,
            col_header_height: 24.0,
        }
    }
}

impl Default for UniformLayout {
    fn default() -> Self {
        Self::new(GridDims::default())
    }
}

impl LayoutSource for UniformLayout {
    fn container_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.row_header_width + self.col_width * self.dims.cols as f64,
            self.col_header_height + self.row_height * self.dims.rows as f64,
        )
    }

    fn cell_rect(&self, cell: CellRef) -> Option<Rect> {
        if !self.dims.contains(cell) {
            return None;
        }
        Some(Rect::new(
            self.row_header_width + self.col_width * cell.col as f64,
            self.col_header_height + self.row_height * (cell.row - 1) as f64,
            self.col_width,
            self.row_height,
        ))
    }
}

/// Outline geometry relative to the container, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineBox {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
    pub mode: OutlineMode,
}

impl OutlineBox {
    fn measure(layout: &dyn LayoutSource, range: Range, mode: OutlineMode) -> Option<Self> {
        let container = layout.container_rect();
        let top_left = layout.cell_rect(range.top_left())?;
        let bottom_right = layout.cell_rect(range.bottom_right())?;
        Some(Self {
            left: (top_left.left - container.left).round() as i64,
            top: (top_left.top - container.top).round() as i64,
            width: (bottom_right.right() - top_left.left).round() as i64,
            height: (bottom_right.bottom() - top_left.top).round() as i64,
            mode,
        })
    }
}

#[derive(Debug, Default)]
pub struct Outline {
    created: bool,
    requested: Option<(Range, OutlineMode)>,
    frame_pending: bool,
    rendered: Option<OutlineBox>,
    hide_deadline: Option<Instant>,
    layout_reads: usize,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the outline around `range`. Drawn on the next animation frame;
    /// cancels a pending auto-hide.
    pub fn show(&mut self, range: Range, mode: OutlineMode) {
        self.created = true;
        self.requested = Some((range, mode));
        self.frame_pending = true;
        self.hide_deadline = None;
    }

    /// Hide now and forget the outline state.
    pub fn hide(&mut self) {
        self.requested = None;
        self.rendered = None;
        self.frame_pending = false;
        self.hide_deadline = None;
    }

    /// Run a pending redraw. At most one layout read per frame however many
    /// `show` calls came before it.
    pub fn on_animation_frame(&mut self, layout: &dyn LayoutSource) -> Option<OutlineBox> {
        if !self.frame_pending {
            return self.rendered;
        }
        self.frame_pending = false;
        let (range, mode) = self.requested?;
        self.layout_reads += 1;
        self.rendered = OutlineBox::measure(layout, range, mode);
        self.rendered
    }

    pub fn schedule_hide(&mut self, now: Instant, delay: Duration) {
        self.hide_deadline = Some(now + delay);
    }

    /// Hide if the auto-hide deadline has passed. Returns true if it fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.hide_deadline {
            Some(deadline) if now >= deadline => {
                self.hide();
                true
            }
            _ => false,
        }
    }

    /// True once the outline element exists (after the first show).
    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn is_shown(&self) -> bool {
        self.requested.is_some()
    }

    pub fn requested(&self) -> Option<(Range, OutlineMode)> {
        self.requested
    }

    pub fn mode(&self) -> Option<OutlineMode> {
        self.requested.map(|(_, mode)| mode)
    }

    pub fn rendered(&self) -> Option<OutlineBox> {
        self.rendered
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    pub fn hide_deadline(&self) -> Option<Instant> {
        self.hide_deadline
    }

    pub fn layout_reads(&self) -> usize {
        self.layout_reads
    }
}
