//! The TabTab controller.
//!
//! One explicit context object owns all grid state. The front end forwards
//! input events to it and renders from its accessors.

use std::time::Instant;

use tabtab_core::{CellRef, Selection};
use tabtab_engine::{CellMeta, CellWrite, History, Sheet};

use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::drag::DragState;
use crate::editing::EditSession;
use crate::error::CommandError;
use crate::generation::{FillLayout, Generator};
use crate::outline::{LayoutSource, Outline, OutlineBox, UniformLayout};

pub struct TabTab {
    pub(crate) sheet: Sheet,
    pub(crate) selection: Selection,
    pub(crate) history: History,
    pub(crate) drag: DragState,
    pub(crate) outline: Outline,
    pub(crate) edit: Option<EditSession>,
    pub(crate) generator: Generator,
    pub(crate) clipboard: Box<dyn Clipboard>,
    pub(crate) layout: Box<dyn LayoutSource>,
    /// Layout used by "generate all" (button and Tab Tab)
    pub(crate) fill_layout: FillLayout,
    /// Time of the previous lone Tab press
    pub(crate) last_tab: Option<Instant>,
    pub(crate) alerts: Vec<CommandError>,
}

impl TabTab {
    /// Empty header cells are seeded from the prompt config's default
    /// column headers.
    pub fn new(mut sheet: Sheet, generator: Generator) -> Self {
        let seeded = sheet.seed_headers(&generator.prompts().column_headers);
        if seeded > 0 {
            log::debug!("seeded {} default column headers", seeded);
        }
        let layout = UniformLayout::new(sheet.dims());
        Self {
            sheet,
            selection: Selection::new(),
            history: History::new(),
            drag: DragState::Idle,
            outline: Outline::new(),
            edit: None,
            generator,
            clipboard: Box::new(MemoryClipboard::default()),
            layout: Box::new(layout),
            fill_layout: FillLayout::default(),
            last_tab: None,
            alerts: Vec::new(),
        }
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn clipboard(&self) -> &dyn Clipboard {
        self.clipboard.as_ref()
    }

    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    pub fn set_layout(&mut self, layout: Box<dyn LayoutSource>) {
        self.layout = layout;
    }

    pub fn fill_layout(&self) -> FillLayout {
        self.fill_layout
    }

    pub fn set_fill_layout(&mut self, layout: FillLayout) {
        self.fill_layout = layout;
    }

    /// Write a cell as a manual edit: metadata is cleared and the change is
    /// recorded (as its own "auto" step outside a transaction).
    pub fn set_cell_text(&mut self, cell: CellRef, text: &str) -> bool {
        self.history.apply_cell_change(
            &mut self.sheet,
            cell,
            CellWrite::text(text).meta(CellMeta::cleared()),
        )
    }

    // =========================================================================
    // Undo / Redo
    // =========================================================================

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&mut self.sheet) {
            Some(tx) => {
                log::debug!("undo '{}' ({} cells)", tx.label, tx.len());
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&mut self.sheet) {
            Some(tx) => {
                log::debug!("redo '{}' ({} cells)", tx.label, tx.len());
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Alerts
    // =========================================================================

    /// Queue a user-facing alert.
    pub fn alert(&mut self, err: CommandError) {
        log::info!("alert: {}", err);
        self.alerts.push(err);
    }

    /// Drain queued alerts, oldest first.
    pub fn take_alerts(&mut self) -> Vec<CommandError> {
        std::mem::take(&mut self.alerts)
    }

    // =========================================================================
    // Frame / timers
    // =========================================================================

    /// Advance timers (the outline auto-hide).
    pub fn tick(&mut self, now: Instant) {
        self.outline.tick(now);
    }

    /// Run the pending outline redraw, if any.
    pub fn render_frame(&mut self) -> Option<OutlineBox> {
        self.outline.on_animation_frame(self.layout.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use tabtab_config::PromptConfig;
    use tabtab_core::{GridDims, Range};
    use tabtab_provider::{CompletionProvider, GenerateError, PromptRequest};

    use super::*;
    use crate::outline::OutlineMode;

    struct Echo;

    impl CompletionProvider for Echo {
        fn display_name(&self) -> &str {
            "Echo"
        }

        fn complete(&self, request: &PromptRequest) -> Result<String, GenerateError> {
            Ok(request.user.clone())
        }
    }

    fn app() -> TabTab {
        let generator = Generator::new(Box::new(Echo), PromptConfig::builtin());
        TabTab::new(Sheet::new(GridDims::default()), generator)
    }

    #[test]
    fn test_new_seeds_default_headers() {
        let prompts = PromptConfig::parse(r#"{"columnHeaders":["Playful","Formal"]}"#).unwrap();
        let generator = Generator::new(Box::new(Echo), prompts);
        let mut sheet = Sheet::new(GridDims::default());
        sheet.set_text(CellRef::new(1, 1), "Custom");
        let app = TabTab::new(sheet, generator);

        assert_eq!(app.sheet().text(CellRef::new(1, 0)), "Playful");
        assert_eq!(app.sheet().text(CellRef::new(1, 1)), "Custom");
        assert_eq!(app.sheet().tone_columns(), vec![0, 1]);
        assert_eq!(app.history().undo_len(), 0);
    }

    #[test]
    fn test_set_cell_text_clears_meta() {
        let mut app = app();
        let cell = CellRef::new(3, 1);
        app.sheet.set_meta(cell, CellMeta::generated("src", "playful"));
        assert!(app.set_cell_text(cell, "manual"));
        assert!(app.sheet().meta(cell).is_empty());
        assert_eq!(app.history().last_committed().unwrap().label, "auto");
        assert!(!app.set_cell_text(CellRef::new(31, 0), "x"));
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut app = app();
        let cell = CellRef::new(2, 0);
        app.set_cell_text(cell, "one");
        app.set_cell_text(cell, "two");

        assert!(app.undo());
        assert_eq!(app.sheet().text(cell), "one");
        assert!(app.redo());
        assert_eq!(app.sheet().text(cell), "two");
        assert!(!app.redo());
    }

    #[test]
    fn test_alert_queue() {
        let mut app = app();
        app.alert(CommandError::NoSelection);
        app.alert(CommandError::HeaderRow);
        assert_eq!(app.take_alerts(), vec![CommandError::NoSelection, CommandError::HeaderRow]);
        assert!(app.take_alerts().is_empty());
    }

    #[test]
    fn test_render_frame_uses_layout() {
        let mut app = app();
        app.apply_range_selection(CellRef::new(2, 0), CellRef::new(2, 0));
        let rect = app.render_frame().unwrap();
        assert_eq!((rect.left, rect.top, rect.mode), (50, 48, OutlineMode::Final));

        let mut layout = UniformLayout::default();
        layout.row_header_width = 0.0;
        app.set_layout(Box::new(layout));
        app.apply_range_selection(CellRef::new(2, 0), CellRef::new(3, 1));
        let rect = app.render_frame().unwrap();
        assert_eq!((rect.left, rect.width), (0, 160));
        assert_eq!(app.outline().requested().map(|(r, _)| r), Some(Range::new(2, 0, 3, 1)));
    }
}
