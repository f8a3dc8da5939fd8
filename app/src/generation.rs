//! Copy generation orchestrator.
//!
//! Every bulk operation opens exactly one history transaction, so one undo
//! reverts the whole batch. Cells are filled one after another in row-major
//! order; a failing cell gets an inline error marker and the batch moves on.

use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use tabtab_config::PromptConfig;
use tabtab_core::{CellRef, Range};
use tabtab_engine::{CellMeta, CellWrite, History, Sheet};
use tabtab_provider::{CompletionProvider, GenerateError, PromptRequest};

use crate::app::TabTab;
use crate::error::CommandError;
use crate::outline::OutlineMode;

/// Placeholders shown in a cell while its request is in flight.
pub const LOADING_TEXTS: &[&str] = &["Writing...", "Words go brrr..."];

/// Minimum time a placeholder stays visible before a result lands.
pub const DEFAULT_MIN_DISPLAY: Duration = Duration::from_millis(500);

/// Cells generated below the focus by a column fill.
pub const COLUMN_BATCH_LEN: usize = 10;

/// Prior outputs listed in the `[not: …]` hint.
pub const AVOID_WINDOW: usize = 3;

pub const ERROR_PREFIX: &str = "⚠ Error: ";

/// Tone used when neither the target nor the origin column has a header.
pub const FALLBACK_TONE: &str = "neutral";

/// Where "generate all" writes its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillLayout {
    /// One cell per tone column, in the next empty output row
    #[default]
    AcrossRow,
    /// Up to ten cells below the focus, using the column header as tone
    DownColumn,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellOutcome {
    Generated(String),
    /// Provider error message (without the marker prefix)
    Failed(String),
}

impl CellOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self, CellOutcome::Generated(_))
    }
}

/// What a batch did, cell by cell, in fill order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub label: &'static str,
    pub cells: Vec<(CellRef, CellOutcome)>,
}

impl BatchReport {
    fn new(label: &'static str) -> Self {
        Self { label, cells: Vec::new() }
    }

    pub fn generated_count(&self) -> usize {
        self.cells.iter().filter(|(_, o)| o.is_generated()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.cells.len() - self.generated_count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn outcome_for(&self, cell: CellRef) -> Option<&CellOutcome> {
        self.cells.iter().find(|(c, _)| *c == cell).map(|(_, o)| o)
    }
}

fn loading_text() -> String {
    LOADING_TEXTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Writing...")
        .to_string()
}

/// Source text plus a hint listing the most recent outputs to avoid.
fn with_avoid_list(source: &str, previous: &[String]) -> String {
    let recent = &previous[previous.len().saturating_sub(AVOID_WINDOW)..];
    if recent.is_empty() {
        source.to_string()
    } else {
        format!("{} [not: {}]", source, recent.join("/"))
    }
}

/// Renders prompts and runs one provider call per cell.
pub struct Generator {
    provider: Box<dyn CompletionProvider>,
    prompts: PromptConfig,
    min_display: Duration,
}

impl Generator {
    pub fn new(provider: Box<dyn CompletionProvider>, prompts: PromptConfig) -> Self {
        Self {
            provider,
            prompts,
            min_display: DEFAULT_MIN_DISPLAY,
        }
    }

    pub fn with_min_display(mut self, min_display: Duration) -> Self {
        self.min_display = min_display;
        self
    }

    pub fn prompts(&self) -> &PromptConfig {
        &self.prompts
    }

    pub fn provider_name(&self) -> &str {
        self.provider.display_name()
    }

    pub fn min_display(&self) -> Duration {
        self.min_display
    }

    pub fn ensure_ready(&self) -> Result<(), CommandError> {
        self.provider.ensure_ready().map_err(CommandError::from)
    }

    pub fn request(&self, tone: &str, input: &str) -> PromptRequest {
        PromptRequest {
            system: self.prompts.system_prompt().to_string(),
            user: self.prompts.build_user_prompt(tone, input),
            temperature: self.prompts.temperature(),
        }
    }

    /// One sanitized completion for `input` in `tone`.
    pub fn generate_text(&self, tone: &str, input: &str) -> Result<String, GenerateError> {
        self.provider.generate(&self.request(tone, input))
    }

    /// Generate into `target` and record the result in `history`.
    ///
    /// The cell shows a loading placeholder for the duration of the call.
    /// What the cell held before the placeholder is recorded as the "before"
    /// side, so undo never restores the placeholder. Failures are written
    /// as an inline marker with metadata cleared.
    pub fn fill_cell(
        &self,
        history: &mut History,
        sheet: &mut Sheet,
        target: CellRef,
        tone: &str,
        source: &str,
        input: &str,
    ) -> CellOutcome {
        let before_text = sheet.text(target).to_string();
        let before_meta = sheet.meta(target);
        sheet.set_placeholder(target, Some(loading_text()));

        let started = Instant::now();
        let outcome = match self.generate_text(tone, input) {
            Ok(text) => {
                let elapsed = started.elapsed();
                if elapsed < self.min_display {
                    thread::sleep(self.min_display - elapsed);
                }
                CellOutcome::Generated(text)
            }
            Err(e) => {
                log::error!("generation failed for {}: {}", target, e);
                CellOutcome::Failed(e.to_string())
            }
        };
        sheet.set_placeholder(target, None);

        let write = match &outcome {
            CellOutcome::Generated(text) => {
                CellWrite::text(text.as_str()).meta(CellMeta::generated(source, tone))
            }
            CellOutcome::Failed(message) => {
                CellWrite::text(format!("{}{}", ERROR_PREFIX, message)).meta(CellMeta::cleared())
            }
        };
        history.apply_cell_change(sheet, target, write.before(before_text, before_meta));
        outcome
    }
}

impl TabTab {
    // =========================================================================
    // Generate below (Cmd/Ctrl+Enter)
    // =========================================================================

    /// Generate from `from` into the cell directly beneath it and focus the
    /// target. A source in the last row is a silent no-op.
    pub fn generate_into_below_cell(&mut self, from: CellRef) -> Result<BatchReport, CommandError> {
        let mut report = BatchReport::new("generate-below");
        if !self.sheet.contains(from) {
            return Ok(report);
        }
        if from.is_header() {
            return Err(CommandError::HeaderSource);
        }
        let source = self.sheet.text(from).trim().to_string();
        if source.is_empty() {
            return Err(CommandError::EmptyCurrentCell);
        }
        let target = CellRef::new(from.row + 1, from.col);
        if !self.sheet.contains(target) {
            return Ok(report);
        }
        self.generator.ensure_ready()?;

        let tone = match self.sheet.tone_for_col(from.col) {
            "" => FALLBACK_TONE.to_string(),
            tone => tone.to_string(),
        };
        self.select_cell(target, false);

        let mut tx = self.history.transaction(report.label);
        let outcome = self
            .generator
            .fill_cell(&mut tx, &mut self.sheet, target, &tone, &source, &source);
        report.cells.push((target, outcome));
        Ok(report)
    }

    // =========================================================================
    // Generate all (button / Tab Tab)
    // =========================================================================

    /// Generate from the focused cell, across the row or down the column.
    pub fn generate_all(&mut self, layout: FillLayout) -> Result<BatchReport, CommandError> {
        let focused = self.selection.focused().ok_or(CommandError::NoSelection)?;
        if focused.is_header() {
            return Err(CommandError::HeaderRow);
        }
        let source = self.sheet.text(focused).trim().to_string();
        if source.is_empty() {
            return Err(CommandError::EmptySource);
        }

        match layout {
            FillLayout::AcrossRow => self.generate_row(&source),
            FillLayout::DownColumn => self.generate_column(focused, &source),
        }
    }

    /// One cell per tone column, in the first output row that is empty
    /// across all of them.
    fn generate_row(&mut self, source: &str) -> Result<BatchReport, CommandError> {
        let tone_cols = self.sheet.tone_columns();
        if tone_cols.is_empty() {
            return Err(CommandError::NoToneColumns);
        }
        let row = self
            .sheet
            .next_empty_output_row(&tone_cols)
            .ok_or(CommandError::NoEmptyRow { last_row: self.sheet.dims().rows })?;
        self.generator.ensure_ready()?;

        let mut report = BatchReport::new("generate-row");
        let mut tx = self.history.transaction(report.label);
        for col in tone_cols {
            let target = CellRef::new(row, col);
            let tone = self.sheet.tone_for_col(col).to_string();
            let outcome = self
                .generator
                .fill_cell(&mut tx, &mut self.sheet, target, &tone, source, source);
            report.cells.push((target, outcome));
        }
        Ok(report)
    }

    /// Up to [`COLUMN_BATCH_LEN`] cells below `focused`, each told to avoid
    /// the previous outputs.
    fn generate_column(&mut self, focused: CellRef, source: &str) -> Result<BatchReport, CommandError> {
        let tone = self.sheet.tone_for_col(focused.col).to_string();
        if tone.is_empty() {
            return Err(CommandError::ColumnWithoutHeader);
        }
        let first_row = focused.row + 1;
        let last_row = self.sheet.dims().rows;
        if first_row > last_row {
            return Err(CommandError::NoRowsBelow);
        }
        let last_row = last_row.min(first_row + COLUMN_BATCH_LEN - 1);
        self.generator.ensure_ready()?;

        let mut report = BatchReport::new("generate-column");
        let mut previous = Vec::new();
        let mut tx = self.history.transaction(report.label);
        for row in first_row..=last_row {
            let target = CellRef::new(row, focused.col);
            let input = with_avoid_list(source, &previous);
            let outcome = self
                .generator
                .fill_cell(&mut tx, &mut self.sheet, target, &tone, source, &input);
            if let CellOutcome::Generated(text) = &outcome {
                previous.push(text.clone());
            }
            report.cells.push((target, outcome));
        }
        Ok(report)
    }

    // =========================================================================
    // Drag fill
    // =========================================================================

    /// Generate into every cell of `range` except `origin`, row by row.
    ///
    /// Each column keeps its own avoid list so repeated tones down a column
    /// don't produce the same line twice.
    pub fn fill_dragged_range(&mut self, origin: CellRef, range: Range) -> Result<BatchReport, CommandError> {
        let mut report = BatchReport::new("drag-fill");
        if !self.sheet.contains(origin) {
            return Ok(report);
        }
        let source = self.sheet.text(origin).trim().to_string();
        if source.is_empty() {
            return Err(CommandError::EmptyOrigin);
        }
        self.generator.ensure_ready()?;

        let origin_tone = self.sheet.tone_for_col(origin.col).to_string();
        let mut column_outputs: HashMap<usize, Vec<String>> = HashMap::new();

        let mut tx = self.history.transaction(report.label);
        for target in range.cells() {
            if target == origin || !self.sheet.contains(target) {
                continue;
            }
            let tone = match self.sheet.tone_for_col(target.col) {
                "" if origin_tone.is_empty() => FALLBACK_TONE.to_string(),
                "" => origin_tone.clone(),
                tone => tone.to_string(),
            };
            self.outline.show(range, OutlineMode::Final);

            let previous = column_outputs.entry(target.col).or_default();
            let input = with_avoid_list(&source, previous);
            let outcome = self
                .generator
                .fill_cell(&mut tx, &mut self.sheet, target, &tone, &source, &input);
            if let CellOutcome::Generated(text) = &outcome {
                previous.push(text.clone());
            }
            self.outline.show(range, OutlineMode::Final);
            report.cells.push((target, outcome));
        }
        Ok(report)
    }
}
