//! End-to-end scenarios driving the `TabTab` controller the way a front end
//! would: pointer and key events in, grid state and alerts out.
//!
//! Run with: cargo test -p tabtab --test scenarios

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tabtab::{CellOutcome, CommandError, FillLayout, Generator, Key, KeyEvent, KeyOutcome, Modifiers, OutlineMode, TabTab};
use tabtab_config::{AIProvider, PromptConfig};
use tabtab_core::{CellRef, GridDims, Range};
use tabtab_engine::{CellMeta, Sheet};
use tabtab_provider::{CompletionProvider, GenerateError, HttpProvider, PromptRequest};

/// Replies from a queue, then "copy N" where N counts calls.
struct Scripted {
    replies: RefCell<VecDeque<Result<String, GenerateError>>>,
    requests: Rc<RefCell<Vec<PromptRequest>>>,
    ready: Result<(), GenerateError>,
}

impl CompletionProvider for Scripted {
    fn display_name(&self) -> &str {
        "Scripted"
    }

    fn ensure_ready(&self) -> Result<(), GenerateError> {
        self.ready.clone()
    }

    fn complete(&self, request: &PromptRequest) -> Result<String, GenerateError> {
        self.requests.borrow_mut().push(request.clone());
        let n = self.requests.borrow().len();
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("copy {}", n)))
    }
}

struct Harness {
    app: TabTab,
    requests: Rc<RefCell<Vec<PromptRequest>>>,
}

fn harness(replies: Vec<Result<String, GenerateError>>) -> Harness {
    harness_with(replies, Ok(()))
}

fn harness_with(replies: Vec<Result<String, GenerateError>>, ready: Result<(), GenerateError>) -> Harness {
    let requests = Rc::new(RefCell::new(Vec::new()));
    let provider = Scripted {
        replies: RefCell::new(replies.into()),
        requests: Rc::clone(&requests),
        ready,
    };
    let generator = Generator::new(Box::new(provider), PromptConfig::builtin()).with_min_display(Duration::ZERO);
    let headers: Vec<String> = ["Playful", "Formal", "Concise"].iter().map(|s| s.to_string()).collect();
    let app = TabTab::new(Sheet::with_headers(GridDims::default(), &headers), generator);
    Harness { app, requests }
}

fn cell(row: usize, col: usize) -> CellRef {
    CellRef::new(row, col)
}

fn drag(app: &mut TabTab, from: CellRef, path: &[CellRef]) -> Option<tabtab::BatchReport> {
    app.begin_fill_drag(from);
    for &c in path {
        app.drag_over(c);
    }
    app.release_drag()
}

#[test]
fn test_drag_fill_is_one_undo_step() {
    let mut h = harness(vec![]);
    h.app.set_cell_text(cell(2, 0), "Sign in");
    let steps_before = h.app.history().undo_len();

    let report = drag(&mut h.app, cell(2, 0), &[cell(3, 1), cell(4, 2)]).unwrap();

    // 3x3 rectangle minus the origin
    assert_eq!(report.generated_count(), 8);
    assert_eq!(h.requests.borrow().len(), 8);
    assert_eq!(h.app.history().undo_len(), steps_before + 1);
    assert_eq!(h.app.history().last_committed().unwrap().label, "drag-fill");

    for target in Range::new(2, 0, 4, 2).cells().filter(|&c| c != cell(2, 0)) {
        assert!(!h.app.sheet().text(target).is_empty(), "{} left empty", target);
        let tone = h.app.sheet().tone_for_col(target.col).to_string();
        assert_eq!(h.app.sheet().meta(target), CellMeta::generated("Sign in", &tone));
        assert!(!h.app.sheet().is_generating(target));
    }

    let filled: Vec<String> = Range::new(2, 0, 4, 2)
        .cells()
        .map(|c| h.app.sheet().text(c).to_string())
        .collect();

    assert!(h.app.undo());
    for target in Range::new(2, 0, 4, 2).cells().filter(|&c| c != cell(2, 0)) {
        assert_eq!(h.app.sheet().text(target), "");
        assert!(h.app.sheet().meta(target).is_empty());
    }
    assert_eq!(h.app.sheet().text(cell(2, 0)), "Sign in");

    assert!(h.app.redo());
    let restored: Vec<String> = Range::new(2, 0, 4, 2)
        .cells()
        .map(|c| h.app.sheet().text(c).to_string())
        .collect();
    assert_eq!(restored, filled);
}

#[test]
fn test_drag_fill_failure_marks_cell_and_continues() {
    let mut h = harness(vec![
        Ok("Hop in".into()),
        Err(GenerateError::Api { status: 500, message: "Server melted".into() }),
    ]);
    h.app.set_cell_text(cell(2, 0), "Sign in");
    let steps_before = h.app.history().undo_len();

    // Row-major from (2,B): (2,B) then (3,A) then (3,B)
    let report = drag(&mut h.app, cell(2, 0), &[cell(3, 1)]).unwrap();
    assert_eq!(report.generated_count(), 2);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(
        report.outcome_for(cell(3, 0)),
        Some(&CellOutcome::Failed("Server melted".into()))
    );

    assert_eq!(h.app.sheet().text(cell(2, 1)), "Hop in");
    assert_eq!(h.app.sheet().text(cell(3, 0)), "⚠ Error: Server melted");
    assert!(h.app.sheet().meta(cell(3, 0)).is_empty());
    assert_eq!(h.app.sheet().text(cell(3, 1)), "copy 3");
    assert_eq!(h.app.history().undo_len(), steps_before + 1);

    h.app.undo();
    assert_eq!(h.app.sheet().text(cell(3, 0)), "");
}

#[test]
fn test_drag_fill_column_avoids_repeats() {
    let mut h = harness(vec![]);
    h.app.set_cell_text(cell(2, 0), "Sign in");
    drag(&mut h.app, cell(2, 0), &[cell(5, 0)]).unwrap();

    let requests = h.requests.borrow();
    assert_eq!(requests.len(), 3);
    assert!(!requests[0].user.contains("[not:"));
    assert!(requests[1].user.contains("Sign in [not: copy 1]"));
    assert!(requests[2].user.contains("Sign in [not: copy 1/copy 2]"));
}

#[test]
fn test_drag_outline_lifecycle() {
    let mut h = harness(vec![]);
    h.app.set_cell_text(cell(2, 0), "Sign in");
    h.app.begin_fill_drag(cell(2, 0));
    h.app.drag_over(cell(3, 1));
    assert_eq!(h.app.outline().requested(), Some((Range::new(2, 0, 3, 1), OutlineMode::Dragging)));

    let boxed = h.app.render_frame().unwrap();
    assert_eq!(boxed.mode, OutlineMode::Dragging);

    let released = Instant::now();
    h.app.release_drag_at(released);
    assert_eq!(h.app.outline().mode(), Some(OutlineMode::Final));

    h.app.tick(released + Duration::from_millis(600));
    assert!(h.app.outline().is_shown());
    h.app.tick(released + tabtab::AUTO_HIDE_DELAY);
    assert!(!h.app.outline().is_shown());
}

#[test]
fn test_copy_range_as_tsv() {
    let mut h = harness(vec![]);
    h.app.set_cell_text(cell(2, 0), "A");
    h.app.set_cell_text(cell(2, 1), "B");
    h.app.set_cell_text(cell(3, 0), "C");
    h.app.set_cell_text(cell(3, 1), "D");

    h.app.click_cell(cell(2, 0), false);
    h.app.click_cell(cell(3, 1), true);
    let copy = KeyEvent::new(Key::Char('c'), Modifiers::CTRL);
    assert_eq!(h.app.handle_key(copy, Instant::now()), KeyOutcome::Handled);
    assert_eq!(h.app.clipboard().read_text().as_deref(), Some("A\tB\nC\tD"));
}

#[test]
fn test_copy_range_from_header_row() {
    let mut h = harness(vec![]);
    for (c, text) in [(cell(1, 0), "A"), (cell(1, 1), "B"), (cell(2, 0), "C"), (cell(2, 1), "D")] {
        h.app.set_cell_text(c, text);
    }

    h.app.apply_range_selection(cell(1, 0), cell(2, 1));
    assert!(h.app.copy_selection());
    assert_eq!(h.app.clipboard().read_text().as_deref(), Some("A\tB\nC\tD"));
}

#[test]
fn test_tab_tab_generates_row() {
    let mut h = harness(vec![]);
    h.app.set_cell_text(cell(2, 0), "Sign in");
    h.app.select_cell(cell(2, 0), false);

    let now = Instant::now();
    assert_eq!(h.app.handle_key(KeyEvent::plain(Key::Tab), now), KeyOutcome::Handled);
    let report = match h.app.handle_key(KeyEvent::plain(Key::Tab), now + Duration::from_millis(100)) {
        KeyOutcome::Generated(report) => report,
        other => panic!("expected a generated batch, got {:?}", other),
    };

    // Row 2 holds the source, so the first row empty in every tone column is 3
    assert_eq!(report.label, "generate-row");
    assert_eq!(
        report.cells.iter().map(|(c, _)| *c).collect::<Vec<_>>(),
        vec![cell(3, 0), cell(3, 1), cell(3, 2)]
    );
    assert!(h.requests.borrow().iter().all(|r| !r.user.contains("[not:")));
}

#[test]
fn test_generate_column_batch() {
    let mut h = harness(vec![]);
    h.app.set_fill_layout(FillLayout::DownColumn);
    h.app.set_cell_text(cell(2, 1), "Sign in");
    h.app.select_cell(cell(2, 1), false);

    let report = h.app.generate_all(h.app.fill_layout()).unwrap();
    assert_eq!(report.generated_count(), 10);
    assert_eq!(report.cells.last().unwrap().0, cell(12, 1));
    assert_eq!(h.app.sheet().text(cell(13, 1)), "");
    assert!(h.requests.borrow()[9].user.contains("[not: copy 7/copy 8/copy 9]"));

    h.app.undo();
    assert!((3..=12).all(|row| h.app.sheet().text(cell(row, 1)).is_empty()));
}

#[test]
fn test_generate_below_with_keyboard() {
    let mut h = harness(vec![Ok("\"**Jump in**\"".into())]);
    h.app.set_cell_text(cell(4, 2), "Sign in");
    h.app.select_cell(cell(4, 2), false);

    let event = KeyEvent::new(Key::Enter, Modifiers::META);
    let KeyOutcome::Generated(report) = h.app.handle_key(event, Instant::now()) else {
        panic!("expected a generated batch");
    };
    assert_eq!(report.generated_count(), 1);
    assert_eq!(h.app.sheet().text(cell(5, 2)), "Jump in");
    assert_eq!(h.app.selection().focused(), Some(cell(5, 2)));
}

#[test]
fn test_unconfigured_provider_alerts_without_touching_grid() {
    let mut h = harness_with(
        vec![],
        Err(GenerateError::NotConfigured("Please add your OpenAI API key in Settings.".into())),
    );
    h.app.set_cell_text(cell(2, 0), "Sign in");
    let steps_before = h.app.history().undo_len();

    assert!(drag(&mut h.app, cell(2, 0), &[cell(3, 1)]).is_none());
    assert_eq!(
        h.app.take_alerts(),
        vec![CommandError::NotConfigured("Please add your OpenAI API key in Settings.".into())]
    );
    assert_eq!(h.app.history().undo_len(), steps_before);
    assert!(h.requests.borrow().is_empty());
    assert_eq!(h.app.sheet().text(cell(2, 1)), "");
}

#[test]
fn test_refusals_become_alerts() {
    let mut h = harness(vec![]);
    let now = Instant::now();

    h.app.select_cell(cell(1, 0), false);
    h.app.handle_key(KeyEvent::plain(Key::Tab), now);
    h.app.handle_key(KeyEvent::plain(Key::Tab), now + Duration::from_millis(50));

    h.app.select_cell(cell(2, 0), false);
    h.app.handle_key(KeyEvent::new(Key::Enter, Modifiers::CTRL), now);

    assert_eq!(
        h.app.take_alerts(),
        vec![CommandError::HeaderRow, CommandError::EmptyCurrentCell]
    );
    assert!(h.requests.borrow().is_empty());
}

#[test]
fn test_edit_then_undo_via_keys() {
    let mut h = harness(vec![]);
    let now = Instant::now();
    h.app.select_cell(cell(3, 0), false);
    for c in "Hi".chars() {
        h.app.handle_key(KeyEvent::plain(Key::Char(c)), now);
    }
    h.app.handle_key(KeyEvent::plain(Key::Enter), now);
    assert_eq!(h.app.sheet().text(cell(3, 0)), "Hi");

    h.app.handle_key(KeyEvent::new(Key::Char('z'), Modifiers::CTRL), now);
    assert_eq!(h.app.sheet().text(cell(3, 0)), "");
    h.app.handle_key(KeyEvent::new(Key::Char('z'), Modifiers::CTRL | Modifiers::SHIFT), now);
    assert_eq!(h.app.sheet().text(cell(3, 0)), "Hi");
}

#[test]
fn test_drag_fill_over_http_provider() {
    use httpmock::prelude::*;
    use serde_json::json;

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/chat");
        then.status(200)
            .json_body(json!({ "message": { "role": "assistant", "content": "\"Hop in!\"" } }));
    });

    let provider = HttpProvider::with_base_url(AIProvider::Ollama, "llama3.2", None, server.base_url()).unwrap();
    let generator = Generator::new(Box::new(provider), PromptConfig::builtin()).with_min_display(Duration::ZERO);
    let sheet = Sheet::from_tsv(GridDims::default(), "playful\tformal\nSign in\t\n");
    let mut app = TabTab::new(sheet, generator);

    let report = drag(&mut app, cell(2, 0), &[cell(3, 1)]).unwrap();
    assert_eq!(report.generated_count(), 3);
    mock.assert_hits(3);
    assert_eq!(app.sheet().to_tsv(), "playful\tformal\nSign in\tHop in!\nHop in!\tHop in!");
}
