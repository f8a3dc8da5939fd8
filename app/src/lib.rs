//! TabTab: a grid for drafting UX copy and rewriting it across tones.
//!
//! [`TabTab`] is the controller that owns the sheet, the selection, the undo
//! log, the outline and the drag-fill state. Its operations are split across
//! modules by concern, each adding an `impl TabTab` block:
//!
//! - `navigation`: selecting, moving and extending
//! - `editing`: in-place edit sessions
//! - `clipboard`: copy, paste, clear
//! - `drag`: the fill-handle state machine
//! - `generation`: the copy-generation orchestrator
//! - `keys`: keyboard dispatch

pub mod app;
pub mod clipboard;
pub mod drag;
pub mod editing;
pub mod error;
pub mod generation;
pub mod keys;
pub mod navigation;
pub mod outline;

pub use app::TabTab;
pub use clipboard::{Clipboard, MemoryClipboard};
pub use drag::{DragState, AUTO_HIDE_DELAY};
pub use editing::EditSession;
pub use error::CommandError;
pub use generation::{BatchReport, CellOutcome, FillLayout, Generator};
pub use keys::{Key, KeyEvent, KeyOutcome, Modifiers};
pub use outline::{LayoutSource, Outline, OutlineBox, OutlineMode, Rect, UniformLayout};
