//! Keyboard dispatch.
//!
//! Grid shortcuts apply when no cell is being edited; while editing only the
//! commit/navigate keys are intercepted and the rest go to the buffer.

use std::time::{Duration, Instant};

use crate::app::TabTab;
use crate::error::CommandError;
use crate::generation::BatchReport;

/// Two Tab presses closer than this run "generate all".
pub const TAB_TAP_WINDOW: Duration = Duration::from_millis(350);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    F2,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    fn arrow_delta(self) -> Option<(isize, isize)> {
        match self {
            Key::Up => Some((-1, 0)),
            Key::Down => Some((1, 0)),
            Key::Left => Some((0, -1)),
            Key::Right => Some((0, 1)),
            _ => None,
        }
    }
}

/// Modifier keys as a bitfield
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000);

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & Self::CTRL.0 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & Self::SHIFT.0 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & Self::ALT.0 != 0
    }

    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & Self::META.0 != 0
    }

    /// Cmd or Ctrl, whichever the platform uses; both are accepted.
    #[inline]
    pub const fn command(self) -> bool {
        self.ctrl() || self.meta()
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// Not a shortcut; let the platform handle it
    Ignored,
    Handled,
    /// A generation batch ran
    Generated(BatchReport),
}

impl TabTab {
    pub fn handle_key(&mut self, event: KeyEvent, now: Instant) -> KeyOutcome {
        if self.is_editing() {
            return self.handle_edit_key(event);
        }
        let Some(focused) = self.selection.focused() else {
            return KeyOutcome::Ignored;
        };
        let mods = event.modifiers;

        match event.key {
            Key::Enter if mods.command() => {
                let result = self.generate_into_below_cell(focused);
                self.batch_outcome(result)
            }
            Key::Tab => self.tab_tap(now),
            Key::Char('c' | 'C') if mods.command() => {
                self.copy_selection();
                KeyOutcome::Handled
            }
            Key::Char('v' | 'V') if mods.command() => {
                self.paste();
                KeyOutcome::Handled
            }
            Key::Char('z' | 'Z') if mods.command() => {
                if mods.shift() {
                    self.redo();
                } else {
                    self.undo();
                }
                KeyOutcome::Handled
            }
            Key::Backspace | Key::Delete => {
                self.clear_selection_cells();
                KeyOutcome::Handled
            }
            Key::Up | Key::Down | Key::Left | Key::Right => {
                let Some((d_row, d_col)) = event.key.arrow_delta() else {
                    return KeyOutcome::Ignored;
                };
                if mods.shift() {
                    self.extend_selection(d_row, d_col);
                } else {
                    self.move_selection(d_row, d_col, false);
                    if let Some(cell) = self.selection.focused() {
                        self.selection.set_anchor(cell);
                    }
                }
                KeyOutcome::Handled
            }
            Key::Enter | Key::F2 => {
                self.start_edit(focused, None);
                KeyOutcome::Handled
            }
            Key::Char(c) if !mods.command() && !mods.alt() => {
                let typed = c.to_string();
                self.start_edit(focused, Some(&typed));
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Ignored,
        }
    }

    fn handle_edit_key(&mut self, event: KeyEvent) -> KeyOutcome {
        let Some(cell) = self.edit.as_ref().map(|e| e.cell) else {
            return KeyOutcome::Ignored;
        };
        let mods = event.modifiers;

        match event.key {
            Key::Enter if mods.command() => {
                self.stop_edit();
                let result = self.generate_into_below_cell(cell);
                self.batch_outcome(result)
            }
            Key::Enter => {
                self.stop_edit();
                self.move_selection(if mods.shift() { -1 } else { 1 }, 0, false);
                KeyOutcome::Handled
            }
            Key::Escape => {
                self.stop_edit();
                KeyOutcome::Handled
            }
            Key::Backspace => {
                self.delete_backward();
                KeyOutcome::Handled
            }
            Key::Char(c) if !mods.command() => {
                self.insert_text(&c.to_string());
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// A lone Tab does nothing; the second one inside the window generates.
    fn tab_tap(&mut self, now: Instant) -> KeyOutcome {
        match self.last_tab.take() {
            Some(prev) if now.saturating_duration_since(prev) < TAB_TAP_WINDOW => {
                let result = self.generate_all(self.fill_layout);
                self.batch_outcome(result)
            }
            _ => {
                self.last_tab = Some(now);
                KeyOutcome::Handled
            }
        }
    }

    fn batch_outcome(&mut self, result: Result<BatchReport, CommandError>) -> KeyOutcome {
        match result {
            Ok(report) if report.is_empty() => KeyOutcome::Handled,
            Ok(report) => KeyOutcome::Generated(report),
            Err(e) => {
                self.alert(e);
                KeyOutcome::Handled
            }
        }
    }
}
