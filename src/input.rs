//! Keyboard input handling.
//!
//! Maps crossterm key events to recorder actions:
//! - `w`: toggle webcam
//! - `c`: capture pose
//! - `s`: save poses
//! - `p`: show poses
//! - `q`, `Esc`, `Ctrl+C`: quit

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Result of handling a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    ToggleCamera,
    CapturePose,
    SavePoses,
    ShowPoses,
    Quit,
    /// Key not bound
    None,
}

/// Translate a key event into an action.
///
/// Only presses (and repeats) count; release events are ignored so a key
/// fires once on terminals that report both.
pub fn handle_key_event(event: KeyEvent) -> KeyAction {
    if event.kind == KeyEventKind::Release {
        return KeyAction::None;
    }

    let KeyEvent {
        code, modifiers, ..
    } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('C') => KeyAction::Quit,
            _ => KeyAction::None,
        };
    }

    match code {
        KeyCode::Char('w') | KeyCode::Char('W') => KeyAction::ToggleCamera,
        KeyCode::Char('c') | KeyCode::Char('C') => KeyAction::CapturePose,
        KeyCode::Char('s') | KeyCode::Char('S') => KeyAction::SavePoses,
        KeyCode::Char('p') | KeyCode::Char('P') => KeyAction::ShowPoses,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
        _ => KeyAction::None,
    }
}

/// One-line key help shown under the status regions.
pub const HELP_LINE: &str = "w webcam  c capture  s save  p show  q quit";
