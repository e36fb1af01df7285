//! Key classification for crossterm key events

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Check if a key event is a quit command (q or Ctrl+C)
pub fn is_quit_event(key: KeyEvent) -> bool {
    (key.code == KeyCode::Char('q') && !key.modifiers.contains(KeyModifiers::CONTROL))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Check if a key event is a refresh command (r or F5)
pub fn is_refresh_event(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('r') | KeyCode::F(5))
        && !key.modifiers.contains(KeyModifiers::CONTROL)
}
