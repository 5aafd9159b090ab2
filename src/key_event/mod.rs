use std::io::Write;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::Backend;

use crate::{App, AppMode};

pub mod browser;
pub mod connection_form;

pub use browser::handle_browser_key;
pub use connection_form::handle_connection_form_key;

/// Result of handling a key event
pub enum KeyFlow {
    Continue,
    Quit,
}

/// Top-level key event handler, dispatching by application mode
pub fn handle_key_event<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    // Only handle actual key presses (ignore repeats/releases)
    if key.kind != KeyEventKind::Press {
        return KeyFlow::Continue;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyFlow::Quit;
    }

    match &app.mode {
        AppMode::ConnectionForm { .. } => handle_connection_form_key(app, key),
        AppMode::Browser { .. } => handle_browser_key(app, key),
    }
}
