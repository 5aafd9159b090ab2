//! Key event handling for the connect form.

use std::io::Write;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::Backend;

use super::KeyFlow;
use crate::notify::Severity;
use crate::{App, AppMode};

pub fn handle_connection_form_key<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    match key.code {
        KeyCode::Esc => {
            return KeyFlow::Quit;
        }
        KeyCode::Tab | KeyCode::Down => {
            if let AppMode::ConnectionForm { form } = &mut app.mode {
                form.next();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let AppMode::ConnectionForm { form } = &mut app.mode {
                form.prev();
            }
        }
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            // Ctrl+R: cycle through saved profiles
            if let AppMode::ConnectionForm { form } = &mut app.mode {
                form.cycle_profile(app.config.profiles());
            }
        }
        KeyCode::Enter => {
            if app.controller.connect_in_flight() {
                return KeyFlow::Continue;
            }
            if let AppMode::ConnectionForm { form } = &app.mode {
                match form.credentials() {
                    Ok(creds) => {
                        app.controller.connect(creds, Instant::now());
                    }
                    Err(e) => {
                        app.controller.notifications.show(
                            e.to_string(),
                            Severity::Error,
                            Instant::now(),
                        );
                    }
                }
            }
        }
        _ => {
            if let AppMode::ConnectionForm { form } = &mut app.mode {
                form.focused_textarea_mut()
                    .input(tui_textarea::Input::from(key));
            }
        }
    }
    app.mark_redraw();
    KeyFlow::Continue
}
