//! Key event handling for the browser mode.

use std::io::Write;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::Backend;

use super::KeyFlow;
use crate::{App, AppMode};

pub fn handle_browser_key<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    // Dialogs take precedence over navigation keys
    if app.controller.delete_confirmation.showing {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.controller.confirm_delete();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.controller.cancel_delete();
            }
            _ => {}
        }
        app.mark_redraw();
        return KeyFlow::Continue;
    }

    if !app.controller.modal.is_closed() {
        match key.code {
            KeyCode::Enter => app.controller.confirm_modal(Instant::now()),
            KeyCode::Esc => app.controller.cancel_modal(),
            KeyCode::Char(c) => app.controller.modal.push_input(c),
            KeyCode::Backspace => app.controller.modal.pop_input(),
            _ => {}
        }
        app.mark_redraw();
        return KeyFlow::Continue;
    }

    if let AppMode::Browser { upload, .. } = &mut app.mode {
        if upload.showing {
            match key.code {
                KeyCode::Enter => {
                    let paths = upload.paths();
                    upload.hide();
                    app.controller.upload(paths, Instant::now());
                }
                KeyCode::Esc => upload.hide(),
                KeyCode::Char(c) => upload.input.push(c),
                KeyCode::Backspace => {
                    upload.input.pop();
                }
                _ => {}
            }
            app.mark_redraw();
            return KeyFlow::Continue;
        }
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.controller.disconnect(Instant::now());
            app.reconcile_mode();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let AppMode::Browser { selected, .. } = &mut app.mode {
                *selected = selected.saturating_sub(1);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let len = app.controller.nav.entries.len();
            if let AppMode::Browser { selected, .. } = &mut app.mode {
                if len > 0 {
                    *selected = (*selected + 1).min(len - 1);
                }
            }
        }
        KeyCode::Enter => {
            // directories open, files download
            if let Some(entry) = app.selected_entry() {
                let name = entry.name.clone();
                if entry.is_directory() {
                    app.controller.change_directory(name);
                } else {
                    app.controller.download(name);
                }
            }
        }
        KeyCode::Char('u') => {
            app.controller.navigate_up();
        }
        KeyCode::Char('r') => {
            app.controller.refresh();
        }
        KeyCode::Char('d') => {
            if let Some(entry) = app.selected_entry() {
                let name = entry.name.clone();
                app.controller.request_delete(name);
            }
        }
        KeyCode::Char('n') => {
            if let Some(entry) = app.selected_entry() {
                let name = entry.name.clone();
                app.controller.open_rename(name);
            }
        }
        KeyCode::Char('m') => {
            app.controller.open_create_dir();
        }
        KeyCode::Char('p') => {
            if let AppMode::Browser { upload, .. } = &mut app.mode {
                upload.show();
            }
        }
        _ => return KeyFlow::Continue,
    }
    app.mark_redraw();
    KeyFlow::Continue
}
