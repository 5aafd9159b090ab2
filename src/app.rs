use std::io::Write;
use std::time::Instant;

use crossterm::event::Event;
use ratatui::Terminal;
use ratatui::prelude::Backend;
use tokio::sync::mpsc;

use crate::config::{ConfigManager, Profile};
use crate::controller::SessionController;
use crate::error::Result;
use crate::events::AppEvent;
use crate::gateway::DirEntry;
use crate::key_event::{KeyFlow, handle_key_event};
use crate::mode_state::{PendingModal, UploadPrompt};
use crate::ui::{self, ConnectionForm};

/// Top-level view state. The controller decides which mode is valid; the
/// run loop reconciles after every applied event.
pub enum AppMode {
    ConnectionForm {
        form: ConnectionForm,
    },
    Browser {
        selected: usize,
        upload: UploadPrompt,
    },
}

/// App is the main application
pub struct App<B: Backend + Write> {
    pub mode: AppMode,
    pub controller: SessionController,
    pub config: ConfigManager,
    terminal: Terminal<B>,
    needs_redraw: bool,
}

impl<B: Backend + Write> Drop for App<B> {
    fn drop(&mut self) {
        use crossterm::execute;
        use crossterm::terminal::{LeaveAlternateScreen, disable_raw_mode};

        disable_raw_mode().ok();
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).ok();
    }
}

impl<B: Backend + Write> App<B> {
    pub fn new(
        terminal: Terminal<B>,
        controller: SessionController,
        config: ConfigManager,
    ) -> Self {
        let form = ConnectionForm::new(config.settings().default_port);
        Self {
            mode: AppMode::ConnectionForm { form },
            controller,
            config,
            terminal,
            needs_redraw: true,
        }
    }

    pub fn init_terminal(&mut self) -> Result<()> {
        use crossterm::ExecutableCommand;
        use crossterm::terminal::{EnterAlternateScreen, enable_raw_mode};

        enable_raw_mode().inspect_err(|e| tracing::error!("Error enabling raw mode: {}", e))?;
        self.terminal
            .backend_mut()
            .execute(EnterAlternateScreen)
            .inspect_err(|e| {
                tracing::error!("Error entering alternate screen: {}", e);
            })?;
        Ok(())
    }

    /// Mark that UI needs redrawing
    pub fn mark_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Check if redraw is needed and mark as drawn
    fn should_redraw(&mut self) -> bool {
        let should = self.needs_redraw;
        self.needs_redraw = false;
        should
    }

    /// The listing entry under the cursor, if any.
    pub fn selected_entry(&self) -> Option<&DirEntry> {
        match &self.mode {
            AppMode::Browser { selected, .. } => self.controller.nav.entries.get(*selected),
            AppMode::ConnectionForm { .. } => None,
        }
    }

    /// Keep the view mode in step with the controller's session state and
    /// clamp the cursor after listing changes.
    pub fn reconcile_mode(&mut self) {
        let connected = self.controller.is_connected();
        let in_browser = matches!(self.mode, AppMode::Browser { .. });

        if connected && !in_browser {
            if let Some(session) = self.controller.session().cloned() {
                self.remember_profile(&session.host, session.port, &session.username);
            }
            self.mode = AppMode::Browser {
                selected: 0,
                upload: UploadPrompt::default(),
            };
        } else if !connected && in_browser {
            self.mode = AppMode::ConnectionForm {
                form: ConnectionForm::new(self.config.settings().default_port),
            };
        } else if let AppMode::Browser { selected, .. } = &mut self.mode {
            let len = self.controller.nav.entries.len();
            *selected = if len == 0 { 0 } else { (*selected).min(len - 1) };
        }
    }

    /// Persist a host/port/username profile after a successful connect.
    /// Failures here are logged, not surfaced; profile storage is a
    /// convenience.
    fn remember_profile(&mut self, host: &str, port: u16, username: &str) {
        let profile = Profile::new(host.to_string(), port, username.to_string());
        if let Err(e) = self.config.add_profile(profile) {
            tracing::warn!("failed to save profile: {}", e);
            return;
        }
        let id = self
            .config
            .profiles()
            .iter()
            .find(|p| p.host == host && p.port == port && p.username == username)
            .map(|p| p.id.clone());
        if let Some(id) = id
            && let Err(e) = self.config.touch_last_used(&id)
        {
            tracing::warn!("failed to update profile: {}", e);
        }
    }

    pub async fn run(&mut self, rx: &mut mpsc::Receiver<AppEvent>) -> Result<()> {
        loop {
            if self.should_redraw() {
                self.draw()?;
            }

            // wait for an event (asynchronous)
            let ev = match rx.recv().await {
                Some(e) => e,
                None => {
                    tracing::warn!("App event channel closed");
                    break;
                }
            };

            match ev {
                AppEvent::Tick => {
                    if self.controller.tick(Instant::now()) {
                        self.mark_redraw();
                    }
                }
                AppEvent::Control(event) => {
                    self.controller.apply(event, Instant::now());
                    self.reconcile_mode();
                    self.mark_redraw();
                }
                AppEvent::Input(Event::Key(key)) => match handle_key_event(self, key) {
                    KeyFlow::Quit => break,
                    KeyFlow::Continue => {}
                },
                AppEvent::Input(Event::Resize(_, _)) => self.mark_redraw(),
                AppEvent::Input(_) => {}
            }
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let now = Instant::now();
        let controller = &self.controller;
        let mode = &self.mode;
        let has_profiles = !self.config.profiles().is_empty();

        self.terminal.draw(|f| {
            let area = f.area();
            let notification = controller.notifications.active(now);

            match mode {
                AppMode::ConnectionForm { form } => {
                    ui::connection::draw_connection_form(
                        area,
                        form,
                        controller.connect_in_flight(),
                        has_profiles,
                        notification,
                        f,
                    );
                }
                AppMode::Browser { selected, upload } => {
                    ui::browser::draw_browser(area, controller, *selected, notification, f);

                    if controller.delete_confirmation.showing {
                        ui::popup::draw_delete_confirmation_popup(
                            area,
                            &controller.delete_confirmation.file_name,
                            f,
                        );
                    }
                    match &controller.modal {
                        PendingModal::RenameOpen { old_name, new_name } => {
                            ui::popup::draw_rename_popup(area, old_name, new_name, f);
                        }
                        PendingModal::CreateDirOpen { name } => {
                            ui::popup::draw_create_dir_popup(area, name, f);
                        }
                        PendingModal::Closed => {}
                    }
                    if upload.showing {
                        ui::popup::draw_upload_popup(area, &upload.input, f);
                    }
                }
            }
        })?;
        Ok(())
    }
}
