use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use tui_textarea::TextArea;

use crate::config::Profile;
use crate::error::{AppError, Result};
use crate::gateway::Credentials;
use crate::notify::Notification;

use super::browser::notification_line;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FocusField {
    Host,
    Port,
    Username,
    Password,
}

/// The connect form. Collects the four credential fields; passwords live
/// only in this widget and the request that carries them.
pub struct ConnectionForm {
    pub host: TextArea<'static>,
    pub port: TextArea<'static>,
    pub username: TextArea<'static>,
    pub password: TextArea<'static>,
    pub focus: FocusField,
    profile_cursor: usize,
}

impl ConnectionForm {
    pub fn new(default_port: u16) -> Self {
        let mut host = TextArea::default();
        host.set_placeholder_text("ftp.example.com");
        host.set_cursor_line_style(Style::default());

        let mut port = TextArea::default();
        port.insert_str(default_port.to_string());
        port.set_cursor_line_style(Style::default());

        let mut username = TextArea::default();
        username.set_placeholder_text("Enter username");
        username.set_cursor_line_style(Style::default());

        let mut password = TextArea::default();
        password.set_placeholder_text("Enter password");
        password.set_mask_char('*');
        password.set_cursor_line_style(Style::default());

        Self {
            host,
            port,
            username,
            password,
            focus: FocusField::Host,
            profile_cursor: 0,
        }
    }

    pub fn next(&mut self) {
        self.focus = match self.focus {
            FocusField::Host => FocusField::Port,
            FocusField::Port => FocusField::Username,
            FocusField::Username => FocusField::Password,
            FocusField::Password => FocusField::Host,
        };
    }

    pub fn prev(&mut self) {
        self.focus = match self.focus {
            FocusField::Host => FocusField::Password,
            FocusField::Port => FocusField::Host,
            FocusField::Username => FocusField::Port,
            FocusField::Password => FocusField::Username,
        };
    }

    pub fn focused_textarea_mut(&mut self) -> &mut TextArea<'static> {
        match self.focus {
            FocusField::Host => &mut self.host,
            FocusField::Port => &mut self.port,
            FocusField::Username => &mut self.username,
            FocusField::Password => &mut self.password,
        }
    }

    /// Pre-fill host, port, and username from a saved profile.
    pub fn apply_profile(&mut self, profile: &Profile) {
        set_text(&mut self.host, &profile.host);
        set_text(&mut self.port, &profile.port.to_string());
        set_text(&mut self.username, &profile.username);
    }

    /// Cycle through saved profiles, pre-filling the form with each.
    pub fn cycle_profile(&mut self, profiles: &[Profile]) {
        if profiles.is_empty() {
            return;
        }
        let profile = &profiles[self.profile_cursor % profiles.len()];
        self.profile_cursor = (self.profile_cursor + 1) % profiles.len();
        self.apply_profile(profile);
    }

    /// Build credentials from the current field values. The port must parse;
    /// emptiness of the other fields is checked at connect time.
    pub fn credentials(&self) -> Result<Credentials> {
        let port = value(&self.port)
            .trim()
            .parse::<u16>()
            .map_err(|_| AppError::ValidationError("Port must be a number".to_string()))?;
        Ok(Credentials {
            host: value(&self.host).trim().to_string(),
            port,
            username: value(&self.username).trim().to_string(),
            password: value(&self.password),
        })
    }
}

fn value(textarea: &TextArea<'_>) -> String {
    textarea.lines().first().cloned().unwrap_or_default()
}

fn set_text(textarea: &mut TextArea<'static>, text: &str) {
    textarea.delete_line_by_head();
    textarea.delete_line_by_end();
    textarea.insert_str(text);
}

pub fn draw_connection_form(
    area: Rect,
    form: &ConnectionForm,
    connecting: bool,
    has_profiles: bool,
    notification: Option<&Notification>,
    frame: &mut ratatui::Frame<'_>,
) {
    let width = area.width.min(64);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let height = 21u16.min(area.height);
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let panel = Rect {
        x,
        y,
        width,
        height,
    };

    let title = if connecting {
        "Connecting..."
    } else {
        "Connect to FTP"
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // notification
            Constraint::Length(3), // host
            Constraint::Length(3), // port
            Constraint::Length(3), // username
            Constraint::Length(3), // password
            Constraint::Length(1), // spacing
            Constraint::Length(1), // hints
        ])
        .split(inner);

    if let Some(notification) = notification {
        frame.render_widget(Paragraph::new(notification_line(notification)), layout[0]);
    }

    draw_field(frame, layout[1], "Host", &form.host, form.focus == FocusField::Host);
    draw_field(frame, layout[2], "Port", &form.port, form.focus == FocusField::Port);
    draw_field(
        frame,
        layout[3],
        "Username",
        &form.username,
        form.focus == FocusField::Username,
    );
    draw_field(
        frame,
        layout[4],
        "Password",
        &form.password,
        form.focus == FocusField::Password,
    );

    let mut hints = String::from("Enter: Connect   Tab: Next Field   Esc: Quit");
    if has_profiles {
        hints.push_str("   Ctrl+R: Load Profile");
    }
    let hints = Paragraph::new(Line::from(Span::styled(
        hints,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(hints, layout[6]);
}

fn draw_field(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    textarea: &TextArea<'static>,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title.to_string());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(textarea, inner);
}
