use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::controller::SessionController;
use crate::gateway::DirEntry;
use crate::notify::{Notification, Severity};

/// Render the connected browser view: header, file table, status line.
pub fn draw_browser(
    area: Rect,
    controller: &SessionController,
    selected: usize,
    notification: Option<&Notification>,
    frame: &mut ratatui::Frame<'_>,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(layout[0], controller, frame);
    draw_file_table(layout[1], controller, selected, frame);
    draw_status_line(layout[2], controller, notification, frame);
}

fn draw_header(area: Rect, controller: &SessionController, frame: &mut ratatui::Frame<'_>) {
    let connected_to = match controller.session() {
        Some(session) => format!(
            "{}@{}:{}",
            session.username, session.host, session.port
        ),
        None => "-".to_string(),
    };
    let line = Line::from(vec![
        Span::styled(
            connected_to,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("    Path: "),
        Span::styled(
            controller.nav.current_path.clone(),
            Style::default().fg(Color::Yellow),
        ),
    ]);
    let block = Block::default().borders(Borders::ALL).title("ftpdeck");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_file_table(
    area: Rect,
    controller: &SessionController,
    selected: usize,
    frame: &mut ratatui::Frame<'_>,
) {
    let entries = &controller.nav.entries;

    let header = Row::new(vec!["Name", "Type", "Size", "Modified"]).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = entries.iter().map(entry_row).collect();

    let title = if controller.nav.listing_in_flight {
        format!(" Files ({}) [loading] ", entries.len())
    } else {
        format!(" Files ({}) ", entries.len())
    };

    let table = Table::new(
        rows,
        [
            Constraint::Min(24),
            Constraint::Length(9),
            Constraint::Length(12),
            Constraint::Length(20),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    if !entries.is_empty() {
        state.select(Some(selected.min(entries.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn entry_row(entry: &DirEntry) -> Row<'static> {
    let (kind, name_style) = if entry.is_directory() {
        (
            "directory",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        ("file", Style::default())
    };
    Row::new(vec![
        Cell::from(Span::styled(entry.name.clone(), name_style)),
        Cell::from(kind),
        Cell::from(format_size(entry.size)),
        Cell::from(entry.modified.clone().unwrap_or_else(|| "-".to_string())),
    ])
}

fn draw_status_line(
    area: Rect,
    controller: &SessionController,
    notification: Option<&Notification>,
    frame: &mut ratatui::Frame<'_>,
) {
    let line = match notification {
        Some(notification) => notification_line(notification),
        None => {
            let mut hints = String::new();
            if controller.can_navigate_up() {
                hints.push_str("u: Up   ");
            }
            hints.push_str(
                "Enter: Open/Download   r: Refresh   p: Upload   n: Rename   m: Mkdir   d: Delete   q: Disconnect",
            );
            Line::from(Span::styled(
                hints,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::DIM),
            ))
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// A status-bar line for a notification, colored by severity.
pub fn notification_line(notification: &Notification) -> Line<'static> {
    let color = match notification.severity {
        Severity::Info => Color::Blue,
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
    };
    Line::from(Span::styled(
        notification.text.clone(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

/// Displayed size: kilobytes with one decimal, `-` when unknown.
fn format_size(size: Option<u64>) -> String {
    match size {
        Some(size) => format!("{:.1} KB", size as f64 / 1024.0),
        None => "-".to_string(),
    }
}
