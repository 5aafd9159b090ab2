use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_w = width.min(area.width.saturating_sub(2));
    let popup_h = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    Rect {
        x,
        y,
        width: popup_w,
        height: popup_h,
    }
}

// Delete confirmation popup renderer
pub fn draw_delete_confirmation_popup(
    area: Rect,
    file_name: &str,
    frame: &mut ratatui::Frame<'_>,
) {
    let popup = centered_popup(area, 56, 7);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(Span::styled(
            "Delete File",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));

    let inner = popup.inner(Margin::new(1, 1));
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // file name
            Constraint::Length(1), // warning
            Constraint::Length(1), // empty line
            Constraint::Length(1), // buttons hint
        ])
        .split(inner);

    let target = Paragraph::new(Line::from(vec![
        Span::styled("Delete ", Style::default().fg(Color::Gray)),
        Span::styled(
            file_name.to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("?", Style::default().fg(Color::Gray)),
    ]));
    frame.render_widget(target, layout[0]);

    let warning = Paragraph::new(Line::from(Span::styled(
        "This action cannot be undone.",
        Style::default().fg(Color::Red),
    )));
    frame.render_widget(warning, layout[1]);

    let buttons = Paragraph::new(Line::from(vec![
        Span::styled(
            "Y",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" - Delete   ", Style::default().fg(Color::White)),
        Span::styled(
            "N",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" - Cancel", Style::default().fg(Color::White)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(buttons, layout[3]);

    frame.render_widget(Paragraph::new("").block(block), popup);
}

// Single-line input popup, shared by the rename, create-directory, and
// upload dialogs
fn draw_input_popup(
    area: Rect,
    title: &str,
    prompt: Line<'_>,
    input: &str,
    frame: &mut ratatui::Frame<'_>,
) {
    let popup = centered_popup(area, 60, 7);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));

    let inner = popup.inner(Margin::new(1, 1));
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // prompt
            Constraint::Length(1), // input
            Constraint::Length(1), // empty line
            Constraint::Length(1), // hints
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(prompt), layout[0]);

    let input_line = Line::from(vec![
        Span::styled(
            input.to_string(),
            Style::default().fg(Color::White),
        ),
        Span::styled("█", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(input_line), layout[1]);

    let hints = Paragraph::new(Line::from(Span::styled(
        "Enter: Confirm   Esc: Cancel",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(hints, layout[3]);

    frame.render_widget(Paragraph::new("").block(block), popup);
}

pub fn draw_rename_popup(
    area: Rect,
    old_name: &str,
    new_name: &str,
    frame: &mut ratatui::Frame<'_>,
) {
    let prompt = Line::from(vec![
        Span::styled("Rename ", Style::default().fg(Color::Gray)),
        Span::styled(
            old_name.to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" to:", Style::default().fg(Color::Gray)),
    ]);
    draw_input_popup(area, "Rename", prompt, new_name, frame);
}

pub fn draw_create_dir_popup(area: Rect, name: &str, frame: &mut ratatui::Frame<'_>) {
    let prompt = Line::from(Span::styled(
        "New directory name:",
        Style::default().fg(Color::Gray),
    ));
    draw_input_popup(area, "Create Directory", prompt, name, frame);
}

pub fn draw_upload_popup(area: Rect, input: &str, frame: &mut ratatui::Frame<'_>) {
    let prompt = Line::from(Span::styled(
        "Local file to upload (first path wins):",
        Style::default().fg(Color::Gray),
    ));
    draw_input_popup(area, "Upload", prompt, input, frame);
}
