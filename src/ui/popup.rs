use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::trailer::{watch_url, TrailerSlot};

/// Where the trailer modal is drawn for a given screen.
pub fn modal_area(screen: Rect) -> Rect {
    centered_rect(60, 9, screen)
}

/// Render the trailer modal over the current screen.
pub fn render_trailer(frame: &mut Frame, app: &App) {
    let Some(modal) = &app.modal else {
        return;
    };

    let area = modal_area(frame.area());
    frame.render_widget(Clear, area);

    let body = match app.modal_slot() {
        Some(TrailerSlot::Available(key)) => Line::from(Span::styled(
            watch_url(key),
            Style::default().fg(Color::Cyan),
        )),
        Some(TrailerSlot::Unavailable) => Line::from(Span::styled(
            "Trailer not available",
            Style::default().fg(Color::Red),
        )),
        Some(TrailerSlot::Pending) | None => Line::from(Span::styled(
            "Loading trailer...",
            Style::default().fg(Color::Yellow),
        )),
    };

    let mut hints = Vec::new();
    if matches!(app.modal_slot(), Some(TrailerSlot::Available(_))) {
        hints.extend([
            Span::styled("[Enter]", Style::default().fg(Color::Green)),
            Span::raw(" play  "),
            Span::styled("[y]", Style::default().fg(Color::Green)),
            Span::raw(" copy URL  "),
        ]);
    }
    hints.extend([
        Span::styled("[Esc]", Style::default().fg(Color::Red)),
        Span::raw(" close"),
    ]);

    let lines = vec![
        Line::from(""),
        body,
        Line::from(""),
        Line::from(hints),
    ];

    let popup = Paragraph::new(lines)
        .block(
            Block::default().borders(Borders::ALL).title(Span::styled(
                format!(" {} ", modal.title),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

/// Create a centered rect of at most `width` x `height` inside the outer rect
fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let popup_width = width.min(outer.width);
    let popup_height = height.min(outer.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((outer.height.saturating_sub(popup_height)) / 2),
            Constraint::Length(popup_height),
            Constraint::Min(0),
        ])
        .split(outer);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((outer.width.saturating_sub(popup_width)) / 2),
            Constraint::Length(popup_width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
