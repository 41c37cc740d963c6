mod details;
mod feed;
pub mod popup;
mod trending;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{App, Focus};
use crate::feed::FetchState;
use crate::scroll::TOP_HINT_ROWS;

/// Screen regions, shared by rendering and mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub header: Rect,
    pub search: Rect,
    pub feed: Rect,
    pub trending: Rect,
    pub details: Rect,
    pub status: Rect,
}

pub fn layout(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[2]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(body[1]);

    Areas {
        header: rows[0],
        search: rows[1],
        feed: body[0],
        trending: side[0],
        details: side[1],
        status: rows[3],
    }
}

/// Movie rows that fit inside the bordered feed list.
pub fn feed_rows(area: Rect) -> usize {
    layout(area).feed.height.saturating_sub(2) as usize
}

pub fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Shorten to `max` characters, ending in "..." when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

pub fn render(frame: &mut Frame, app: &App) {
    let areas = layout(frame.area());

    render_header(frame, app, areas.header);
    render_search(frame, app, areas.search);
    feed::render(frame, app, areas.feed);
    trending::render(frame, app, areas.trending);
    details::render(frame, app, areas.details);
    render_status_bar(frame, app, areas.status);

    if app.modal.is_some() {
        popup::render_trailer(frame, app);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "marquee - Find movie trailers you'll enjoy",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if app.offset > TOP_HINT_ROWS {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "↑ Top (g)",
            Style::default().fg(Color::Magenta),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Search;
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let content = if app.search_input.is_empty() && !focused {
        Span::styled(
            "Search through thousands of movies (/)",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(app.search_input.as_str())
    };

    let search = Paragraph::new(Line::from(content)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(if app.search_pending() {
                " Search ... "
            } else {
                " Search "
            }),
    );
    frame.render_widget(search, area);

    if focused {
        frame.set_cursor_position((cursor_x(area, &app.search_input), area.y + 1));
    }
}

/// Column after the last typed character, pinned inside the box border.
fn cursor_x(area: Rect, input: &str) -> u16 {
    let width = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(width)
        .min(area.right().saturating_sub(2))
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let FetchState::Error(error) = app.feed.fetch_state() {
        Line::from(vec![Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(notice) = &app.notice {
        Line::from(vec![Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Green),
        )])
    } else if *app.feed.fetch_state() == FetchState::Loading {
        Line::from(vec![Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        )])
    } else {
        let help = if app.modal.is_some() {
            "Enter: open in browser | y: copy URL | Esc: close"
        } else if app.focus == Focus::Search {
            "type to search | Ctrl+u: clear | Enter/Esc: back to list"
        } else {
            "/: search | j/k/g/G: nav | Ctrl+d/u: page | Enter: trailer | R: trending | q: quit"
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_reserves_chrome_rows() {
        let areas = layout(Rect::new(0, 0, 100, 12));
        assert_eq!(areas.header.height, 1);
        assert_eq!(areas.search.height, 3);
        assert_eq!(areas.status.y, 11);
        assert_eq!(feed_rows(Rect::new(0, 0, 100, 12)), 5);
    }

    #[test]
    fn tiny_terminal_has_no_feed_rows() {
        assert_eq!(feed_rows(Rect::default()), 0);
        assert_eq!(feed_rows(Rect::new(0, 0, 80, 5)), 0);
    }

    #[test]
    fn contains_is_half_open() {
        let area = Rect::new(10, 5, 4, 2);
        assert!(contains(area, 10, 5));
        assert!(contains(area, 13, 6));
        assert!(!contains(area, 14, 5));
        assert!(!contains(area, 10, 7));
    }

    #[test]
    fn cursor_stays_inside_search_box() {
        let area = Rect::new(0, 1, 40, 3);
        assert_eq!(cursor_x(area, ""), 1);
        assert_eq!(cursor_x(area, "heat"), 5);
        assert_eq!(cursor_x(area, &"x".repeat(70_000)), 38);
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("Amélie", 10), "Amélie");
        assert_eq!(truncate("The Lord of the Rings", 10), "The Lor...");
    }
}
