use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::{App, Focus};

use super::truncate;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let movies = app.feed.movies();
    let title = if app.feed.is_searching() {
        format!(" Results for \"{}\" ({}) ", app.feed.committed(), movies.len())
    } else {
        format!(" All Movies ({}) ", movies.len())
    };

    let is_active = app.focus == Focus::Feed && app.modal.is_none();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            title,
            if is_active {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            },
        ))
        .border_style(if is_active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    if movies.is_empty() && !app.feed.is_loading() && app.feed.is_searching() {
        let empty = Paragraph::new("No movies found")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 20; // rating(7) + spaces(2) + lang(4) + space(1) + year(4) + margin(2)
    let flex = w.saturating_sub(fixed).max(10);

    let mut items: Vec<ListItem> = movies
        .iter()
        .enumerate()
        .map(|(i, movie)| {
            let style = if i == app.selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let line = Line::from(vec![
                Span::styled(format!("{:<flex$}", truncate(&movie.title, flex)), style),
                Span::raw(" "),
                Span::styled(
                    format!("★ {:>4}", movie.rating_display()),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("{:<4}", movie.language_display()),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(" "),
                Span::styled(movie.year_display(), Style::default().fg(Color::DarkGray)),
            ]);

            ListItem::new(line)
        })
        .collect();

    if app.shows_sentinel() {
        let text = if app.feed.is_loading() {
            "Loading more..."
        } else {
            "..."
        };
        items.push(ListItem::new(Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        ))));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default().with_offset(app.offset);
    if !movies.is_empty() {
        state.select(Some(app.selected));
    }

    frame.render_stateful_widget(list, area, &mut state);
}
