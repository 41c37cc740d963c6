use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::app::App;

use super::truncate;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            " Trending Movies ",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(Color::DarkGray));

    if app.trending.is_empty() {
        let text = if app.trending_failed {
            "Trending unavailable"
        } else {
            "No searches yet"
        };
        let empty = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let flex = w.saturating_sub(12).max(5); // rank(3) + space(1) + count(~8)

    let mut items: Vec<ListItem> = app
        .trending
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>2}.", i + 1),
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::raw(format!("{:<flex$}", truncate(&entry.title, flex))),
                Span::styled(
                    format!(" {:>5}x", entry.count),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    if app.trending_failed {
        items.push(ListItem::new(Line::from(Span::styled(
            "(stale: refresh failed)",
            Style::default().fg(Color::Red),
        ))));
    }

    frame.render_widget(List::new(items).block(block), area);
}
