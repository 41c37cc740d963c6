use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::trailer::{watch_url, TrailerSlot};
use crate::types::NO_POSTER;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Details ")
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(movie) = app.selected_movie() else {
        let empty = Paragraph::new("No movie selected")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    };

    let poster = movie.poster_url().unwrap_or_else(|| NO_POSTER.to_string());
    let trailer = match app.trailers.get(movie.id) {
        None => Span::styled("Enter to play", Style::default().fg(Color::Gray)),
        Some(TrailerSlot::Pending) => Span::styled("Loading...", Style::default().fg(Color::Yellow)),
        Some(TrailerSlot::Available(key)) => {
            Span::styled(watch_url(key), Style::default().fg(Color::Cyan))
        }
        Some(TrailerSlot::Unavailable) => {
            Span::styled("Trailer not available", Style::default().fg(Color::Red))
        }
    };

    let lines = vec![
        Line::from(Span::styled(
            movie.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                format!("★ {}", movie.rating_display()),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(" • "),
            Span::raw(movie.language_display()),
            Span::raw(" • "),
            Span::raw(movie.year_display()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Poster: ", Style::default().fg(Color::Gray)),
            Span::raw(poster),
        ]),
        Line::from(vec![
            Span::styled("Trailer: ", Style::default().fg(Color::Gray)),
            trailer,
        ]),
    ];

    let details = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(details, area);
}
