use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::action::Action;
use crate::catalog::Catalog;
use crate::debounce::Debouncer;
use crate::event::Event;
use crate::feed::{FeedState, FetchMode, FetchTicket, StalePolicy};
use crate::scroll::{offset_for, sentinel_visible, Sentinel};
use crate::trailer::{select_trailer, watch_url, TrailerCache, TrailerSlot};
use crate::trending::TrendingStore;
use crate::types::{MovieSummary, TrendingEntry};
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Feed,   // Movie list navigation
    Search, // Typing into the search box
}

/// Movie whose trailer modal is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerModal {
    pub movie_id: u64,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub debounce: Duration,
    pub stale_policy: StalePolicy,
    pub trending_limit: usize,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            stale_policy: StalePolicy::default(),
            trending_limit: 5,
        }
    }
}

pub struct App {
    pub focus: Focus,
    pub search_input: String,
    pub feed: FeedState,
    pub selected: usize,
    pub offset: usize,

    pub trending: Vec<TrendingEntry>,
    pub trending_failed: bool,

    pub trailers: TrailerCache,
    pub modal: Option<TrailerModal>,

    /// Transient message for the status bar (clipboard, browser).
    pub notice: Option<String>,
    pub should_quit: bool,
    pub area: Rect,

    sentinel: Sentinel,
    debouncer: Debouncer<Action>,
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn TrendingStore>,
    trending_limit: usize,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        store: Arc<dyn TrendingStore>,
        options: AppOptions,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            focus: Focus::Feed,
            search_input: String::new(),
            feed: FeedState::new(options.stale_policy),
            selected: 0,
            offset: 0,

            trending: Vec::new(),
            trending_failed: false,

            trailers: TrailerCache::default(),
            modal: None,

            notice: None,
            should_quit: false,
            area: Rect::default(),

            sentinel: Sentinel::default(),
            debouncer: Debouncer::new(options.debounce, action_tx.clone()),
            catalog,
            store,
            trending_limit: options.trending_limit,
            action_tx,
        }
    }

    pub fn selected_movie(&self) -> Option<&MovieSummary> {
        self.feed.movies().get(self.selected)
    }

    /// Whether the "Loading more" row is part of the list.
    pub fn shows_sentinel(&self) -> bool {
        self.sentinel.is_observing()
    }

    /// A keystroke is waiting out the debounce interval.
    pub fn search_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn modal_slot(&self) -> Option<&TrailerSlot> {
        self.modal
            .as_ref()
            .and_then(|m| self.trailers.get(m.movie_id))
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::LoadHome,
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown if self.modal.is_none() => Action::ScrollDown,
                MouseEventKind::ScrollUp if self.modal.is_none() => Action::ScrollUp,
                MouseEventKind::Down(MouseButton::Left) => Action::Click {
                    column: mouse.column,
                    row: mouse.row,
                },
                _ => Action::None,
            },
            Event::Resize(w, h) => Action::Resize(w, h),
            Event::Tick | Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if self.modal.is_some() {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('q') => Action::CloseTrailer,
                KeyCode::Enter | KeyCode::Char('o') => Action::OpenTrailer,
                KeyCode::Char('y') => Action::YankTrailer,
                _ => Action::None,
            };
        }

        if self.focus == Focus::Search {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Down | KeyCode::Tab => Action::BlurSearch,
                KeyCode::Backspace => Action::SearchBackspace,
                KeyCode::Char('u') if ctrl => Action::ClearSearch,
                KeyCode::Char(c) if !ctrl => Action::SearchInput(c),
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Esc => {
                if self.search_input.is_empty() {
                    Action::Quit
                } else {
                    Action::ClearSearch
                }
            }
            KeyCode::Char('/') | KeyCode::Tab => Action::FocusSearch,
            KeyCode::Char('d') if ctrl => Action::PageDown,
            KeyCode::Char('u') if ctrl => Action::PageUp,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('g') | KeyCode::Home => Action::GoToTop,
            KeyCode::Char('G') | KeyCode::End => Action::GoToBottom,
            KeyCode::Enter | KeyCode::Char('p') | KeyCode::Char(' ') => Action::PlayTrailer,
            KeyCode::Char('R') => Action::LoadTrending,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if self.notice.is_some() && is_input(&action) {
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.debouncer.cancel();
                self.sentinel.disconnect();
                self.should_quit = true;
            }
            Action::ScrollUp => {
                self.selected = self.selected.saturating_sub(1);
                self.after_user_scroll();
            }
            Action::ScrollDown => {
                if self.selected + 1 < self.feed.movies().len() {
                    self.selected += 1;
                }
                self.after_user_scroll();
            }
            Action::PageUp => {
                let half = (self.feed_rows() / 2).max(1);
                self.selected = self.selected.saturating_sub(half);
                self.after_user_scroll();
            }
            Action::PageDown => {
                let half = (self.feed_rows() / 2).max(1);
                let last = self.feed.movies().len().saturating_sub(1);
                self.selected = (self.selected + half).min(last);
                self.after_user_scroll();
            }
            Action::GoToTop => {
                self.selected = 0;
                self.after_user_scroll();
            }
            Action::GoToBottom => {
                self.selected = self.feed.movies().len().saturating_sub(1);
                self.after_user_scroll();
            }

            // Search input
            Action::FocusSearch => self.focus = Focus::Search,
            Action::BlurSearch => self.focus = Focus::Feed,
            Action::SearchInput(c) => {
                self.search_input.push(c);
                self.debounce_search();
            }
            Action::SearchBackspace => {
                if self.search_input.pop().is_some() {
                    self.debounce_search();
                }
            }
            Action::ClearSearch => {
                if !self.search_input.is_empty() {
                    self.search_input.clear();
                    self.debounce_search();
                }
            }
            Action::CommitSearch(term) => self.commit(&term),

            // Movie feed
            Action::LoadHome => {
                self.spawn_load_trending();
                let term = self.search_input.clone();
                self.commit(&term);
            }
            Action::MoviesLoaded(movies, ticket) => self.apply_movies(movies, ticket),
            Action::MoviesFailed(ticket) => {
                if self.feed.apply_failure(&ticket) && !self.feed.is_searching() {
                    self.sentinel.hold();
                }
            }

            // Trending
            Action::LoadTrending => self.spawn_load_trending(),
            Action::TrendingLoaded(entries) => {
                self.trending = entries;
                self.trending_failed = false;
            }
            Action::TrendingFailed => {
                self.trending_failed = true;
            }

            // Trailer modal
            Action::PlayTrailer => {
                let Some(movie) = self.selected_movie() else {
                    return;
                };
                let modal = TrailerModal {
                    movie_id: movie.id,
                    title: movie.title.clone(),
                };
                let movie_id = modal.movie_id;
                self.modal = Some(modal);
                if self.trailers.begin(movie_id) {
                    self.spawn_resolve_trailer(movie_id);
                }
            }
            Action::TrailerResolved { movie_id, key } => {
                self.trailers.resolve(movie_id, key);
            }
            Action::CloseTrailer => self.modal = None,
            Action::OpenTrailer => {
                if let Some(url) = self.modal_url() {
                    self.notice = Some(match open::that(&url) {
                        Ok(()) => "Opened trailer in browser".to_string(),
                        Err(e) => {
                            tracing::warn!(url = %url, error = %e, "failed to open browser");
                            format!("Could not open browser: {}", e)
                        }
                    });
                }
            }
            Action::YankTrailer => {
                if let Some(url) = self.modal_url() {
                    let copied =
                        arboard::Clipboard::new().and_then(|mut cb| cb.set_text(url.clone()));
                    self.notice = Some(match copied {
                        Ok(()) => format!("Copied {}", url),
                        Err(e) => {
                            tracing::warn!(error = %e, "clipboard unavailable");
                            format!("Could not copy: {}", e)
                        }
                    });
                }
            }

            // Terminal
            Action::Resize(width, height) => {
                self.area = Rect::new(0, 0, width, height);
                self.after_scroll();
            }
            Action::Click { column, row } => self.click(column, row),

            Action::None => {}
        }
    }

    fn debounce_search(&mut self) {
        self.debouncer
            .push(Action::CommitSearch(self.search_input.clone()));
    }

    fn commit(&mut self, term: &str) {
        let Some(ticket) = self.feed.commit(term) else {
            return;
        };
        if self.feed.is_searching() {
            self.sentinel.disconnect();
        } else {
            self.sentinel.observe();
        }
        self.spawn_fetch(ticket);
    }

    fn apply_movies(&mut self, movies: Vec<MovieSummary>, ticket: FetchTicket) {
        let empty_page = movies.is_empty() && matches!(ticket.mode, FetchMode::Discover { .. });

        let Some(merge) = self.feed.apply_success(&ticket, movies) else {
            return;
        };

        if merge.replaced {
            // Replacing the list remounts every card.
            self.trailers.clear();
            self.modal = None;
            self.selected = 0;
            self.offset = 0;
        }
        if empty_page {
            self.sentinel.hold();
        }
        if let Some((query, movie)) = merge.record {
            self.spawn_record_search(query, movie);
        }
        self.after_scroll();
    }

    fn modal_url(&self) -> Option<String> {
        match self.modal_slot() {
            Some(TrailerSlot::Available(key)) => Some(watch_url(key)),
            _ => None,
        }
    }

    fn click(&mut self, column: u16, row: u16) {
        if self.modal.is_some() {
            // Clicks inside the modal stay there.
            if !ui::contains(ui::popup::modal_area(self.area), column, row) {
                self.modal = None;
            }
            return;
        }

        let feed = ui::layout(self.area).feed;
        let inner_top = feed.y + 1;
        let inner_bottom = feed.bottom().saturating_sub(1);
        if ui::contains(feed, column, row) && row >= inner_top && row < inner_bottom {
            let index = self.offset + (row - inner_top) as usize;
            if index < self.feed.movies().len() {
                self.selected = index;
                self.after_scroll();
            }
        }
    }

    pub fn feed_rows(&self) -> usize {
        ui::feed_rows(self.area)
    }

    /// Scrolling on an empty list cannot move the sentinel out of view, so
    /// the attempt itself counts as leaving and re-entering it.
    fn after_user_scroll(&mut self) {
        if self.feed.movies().is_empty() {
            self.sentinel.release();
        }
        self.after_scroll();
    }

    /// Keep the selection on screen, then let the sentinel observe the new
    /// viewport.
    fn after_scroll(&mut self) {
        let rows = self.feed_rows();
        let len = self.feed.movies().len();
        self.selected = self.selected.min(len.saturating_sub(1));

        // At the end of the list, scroll far enough to reveal the sentinel.
        let anchor = if self.sentinel.is_observing() && self.selected + 1 >= len {
            len
        } else {
            self.selected
        };
        self.offset = offset_for(self.offset, anchor, rows);

        let visible = sentinel_visible(self.offset, len, rows);
        if self.sentinel.update(visible, !self.feed.is_loading()) {
            if let Some(ticket) = self.feed.request_next_page() {
                self.spawn_fetch(ticket);
            }
        }
    }

    fn spawn_fetch(&self, ticket: FetchTicket) {
        let tx = self.action_tx.clone();
        let catalog = Arc::clone(&self.catalog);
        tokio::spawn(async move {
            let result = match &ticket.mode {
                FetchMode::Search(query) => catalog.search_movies(query).await,
                FetchMode::Discover { page } => catalog.discover_movies(*page).await,
            };
            match result {
                Ok(movies) => {
                    tx.send(Action::MoviesLoaded(movies, ticket)).ok();
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        generation = ticket.generation,
                        mode = ?ticket.mode,
                        "error fetching movies"
                    );
                    tx.send(Action::MoviesFailed(ticket)).ok();
                }
            }
        });
    }

    fn spawn_load_trending(&self) {
        let tx = self.action_tx.clone();
        let store = Arc::clone(&self.store);
        let limit = self.trending_limit;
        tokio::spawn(async move {
            match store.read_trending(limit).await {
                Ok(entries) => {
                    tx.send(Action::TrendingLoaded(entries)).ok();
                }
                Err(e) => {
                    tracing::error!(error = %e, backend = store.name(), "error loading trending movies");
                    tx.send(Action::TrendingFailed).ok();
                }
            }
        });
    }

    /// Fire and forget: the outcome never reaches the feed.
    fn spawn_record_search(&self, query: String, movie: MovieSummary) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.record_search(&query, &movie).await {
                tracing::warn!(
                    error = %e,
                    backend = store.name(),
                    query = %query,
                    "failed to record search"
                );
            }
        });
    }

    fn spawn_resolve_trailer(&self, movie_id: u64) {
        let tx = self.action_tx.clone();
        let catalog = Arc::clone(&self.catalog);
        tokio::spawn(async move {
            let key = match catalog.movie_videos(movie_id).await {
                Ok(videos) => {
                    let key = select_trailer(&videos);
                    if key.is_none() {
                        tracing::warn!(movie_id, "no YouTube trailer found");
                    }
                    key
                }
                Err(e) => {
                    tracing::warn!(movie_id, error = %e, "trailer lookup failed");
                    None
                }
            };
            tx.send(Action::TrailerResolved { movie_id, key }).ok();
        });
    }
}

/// Actions that come from the user rather than a finished task.
fn is_input(action: &Action) -> bool {
    matches!(
        action,
        Action::ScrollUp
            | Action::ScrollDown
            | Action::PageUp
            | Action::PageDown
            | Action::GoToTop
            | Action::GoToBottom
            | Action::FocusSearch
            | Action::SearchInput(_)
            | Action::SearchBackspace
            | Action::ClearSearch
            | Action::PlayTrailer
            | Action::CloseTrailer
    )
}
