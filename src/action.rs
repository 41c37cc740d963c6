use crate::feed::FetchTicket;
use crate::types::{MovieSummary, TrendingEntry};

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,

    // Search input
    FocusSearch,
    BlurSearch,
    SearchInput(char),
    SearchBackspace,
    ClearSearch,
    /// Debounced search term, delivered after the quiet period.
    CommitSearch(String),

    // Movie feed
    LoadHome,
    MoviesLoaded(Vec<MovieSummary>, FetchTicket),
    MoviesFailed(FetchTicket),

    // Trending
    LoadTrending,
    TrendingLoaded(Vec<TrendingEntry>),
    TrendingFailed,

    // Trailer modal
    PlayTrailer,
    TrailerResolved { movie_id: u64, key: Option<String> },
    CloseTrailer,
    OpenTrailer,
    YankTrailer,

    // Terminal
    Resize(u16, u16),
    Click { column: u16, row: u16 },

    None,
}
