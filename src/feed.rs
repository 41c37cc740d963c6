//! Movie feed state machine.
//!
//! All list, cursor and loading transitions go through [`FeedState`]. The
//! app issues a [`FetchTicket`] for every request it spawns and hands the
//! ticket back with the response, so the state can decide whether the
//! response is still wanted.

use serde::Deserialize;

use crate::types::MovieSummary;

/// Shown for any failed movie fetch. Underlying errors go to the log only.
pub const FETCH_ERROR: &str = "Failed to fetch movies. Try again later.";

/// What to do with a response that was overtaken by a newer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StalePolicy {
    /// Only the most recently issued request may change state.
    #[default]
    Discard,
    /// Responses apply in arrival order, whichever request they belong to.
    LastWriteWins,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMode {
    Search(String),
    Discover { page: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub mode: FetchMode,
    /// Replace the list instead of appending. Always set for searches.
    pub reset: bool,
}

/// Result of merging a successful response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Merge {
    /// The list was replaced wholesale.
    pub replaced: bool,
    /// Search to count on the trending board: the query and its top result.
    pub record: Option<(String, MovieSummary)>,
}

#[derive(Debug, Clone)]
pub struct FeedState {
    committed: String,
    movies: Vec<MovieSummary>,
    page: u32,
    fetch: FetchState,
    generation: u64,
    policy: StalePolicy,
}

impl FeedState {
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            committed: String::new(),
            movies: Vec::new(),
            page: 1,
            fetch: FetchState::Idle,
            generation: 0,
            policy,
        }
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn movies(&self) -> &[MovieSummary] {
        &self.movies
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    pub fn is_searching(&self) -> bool {
        !self.committed.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.fetch == FetchState::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.fetch {
            FetchState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Commit a debounced search term. A changed term resets the cursor and
    /// starts a replacing fetch; an unchanged term does nothing once the
    /// feed has loaded at least once.
    pub fn commit(&mut self, term: &str) -> Option<FetchTicket> {
        let term = term.trim();
        if term == self.committed && self.generation > 0 {
            return None;
        }
        self.committed = term.to_string();
        self.page = 1;
        Some(self.begin_fetch(true))
    }

    /// Start a fetch for the current mode: search when a term is committed,
    /// otherwise the discover page under the cursor.
    pub fn begin_fetch(&mut self, reset: bool) -> FetchTicket {
        self.generation += 1;
        self.fetch = FetchState::Loading;

        let (mode, reset) = if self.is_searching() {
            (FetchMode::Search(self.committed.clone()), true)
        } else {
            (FetchMode::Discover { page: self.page }, reset)
        };

        FetchTicket {
            generation: self.generation,
            mode,
            reset,
        }
    }

    /// Next discover page, unless searching or a fetch is already running.
    pub fn request_next_page(&mut self) -> Option<FetchTicket> {
        if self.is_searching() || self.is_loading() {
            return None;
        }
        Some(self.begin_fetch(false))
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    fn accepts(&self, ticket: &FetchTicket) -> bool {
        match self.policy {
            StalePolicy::Discard => self.is_current(ticket),
            StalePolicy::LastWriteWins => true,
        }
    }

    /// Merge a successful response. Returns `None` when the response is
    /// stale and the policy discards it.
    pub fn apply_success(
        &mut self,
        ticket: &FetchTicket,
        results: Vec<MovieSummary>,
    ) -> Option<Merge> {
        if !self.accepts(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "discarding stale movie response"
            );
            return None;
        }

        let merge = match &ticket.mode {
            FetchMode::Search(query) => {
                self.movies = results;
                Merge {
                    replaced: true,
                    record: self.movies.first().map(|m| (query.clone(), m.clone())),
                }
            }
            FetchMode::Discover { .. } => {
                let replaced = ticket.reset;
                if replaced {
                    self.movies = results;
                } else {
                    self.movies.extend(results);
                }
                self.page += 1;
                Merge {
                    replaced,
                    record: None,
                }
            }
        };

        self.fetch = FetchState::Idle;
        Some(merge)
    }

    /// Record a failed fetch. The list is left as it was. Returns whether
    /// the failure was applied.
    pub fn apply_failure(&mut self, ticket: &FetchTicket) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.fetch = FetchState::Error(FETCH_ERROR.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64) -> MovieSummary {
        MovieSummary {
            id,
            title: format!("Movie {}", id),
            poster_path: None,
            release_date: None,
            vote_average: None,
            original_language: None,
        }
    }

    fn movies(ids: &[u64]) -> Vec<MovieSummary> {
        ids.iter().copied().map(movie).collect()
    }

    fn ids(state: &FeedState) -> Vec<u64> {
        state.movies().iter().map(|m| m.id).collect()
    }

    /// Feed that has loaded discover pages 1 and 2, cursor at 3.
    fn browsing() -> FeedState {
        let mut state = FeedState::new(StalePolicy::Discard);
        let first = state.commit("").unwrap();
        state.apply_success(&first, movies(&[1, 2])).unwrap();
        let second = state.request_next_page().unwrap();
        state.apply_success(&second, movies(&[3, 4])).unwrap();
        state
    }

    #[test]
    fn initial_load_is_discover_page_one() {
        let mut state = FeedState::new(StalePolicy::Discard);
        let ticket = state.commit("").unwrap();
        assert_eq!(ticket.mode, FetchMode::Discover { page: 1 });
        assert!(ticket.reset);
        assert!(state.is_loading());

        let merge = state.apply_success(&ticket, movies(&[1, 2])).unwrap();
        assert!(merge.replaced);
        assert_eq!(state.page(), 2);
        assert_eq!(*state.fetch_state(), FetchState::Idle);
    }

    #[test]
    fn search_replaces_list_and_resets_cursor() {
        let mut state = browsing();
        assert_eq!(state.page(), 3);

        let ticket = state.commit("batman").unwrap();
        assert_eq!(state.page(), 1);
        assert_eq!(ticket.mode, FetchMode::Search("batman".to_string()));

        state.apply_success(&ticket, movies(&[268, 414906])).unwrap();
        assert_eq!(ids(&state), vec![268, 414906]);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn discover_appends_and_advances() {
        let mut state = browsing();
        let ticket = state.request_next_page().unwrap();
        assert_eq!(ticket.mode, FetchMode::Discover { page: 3 });
        assert!(!ticket.reset);

        let merge = state.apply_success(&ticket, movies(&[5, 6])).unwrap();
        assert!(!merge.replaced);
        assert_eq!(ids(&state), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(state.page(), 4);
    }

    #[test]
    fn duplicate_ids_across_pages_are_kept() {
        let mut state = browsing();
        let ticket = state.request_next_page().unwrap();
        state.apply_success(&ticket, movies(&[4, 7])).unwrap();
        assert_eq!(ids(&state), vec![1, 2, 3, 4, 4, 7]);
    }

    #[test]
    fn empty_search_clears_list_without_record() {
        let mut state = browsing();
        let ticket = state.commit("zzzzqx").unwrap();
        let merge = state.apply_success(&ticket, Vec::new()).unwrap();
        assert!(state.movies().is_empty());
        assert_eq!(merge.record, None);
    }

    #[test]
    fn search_records_only_top_result() {
        let mut state = browsing();
        let ticket = state.commit("batman").unwrap();
        let merge = state.apply_success(&ticket, movies(&[268, 414906, 272])).unwrap();
        assert_eq!(merge.record, Some(("batman".to_string(), movie(268))));
    }

    #[test]
    fn failure_keeps_list_and_success_clears_error() {
        let mut state = browsing();
        let ticket = state.request_next_page().unwrap();
        assert!(state.apply_failure(&ticket));
        assert_eq!(ids(&state), vec![1, 2, 3, 4]);
        assert_eq!(state.error(), Some(FETCH_ERROR));
        assert_eq!(state.page(), 3);

        let retry = state.request_next_page().unwrap();
        assert_eq!(state.error(), None);
        state.apply_success(&retry, movies(&[5])).unwrap();
        assert_eq!(*state.fetch_state(), FetchState::Idle);
        assert_eq!(state.page(), 4);
    }

    #[test]
    fn no_page_requests_while_searching_or_loading() {
        let mut state = browsing();
        let _pending = state.request_next_page().unwrap();
        assert!(state.request_next_page().is_none());

        let search = state.commit("alien").unwrap();
        state.apply_success(&search, movies(&[348])).unwrap();
        assert!(state.request_next_page().is_none());
    }

    #[test]
    fn unchanged_term_does_not_refetch() {
        let mut state = browsing();
        assert!(state.commit("").is_none());
        assert!(state.commit("heat").is_some());
        assert!(state.commit(" heat ").is_none());
    }

    #[test]
    fn clearing_search_returns_to_discover_page_one() {
        let mut state = browsing();
        let search = state.commit("heat").unwrap();
        state.apply_success(&search, movies(&[949])).unwrap();

        let ticket = state.commit("").unwrap();
        assert_eq!(ticket.mode, FetchMode::Discover { page: 1 });
        assert!(ticket.reset);
        state.apply_success(&ticket, movies(&[10, 11])).unwrap();
        assert_eq!(ids(&state), vec![10, 11]);
        assert_eq!(state.page(), 2);
    }

    #[test]
    fn stale_search_is_discarded() {
        let mut state = browsing();
        let old = state.commit("bat").unwrap();
        let new = state.commit("batman").unwrap();

        state.apply_success(&new, movies(&[268])).unwrap();
        assert_eq!(state.apply_success(&old, movies(&[999])), None);
        assert!(!state.apply_failure(&old));
        assert_eq!(ids(&state), vec![268]);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn stale_response_does_not_end_newer_loading() {
        let mut state = browsing();
        let old = state.commit("bat").unwrap();
        let _new = state.commit("batman").unwrap();
        assert_eq!(state.apply_success(&old, movies(&[999])), None);
        assert!(state.is_loading());
    }

    #[test]
    fn last_write_wins_applies_stale_response() {
        let mut state = FeedState::new(StalePolicy::LastWriteWins);
        let old = state.commit("bat").unwrap();
        let new = state.commit("batman").unwrap();

        state.apply_success(&new, movies(&[268])).unwrap();
        let merge = state.apply_success(&old, movies(&[999])).unwrap();
        assert_eq!(ids(&state), vec![999]);
        assert_eq!(merge.record, Some(("bat".to_string(), movie(999))));
    }
}
