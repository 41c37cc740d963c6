use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::types::{MovieSummary, TrendingEntry};

/// Search-count leaderboard backend.
#[async_trait]
pub trait TrendingStore: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Most-searched entries, highest count first, at most `limit`.
    async fn read_trending(&self, limit: usize) -> Result<Vec<TrendingEntry>>;

    /// Upsert the counter for `query`: increment if it exists, otherwise
    /// create it seeded from `movie`.
    async fn record_search(&self, query: &str, movie: &MovieSummary) -> Result<()>;
}

/// Counters are keyed by trimmed, lowercased query text.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Poster URL stored alongside a new counter. Empty when TMDB has no
/// artwork; placeholders are a rendering concern.
pub fn stored_poster_url(movie: &MovieSummary) -> String {
    movie.poster_url().unwrap_or_default()
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LocalBoard {
    entries: Vec<TrendingEntry>,
}

impl LocalBoard {
    fn top(&self, limit: usize) -> Vec<TrendingEntry> {
        let mut entries = self.entries.clone();
        // Stable sort keeps first-recorded order among equal counts.
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries.truncate(limit);
        entries
    }

    fn record(&mut self, query: &str, movie: &MovieSummary) {
        let term = normalize_query(query);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.search_term == term) {
            entry.count += 1;
            return;
        }
        let id = format!("local-{}", self.entries.len() + 1);
        self.entries.push(TrendingEntry {
            id,
            search_term: term,
            movie_id: movie.id,
            title: movie.title.clone(),
            poster_url: stored_poster_url(movie),
            count: 1,
        });
    }
}

/// File-backed leaderboard for running without a document store.
#[derive(Debug)]
pub struct LocalTrending {
    path: PathBuf,
    lock: Mutex<()>,
}

/// ~/.local/share/marquee/trending.json (Linux) or the platform equivalent
pub fn default_local_path() -> Option<PathBuf> {
    Some(dirs::data_dir()?.join("marquee").join("trending.json"))
}

impl LocalTrending {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<LocalBoard> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LocalBoard::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, board: &LocalBoard) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_string_pretty(board)?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

#[async_trait]
impl TrendingStore for LocalTrending {
    fn name(&self) -> &str {
        "local"
    }

    async fn read_trending(&self, limit: usize) -> Result<Vec<TrendingEntry>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.top(limit))
    }

    async fn record_search(&self, query: &str, movie: &MovieSummary) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut board = self.load().await?;
        board.record(query, movie);
        self.save(&board).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            poster_path: Some(format!("/{}.jpg", id)),
            release_date: None,
            vote_average: None,
            original_language: None,
        }
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_query("  The Batman "), "the batman");
    }

    #[test]
    fn missing_poster_is_stored_empty() {
        let mut m = movie(1, "Heat");
        m.poster_path = None;
        assert_eq!(stored_poster_url(&m), "");
    }

    #[tokio::test]
    async fn posterless_movie_records_without_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalTrending::new(dir.path().join("trending.json"));
        let mut m = movie(949, "Heat");
        m.poster_path = None;

        store.record_search("heat", &m).await.unwrap();

        let top = store.read_trending(5).await.unwrap();
        assert_eq!(top[0].poster_url, "");
    }

    #[tokio::test]
    async fn record_creates_then_increments() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalTrending::new(dir.path().join("trending.json"));

        store.record_search("Batman", &movie(268, "Batman")).await.unwrap();
        store.record_search(" batman", &movie(999, "Other")).await.unwrap();
        store.record_search("heat", &movie(949, "Heat")).await.unwrap();

        let top = store.read_trending(5).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].search_term, "batman");
        assert_eq!(top[0].count, 2);
        // Seeded from the first recorded movie, not overwritten.
        assert_eq!(top[0].movie_id, 268);
        assert_eq!(top[0].poster_url, "https://image.tmdb.org/t/p/w500/268.jpg");
        assert_eq!(top[1].search_term, "heat");
    }

    #[tokio::test]
    async fn read_respects_limit_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalTrending::new(dir.path().join("nested").join("trending.json"));

        for (term, times) in [("a", 1), ("b", 3), ("c", 2)] {
            for _ in 0..times {
                store.record_search(term, &movie(1, term)).await.unwrap();
            }
        }

        let top = store.read_trending(2).await.unwrap();
        let terms: Vec<_> = top.iter().map(|e| e.search_term.as_str()).collect();
        assert_eq!(terms, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalTrending::new(dir.path().join("none.json"));
        assert!(store.read_trending(5).await.unwrap().is_empty());
    }
}
