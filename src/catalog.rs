use async_trait::async_trait;

use crate::error::Result;
use crate::types::{MovieSummary, Video};

/// Read-only movie metadata source.
#[async_trait]
pub trait Catalog: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Movies matching a non-empty query.
    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>>;

    /// One page of the popularity-ordered feed. Pages start at 1.
    async fn discover_movies(&self, page: u32) -> Result<Vec<MovieSummary>>;

    async fn movie_videos(&self, movie_id: u64) -> Result<Vec<Video>>;
}
