use std::collections::HashMap;

use crate::types::Video;

/// Lookup state of one movie's trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrailerSlot {
    Pending,
    Available(String),
    /// Terminal: no YouTube video, or the lookup failed.
    Unavailable,
}

/// Pick the first YouTube trailer, falling back to any YouTube video.
pub fn select_trailer(videos: &[Video]) -> Option<String> {
    let youtube = |v: &&Video| v.site == "YouTube" && !v.key.is_empty();
    videos
        .iter()
        .filter(youtube)
        .find(|v| v.kind == "Trailer")
        .or_else(|| videos.iter().find(youtube))
        .map(|v| v.key.clone())
}

pub fn watch_url(key: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", key)
}

/// Per-movie trailer lookups for the list currently on screen.
///
/// Entries survive pagination and are dropped whenever the list is replaced,
/// the same lifetime a rendered card has.
#[derive(Debug, Default)]
pub struct TrailerCache {
    slots: HashMap<u64, TrailerSlot>,
}

impl TrailerCache {
    pub fn get(&self, movie_id: u64) -> Option<&TrailerSlot> {
        self.slots.get(&movie_id)
    }

    /// Mark a lookup as started. Returns false if the movie already has a
    /// slot, in which case no request should be made.
    pub fn begin(&mut self, movie_id: u64) -> bool {
        if self.slots.contains_key(&movie_id) {
            return false;
        }
        self.slots.insert(movie_id, TrailerSlot::Pending);
        true
    }

    /// Store a lookup result. Results for movies no longer pending (the list
    /// was replaced meanwhile) are dropped.
    pub fn resolve(&mut self, movie_id: u64, key: Option<String>) {
        if let Some(slot) = self.slots.get_mut(&movie_id) {
            if *slot == TrailerSlot::Pending {
                *slot = match key {
                    Some(key) => TrailerSlot::Available(key),
                    None => TrailerSlot::Unavailable,
                };
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
