use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// CDN prefix for poster images at the size the cards use.
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Shown in place of a poster URL when TMDB has no artwork.
pub const NO_POSTER: &str = "No poster";

/// A movie as returned by the search and discover endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub original_language: Option<String>,
}

impl MovieSummary {
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}/{}", POSTER_BASE_URL, p.trim_start_matches('/')))
    }

    /// Release year, if TMDB gave a usable date.
    pub fn year(&self) -> Option<i32> {
        let date = self.release_date.as_deref()?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(|d| d.year())
            .ok()
            .or_else(|| date.split('-').next()?.parse().ok())
    }

    /// Rating with one decimal, "N/A" when unrated.
    pub fn rating_display(&self) -> String {
        match self.vote_average {
            Some(v) if v > 0.0 => format!("{:.1}", v),
            _ => "N/A".to_string(),
        }
    }

    pub fn language_display(&self) -> String {
        let lang = self.original_language.as_deref().unwrap_or("");
        let mut chars = lang.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => "N/A".to_string(),
        }
    }

    pub fn year_display(&self) -> String {
        self.year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// One row of the trending leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub id: String,
    pub search_term: String,
    pub movie_id: u64,
    pub title: String,
    pub poster_url: String,
    pub count: u64,
}

/// A video attached to a movie (trailers, teasers, clips).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub key: String,
}
