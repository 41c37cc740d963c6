use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::catalog::Catalog;
use crate::config::TmdbConfig;
use crate::error::{MarqueeError, Result};
use crate::types::{MovieSummary, Video};

/// TMDB v3 client authenticated with a bearer token.
pub struct Tmdb {
    client: Client,
    base_url: String,
    language: String,
    token: String,
}

impl std::fmt::Debug for Tmdb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tmdb")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

// TMDB API response types

#[derive(Debug, Deserialize)]
struct TmResults<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

impl Tmdb {
    pub fn new(config: &TmdbConfig, token: String) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| MarqueeError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            token,
        })
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search/movie?query={}&language={}",
            self.base_url,
            urlencoding::encode(query),
            self.language
        )
    }

    fn discover_url(&self, page: u32) -> String {
        format!(
            "{}/discover/movie?sort_by=popularity.desc&language={}&page={}",
            self.base_url, self.language, page
        )
    }

    fn videos_url(&self, movie_id: u64) -> String {
        format!(
            "{}/movie/{}/videos?language={}",
            self.base_url, movie_id, self.language
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(url = %url, "TMDB request");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| MarqueeError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(MarqueeError::Transport(format!(
                "TMDB API {}: {}",
                status, text
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| MarqueeError::Transport(e.to_string()))?;
        parse_body(&body)
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| MarqueeError::Parse(e.to_string()))
}

#[async_trait]
impl Catalog for Tmdb {
    fn name(&self) -> &str {
        "TMDB"
    }

    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>> {
        let url = self.search_url(query);
        let page: TmResults<MovieSummary> = self.get_json(&url).await?;
        Ok(page.results)
    }

    async fn discover_movies(&self, page: u32) -> Result<Vec<MovieSummary>> {
        let url = self.discover_url(page);
        let page: TmResults<MovieSummary> = self.get_json(&url).await?;
        Ok(page.results)
    }

    async fn movie_videos(&self, movie_id: u64) -> Result<Vec<Video>> {
        let url = self.videos_url(movie_id);
        let videos: TmResults<Video> = self.get_json(&url).await?;
        Ok(videos.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server;

    fn client() -> Tmdb {
        Tmdb::new(&TmdbConfig::default(), "token".to_string()).unwrap()
    }

    #[test]
    fn search_url_encodes_query() {
        assert_eq!(
            client().search_url("the dark knight & co"),
            "https://api.themoviedb.org/3/search/movie?query=the%20dark%20knight%20%26%20co&language=en-US"
        );
    }

    #[test]
    fn discover_url_orders_by_popularity() {
        assert_eq!(
            client().discover_url(3),
            "https://api.themoviedb.org/3/discover/movie?sort_by=popularity.desc&language=en-US&page=3"
        );
    }

    #[test]
    fn videos_url_targets_movie() {
        assert_eq!(
            client().videos_url(268),
            "https://api.themoviedb.org/3/movie/268/videos?language=en-US"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_dropped() {
        let config = TmdbConfig {
            base_url: "http://localhost:8080/3/".to_string(),
            ..TmdbConfig::default()
        };
        let tmdb = Tmdb::new(&config, "t".to_string()).unwrap();
        assert_eq!(
            tmdb.videos_url(1),
            "http://localhost:8080/3/movie/1/videos?language=en-US"
        );
    }

    #[test]
    fn parses_search_page() {
        let body = br#"{
            "page": 1,
            "results": [
                {"id": 268, "title": "Batman", "poster_path": "/a.jpg", "release_date": "1989-06-21",
                 "vote_average": 7.2, "original_language": "en", "popularity": 40.1},
                {"id": 414906, "title": "The Batman", "poster_path": null, "release_date": "",
                 "vote_average": 0, "original_language": "en"}
            ],
            "total_pages": 1
        }"#;
        let page: TmResults<MovieSummary> = parse_body(body).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].title, "Batman");
        assert!(page.results[1].poster_path.is_none());
    }

    #[test]
    fn missing_results_is_empty() {
        let page: TmResults<MovieSummary> = parse_body(br#"{"page": 1}"#).unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn malformed_body_is_parse_error() {
        let err = parse_body::<TmResults<MovieSummary>>(b"<html>").unwrap_err();
        assert!(matches!(err, MarqueeError::Parse(_)));
    }

    fn local(base: String) -> Tmdb {
        let config = TmdbConfig {
            base_url: format!("{}/3", base),
            ..TmdbConfig::default()
        };
        Tmdb::new(&config, "token".to_string()).unwrap()
    }

    #[tokio::test]
    async fn server_error_is_transport() {
        let base = test_server::serve(500, r#"{"status_message":"Internal error."}"#).await;
        let err = local(base).discover_movies(1).await.unwrap_err();
        match err {
            MarqueeError::Transport(msg) => assert!(msg.contains("500"), "{}", msg),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unauthorized_is_transport() {
        let base = test_server::serve(401, r#"{"status_code":7}"#).await;
        let err = local(base).search_movies("heat").await.unwrap_err();
        assert!(matches!(err, MarqueeError::Transport(_)));
    }

    #[tokio::test]
    async fn malformed_success_is_parse_error() {
        let base = test_server::serve(200, "<html>not json</html>").await;
        let err = local(base).movie_videos(268).await.unwrap_err();
        assert!(matches!(err, MarqueeError::Parse(_)));
    }

    #[tokio::test]
    async fn success_returns_results() {
        let base = test_server::serve(200, r#"{"page":1,"results":[{"id":949,"title":"Heat"}]}"#).await;
        let movies = local(base).discover_movies(1).await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Heat");
    }

    #[test]
    fn parses_videos() {
        let body = br#"{"id": 268, "results": [
            {"site": "YouTube", "type": "Trailer", "key": "dgC9Q0uhX70", "name": "Trailer"}
        ]}"#;
        let videos: TmResults<Video> = parse_body(body).unwrap();
        assert_eq!(videos.results[0].kind, "Trailer");
        assert_eq!(videos.results[0].key, "dgC9Q0uhX70");
    }
}
