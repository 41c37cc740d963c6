use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::TrendingConfig;
use crate::error::{MarqueeError, Result};
use crate::trending::{normalize_query, TrendingStore};
use crate::types::{MovieSummary, TrendingEntry};

/// Trending counters kept in an Appwrite collection.
///
/// Each document holds `searchTerm`, `count`, `movie_id`, `title` and
/// `poster_url`. Increments are read-then-write; concurrent writers for the
/// same term can lose an update.
pub struct Appwrite {
    client: Client,
    documents_url: String,
    project_id: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for Appwrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Appwrite")
            .field("documents_url", &self.documents_url)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

// Appwrite API response types

#[derive(Deserialize)]
struct AwDocumentList {
    #[serde(default)]
    documents: Vec<AwMetric>,
}

#[derive(Deserialize)]
struct AwMetric {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "searchTerm", default)]
    search_term: String,
    #[serde(default)]
    count: u64,
    #[serde(default)]
    movie_id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    poster_url: Option<String>,
}

impl From<AwMetric> for TrendingEntry {
    fn from(doc: AwMetric) -> Self {
        TrendingEntry {
            title: doc.title.unwrap_or_else(|| doc.search_term.clone()),
            id: doc.id,
            search_term: doc.search_term,
            movie_id: doc.movie_id,
            poster_url: doc.poster_url.unwrap_or_default(),
            count: doc.count,
        }
    }
}

fn query_equal(attribute: &str, value: &str) -> String {
    json!({"method": "equal", "attribute": attribute, "values": [value]}).to_string()
}

fn query_order_desc(attribute: &str) -> String {
    json!({"method": "orderDesc", "attribute": attribute}).to_string()
}

fn query_limit(limit: usize) -> String {
    json!({"method": "limit", "values": [limit]}).to_string()
}

fn new_metric(term: &str, movie: &MovieSummary) -> Value {
    let mut data = json!({
        "searchTerm": term,
        "count": 1,
        "movie_id": movie.id,
        "title": movie.title,
    });
    // poster_url is a URL attribute and stays unset without artwork.
    if let Some(url) = movie.poster_url() {
        data["poster_url"] = Value::String(url);
    }
    json!({"documentId": "unique()", "data": data})
}

impl Appwrite {
    pub fn new(config: &TrendingConfig, api_key: Option<String>) -> Self {
        let documents_url = format!(
            "{}/databases/{}/collections/{}/documents",
            config.endpoint.trim_end_matches('/'),
            urlencoding::encode(&config.database_id),
            urlencoding::encode(&config.collection_id)
        );
        Self {
            client: Client::new(),
            documents_url,
            project_id: config.project_id.clone(),
            api_key,
        }
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}", self.documents_url, urlencoding::encode(id))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("X-Appwrite-Project", &self.project_id);
        match &self.api_key {
            Some(key) => request.header("X-Appwrite-Key", key),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self
            .authorize(request)
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
                "Appwrite API {}: {}",
                status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| MarqueeError::Parse(e.to_string()))
    }

    async fn list(&self, queries: &[String]) -> Result<Vec<AwMetric>> {
        let params: Vec<(&str, &str)> = queries.iter().map(|q| ("queries[]", q.as_str())).collect();
        let request = self.client.get(&self.documents_url).query(&params);
        let list: AwDocumentList = self.send(request).await?;
        Ok(list.documents)
    }
}

#[async_trait]
impl TrendingStore for Appwrite {
    fn name(&self) -> &str {
        "appwrite"
    }

    async fn read_trending(&self, limit: usize) -> Result<Vec<TrendingEntry>> {
        let docs = self
            .list(&[query_order_desc("count"), query_limit(limit)])
            .await?;
        Ok(docs.into_iter().map(TrendingEntry::from).collect())
    }

    async fn record_search(&self, query: &str, movie: &MovieSummary) -> Result<()> {
        let term = normalize_query(query);
        let existing = self.list(&[query_equal("searchTerm", &term)]).await?;

        match existing.into_iter().next() {
            Some(doc) => {
                tracing::debug!(term = %term, count = doc.count + 1, "incrementing search count");
                let body = json!({"data": {"count": doc.count + 1}});
                let request = self.client.patch(self.document_url(&doc.id)).json(&body);
                let _: Value = self.send(request).await?;
            }
            None => {
                tracing::debug!(term = %term, movie_id = movie.id, "creating search count");
                let request = self
                    .client
                    .post(&self.documents_url)
                    .json(&new_metric(&term, movie));
                let _: Value = self.send(request).await?;
            }
        }
        Ok(())
    }
}
