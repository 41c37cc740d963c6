use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{MarqueeError, Result};
use crate::feed::StalePolicy;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub base_url: String,
    pub language: String,
    pub token_env: String,
    pub token_command: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            language: "en-US".to_string(),
            token_env: "TMDB_API_TOKEN".to_string(),
            token_command: None,
            timeout_secs: None,
        }
    }
}

impl TmdbConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrendingBackend {
    #[default]
    Appwrite,
    Local,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrendingConfig {
    pub backend: TrendingBackend,
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub collection_id: String,
    pub api_key_env: Option<String>,
    pub limit: usize,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            backend: TrendingBackend::default(),
            endpoint: "https://cloud.appwrite.io/v1".to_string(),
            project_id: String::new(),
            database_id: String::new(),
            collection_id: String::new(),
            api_key_env: Some("APPWRITE_API_KEY".to_string()),
            limit: 5,
        }
    }
}

impl TrendingConfig {
    /// Appwrite needs a project, database and collection to address documents.
    pub fn appwrite_ready(&self) -> bool {
        !self.endpoint.is_empty()
            && !self.project_id.is_empty()
            && !self.database_id.is_empty()
            && !self.collection_id.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub stale_policy: StalePolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            stale_policy: StalePolicy::default(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub tmdb: TmdbConfig,
    pub trending: TrendingConfig,
    pub search: SearchConfig,
}

pub fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("marquee").join("config.toml"))
}

impl Config {
    /// Load from the default location, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
                Config::default()
            }
        }
    }

    /// Load an explicitly requested file. Unlike [`Config::load`], errors are fatal.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| MarqueeError::Config(format!("{}: {}", path.display(), e)))
    }
}
