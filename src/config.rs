//! Configuration management for jokecrawl using the prefer crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;
use crate::scrapers::http_client::Timeouts;
use crate::scrapers::{CommentSourceKind, PostSourceKind};

/// Default database filename.
pub const DEFAULT_DATABASE: &str = "jokecrawl.db";

/// Environment variable that overrides `ingest_url`.
pub const INGEST_URL_ENV: &str = "JOKECRAWL_INGEST_URL";

/// One configured listing source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Key used for comment adapter lookup and `--source` filtering.
    pub key: String,
    /// Listing URL handed to the adapter.
    pub url: String,
    pub adapter: PostSourceKind,
}

impl SourceEntry {
    pub fn new(key: &str, url: &str, adapter: PostSourceKind) -> Self {
        Self {
            key: key.to_string(),
            url: url.to_string(),
            adapter,
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database path.
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// Base URL of the ingestion API. Forwarding is off when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingest_url: Option<String>,
    /// User agent override for source requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Sources crawled each cycle, in order.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceEntry>,
    /// Source key to comment adapter.
    #[serde(default = "default_comments")]
    pub comments: HashMap<String, CommentSourceKind>,
    /// Site tag to ingestion source id.
    #[serde(default = "default_source_ids")]
    pub source_ids: HashMap<String, i64>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

fn default_database() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE)
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_read_timeout_secs() -> u64 {
    30
}

fn default_sources() -> Vec<SourceEntry> {
    vec![
        SourceEntry::new(
            "pengfu",
            "http://www.pengfu.com/xiaohua_1.html",
            PostSourceKind::PengFu,
        ),
        SourceEntry::new(
            "waduanzi",
            "http://www.waduanzi.com/joke/page/1",
            PostSourceKind::WaDuanZi,
        ),
    ]
}

fn default_comments() -> HashMap<String, CommentSourceKind> {
    [
        ("xixihaha", CommentSourceKind::XiHa),
        ("netease", CommentSourceKind::NetEase),
        ("neihan", CommentSourceKind::NeiHan),
        ("pengfu", CommentSourceKind::PengFu),
    ]
    .into_iter()
    .map(|(key, kind)| (key.to_string(), kind))
    .collect()
}

fn default_source_ids() -> HashMap<String, i64> {
    [("捧腹网", 5266), ("挖段子", 5267)]
        .into_iter()
        .map(|(site, id)| (site.to_string(), id))
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            ingest_url: None,
            user_agent: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            sources: default_sources(),
            comments: default_comments(),
            source_ids: default_source_ids(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no jokecrawl config file is found.
    pub async fn load() -> Result<Self, ScrapeError> {
        Self::from_discovery(prefer::load("jokecrawl").await).await
    }

    /// Only a missing file falls back to defaults; a broken one is an error.
    async fn from_discovery(found: prefer::Result<prefer::Config>) -> Result<Self, ScrapeError> {
        match found {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await,
                None => Ok(Self::default_with_env()),
            },
            Err(prefer::Error::FileNotFound(_)) => Ok(Self::default_with_env()),
            Err(e) => Err(ScrapeError::config(format!("failed to load config: {}", e))),
        }
    }

    /// Defaults with environment overrides applied.
    pub fn default_with_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load configuration from a specific TOML or JSON file.
    pub async fn load_from_path(path: &Path) -> Result<Self, ScrapeError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ScrapeError::config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)
            .map_err(|e| ScrapeError::config(format!("{}: {}", path.display(), e)))?;

        config.source_path = Some(path.to_path_buf());
        // Relative database paths are relative to the config file
        if config.database.is_relative() {
            if let Some(base) = config.base_dir() {
                config.database = base.join(&config.database);
            }
        }
        Ok(config.with_env_overrides())
    }

    /// Parse config text by format name (`toml`, anything else is JSON).
    pub fn parse(contents: &str, format: &str) -> Result<Self, String> {
        match format {
            "toml" => toml::from_str(contents).map_err(|e| format!("invalid TOML config: {}", e)),
            _ => serde_json::from_str(contents).map_err(|e| format!("invalid JSON config: {}", e)),
        }
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = std::env::var(INGEST_URL_ENV).ok().filter(|s| !s.is_empty()) {
            self.ingest_url = Some(url);
        }
        self
    }

    /// Directory of the config file, if loaded from one.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            read: Duration::from_secs(self.read_timeout_secs),
        }
    }

    /// Comment adapter configured for a source key.
    pub fn comment_adapter(&self, key: &str) -> Option<CommentSourceKind> {
        self.comments.get(key).copied()
    }

    /// Sources to crawl. An empty filter selects every source; an unknown key
    /// in the filter is an error.
    pub fn selected_sources(&self, keys: &[String]) -> Result<Vec<&SourceEntry>, ScrapeError> {
        if keys.is_empty() {
            return Ok(self.sources.iter().collect());
        }
        if let Some(unknown) = keys
            .iter()
            .find(|key| !self.sources.iter().any(|s| &s.key == *key))
        {
            return Err(ScrapeError::config(format!("unknown source '{}'", unknown)));
        }
        Ok(self
            .sources
            .iter()
            .filter(|s| keys.contains(&s.key))
            .collect())
    }
}
