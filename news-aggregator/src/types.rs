use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::env;
// Use the interfaces crate for wire types
pub use interfaces::defs::{Article, EnrichmentRecord, SearchRequest, SearchResponse, ValidationError};

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub resolve_timeout_seconds: u64,
    pub max_redirects: usize,
    pub max_feed_size_mb: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "News-Aggregator/1.0".to_string(),
            timeout_seconds: 30,
            resolve_timeout_seconds: 8,
            max_redirects: 10,
            max_feed_size_mb: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl EnrichmentConfig {
    /// A blank key is treated the same as a missing one.
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub provider_base_url: String,
    pub language: String,
    pub country: String,
    pub edition: String,
    pub standard_resolve_limit: usize,
    pub deep_resolve_limit: usize,
    pub standard_result_cap: usize,
    pub deep_result_cap: usize,
    pub enrichment_batch_size: usize,
    pub fetch: FetchConfig,
    pub enrichment: EnrichmentConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider_base_url: "https://news.google.com".to_string(),
            language: "en-US".to_string(),
            country: "US".to_string(),
            edition: "US:en".to_string(),
            standard_resolve_limit: 8,
            deep_resolve_limit: 12,
            standard_result_cap: 12,
            deep_result_cap: 20,
            enrichment_batch_size: 12,
            fetch: FetchConfig::default(),
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Build a config from the process environment, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base) = env::var("NEWS_PROVIDER_BASE_URL") {
            config.provider_base_url = base;
        }
        if let Ok(agent) = env::var("NEWS_USER_AGENT") {
            config.fetch.user_agent = agent;
        }
        config.enrichment.api_key = env::var("GEMINI_API_KEY").ok();
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.enrichment.model = model;
        }
        if let Ok(base) = env::var("GEMINI_BASE_URL") {
            config.enrichment.base_url = base;
        }

        config
    }

    pub fn resolve_limit(&self, deep_research: bool) -> usize {
        if deep_research {
            self.deep_resolve_limit
        } else {
            self.standard_resolve_limit
        }
    }

    pub fn result_cap(&self, deep_research: bool) -> usize {
        if deep_research {
            self.deep_result_cap
        } else {
            self.standard_result_cap
        }
    }
}

#[derive(Debug)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<RawEntry>,
}

/// A feed item before normalization. Every field is optional because feeds
/// disagree on what they carry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Label of the item's `<source>` element.
    pub source: Option<String>,
    /// First author name, the alternate place some feeds put the publisher.
    pub author: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub raw_date: Option<String>,
    pub content_snippet: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed request failed with HTTP {status}")]
    FeedStatus { status: u16 },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Feed size exceeds limit: {size_mb}MB")]
    FeedTooLarge { size_mb: usize },

    #[error("Enrichment service error: {0}")]
    EnrichmentService(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AggregatorError {
    /// Validation failures are the caller's fault and carry a user-facing
    /// message; everything else is a server-side failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, AggregatorError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
