use serde::{Deserialize, Serialize};

pub const MIN_KEYWORD_CHARS: usize = 2;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub keywords: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default)]
    pub deep_research: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter keywords (2+ chars).")]
    KeywordsTooShort,
}

impl SearchRequest {
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            ..Default::default()
        }
    }

    pub fn with_date_range(mut self, date_from: Option<&str>, date_to: Option<&str>) -> Self {
        self.date_from = date_from.map(str::to_owned);
        self.date_to = date_to.map(str::to_owned);
        self
    }

    pub fn deep(mut self, deep_research: bool) -> Self {
        self.deep_research = deep_research;
        self
    }

    /// Keywords with surrounding whitespace removed.
    pub fn trimmed_keywords(&self) -> &str {
        self.keywords.trim()
    }

    /// Blank date bounds count as absent.
    pub fn date_from(&self) -> Option<&str> {
        self.date_from.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    pub fn date_to(&self) -> Option<&str> {
        self.date_to.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    pub fn has_date_range(&self) -> bool {
        self.date_from().is_some() || self.date_to().is_some()
    }

    /// Counts characters, not bytes, so short non-ASCII queries are judged fairly.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.trimmed_keywords().chars().count() < MIN_KEYWORD_CHARS {
            return Err(ValidationError::KeywordsTooShort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub publisher: String,
    pub published_date_time: String,
    pub publisher_url: String,
    pub google_news_url: String,
    pub snippet: String,
    pub summary: String,
    pub relevance_score: Option<f64>,
}

impl Article {
    /// The url an outer consumer should link to: the resolved publisher url,
    /// else the feed permalink.
    pub fn link(&self) -> &str {
        if self.publisher_url.is_empty() {
            &self.google_news_url
        } else {
            &self.publisher_url
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRecord {
    pub url: String,
    pub relevance_score: Option<f64>,
    pub summary: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub articles: Vec<Article>,
    pub search_summary: String,
    pub total_sources: usize,
}

// Object style note:
// Everything in this module is plain data that crosses a process boundary
// (CLI output, an HTTP wrapper, exporters). Keep behavior in the aggregator
// crate; the only rule that lives here is keyword validation, because every
// outer surface must apply it before any pipeline work starts.
