use crate::types::{SearchConfig, SearchRequest};

/// Composes provider search queries and the feed endpoint url for them.
///
/// The `after:`/`before:` operators are interpreted by the provider and are
/// not strictly exclusive, so date bounds narrow results on a best-effort
/// basis only.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base_url: String,
    language: String,
    country: String,
    edition: String,
}

impl QueryBuilder {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            base_url: config.provider_base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            country: config.country.clone(),
            edition: config.edition.clone(),
        }
    }

    /// `keywords [after:<from>] [before:<to>]`, in that order.
    pub fn build_query(keywords: &str, date_from: Option<&str>, date_to: Option<&str>) -> String {
        let mut parts = vec![keywords.trim().to_string()];
        if let Some(from) = date_from {
            parts.push(format!("after:{}", from));
        }
        if let Some(to) = date_to {
            parts.push(format!("before:{}", to));
        }
        parts.join(" ")
    }

    pub fn feed_url(&self, query: &str) -> String {
        format!(
            "{}/rss/search?q={}&hl={}&gl={}&ceid={}",
            self.base_url,
            urlencoding::encode(query),
            self.language,
            self.country,
            self.edition,
        )
    }

    pub fn feed_url_for(&self, request: &SearchRequest) -> String {
        let query = Self::build_query(request.trimmed_keywords(), request.date_from(), request.date_to());
        self.feed_url(&query)
    }
}
