use crate::fetcher::Fetcher;
use crate::types::Article;
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of one redirect probe. A failed probe is not an error: it falls
/// back to the url it started from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Fallback(String),
}

impl Resolution {
    pub fn url(&self) -> &str {
        match self {
            Resolution::Resolved(url) | Resolution::Fallback(url) => url,
        }
    }

    pub fn into_url(self) -> String {
        match self {
            Resolution::Resolved(url) | Resolution::Fallback(url) => url,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback(_))
    }
}

/// Resolves feed permalinks to publisher urls for a bounded prefix of the
/// article list.
pub struct LinkResolver {
    fetcher: Fetcher,
    per_link_timeout: Duration,
}

impl LinkResolver {
    pub fn new(fetcher: Fetcher) -> Self {
        let per_link_timeout = Duration::from_secs(fetcher.config().resolve_timeout_seconds);
        Self {
            fetcher,
            per_link_timeout,
        }
    }

    pub fn with_timeout(mut self, per_link_timeout: Duration) -> Self {
        self.per_link_timeout = per_link_timeout;
        self
    }

    pub async fn resolve(&self, url: &str) -> Resolution {
        if url.is_empty() {
            return Resolution::Fallback(String::new());
        }

        match tokio::time::timeout(self.per_link_timeout, self.fetcher.probe_redirects(url)).await {
            Ok(Ok(landed)) => Resolution::Resolved(landed),
            Ok(Err(e)) => {
                warn!("Link resolution failed for {}: {}", url, e);
                Resolution::Fallback(url.to_string())
            }
            Err(_) => {
                warn!(
                    "Link resolution timed out after {:?} for {}",
                    self.per_link_timeout, url
                );
                Resolution::Fallback(url.to_string())
            }
        }
    }

    /// Resolve the first `limit` articles concurrently and wait for all of
    /// them. The result keeps the original order: resolved prefix followed
    /// by the untouched remainder, whose `publisher_url` stays empty.
    pub async fn resolve_prefix(&self, articles: Vec<Article>, limit: usize) -> Vec<Article> {
        let split_at = limit.min(articles.len());
        let mut prefix = articles;
        let remainder = prefix.split_off(split_at);

        let resolutions = join_all(prefix.iter().map(|a| self.resolve(&a.google_news_url))).await;

        let fallbacks = resolutions.iter().filter(|r| r.is_fallback()).count();
        info!(
            "Resolved {} links ({} fell back to the feed permalink)",
            resolutions.len(),
            fallbacks
        );

        let mut resolved: Vec<Article> = prefix
            .into_iter()
            .zip(resolutions)
            .map(|(article, resolution)| {
                debug!("{} -> {}", article.google_news_url, resolution.url());
                Article {
                    publisher_url: resolution.into_url(),
                    ..article
                }
            })
            .collect();

        resolved.extend(remainder);
        resolved
    }
}
