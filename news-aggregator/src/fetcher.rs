use crate::types::{AggregatorError, FetchConfig, Result};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use url::Url;

/// HTTP transport for the feed endpoint and for redirect probes.
///
/// The client is stateless and cheap to clone, so one `Fetcher` serves every
/// concurrent probe of a search.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Download the feed document. Any transport failure, non-success status
    /// or oversized body is an error; there is no retry.
    pub async fn fetch_feed(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        let parsed = Url::parse(url)?;

        debug!("Fetching feed: {}", parsed);

        let response = self.client.get(parsed).send().await.map_err(|e| {
            error!("Feed request failed for {}: {}", url, e);
            AggregatorError::Http(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Feed request for {} returned HTTP {}", url, status);
            return Err(AggregatorError::FeedStatus { status: status.as_u16() });
        }

        if let Some(content_length) = response.content_length() {
            self.check_size(content_length as usize)?;
        }

        let content = response.text().await?;
        self.check_size(content.len())?;

        info!(
            "Fetched feed ({} bytes) in {}ms",
            content.len(),
            start_time.elapsed().as_millis()
        );
        Ok(content)
    }

    /// Follow the redirect chain from `url` and return the url the request
    /// finally landed on. Any HTTP response counts as landed, whatever its
    /// status; only transport failures are errors.
    pub async fn probe_redirects(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let landed = response.url().to_string();
        debug!("Redirect probe {} -> {} (HTTP {})", url, landed, response.status());
        Ok(landed)
    }

    fn check_size(&self, bytes: usize) -> Result<()> {
        let limit = self.config.max_feed_size_mb * 1024 * 1024;
        if bytes > limit {
            return Err(AggregatorError::FeedTooLarge {
                size_mb: bytes.div_ceil(1024 * 1024),
            });
        }
        Ok(())
    }
}
