use crate::dedup::deduplicate;
use crate::enricher::Enricher;
use crate::fetcher::Fetcher;
use crate::normalizer::normalize_entries;
use crate::parser::FeedParser;
use crate::query::QueryBuilder;
use crate::resolver::LinkResolver;
use crate::types::{Article, Result, SearchConfig, SearchRequest, SearchResponse};
use std::collections::HashSet;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Runs one search end to end: query, feed, normalize, resolve, dedupe,
/// cap, optionally enrich, and summarize.
///
/// Holds only stateless clients, so a single pipeline can serve concurrent
/// searches.
pub struct SearchPipeline {
    config: SearchConfig,
    query_builder: QueryBuilder,
    fetcher: Fetcher,
    resolver: LinkResolver,
    enricher: Enricher,
}

impl SearchPipeline {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let enricher = Enricher::from_config(&config.enrichment, config.enrichment_batch_size)?;
        Self::with_enricher(config, enricher)
    }

    pub fn with_enricher(config: SearchConfig, enricher: Enricher) -> Result<Self> {
        let fetcher = Fetcher::new(config.fetch.clone())?;
        let resolver = LinkResolver::new(fetcher.clone());
        let query_builder = QueryBuilder::new(&config);

        Ok(Self {
            config,
            query_builder,
            fetcher,
            resolver,
            enricher,
        })
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let request_id = Uuid::new_v4();
        let span = info_span!("search", %request_id, deep = request.deep_research);
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &SearchRequest) -> Result<SearchResponse> {
        request.validate()?;

        let keywords = request.trimmed_keywords();
        let deep = request.deep_research;
        let feed_url = self.query_builder.feed_url_for(request);
        info!("Searching for {:?}", keywords);

        let content = self.fetcher.fetch_feed(&feed_url).await?;
        let feed = FeedParser::parse_feed(&content).map_err(|e| {
            error!("Aborting search: {}", e);
            e
        })?;

        info!(
            "Feed {:?} returned {} entries",
            feed.title.as_deref().unwrap_or("untitled"),
            feed.entries.len()
        );

        let normalized = normalize_entries(&feed.entries);
        let resolved = self
            .resolver
            .resolve_prefix(normalized, self.config.resolve_limit(deep))
            .await;

        let mut articles = deduplicate(resolved);
        articles.truncate(self.config.result_cap(deep));
        let mut total_sources = count_distinct_publishers(&articles);

        let mut search_summary = String::new();
        if deep {
            let enrichment = self.enricher.enrich(keywords, articles).await?;
            articles = enrichment.articles;
            search_summary = enrichment.search_summary;
            total_sources = count_distinct_publishers(&articles);
        }

        if search_summary.is_empty() {
            search_summary = default_summary(request);
        }

        info!(
            "Returning {} articles from {} sources",
            articles.len(),
            total_sources
        );

        Ok(SearchResponse {
            articles,
            search_summary,
            total_sources,
        })
    }
}

/// Distinct non-blank publishers, compared case-insensitively.
pub fn count_distinct_publishers(articles: &[Article]) -> usize {
    articles
        .iter()
        .map(|a| a.publisher.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

pub fn default_summary(request: &SearchRequest) -> String {
    let keywords = request.trimmed_keywords();
    match (request.date_from(), request.date_to()) {
        (Some(from), Some(to)) => {
            format!("Showing results for \"{}\" from {} to {}.", keywords, from, to)
        }
        (Some(from), None) => format!("Showing results for \"{}\" since {}.", keywords, from),
        (None, Some(to)) => format!("Showing results for \"{}\" before {}.", keywords, to),
        (None, None) => format!("Showing results for \"{}\" (recent-first).", keywords),
    }
}
