use crate::types::{AggregatorError, Article, EnrichmentConfig, EnrichmentRecord, Result};
use crate::utils::text::truncate_chars;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const ENRICHMENT_INSTRUCTIONS: &str = r#"You are a news research assistant.
Given the user's keywords and a list of articles (title, publisher, datetime, snippet, url), produce:
1) A relevanceScore 0-100 for each item based on the user's keywords.
2) A 1-2 sentence summary for each item.

Return ONLY JSON:
{
  "searchSummary": "string",
  "items": [
    {"url":"string","relevanceScore":number,"summary":"string"}
  ]
}
Rules:
- JSON only.
- Keep summaries factual and short.
- If snippet is weak, infer carefully from title and publisher only."#;

/// An external text-generation service used to score and summarize articles.
#[async_trait]
pub trait EnrichmentService: Send + Sync {
    fn service_name(&self) -> String;

    /// Send one prompt and return the raw text of the reply. Failing here is
    /// fatal to the request; malformed reply text is not.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Gemini `generateContent` client.
pub struct GeminiService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiService {
    pub fn new(config: &EnrichmentConfig, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[async_trait]
impl EnrichmentService for GeminiService {
    fn service_name(&self) -> String {
        format!("Gemini ({})", self.model)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AggregatorError::EnrichmentService(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AggregatorError::EnrichmentService(e.to_string()))?;

        if !status.is_success() {
            return Err(AggregatorError::EnrichmentService(format!(
                "HTTP {}: {}",
                status,
                truncate_chars(&text, 300)
            )));
        }

        let envelope: GenerateContentResponse = serde_json::from_str(&text).map_err(|e| {
            AggregatorError::EnrichmentService(format!("unreadable response envelope: {}", e))
        })?;

        Ok(envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptArticle<'a> {
    title: &'a str,
    publisher: &'a str,
    published_date_time: &'a str,
    url: &'a str,
    snippet: &'a str,
}

#[derive(Serialize)]
struct PromptInput<'a> {
    keywords: &'a str,
    articles: Vec<PromptArticle<'a>>,
}

/// Result of reading the service's reply.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    Parsed {
        search_summary: String,
        records: Vec<EnrichmentRecord>,
    },
    /// No usable JSON object in the reply; enrichment is skipped.
    Void,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub articles: Vec<Article>,
    pub search_summary: String,
}

/// Scores and summarizes articles through an [`EnrichmentService`] and merges
/// the results back by url.
pub struct Enricher {
    service: Option<Arc<dyn EnrichmentService>>,
    batch_size: usize,
}

impl Enricher {
    /// Without a configured credential the enricher is a no-op.
    pub fn from_config(config: &EnrichmentConfig, batch_size: usize) -> Result<Self> {
        let service = match config.credential() {
            Some(key) => {
                let gemini = GeminiService::new(config, key)?;
                info!("Enrichment enabled via {}", gemini.service_name());
                Some(Arc::new(gemini) as Arc<dyn EnrichmentService>)
            }
            None => {
                debug!("No enrichment credential configured");
                None
            }
        };
        Ok(Self { service, batch_size })
    }

    pub fn with_service(service: Arc<dyn EnrichmentService>, batch_size: usize) -> Self {
        Self {
            service: Some(service),
            batch_size,
        }
    }

    pub fn disabled() -> Self {
        Self {
            service: None,
            batch_size: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    pub async fn enrich(&self, keywords: &str, articles: Vec<Article>) -> Result<Enrichment> {
        let Some(service) = &self.service else {
            return Ok(Enrichment {
                articles,
                search_summary: String::new(),
            });
        };

        let batch_len = self.batch_size.min(articles.len());
        let prompt = build_prompt(keywords, &articles[..batch_len])?;

        info!(
            "Requesting enrichment for {} of {} articles from {}",
            batch_len,
            articles.len(),
            service.service_name()
        );
        let reply = service.generate(&prompt).await?;

        match parse_enrichment(&reply) {
            EnrichmentOutcome::Parsed {
                search_summary,
                records,
            } => {
                let articles = sort_by_relevance(merge_enrichment(articles, &records));
                Ok(Enrichment {
                    articles,
                    search_summary,
                })
            }
            EnrichmentOutcome::Void => {
                warn!(
                    "Enrichment reply held no usable JSON object: {:?}",
                    truncate_chars(&reply, 200)
                );
                Ok(Enrichment {
                    articles,
                    search_summary: String::new(),
                })
            }
        }
    }
}

pub fn build_prompt(keywords: &str, batch: &[Article]) -> Result<String> {
    let input = PromptInput {
        keywords,
        articles: batch
            .iter()
            .map(|a| PromptArticle {
                title: &a.title,
                publisher: &a.publisher,
                published_date_time: &a.published_date_time,
                url: a.link(),
                snippet: &a.snippet,
            })
            .collect(),
    };
    let input_json = serde_json::to_string(&input)?;
    Ok(format!("{}\n\nINPUT:\n{}", ENRICHMENT_INSTRUCTIONS, input_json))
}

/// Return the first outermost balanced `{...}` in `text`, skipping braces that
/// appear inside JSON string literals.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn parse_enrichment(reply: &str) -> EnrichmentOutcome {
    let Some(object) = extract_json_object(reply) else {
        return EnrichmentOutcome::Void;
    };
    let parsed: Value = match serde_json::from_str(object) {
        Ok(value) => value,
        Err(e) => {
            debug!("Enrichment JSON failed to parse: {}", e);
            return EnrichmentOutcome::Void;
        }
    };

    let search_summary = parsed
        .get("searchSummary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let records = parsed
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(record_from_value).collect())
        .unwrap_or_default();

    EnrichmentOutcome::Parsed {
        search_summary,
        records,
    }
}

fn record_from_value(item: &Value) -> Option<EnrichmentRecord> {
    let url = match item.get("url")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if url.is_empty() {
        return None;
    }

    Some(EnrichmentRecord {
        url,
        relevance_score: item.get("relevanceScore").and_then(finite_score),
        summary: item.get("summary").and_then(Value::as_str).map(str::to_string),
    })
}

fn finite_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    score.filter(|s| s.is_finite())
}

/// Apply records to every article whose link matches, not just the batch
/// that was sent. Later records for the same url win.
pub fn merge_enrichment(articles: Vec<Article>, records: &[EnrichmentRecord]) -> Vec<Article> {
    let by_url: HashMap<&str, &EnrichmentRecord> =
        records.iter().map(|r| (r.url.as_str(), r)).collect();

    let mut matched = 0;
    let merged: Vec<Article> = articles
        .into_iter()
        .map(|article| {
            let key = article.link();
            let Some(record) = (!key.is_empty()).then(|| by_url.get(key)).flatten() else {
                return article;
            };
            matched += 1;
            Article {
                relevance_score: record.relevance_score.or(article.relevance_score),
                summary: record.summary.clone().unwrap_or_else(|| article.summary.clone()),
                ..article
            }
        })
        .collect();

    info!("Merged enrichment into {} of {} articles", matched, merged.len());
    merged
}

/// Stable descending sort by relevance; unscored articles count as zero.
pub fn sort_by_relevance(mut articles: Vec<Article>) -> Vec<Article> {
    articles.sort_by(|a, b| {
        let a_score = a.relevance_score.unwrap_or(0.0);
        let b_score = b.relevance_score.unwrap_or(0.0);
        b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal)
    });
    articles
}
