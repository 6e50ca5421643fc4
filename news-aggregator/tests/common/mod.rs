#![allow(dead_code)]

use async_trait::async_trait;
use news_aggregator::{AggregatorError, EnrichmentService, Result, SearchConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .try_init()
            .ok();
    });
}

pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    pub source: Option<String>,
}

impl FeedItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: None,
            source: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

/// A Google-News-shaped RSS 2.0 document.
pub fn rss_document(items: &[FeedItem]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
<title>Search results - Google News</title>
<link>https://news.google.com</link>
<description>Google News</description>
"#,
    );
    for (i, item) in items.iter().enumerate() {
        xml.push_str("<item>");
        xml.push_str(&format!("<title>{}</title>", escape(&item.title)));
        xml.push_str(&format!("<link>{}</link>", escape(&item.link)));
        xml.push_str(&format!(r#"<guid isPermaLink="false">item-{}</guid>"#, i));
        xml.push_str("<pubDate>Mon, 05 Feb 2024 12:00:00 GMT</pubDate>");
        if let Some(description) = &item.description {
            xml.push_str(&format!("<description>{}</description>", escape(description)));
        }
        if let Some(source) = &item.source {
            xml.push_str(&format!(
                r#"<source url="https://publisher.example">{}</source>"#,
                escape(source)
            ));
        }
        xml.push_str("</item>\n");
    }
    xml.push_str("</channel></rss>");
    xml
}

/// `count` items titled "Story N - Publisher N" linking to `{base}/articles/N`.
pub fn numbered_items(base: &str, count: usize) -> Vec<FeedItem> {
    (0..count)
        .map(|i| FeedItem::new(format!("Story {} - Publisher {}", i, i), format!("{}/articles/{}", base, i)))
        .collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn config_for(base_url: &str) -> SearchConfig {
    let mut config = SearchConfig::default();
    config.provider_base_url = base_url.to_string();
    config.fetch.user_agent = "News-Aggregator-Test/1.0".to_string();
    config.fetch.timeout_seconds = 5;
    config.fetch.resolve_timeout_seconds = 2;
    config
}

/// Enrichment service that replays a fixed reply and records prompts.
pub struct ScriptedService {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedService {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl EnrichmentService for ScriptedService {
    fn service_name(&self) -> String {
        "Scripted".to_string()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .map_err(AggregatorError::EnrichmentService)
    }
}
