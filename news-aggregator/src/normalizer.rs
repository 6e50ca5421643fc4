use crate::types::{Article, RawEntry};
use chrono::SecondsFormat;

const TITLE_SEPARATOR: &str = " - ";

/// Map raw entries to canonical articles, one for one and in order.
pub fn normalize_entries(entries: &[RawEntry]) -> Vec<Article> {
    entries.iter().map(normalize_entry).collect()
}

pub fn normalize_entry(entry: &RawEntry) -> Article {
    let raw_title = entry.title.as_deref().unwrap_or("");
    let (title, split_publisher) = split_title(raw_title);

    // Fallback chain: title suffix, then the source label, then the author.
    let publisher = split_publisher
        .or_else(|| non_blank(entry.source.as_deref()))
        .or_else(|| non_blank(entry.author.as_deref()))
        .unwrap_or_default();

    let published_date_time = entry
        .published
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .or_else(|| entry.raw_date.clone())
        .unwrap_or_default();

    Article {
        title,
        publisher,
        published_date_time,
        publisher_url: String::new(),
        google_news_url: entry.link.clone().unwrap_or_default(),
        snippet: entry.content_snippet.as_deref().unwrap_or("").trim().to_string(),
        summary: String::new(),
        relevance_score: None,
    }
}

/// Split `"Headline - Publisher"` into its parts. Only the last segment is the
/// publisher, so headlines that themselves contain the separator survive.
pub fn split_title(raw_title: &str) -> (String, Option<String>) {
    let segments: Vec<&str> = raw_title.split(TITLE_SEPARATOR).collect();
    match segments.split_last() {
        Some((publisher, head)) if !head.is_empty() => (
            head.join(TITLE_SEPARATOR).trim().to_string(),
            Some(publisher.trim().to_string()),
        ),
        _ => (raw_title.trim().to_string(), None),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
