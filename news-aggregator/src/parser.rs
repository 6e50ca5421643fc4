use crate::types::{AggregatorError, ParsedFeed, RawEntry, Result};
use crate::utils::text::collapse_whitespace;
use chrono::{DateTime, Utc};
use feed_rs::model::FeedType;
use feed_rs::parser;
use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

/// Turns a syndication document into raw entries, preserving feed order.
pub struct FeedParser;

impl FeedParser {
    pub fn parse_feed(content: &str) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))?;

        // RSS parsers stamp every item with the channel's build date, so
        // `updated` is only an entry's own timestamp for Atom and JSON feeds.
        let own_updated = matches!(feed.feed_type, FeedType::Atom | FeedType::JSON);

        let mut item_fields = if own_updated { Vec::new() } else { scan_items(content) };
        if !item_fields.is_empty() && item_fields.len() != feed.entries.len() {
            debug!(
                "Item scan found {} items for {} entries, ignoring it",
                item_fields.len(),
                feed.entries.len()
            );
            item_fields.clear();
        }
        let mut item_fields = item_fields.into_iter();

        let title = feed.title.map(|t| t.content);
        let entries: Vec<RawEntry> = feed
            .entries
            .into_iter()
            .map(|entry| {
                let fields = item_fields.next().unwrap_or_default();
                Self::parse_entry(entry, fields, own_updated)
            })
            .collect();

        info!("Parsed feed with {} entries", entries.len());

        Ok(ParsedFeed { title, entries })
    }

    fn parse_entry(entry: feed_rs::model::Entry, fields: ItemFields, own_updated: bool) -> RawEntry {
        let title = entry.title.map(|t| t.content);

        let link = entry
            .links
            .iter()
            .map(|l| l.href.trim())
            .find(|href| !href.is_empty())
            .map(str::to_string);

        // A source that is only a url carries no publisher name.
        let source = fields
            .source
            .or(entry.source)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && !is_http_url(s));

        let author = entry
            .authors
            .first()
            .map(|a| a.name.trim().to_string())
            .filter(|name| !name.is_empty());

        let content_snippet = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .map(|html| html_to_text(&html))
            .filter(|text| !text.is_empty());

        RawEntry {
            title,
            link,
            source,
            author,
            published: published_at(entry.published, entry.updated, own_updated),
            raw_date: fields.pub_date.filter(|d| !d.is_empty()),
            content_snippet,
        }
    }
}

fn published_at(
    published: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
    own_updated: bool,
) -> Option<DateTime<Utc>> {
    if own_updated {
        published.or(updated)
    } else {
        published
    }
}

/// Item fields feed-rs does not keep for RSS: the `<source>` label and the
/// `pubDate` text as written.
#[derive(Debug, Default)]
struct ItemFields {
    source: Option<String>,
    pub_date: Option<String>,
}

/// Collects `ItemFields` for every `<item>`, in document order. A document
/// the scan cannot read yields no items.
fn scan_items(content: &str) -> Vec<ItemFields> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<ItemFields> = None;
    let mut field: Option<&'static str> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => current = Some(ItemFields::default()),
                b"source" if current.is_some() => {
                    field = Some("source");
                    text.clear();
                }
                b"pubDate" if current.is_some() => {
                    field = Some("pubDate");
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Text(e)) if field.is_some() => match e.unescape() {
                Ok(value) => text.push_str(&value),
                Err(err) => {
                    warn!("Skipping item scan: {}", err);
                    return Vec::new();
                }
            },
            Ok(Event::CData(e)) if field.is_some() => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"item" => {
                    if let Some(fields) = current.take() {
                        items.push(fields);
                    }
                    field = None;
                }
                b"source" | b"pubDate" => {
                    if let (Some(name), Some(fields)) = (field.take(), current.as_mut()) {
                        let value = Some(text.trim().to_string());
                        if name == "source" {
                            fields.source = value;
                        } else {
                            fields.pub_date = value;
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => {
                warn!("Skipping item scan: {}", err);
                return Vec::new();
            }
            _ => {}
        }
    }

    items
}

/// Plain-text rendering of an html fragment: tags dropped, entities decoded,
/// whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    collapse_whitespace(&text)
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|u| u.scheme() == "http" || u.scheme() == "https")
        .unwrap_or(false)
}
