use crate::types::Article;
use std::collections::HashSet;
use tracing::{debug, info};

/// Publisher url, else feed permalink, else title. `None` when all are empty.
pub fn dedup_key(article: &Article) -> Option<&str> {
    [
        article.publisher_url.as_str(),
        article.google_news_url.as_str(),
        article.title.as_str(),
    ]
    .into_iter()
    .find(|key| !key.is_empty())
}

/// Keep the first article per key, in order. Keyless articles are dropped.
pub fn deduplicate(articles: Vec<Article>) -> Vec<Article> {
    let total = articles.len();
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(total);

    for article in articles {
        let Some(key) = dedup_key(&article) else {
            debug!("Dropping article without a usable key");
            continue;
        };
        if !seen.insert(key.to_string()) {
            debug!("Removing duplicate article: {} ({})", article.title, key);
            continue;
        }
        unique.push(article);
    }

    let removed = total - unique.len();
    if removed > 0 {
        info!("Removed {} duplicate or keyless articles", removed);
    }

    unique
}
