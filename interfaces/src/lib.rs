pub mod defs;

pub use defs::{Article, EnrichmentRecord, SearchRequest, SearchResponse, ValidationError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_keywords_shorter_than_two_trimmed_chars() {
        assert_eq!(SearchRequest::new("").validate(), Err(ValidationError::KeywordsTooShort));
        assert_eq!(SearchRequest::new("   a  ").validate(), Err(ValidationError::KeywordsTooShort));
        assert!(SearchRequest::new(" ai ").validate().is_ok());
        assert!(SearchRequest::new("é日").validate().is_ok());
    }

    #[test]
    fn blank_date_bounds_are_absent() {
        let request = SearchRequest::new("rates").with_date_range(Some("  "), Some("2024-02-01"));
        assert_eq!(request.date_from(), None);
        assert_eq!(request.date_to(), Some("2024-02-01"));
        assert!(request.has_date_range());
        assert!(!SearchRequest::new("rates").has_date_range());
    }

    #[test]
    fn request_accepts_camel_case_json() {
        let request: SearchRequest = serde_json::from_str(
            r#"{"keywords":"tesla earnings","dateFrom":"2024-01-01","deepResearch":true}"#,
        )
        .unwrap();
        assert_eq!(request.trimmed_keywords(), "tesla earnings");
        assert_eq!(request.date_from(), Some("2024-01-01"));
        assert_eq!(request.date_to(), None);
        assert!(request.deep_research);
    }

    #[test]
    fn article_serializes_every_field_with_null_score() {
        let article = Article {
            title: "Fed Cuts Rates Again".to_owned(),
            publisher: "Reuters".to_owned(),
            google_news_url: "https://news.google.com/rss/articles/abc".to_owned(),
            ..Default::default()
        };
        let value = serde_json::to_value(&article).unwrap();
        let object = value.as_object().unwrap();
        for field in [
            "title",
            "publisher",
            "publishedDateTime",
            "publisherUrl",
            "googleNewsUrl",
            "snippet",
            "summary",
        ] {
            assert!(object[field].is_string(), "{field} should be a string");
        }
        assert!(object["relevanceScore"].is_null());
        assert_eq!(article.link(), "https://news.google.com/rss/articles/abc");
    }
}
