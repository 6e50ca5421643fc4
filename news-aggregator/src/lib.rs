pub mod types;
pub mod query;
pub mod fetcher;
pub mod parser;
pub mod normalizer;
pub mod resolver;
pub mod dedup;
pub mod enricher;
pub mod pipeline;
pub mod utils;

pub use types::*;
pub use query::QueryBuilder;
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use resolver::{LinkResolver, Resolution};
pub use enricher::{Enricher, EnrichmentService, GeminiService};
pub use pipeline::SearchPipeline;
