use anyhow::Context;
use clap::{Parser, Subcommand};
use news_aggregator::{Enricher, SearchConfig, SearchPipeline, SearchRequest};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "news-aggregator", about = "Search, resolve and rank news articles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one search and print the result as JSON
    Search {
        /// Keywords to search for (at least 2 characters)
        keywords: String,
        /// Only include articles after this date (YYYY-MM-DD)
        #[arg(long = "from")]
        date_from: Option<String>,
        /// Only include articles before this date (YYYY-MM-DD)
        #[arg(long = "to")]
        date_to: Option<String>,
        /// Score and summarize results with the enrichment service
        #[arg(long)]
        deep: bool,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Search {
            keywords,
            date_from,
            date_to,
            deep,
            pretty,
        } => {
            let request = SearchRequest {
                keywords,
                date_from,
                date_to,
                deep_research: deep,
            };

            let config = SearchConfig::from_env();
            let enricher = Enricher::from_config(&config.enrichment, config.enrichment_batch_size)
                .context("failed to build enrichment client")?;
            if deep && !enricher.is_enabled() {
                info!("GEMINI_API_KEY is not set; deep research will skip enrichment");
            }

            let pipeline = SearchPipeline::with_enricher(config, enricher)
                .context("failed to build search pipeline")?;
            let response = match pipeline.search(&request).await {
                Ok(response) => response,
                Err(e) if e.is_validation() => anyhow::bail!("{}", e),
                Err(e) => return Err(e).context("search failed"),
            };

            let output = if pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            println!("{}", output);
        }
    }

    Ok(())
}
