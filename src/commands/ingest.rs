//! Ingest command implementation

use crate::config::{Config, Credentials};
use crate::db::RecordDb;
use crate::error::Result;
use crate::ingestor::{IngestSummary, Ingestor};
use crate::providers::{HeadlinesOptions, NewsOptions, SocialOptions};

/// What to ingest
#[derive(Debug, Clone)]
pub enum IngestRequest {
    /// News article search
    News { query: String, options: NewsOptions },
    /// Recent social post search
    Social {
        query: String,
        options: SocialOptions,
    },
    /// Current news headlines
    Headlines(HeadlinesOptions),
    /// One user's latest posts
    Timeline {
        username: String,
        options: SocialOptions,
    },
}

/// Run one ingestion request against the record database
pub async fn cmd_ingest(
    config: &Config,
    credentials: &Credentials,
    db: &RecordDb,
    request: IngestRequest,
) -> Result<IngestSummary> {
    let ingestor = Ingestor::new(config, credentials, db)?;

    match request {
        IngestRequest::News { query, options } => ingestor.ingest_news(&query, &options).await,
        IngestRequest::Social { query, options } => {
            ingestor.ingest_social(&query, &options).await
        }
        IngestRequest::Headlines(options) => ingestor.ingest_headlines(&options).await,
        IngestRequest::Timeline { username, options } => {
            ingestor.ingest_user_timeline(&username, &options).await
        }
    }
}

/// Print an ingestion summary to console
pub fn print_ingest_summary(summary: &IngestSummary) {
    println!("\n✓ {} ingestion complete", summary.source);
    println!("  Query: {}", summary.query);
    println!("  Fetched: {}", summary.fetched);
    println!("  Inserted: {}", summary.inserted_count);

    let outcome = &summary.outcome;
    if outcome.skipped_existing > 0 || outcome.skipped_in_batch > 0 {
        println!(
            "  Skipped: {} already stored, {} repeated in batch",
            outcome.skipped_existing, outcome.skipped_in_batch
        );
    }
    if outcome.without_key > 0 {
        println!("  Without identifier: {}", outcome.without_key);
    }
}
