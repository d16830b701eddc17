//! Deduplication and normalization of provider batches
//!
//! [`DedupEngine::process`] decides, record by record, whether a provider item
//! is new relative to stored state, maps new items onto the common schema, and
//! hands the whole batch to the gateway as a single transaction.
//!
//! Dedup is detect-and-skip: an item already stored under the same
//! `(source, source_id)` is never updated. Items without a native identifier
//! cannot be matched and are always inserted.

mod normalize;

pub use normalize::*;

use crate::config::Config;
use crate::db::RecordGateway;
use crate::error::StorageError;
use crate::models::{ProviderRecord, SourceTag};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// What happened to one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    /// Records committed
    pub inserted: usize,
    /// Records skipped because the key was already stored
    pub skipped_existing: usize,
    /// Records skipped because an earlier record in the same batch had the key
    pub skipped_in_batch: usize,
    /// Inserted records that had no native identifier
    pub without_key: usize,
}

/// Dedup/normalize engine
#[derive(Debug, Clone)]
pub struct DedupEngine {
    status_url_base: String,
}

impl DedupEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            status_url_base: config.social.status_url_base.clone(),
        }
    }

    /// Process one provider batch against the gateway.
    ///
    /// Nothing is written until every record has been examined; the staged
    /// records then go to [`RecordGateway::insert_many`] in one call. If that
    /// commit fails, no record from the batch is stored. Dropping the returned
    /// future before the commit likewise stores nothing.
    pub async fn process<G>(
        &self,
        gateway: &G,
        source: SourceTag,
        records: &[ProviderRecord],
    ) -> Result<ProcessOutcome, StorageError>
    where
        G: RecordGateway + ?Sized,
    {
        let now = Utc::now().to_rfc3339();
        let mut outcome = ProcessOutcome::default();
        let mut batch_keys: HashSet<String> = HashSet::new();
        let mut staged = Vec::with_capacity(records.len());

        for record in records {
            let source_id = extract_source_id(source, record);

            match &source_id {
                Some(id) => {
                    if batch_keys.contains(id) {
                        debug!(%source, source_id = %id, "Skipping duplicate within batch");
                        outcome.skipped_in_batch += 1;
                        continue;
                    }
                    if gateway.exists(source, id).await? {
                        debug!(%source, source_id = %id, "Skipping already stored record");
                        outcome.skipped_existing += 1;
                        continue;
                    }
                    batch_keys.insert(id.clone());
                }
                None => outcome.without_key += 1,
            }

            staged.push(normalize(
                source,
                record,
                source_id,
                &self.status_url_base,
                &now,
            ));
        }

        gateway.insert_many(&staged).await?;
        outcome.inserted = staged.len();

        info!(
            %source,
            received = records.len(),
            inserted = outcome.inserted,
            skipped_existing = outcome.skipped_existing,
            skipped_in_batch = outcome.skipped_in_batch,
            without_key = outcome.without_key,
            "Processed batch"
        );

        Ok(outcome)
    }
}
