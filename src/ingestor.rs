//! Ingestion orchestration
//!
//! An [`Ingestor`] runs one request end to end: it checks that the provider's
//! credential is configured, fetches one batch through the matching adapter,
//! and passes the batch through the dedup engine into storage.

use crate::config::{Config, Credentials};
use crate::db::RecordGateway;
use crate::dedup::{DedupEngine, ProcessOutcome};
use crate::error::{ConfigError, Result};
use crate::models::{ProviderRecord, SourceTag};
use crate::providers::{
    build_http_client, HeadlinesOptions, NewsClient, NewsOptions, Provider, SocialClient,
    SocialOptions,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Result of one ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Records newly stored by this run
    pub inserted_count: usize,
    /// The query as requested
    pub query: String,
    pub source: SourceTag,
    /// Items returned by the provider
    pub fetched: usize,
    pub outcome: ProcessOutcome,
}

/// Ingestion orchestrator
pub struct Ingestor<'a, G: RecordGateway + ?Sized> {
    config: &'a Config,
    credentials: &'a Credentials,
    http: Client,
    gateway: &'a G,
    engine: DedupEngine,
}

impl<'a, G: RecordGateway + ?Sized> Ingestor<'a, G> {
    pub fn new(config: &'a Config, credentials: &'a Credentials, gateway: &'a G) -> Result<Self> {
        Ok(Self {
            config,
            credentials,
            http: build_http_client(&config.http)?,
            gateway,
            engine: DedupEngine::new(config),
        })
    }

    /// Search news articles and store the new ones
    pub async fn ingest_news(&self, query: &str, options: &NewsOptions) -> Result<IngestSummary> {
        let client = self.news_client()?;
        self.run(&client, query, options).await
    }

    /// Search recent social posts and store the new ones
    pub async fn ingest_social(
        &self,
        query: &str,
        options: &SocialOptions,
    ) -> Result<IngestSummary> {
        let client = self.social_client()?;
        self.run(&client, query, options).await
    }

    /// Fetch current top headlines and store the new ones
    pub async fn ingest_headlines(&self, options: &HeadlinesOptions) -> Result<IngestSummary> {
        let client = self.news_client()?;
        let label = match &options.category {
            Some(category) => format!("top-headlines:{}:{}", options.country, category),
            None => format!("top-headlines:{}", options.country),
        };

        info!(query = %label, "Fetching top headlines");
        let records = client.fetch_top_headlines(options).await?;
        self.store(SourceTag::News, label, records).await
    }

    /// Fetch a user's latest posts and store the new ones
    pub async fn ingest_user_timeline(
        &self,
        username: &str,
        options: &SocialOptions,
    ) -> Result<IngestSummary> {
        let client = self.social_client()?;
        let label = format!("@{}", username.trim_start_matches('@'));

        info!(query = %label, "Fetching user timeline");
        let records = client.fetch_user_posts(username, options).await?;
        self.store(SourceTag::Social, label, records).await
    }

    async fn run<P: Provider>(
        &self,
        provider: &P,
        query: &str,
        options: &P::Options,
    ) -> Result<IngestSummary> {
        info!(source = %provider.source(), query, "Fetching from provider");
        let records = provider.fetch(query, options).await?;
        self.store(provider.source(), query.to_string(), records)
            .await
    }

    async fn store(
        &self,
        source: SourceTag,
        query: String,
        records: Vec<ProviderRecord>,
    ) -> Result<IngestSummary> {
        let outcome = self.engine.process(self.gateway, source, &records).await?;

        info!(
            %source,
            query = %query,
            fetched = records.len(),
            inserted = outcome.inserted,
            "Ingestion complete"
        );

        Ok(IngestSummary {
            inserted_count: outcome.inserted,
            query,
            source,
            fetched: records.len(),
            outcome,
        })
    }

    fn news_client(&self) -> Result<NewsClient> {
        let api_key = self.credential(SourceTag::News)?;
        Ok(NewsClient::new(
            self.http.clone(),
            &self.config.news,
            api_key.to_string(),
        ))
    }

    fn social_client(&self) -> Result<SocialClient> {
        let token = self.credential(SourceTag::Social)?;
        Ok(SocialClient::new(
            self.http.clone(),
            &self.config.social,
            token.to_string(),
        ))
    }

    fn credential(&self, source: SourceTag) -> std::result::Result<&str, ConfigError> {
        let (value, env_var) = match source {
            SourceTag::News => (
                self.credentials.news_api_key.as_deref(),
                &self.config.news.api_key_env,
            ),
            SourceTag::Social => (
                self.credentials.social_bearer_token.as_deref(),
                &self.config.social.bearer_token_env,
            ),
        };
        value.ok_or_else(|| ConfigError::MissingCredential {
            provider: source.provider_name(),
            env_var: env_var.clone(),
        })
    }
}
