//! Social API adapter (recent search and user timelines, v2-style endpoints)

use super::{
    check_status, endpoint, into_records, require_credential, transport_error, Provider,
};
use crate::config::{SocialConfig, PROVIDER_MAX_PAGE_SIZE};
use crate::error::ProviderError;
use crate::models::{ProviderRecord, SourceTag};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

const PROVIDER: &str = "Social";

/// Smallest page the search endpoints accept
const MIN_PAGE_SIZE: u32 = 10;

const SEARCH_FIELDS: &str = "created_at,author_id,public_metrics";
const TIMELINE_FIELDS: &str = "created_at,public_metrics";

/// Options for a social fetch
#[derive(Debug, Clone)]
pub struct SocialOptions {
    /// Total number of posts wanted; fetched in pages of at most 100
    pub max_results: u32,
}

impl SocialOptions {
    pub fn from_config(config: &SocialConfig) -> Self {
        Self {
            max_results: config.page_size,
        }
    }
}

impl Default for SocialOptions {
    fn default() -> Self {
        Self::from_config(&SocialConfig::default())
    }
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    meta: PageMeta,
}

#[derive(Debug, Default, Deserialize)]
struct PageMeta {
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: Option<UserData>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
}

/// Client for the social API
pub struct SocialClient {
    client: Client,
    base_url: String,
    bearer_token: String,
}

impl SocialClient {
    pub fn new(client: Client, config: &SocialConfig, bearer_token: String) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            bearer_token,
        }
    }

    /// Search recent posts, newest first, following pagination until
    /// `max_results` posts are collected or the results run out
    pub async fn fetch_posts(
        &self,
        query: &str,
        options: &SocialOptions,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        require_credential(PROVIDER, &self.bearer_token)?;
        let items = self
            .paginate(
                "tweets/search/recent",
                &[("query", query), ("tweet.fields", SEARCH_FIELDS)],
                "next_token",
                options.max_results,
            )
            .await?;
        Ok(into_records(PROVIDER, items))
    }

    /// Fetch the latest posts of one user. The resolved user ID is filled in
    /// as `author_id` on posts that lack it.
    pub async fn fetch_user_posts(
        &self,
        username: &str,
        options: &SocialOptions,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        require_credential(PROVIDER, &self.bearer_token)?;
        let user_id = self.lookup_user(username).await?;
        let path = format!("users/{}/tweets", user_id);
        let items = self
            .paginate(
                &path,
                &[("tweet.fields", TIMELINE_FIELDS)],
                "pagination_token",
                options.max_results,
            )
            .await?;

        let mut records = into_records(PROVIDER, items);
        for record in &mut records {
            if !record.contains("author_id") {
                record.insert("author_id", Value::String(user_id.clone()));
            }
        }
        Ok(records)
    }

    async fn lookup_user(&self, username: &str) -> Result<String, ProviderError> {
        let url = user_lookup_url(&self.base_url, username)?;
        debug!("Fetching: {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response).await?;
        let body: UserResponse = response
            .json()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        body.data
            .map(|user| user.id)
            .ok_or_else(|| ProviderError::upstream(PROVIDER, format!("User {} not found", username)))
    }

    async fn paginate(
        &self,
        path: &str,
        params: &[(&str, &str)],
        token_param: &str,
        limit: u32,
    ) -> Result<Vec<Value>, ProviderError> {
        let url = endpoint(&self.base_url, path);
        let limit = limit as usize;
        let mut items: Vec<Value> = Vec::new();
        let mut next_token: Option<String> = None;

        while items.len() < limit {
            let per_page = page_size_for(limit - items.len()).to_string();
            let mut query: Vec<(&str, &str)> = params.to_vec();
            query.push(("max_results", per_page.as_str()));
            if let Some(token) = next_token.as_deref() {
                query.push((token_param, token));
            }

            debug!("Fetching: {} ({} collected)", url, items.len());
            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.bearer_token)
                .query(&query)
                .send()
                .await
                .map_err(|e| transport_error(PROVIDER, e))?;
            let response = check_status(PROVIDER, response).await?;
            let page: PageResponse = response
                .json()
                .await
                .map_err(|e| transport_error(PROVIDER, e))?;

            if page.data.is_empty() {
                break;
            }
            items.extend(page.data);

            match page.meta.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        items.truncate(limit);
        Ok(items)
    }
}

#[async_trait]
impl Provider for SocialClient {
    type Options = SocialOptions;

    fn source(&self) -> SourceTag {
        SourceTag::Social
    }

    async fn fetch(
        &self,
        query: &str,
        options: &SocialOptions,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        self.fetch_posts(query, options).await
    }
}

/// `{base}/users/by/username/{name}`, with the name escaped as a single path segment
fn user_lookup_url(base_url: &str, username: &str) -> Result<Url, ProviderError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ProviderError::upstream(PROVIDER, format!("invalid base URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| ProviderError::upstream(PROVIDER, "base URL cannot take a path"))?
        .pop_if_empty()
        .extend(["users", "by", "username", username.trim_start_matches('@')]);
    Ok(url)
}

/// Per-request page size for the remaining budget, within the API's bounds
fn page_size_for(remaining: usize) -> u32 {
    let remaining = u32::try_from(remaining).unwrap_or(u32::MAX);
    remaining.clamp(MIN_PAGE_SIZE, PROVIDER_MAX_PAGE_SIZE)
}
