//! Provider adapters
//!
//! Each adapter fetches one batch of items from an external API and hands
//! them back as [`ProviderRecord`]s, in the order the provider returned them.
//! Adapters never retry; one attempt is made and any failure is surfaced as a
//! [`ProviderError`].

mod news;
mod social;

pub use news::*;
pub use social::*;

use crate::config::HttpConfig;
use crate::error::{ConfigError, ProviderError};
use crate::models::{ProviderRecord, SourceTag};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// A source of provider records
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider-specific fetch options
    type Options: Send + Sync;

    /// Tag stored with every record from this provider
    fn source(&self) -> SourceTag;

    /// Fetch one batch matching `query`
    async fn fetch(
        &self,
        query: &str,
        options: &Self::Options,
    ) -> Result<Vec<ProviderRecord>, ProviderError>;
}

/// Build the shared HTTP client. Every request is bounded by the configured timeout.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, ConfigError> {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| ConfigError::Invalid(format!("Failed to create HTTP client: {}", e)))
}

/// Join an endpoint path onto a base URL
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Reject a blank credential before any request is made
pub(crate) fn require_credential(provider: &'static str, value: &str) -> Result<(), ProviderError> {
    if value.trim().is_empty() {
        return Err(ProviderError::Unauthenticated {
            provider,
            message: "no credential configured".to_string(),
        });
    }
    Ok(())
}

/// Map a transport failure (connect, timeout, body read) to an upstream error.
/// The request URL is stripped since it can carry a query-string API key.
pub(crate) fn transport_error(provider: &'static str, err: reqwest::Error) -> ProviderError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        format!("request failed: {}", err.without_url())
    };
    ProviderError::upstream(provider, message)
}

/// Turn a non-2xx response into the matching provider error
pub(crate) async fn check_status(
    provider: &'static str,
    response: Response,
) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.to_string()
        } else {
            body.trim().to_string()
        }
    });

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::Unauthenticated { provider, message }
        }
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { provider },
        _ => ProviderError::upstream(provider, format!("{} ({})", message, status.as_u16())),
    })
}

/// Pull a human-readable message out of a provider error body
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "detail", "title", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Keep JSON objects, drop anything else the provider put in its item list
pub(crate) fn into_records(provider: &'static str, items: Vec<Value>) -> Vec<ProviderRecord> {
    items
        .into_iter()
        .filter_map(|item| {
            let record = ProviderRecord::from_value(item);
            if record.is_none() {
                warn!(provider, "Dropping non-object item from provider response");
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_joins_cleanly() {
        assert_eq!(
            endpoint("https://newsapi.org/v2", "everything"),
            "https://newsapi.org/v2/everything"
        );
        assert_eq!(
            endpoint("http://127.0.0.1:9000/", "/tweets/search/recent"),
            "http://127.0.0.1:9000/tweets/search/recent"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#)
                .as_deref(),
            Some("Your API key is invalid.")
        );
        assert_eq!(
            error_message(r#"{"title":"Unauthorized","detail":"Unauthorized","status":401}"#)
                .as_deref(),
            Some("Unauthorized")
        );
        assert_eq!(error_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_into_records_skips_non_objects() {
        let records = into_records("News", vec![json!({"url": "a"}), json!(null), json!(3)]);
        assert_eq!(records.len(), 1);
    }
}
