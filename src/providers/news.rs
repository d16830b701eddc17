//! News API adapter (`/everything` search and `/top-headlines`)

use super::{
    check_status, endpoint, into_records, require_credential, transport_error, Provider,
};
use crate::config::{NewsConfig, PROVIDER_MAX_PAGE_SIZE};
use crate::error::ProviderError;
use crate::models::{ProviderRecord, SourceTag};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const PROVIDER: &str = "News";

/// Options for an article search
#[derive(Debug, Clone)]
pub struct NewsOptions {
    pub language: String,
    pub page_size: u32,
}

impl NewsOptions {
    pub fn from_config(config: &NewsConfig) -> Self {
        Self {
            language: config.language.clone(),
            page_size: config.page_size,
        }
    }
}

impl Default for NewsOptions {
    fn default() -> Self {
        Self::from_config(&NewsConfig::default())
    }
}

/// Options for a top-headlines fetch
#[derive(Debug, Clone)]
pub struct HeadlinesOptions {
    pub country: String,
    pub category: Option<String>,
    pub page_size: u32,
}

impl HeadlinesOptions {
    pub fn from_config(config: &NewsConfig) -> Self {
        Self {
            country: config.country.clone(),
            category: None,
            page_size: config.page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Value>,
}

/// Client for the news API
pub struct NewsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NewsClient {
    pub fn new(client: Client, config: &NewsConfig, api_key: String) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
        }
    }

    /// Search all articles, most recently published first
    pub async fn fetch_articles(
        &self,
        query: &str,
        options: &NewsOptions,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        let page_size = capped_page_size(options.page_size).to_string();
        let params = [
            ("q", query),
            ("language", options.language.as_str()),
            ("pageSize", page_size.as_str()),
            ("apiKey", self.api_key.as_str()),
            ("sortBy", "publishedAt"),
        ];
        self.get("everything", &params).await
    }

    /// Fetch current top headlines for a country, optionally narrowed to a category
    pub async fn fetch_top_headlines(
        &self,
        options: &HeadlinesOptions,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        let page_size = capped_page_size(options.page_size).to_string();
        let mut params = vec![
            ("country", options.country.as_str()),
            ("pageSize", page_size.as_str()),
            ("apiKey", self.api_key.as_str()),
        ];
        if let Some(category) = options.category.as_deref() {
            params.push(("category", category));
        }
        self.get("top-headlines", &params).await
    }

    async fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        require_credential(PROVIDER, &self.api_key)?;
        let url = endpoint(&self.base_url, path);
        debug!("Fetching: {}", url);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response).await?;

        let body: NewsResponse = response
            .json()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if body.status != "ok" {
            return Err(ProviderError::upstream(
                PROVIDER,
                body.message.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        debug!("{} returned {} articles", path, body.articles.len());
        Ok(into_records(PROVIDER, body.articles))
    }
}

#[async_trait]
impl Provider for NewsClient {
    type Options = NewsOptions;

    fn source(&self) -> SourceTag {
        SourceTag::News
    }

    async fn fetch(
        &self,
        query: &str,
        options: &NewsOptions,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        self.fetch_articles(query, options).await
    }
}

fn capped_page_size(requested: u32) -> u32 {
    requested.clamp(1, PROVIDER_MAX_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::error::ProviderErrorKind;
    use crate::providers::build_http_client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> NewsClient {
        let config = NewsConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        NewsClient::new(Client::new(), &config, "test-key".to_string())
    }

    fn ok_body(articles: serde_json::Value) -> serde_json::Value {
        json!({"status": "ok", "totalResults": 2, "articles": articles})
    }

    #[tokio::test]
    async fn test_fetch_articles_sends_search_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/everything"))
            .and(query_param("q", "rust lang"))
            .and(query_param("language", "en"))
            .and(query_param("pageSize", "100"))
            .and(query_param("apiKey", "test-key"))
            .and(query_param("sortBy", "publishedAt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!([
                {"url": "https://a.example/2", "title": "newer"},
                {"url": "https://a.example/1", "title": "older"}
            ]))))
            .expect(1)
            .mount(&server)
            .await;

        let options = NewsOptions {
            language: "en".to_string(),
            page_size: 500,
        };
        let records = client(&server)
            .fetch_articles("rust lang", &options)
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].str_field("title"), Some("newer"));
    }

    #[tokio::test]
    async fn test_top_headlines_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/top-headlines"))
            .and(query_param("country", "gb"))
            .and(query_param("category", "technology"))
            .and(query_param("pageSize", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!([
                {"url": "https://b.example/1"}
            ]))))
            .expect(1)
            .mount(&server)
            .await;

        let options = HeadlinesOptions {
            country: "gb".to_string(),
            category: Some("technology".to_string()),
            page_size: 20,
        };
        let records = client(&server).fetch_top_headlines(&options).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_error_status_in_body_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/everything"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "code": "parameterInvalid",
                "message": "You must include a query"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_articles("", &NewsOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Upstream);
        assert!(err.to_string().contains("You must include a query"));
    }

    #[tokio::test]
    async fn test_http_status_mapping() {
        let cases = [
            (401, ProviderErrorKind::Unauthenticated),
            (429, ProviderErrorKind::RateLimited),
            (500, ProviderErrorKind::Upstream),
        ];

        for (status, expected) in cases {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/everything"))
                .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                    "status": "error",
                    "message": "nope"
                })))
                .expect(1)
                .mount(&server)
                .await;

            let err = client(&server)
                .fetch_articles("q", &NewsOptions::default())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), expected, "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_upstream_without_key() {
        let config = NewsConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let client = NewsClient::new(Client::new(), &config, "SECRETKEY123".to_string());
        let err = client
            .fetch_articles("q", &NewsOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Upstream);
        assert!(!err.to_string().contains("SECRETKEY123"), "{}", err);
        assert!(!err.to_string().contains("apiKey"), "{}", err);
    }

    #[tokio::test]
    async fn test_slow_response_times_out_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/everything"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_body(json!([])))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let http = HttpConfig {
            timeout_secs: 1,
            ..Default::default()
        };
        let config = NewsConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        let client = NewsClient::new(
            build_http_client(&http).unwrap(),
            &config,
            "SECRETKEY123".to_string(),
        );

        let err = client
            .fetch_articles("q", &NewsOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Upstream);
        assert!(err.to_string().contains("timed out"), "{}", err);
    }

    #[tokio::test]
    async fn test_blank_key_is_unauthenticated_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!([]))))
            .expect(0)
            .mount(&server)
            .await;

        let config = NewsConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        let client = NewsClient::new(Client::new(), &config, "  ".to_string());
        let err = client
            .fetch_articles("q", &NewsOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Unauthenticated);
    }

    #[test]
    fn test_page_size_cap() {
        assert_eq!(capped_page_size(500), 100);
        assert_eq!(capped_page_size(0), 1);
        assert_eq!(capped_page_size(50), 50);
    }
}
