//! Default values for configuration

/// Largest page either provider serves per request
pub const PROVIDER_MAX_PAGE_SIZE: u32 = 100;

/// Default news API base URL
pub fn default_news_base_url() -> String {
    std::env::var("GATHERER_NEWS_BASE_URL")
        .unwrap_or_else(|_| "https://newsapi.org/v2".to_string())
}

/// Default environment variable holding the news API key
pub fn default_news_api_key_env() -> String {
    "NEWS_API_KEY".to_string()
}

/// Default article language
pub fn default_news_language() -> String {
    "en".to_string()
}

/// Default country for top headlines
pub fn default_news_country() -> String {
    "us".to_string()
}

/// Default social API base URL
pub fn default_social_base_url() -> String {
    std::env::var("GATHERER_SOCIAL_BASE_URL")
        .unwrap_or_else(|_| "https://api.twitter.com/2".to_string())
}

/// Default environment variable holding the social bearer token
pub fn default_social_bearer_token_env() -> String {
    "SOCIAL_BEARER_TOKEN".to_string()
}

/// Default prefix for canonical post links
pub fn default_social_status_url_base() -> String {
    "https://twitter.com/user/status".to_string()
}

/// Default number of records requested per ingestion
pub fn default_page_size() -> u32 {
    PROVIDER_MAX_PAGE_SIZE
}

/// Default request timeout in seconds
pub fn default_http_timeout() -> u64 {
    30
}

/// Default user agent
pub fn default_http_user_agent() -> String {
    format!("gatherer/{}", env!("CARGO_PKG_VERSION"))
}
