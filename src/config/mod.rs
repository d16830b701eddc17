//! Configuration management for gatherer
//!
//! Handles loading, saving, and validating configuration from TOML files.
//! Provider credentials never live in the file; the config names the
//! environment variables that hold them and [`Credentials`] resolves them once.

mod defaults;

pub use defaults::*;

use crate::error::{ConfigError, Result};
use crate::models::SourceTag;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// News provider configuration
    #[serde(default)]
    pub news: NewsConfig,

    /// Social provider configuration
    #[serde(default)]
    pub social: SocialConfig,

    /// Outbound HTTP configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// News provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// API base URL (the `/everything` and `/top-headlines` endpoints hang off it)
    #[serde(default = "default_news_base_url")]
    pub base_url: String,

    /// Environment variable name for the API key
    #[serde(default = "default_news_api_key_env")]
    pub api_key_env: String,

    /// Default article language
    #[serde(default = "default_news_language")]
    pub language: String,

    /// Default country for top headlines
    #[serde(default = "default_news_country")]
    pub country: String,

    /// Default number of articles per ingestion
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Social provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    /// API base URL
    #[serde(default = "default_social_base_url")]
    pub base_url: String,

    /// Environment variable name for the bearer token
    #[serde(default = "default_social_bearer_token_env")]
    pub bearer_token_env: String,

    /// Prefix used to build canonical post links
    #[serde(default = "default_social_status_url_base")]
    pub status_url_base: String,

    /// Default number of posts per ingestion
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,

    /// User agent string
    #[serde(default = "default_http_user_agent")]
    pub user_agent: String,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for gatherer data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to SQLite database
    pub db_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            news: NewsConfig::default(),
            social: SocialConfig::default(),
            http: HttpConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: default_news_base_url(),
            api_key_env: default_news_api_key_env(),
            language: default_news_language(),
            country: default_news_country(),
            page_size: default_page_size(),
        }
    }
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            base_url: default_social_base_url(),
            bearer_token_env: default_social_bearer_token_env(),
            status_url_base: default_social_status_url_base(),
            page_size: default_page_size(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
            user_agent: default_http_user_agent(),
        }
    }
}

impl Config {
    /// Get the default base directory for gatherer (~/.gatherer)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gatherer")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Resolve a `--config` argument: a `.toml` path is the file itself,
    /// anything else is a directory holding `config.toml`
    pub fn resolve_config_path(path: PathBuf) -> PathBuf {
        if path.extension().is_some_and(|e| e == "toml") {
            path
        } else {
            path.join("config.toml")
        }
    }

    /// Point all paths at the given base directory
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            db_file: base.join("gatherer.db"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(ConfigError::Invalid(format!(
                "Config file not found: {}",
                config_path.display()
            ))
            .into());
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            db_file: base.join("gatherer.db"),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for (name, size) in [
            ("news.page_size", self.news.page_size),
            ("social.page_size", self.social.page_size),
        ] {
            if size == 0 || size > PROVIDER_MAX_PAGE_SIZE {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 1 and {}",
                    name, PROVIDER_MAX_PAGE_SIZE
                )));
            }
        }

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http.timeout_secs must be positive".to_string(),
            ));
        }

        if self.news.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "news.api_key_env must name an environment variable".to_string(),
            ));
        }

        if self.social.bearer_token_env.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "social.bearer_token_env must name an environment variable".to_string(),
            ));
        }

        for (name, value) in [
            ("news.base_url", &self.news.base_url),
            ("social.base_url", &self.social.base_url),
        ] {
            Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{} is not a valid URL: {}", name, e)))?;
        }

        Ok(())
    }
}

/// Provider credentials, resolved once at startup
#[derive(Clone, Default)]
pub struct Credentials {
    pub news_api_key: Option<String>,
    pub social_bearer_token: Option<String>,
}

impl Credentials {
    /// Read credentials from the environment variables named in the config.
    /// Empty values count as unset.
    pub fn from_env(config: &Config) -> Self {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            news_api_key: read(&config.news.api_key_env),
            social_bearer_token: read(&config.social.bearer_token_env),
        }
    }

    /// Whether the credential for a source is present
    pub fn has(&self, source: SourceTag) -> bool {
        match source {
            SourceTag::News => self.news_api_key.is_some(),
            SourceTag::Social => self.social_bearer_token.is_some(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| "<redacted>"))
            .field(
                "social_bearer_token",
                &self.social_bearer_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.news.api_key_env, "NEWS_API_KEY");
        assert_eq!(config.news.page_size, 100);
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.news.language = "de".to_string();

        config.save().unwrap();
        assert!(config.paths.config_file.exists());

        let loaded = Config::load(&config.paths.config_file).unwrap();
        assert_eq!(loaded.news.language, "de");
        assert_eq!(loaded.paths.db_file, tmp.path().join("gatherer.db"));
    }

    #[test]
    fn test_config_dir_and_file_resolve_alike() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.save().unwrap();

        let from_dir = Config::resolve_config_path(tmp.path().to_path_buf());
        let from_file = Config::resolve_config_path(tmp.path().join("config.toml"));
        assert_eq!(from_dir, from_file);
        assert_eq!(
            Config::resolve_config_path(PathBuf::from("/etc/custom.toml")),
            PathBuf::from("/etc/custom.toml")
        );

        let loaded = Config::load(&from_dir).unwrap();
        assert_eq!(loaded.paths.db_file, tmp.path().join("gatherer.db"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[http]\ntimeout_secs = 5\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.http.timeout_secs, 5);
        assert_eq!(loaded.social.bearer_token_env, "SOCIAL_BEARER_TOKEN");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.news.page_size = 500;
        assert!(config.validate().is_err());
        config.news.page_size = 50;
        assert!(config.validate().is_ok());

        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());
        config.http.timeout_secs = 10;

        config.social.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials {
            news_api_key: Some("secret".to_string()),
            social_bearer_token: None,
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("secret"));
        assert!(creds.has(SourceTag::News));
        assert!(!creds.has(SourceTag::Social));
    }
}
