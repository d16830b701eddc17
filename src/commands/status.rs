//! Status command implementation

use crate::config::{Config, Credentials};
use crate::db::{RecordDb, RecordStats};
use crate::error::Result;
use crate::models::SourceTag;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Status information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub db_path: String,
    pub news_base_url: String,
    pub social_base_url: String,
    pub news_credential: CredentialStatus,
    pub social_credential: CredentialStatus,
    pub db_stats: RecordStats,
}

/// Whether a provider credential is available, and where it is read from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialStatus {
    pub env_var: String,
    pub configured: bool,
}

/// Get system status
pub async fn cmd_status(
    config: &Config,
    credentials: &Credentials,
    db: &RecordDb,
) -> Result<StatusInfo> {
    info!("Getting status");

    let db_stats = db.get_stats().await?;

    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        db_path: config.paths.db_file.display().to_string(),
        news_base_url: config.news.base_url.clone(),
        social_base_url: config.social.base_url.clone(),
        news_credential: CredentialStatus {
            env_var: config.news.api_key_env.clone(),
            configured: credentials.has(SourceTag::News),
        },
        social_credential: CredentialStatus {
            env_var: config.social.bearer_token_env.clone(),
            configured: credentials.has(SourceTag::Social),
        },
        db_stats,
    })
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 gatherer Status\n");
    println!("Configuration: {}", status.config_path);
    println!("Database: {}", status.db_path);

    println!("\nProviders:");
    print_provider("News", &status.news_base_url, &status.news_credential);
    print_provider("Social", &status.social_base_url, &status.social_credential);

    println!("\nDatabase Stats:");
    println!("  Records: {}", status.db_stats.total);
    println!("  News: {}", status.db_stats.news);
    println!("  Social: {}", status.db_stats.social);
}

fn print_provider(name: &str, base_url: &str, credential: &CredentialStatus) {
    let state = if credential.configured {
        "✓ Credential set".to_string()
    } else {
        format!("✗ No credential (set {})", credential.env_var)
    };
    println!("  {}: {}", name, base_url);
    println!("    {}", state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_reports_credentials_and_counts() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        let db = RecordDb::new(&config.paths.db_file).await.unwrap();

        let credentials = Credentials {
            news_api_key: Some("key".to_string()),
            social_bearer_token: None,
        };

        let status = cmd_status(&config, &credentials, &db).await.unwrap();
        assert!(status.news_credential.configured);
        assert!(!status.social_credential.configured);
        assert_eq!(status.social_credential.env_var, "SOCIAL_BEARER_TOKEN");
        assert_eq!(status.db_stats.total, 0);
        assert!(status.db_path.ends_with("gatherer.db"));
    }
}
