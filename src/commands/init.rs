//! Init command implementation

use crate::config::Config;
use crate::db::RecordDb;
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Write a default config and create the record database.
///
/// The database is placed next to the config file, where [`Config::load`]
/// expects it. An existing config is only replaced with `force`.
pub async fn cmd_init(config_path: Option<PathBuf>, force: bool) -> Result<Config> {
    let mut config = Config::default();
    match config_path {
        Some(path) => {
            let base = path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(Config::default_base_dir);
            config.init_paths(Some(base));
            config.paths.config_file = path;
        }
        None => config.init_paths(None),
    }

    if config.paths.config_file.exists() && !force {
        return Err(Error::AlreadyInitialized(
            config.paths.config_file.display().to_string(),
        ));
    }

    config.save()?;

    let db = RecordDb::open(&config.paths.db_file).await?;
    if !db.is_initialized().await? {
        db.init_schema().await?;
    }

    info!("Initialized gatherer at {:?}", config.paths.base_dir);
    Ok(config)
}
