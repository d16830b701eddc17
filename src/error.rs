//! Error types for gatherer
//!
//! Failures that matter to callers are tagged: configuration problems, provider
//! failures and storage failures each carry a kind that can be matched on. They
//! are only rendered to text at the outermost boundary.

use thiserror::Error;

/// Main error type for gatherer operations
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    #[error("Already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Storage(err.into())
    }
}

/// Result type alias for gatherer
pub type Result<T> = std::result::Result<T, Error>;

/// Kinds of configuration failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// A provider credential is not configured
    MissingCredential,
    /// The configuration file is missing or holds invalid values
    Invalid,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{provider} credentials not configured (set {env_var})")]
    MissingCredential {
        provider: &'static str,
        env_var: String,
    },

    #[error("Configuration error: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn kind(&self) -> ConfigErrorKind {
        match self {
            ConfigError::MissingCredential { .. } => ConfigErrorKind::MissingCredential,
            ConfigError::Invalid(_) => ConfigErrorKind::Invalid,
        }
    }
}

/// Kinds of provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Unauthenticated,
    RateLimited,
    Upstream,
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} API authentication failed: {message}")]
    Unauthenticated {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} API rate limit exceeded")]
    RateLimited { provider: &'static str },

    #[error("{provider} API error: {message}")]
    Upstream {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            ProviderError::Unauthenticated { .. } => ProviderErrorKind::Unauthenticated,
            ProviderError::RateLimited { .. } => ProviderErrorKind::RateLimited,
            ProviderError::Upstream { .. } => ProviderErrorKind::Upstream,
        }
    }

    pub fn upstream(provider: &'static str, message: impl Into<String>) -> Self {
        ProviderError::Upstream {
            provider,
            message: message.into(),
        }
    }
}

/// Kinds of storage failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    ConnectionLost,
    ConstraintViolation,
    Backend,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection lost: {0}")]
    ConnectionLost(String),

    #[error("Database constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Database error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn kind(&self) -> StorageErrorKind {
        match self {
            StorageError::ConnectionLost(_) => StorageErrorKind::ConnectionLost,
            StorageError::ConstraintViolation(_) => StorageErrorKind::ConstraintViolation,
            StorageError::Backend(_) => StorageErrorKind::Backend,
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StorageError::ConstraintViolation(db_err.message().to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StorageError::ConnectionLost(err.to_string()),
            _ => StorageError::Backend(err.to_string()),
        }
    }
}

impl Error {
    /// True when the error is a missing provider credential
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Error::Config(e) if e.kind() == ConfigErrorKind::MissingCredential)
    }
}
