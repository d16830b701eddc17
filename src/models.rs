//! Record types shared by the providers, the dedup engine and the database

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use std::str::FromStr;

/// Which provider a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    News,
    Social,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::News => "news",
            SourceTag::Social => "social",
        }
    }

    /// Provider name used in log lines and error messages
    pub fn provider_name(&self) -> &'static str {
        match self {
            SourceTag::News => "News",
            SourceTag::Social => "Social",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "news" => Ok(SourceTag::News),
            "social" | "twitter" => Ok(SourceTag::Social),
            _ => Err(Error::InvalidArgument(format!("Unknown source: {}", s))),
        }
    }
}

/// One item as returned by a provider, with the provider's own field names.
///
/// The whole object is kept so it can be stored verbatim as raw metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderRecord(Map<String, Value>);

impl ProviderRecord {
    /// Wrap a JSON value; anything other than an object is rejected
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// A non-empty string field
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// A string or numeric field rendered as text (post IDs come as either)
    pub fn id_field(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|v| !v.is_null())
    }

    /// The full payload as JSON text
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

/// A normalized record staged for insertion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecord {
    pub source: SourceTag,
    pub source_id: Option<String>,
    pub title: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
    pub raw_metadata: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A persisted record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: i64,
    pub source: String,
    pub source_id: Option<String>,
    pub title: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
    pub raw_metadata: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl RawRecord {
    pub fn get_source(&self) -> Result<SourceTag, Error> {
        self.source.parse()
    }

    /// The stored provider payload, parsed back into JSON
    pub fn metadata(&self) -> Option<Value> {
        self.raw_metadata
            .as_ref()
            .and_then(|j| serde_json::from_str(j).ok())
    }
}
