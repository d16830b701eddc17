//! gatherer - ingest news articles and social posts into a deduplicated store
//!
//! This crate provides:
//! - Provider adapters for a news search API and a social post API
//! - A dedup/normalize engine keyed on (source, provider-native id)
//! - A SQLite record store with transactional batch inserts
//! - CLI commands for ingesting, listing and inspecting records

pub mod commands;
pub mod config;
pub mod db;
pub mod dedup;
pub mod error;
pub mod ingestor;
pub mod models;
pub mod providers;

pub use config::{Config, Credentials};
pub use error::{Error, Result};
pub use ingestor::{IngestSummary, Ingestor};
