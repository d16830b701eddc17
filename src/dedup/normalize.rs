//! Field mapping from provider payloads to the common record schema

use crate::models::{NewRecord, ProviderRecord, SourceTag};
use chrono::{DateTime, Utc};
use tracing::warn;

/// The provider-native identifier used as `source_id`.
///
/// News articles are keyed by their URL, social posts by their post ID.
pub fn extract_source_id(source: SourceTag, record: &ProviderRecord) -> Option<String> {
    match source {
        SourceTag::News => record.str_field("url").map(str::to_string),
        SourceTag::Social => record.id_field("id"),
    }
}

/// Build a storage-ready record. `now` stamps both bookkeeping timestamps.
pub fn normalize(
    source: SourceTag,
    record: &ProviderRecord,
    source_id: Option<String>,
    status_url_base: &str,
    now: &str,
) -> NewRecord {
    let (title, content, author, url, published_at) = match source {
        SourceTag::News => {
            let content = format!(
                "{} {}",
                record.str_field("description").unwrap_or_default(),
                record.str_field("content").unwrap_or_default()
            );
            (
                record.str_field("title").map(str::to_string),
                content,
                record.str_field("author").map(str::to_string),
                record.str_field("url").map(str::to_string),
                parse_timestamp(record.str_field("publishedAt")),
            )
        }
        SourceTag::Social => {
            let url = source_id
                .as_ref()
                .map(|id| format!("{}/{}", status_url_base.trim_end_matches('/'), id));
            (
                None,
                record.str_field("text").unwrap_or_default().to_string(),
                record.id_field("author_id"),
                url,
                parse_timestamp(record.str_field("created_at")),
            )
        }
    };

    NewRecord {
        source,
        source_id,
        title,
        content,
        author,
        url,
        published_at,
        raw_metadata: record.to_json_string(),
        created_at: now.to_string(),
        updated_at: now.to_string(),
    }
}

/// Normalize a provider timestamp to RFC 3339 UTC; unparseable values are dropped
fn parse_timestamp(value: Option<&str>) -> Option<String> {
    let raw = value?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc).to_rfc3339()),
        Err(e) => {
            warn!(value = raw, error = %e, "Ignoring unparseable publication time");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: &str = "2024-05-01T00:00:00+00:00";
    const STATUS_BASE: &str = "https://twitter.com/user/status";

    fn record(value: serde_json::Value) -> ProviderRecord {
        ProviderRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_news_mapping() {
        let article = record(json!({
            "title": "T",
            "description": "D",
            "content": "C",
            "url": "U",
            "author": "A",
            "publishedAt": "P"
        }));

        let source_id = extract_source_id(SourceTag::News, &article);
        assert_eq!(source_id.as_deref(), Some("U"));

        let mapped = normalize(SourceTag::News, &article, source_id, STATUS_BASE, NOW);
        assert_eq!(mapped.source, SourceTag::News);
        assert_eq!(mapped.source_id.as_deref(), Some("U"));
        assert_eq!(mapped.content, "D C");
        assert_eq!(mapped.title.as_deref(), Some("T"));
        assert_eq!(mapped.author.as_deref(), Some("A"));
        assert_eq!(mapped.url.as_deref(), Some("U"));
        assert_eq!(mapped.published_at, None);
        assert_eq!(mapped.created_at, NOW);
        assert_eq!(mapped.updated_at, NOW);

        let stored: serde_json::Value = serde_json::from_str(&mapped.raw_metadata).unwrap();
        assert_eq!(stored["publishedAt"], "P");
    }

    #[test]
    fn test_news_content_keeps_separator_when_side_missing() {
        let only_description = record(json!({"description": "D", "url": "U"}));
        let mapped = normalize(SourceTag::News, &only_description, None, STATUS_BASE, NOW);
        assert_eq!(mapped.content, "D ");

        let only_body = record(json!({"description": null, "content": "C"}));
        let mapped = normalize(SourceTag::News, &only_body, None, STATUS_BASE, NOW);
        assert_eq!(mapped.content, " C");
    }

    #[test]
    fn test_news_timestamp_normalized() {
        let article = record(json!({"url": "U", "publishedAt": "2024-03-05T10:15:00Z"}));
        let mapped = normalize(SourceTag::News, &article, None, STATUS_BASE, NOW);
        assert_eq!(
            mapped.published_at.as_deref(),
            Some("2024-03-05T10:15:00+00:00")
        );
    }

    #[test]
    fn test_social_mapping() {
        let post = record(json!({
            "id": "1790000000000000001",
            "text": "hello  world ",
            "author_id": 2244994945u64,
            "created_at": "2024-04-30T08:00:00.000Z",
            "public_metrics": {"like_count": 3}
        }));

        let source_id = extract_source_id(SourceTag::Social, &post);
        let mapped = normalize(SourceTag::Social, &post, source_id, STATUS_BASE, NOW);

        assert_eq!(mapped.source_id.as_deref(), Some("1790000000000000001"));
        assert_eq!(mapped.title, None);
        assert_eq!(mapped.content, "hello  world ");
        assert_eq!(mapped.author.as_deref(), Some("2244994945"));
        assert_eq!(
            mapped.url.as_deref(),
            Some("https://twitter.com/user/status/1790000000000000001")
        );
        assert_eq!(
            mapped.published_at.as_deref(),
            Some("2024-04-30T08:00:00+00:00")
        );
    }

    #[test]
    fn test_missing_identifier() {
        let post = record(json!({"text": "no id"}));
        assert_eq!(extract_source_id(SourceTag::Social, &post), None);
        let mapped = normalize(SourceTag::Social, &post, None, STATUS_BASE, NOW);
        assert_eq!(mapped.url, None);

        let article = record(json!({"title": "no url", "url": ""}));
        assert_eq!(extract_source_id(SourceTag::News, &article), None);
    }
}
