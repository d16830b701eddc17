//! Record listing and lookup commands

use crate::db::{ListQuery, RecordDb, RecordPage};
use crate::error::{Error, Result};
use crate::models::RawRecord;
use tracing::info;

/// List stored records, one page at a time
pub async fn cmd_list_records(db: &RecordDb, query: &ListQuery) -> Result<RecordPage> {
    info!(
        skip = query.skip,
        limit = query.limit,
        source = ?query.source,
        "Listing records"
    );
    db.list_records(query).await
}

/// Look up one stored record by id
pub async fn cmd_show_record(db: &RecordDb, id: i64) -> Result<RawRecord> {
    db.get_record(id).await?.ok_or(Error::RecordNotFound(id))
}

/// Print a page of records to console
pub fn print_record_page(page: &RecordPage) {
    println!(
        "\n📰 Records {}-{} of {}\n",
        if page.data.is_empty() { page.skip } else { page.skip + 1 },
        page.skip as usize + page.data.len(),
        page.total
    );

    if page.data.is_empty() {
        println!("No records. Use 'gatherer ingest' to fetch some.");
        return;
    }

    for record in &page.data {
        let heading = record
            .title
            .as_deref()
            .unwrap_or_else(|| preview(&record.content, 80));
        println!("{}. [{}] {}", record.id, record.source, heading);
        if let Some(url) = &record.url {
            println!("   {}", url);
        }
        if let Some(published) = &record.published_at {
            println!("   Published: {}", published);
        }
    }
}

/// Print a single record to console
pub fn print_record(record: &RawRecord) {
    println!("\nRecord {} [{}]", record.id, record.source);
    if let Some(source_id) = &record.source_id {
        println!("  Source ID: {}", source_id);
    }
    if let Some(title) = &record.title {
        println!("  Title: {}", title);
    }
    if let Some(author) = &record.author {
        println!("  Author: {}", author);
    }
    if let Some(url) = &record.url {
        println!("  URL: {}", url);
    }
    if let Some(published) = &record.published_at {
        println!("  Published: {}", published);
    }
    println!("  Ingested: {}", record.created_at);
    println!("\n{}", record.content.trim());
}

fn preview(text: &str, max_chars: usize) -> &str {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
