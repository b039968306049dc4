//! Response Envelope
//!
//! The single JSON shape returned to HTTP clients for an entry, whether it
//! came from the backend or from the fallback store.
//!
//! Backend records are projected with a fixed default table:
//!
//! | field       | read from (first match wins)                      | default      |
//! |-------------|---------------------------------------------------|--------------|
//! | `id`        | record id                                         | required     |
//! | `title`     | `title`                                           | `"Untitled"` |
//! | `content`   | `description`, `content`                          | `""`         |
//! | `createdAt` | `createdAt` (ms), `createdDate` (s)               | now          |
//! | `updatedAt` | `lastModifiedDate` (s)                            | omitted      |
//!
//! Text fields only match non-empty strings. Timestamps accept JSON numbers
//! or numeric strings; a second count too large to express in milliseconds
//! counts as absent.

use crate::journal::types::JournalEntry;
use crate::rpc::protocol::{Details, ObjectRecord};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_CONTENT: &str = "";

pub const DETAIL_TITLE: &str = "title";
pub const DETAIL_DESCRIPTION: &str = "description";
pub const DETAIL_CONTENT: &str = "content";
pub const DETAIL_CREATED_AT_MS: &str = "createdAt";
pub const DETAIL_CREATED_DATE_S: &str = "createdDate";
pub const DETAIL_LAST_MODIFIED_S: &str = "lastModifiedDate";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
}

impl From<JournalEntry> for EntryView {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: entry.id.0,
            title: entry.title,
            content: entry.content,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

/// Projects a backend record onto the envelope. Total: every missing field
/// is replaced by its default, with `now_ms` standing in for the creation time.
pub fn project_record(record: &ObjectRecord, now_ms: u64) -> EntryView {
    let details = &record.details;

    let title = text_field(details, DETAIL_TITLE).unwrap_or(DEFAULT_TITLE);
    let content = text_field(details, DETAIL_DESCRIPTION)
        .or_else(|| text_field(details, DETAIL_CONTENT))
        .unwrap_or(DEFAULT_CONTENT);
    let created_at = number_field(details, DETAIL_CREATED_AT_MS)
        .or_else(|| seconds_field_as_ms(details, DETAIL_CREATED_DATE_S))
        .unwrap_or(now_ms);
    let updated_at = seconds_field_as_ms(details, DETAIL_LAST_MODIFIED_S);

    EntryView {
        id: record.object_id.clone(),
        title: title.to_string(),
        content: content.to_string(),
        created_at,
        updated_at,
    }
}

/// Details sent to the backend for an entry's title and content.
pub fn entry_details(title: &str, content: &str) -> Details {
    let mut details = Details::new();
    details.insert(DETAIL_TITLE.to_string(), Value::String(title.to_string()));
    details.insert(
        DETAIL_DESCRIPTION.to_string(),
        Value::String(content.to_string()),
    );
    details
}

fn text_field<'a>(details: &'a Details, key: &str) -> Option<&'a str> {
    details
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

fn seconds_field_as_ms(details: &Details, key: &str) -> Option<u64> {
    number_field(details, key)?.checked_mul(1000)
}

fn number_field(details: &Details, key: &str) -> Option<u64> {
    match details.get(key)? {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
