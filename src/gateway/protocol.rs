//! HTTP API Protocol
//!
//! Public endpoints of the gateway and the JSON bodies they accept and return.

use super::envelope::EntryView;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- API Endpoints ---

pub const ENDPOINT_HEALTH: &str = "/health";
/// Diagnostic probe that performs a backend version check.
pub const ENDPOINT_TEST_CONNECTION: &str = "/test-connection";
pub const ENDPOINT_OBJECTS: &str = "/objects";
pub const ENDPOINT_OBJECT: &str = "/objects/:id";
/// Backend passthrough, no fallback.
pub const ENDPOINT_WORKSPACES: &str = "/workspaces";
/// Backend passthrough, no fallback.
pub const ENDPOINT_APP_VERSION: &str = "/app/version";

pub const SERVICE_NAME: &str = "object-gateway";
pub const DEFAULT_PAGE_LIMIT: usize = 50;

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionStatusResponse {
    /// `"connected"` or `"error"`.
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Paging query for `GET /objects`.
///
/// Kept as raw strings so that junk values fall back to the defaults instead
/// of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListParams {
    /// `(limit, offset)`. A missing, unparsable or zero limit means
    /// [`DEFAULT_PAGE_LIMIT`]; a missing or unparsable offset means 0.
    pub fn page(&self) -> (usize, usize) {
        let limit = parse_count(self.limit.as_deref())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = parse_count(self.offset.as_deref()).unwrap_or(0);
        (limit, offset)
    }
}

fn parse_count(raw: Option<&str>) -> Option<usize> {
    raw?.trim().parse().ok()
}

/// Body of `POST /objects` and `PUT /objects/:id`. Both fields are required.
///
/// Fields are kept as raw JSON and checked for truthiness: absent, `null`,
/// `false`, `0` and `""` all count as missing. Any other value is accepted,
/// non-strings as their JSON text (`123` becomes `"123"`).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EntryPayload {
    pub title: Option<Value>,
    pub content: Option<Value>,
}

impl EntryPayload {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(Value::String(title.into())),
            content: Some(Value::String(content.into())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: String,
    pub id: String,
    /// The removed record when it was deleted from the fallback store;
    /// `null` when the backend performed the delete.
    pub deleted_entry: Option<EntryView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
