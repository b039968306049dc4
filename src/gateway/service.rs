use super::envelope::{EntryView, entry_details, project_record};
use super::error::GatewayError;
use super::protocol::{DeleteResponse, EntryPayload};
use crate::journal::store::FallbackStore;
use crate::journal::types::{EntryPatch, now_ms};
use crate::rpc::backend::ObjectBackend;
use crate::rpc::client::RpcError;
use crate::rpc::protocol::ObjectRecord;

use serde_json::Value;
use std::sync::Arc;

const MSG_DELETED: &str = "Entry deleted successfully";

/// Translates entry operations into backend calls, falling back to the local
/// store when a call fails.
///
/// Every operation tries the backend exactly once. There is no memory of
/// earlier failures, so a backend that comes back is used again immediately.
pub struct Gateway {
    backend: Arc<dyn ObjectBackend>,
    store: Arc<FallbackStore>,
    fallback_enabled: bool,
    object_type_key: String,
}

impl Gateway {
    pub fn new(
        backend: Arc<dyn ObjectBackend>,
        store: Arc<FallbackStore>,
        fallback_enabled: bool,
    ) -> Self {
        Self {
            backend,
            store,
            fallback_enabled,
            object_type_key: String::new(),
        }
    }

    /// Object type key passed to the backend on create.
    pub fn with_object_type_key(mut self, type_key: impl Into<String>) -> Self {
        self.object_type_key = type_key.into();
        self
    }

    /// Decides whether a failed backend call may be served from the store.
    fn fall_back(&self, operation: &str, err: RpcError) -> Result<(), GatewayError> {
        if self.fallback_enabled {
            tracing::warn!("{}: backend failed, using fallback store: {}", operation, err);
            Ok(())
        } else {
            Err(GatewayError::Backend(err))
        }
    }

    pub async fn list_entries(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<EntryView>, GatewayError> {
        match self.backend.search_objects(Vec::new(), limit, offset).await {
            Ok(records) => {
                tracing::debug!("list: {} records from backend", records.len());
                let now = now_ms();
                Ok(records
                    .iter()
                    .map(|record| project_record(record, now))
                    .collect())
            }
            Err(err) => {
                self.fall_back("list", err)?;
                Ok(self
                    .store
                    .list(limit, offset)
                    .await
                    .into_iter()
                    .map(EntryView::from)
                    .collect())
            }
        }
    }

    pub async fn create_entry(&self, payload: EntryPayload) -> Result<EntryView, GatewayError> {
        let (title, content) = required_fields(payload)?;

        match self
            .backend
            .create_object(&self.object_type_key, entry_details(&title, &content), "")
            .await
        {
            Ok(record) => {
                tracing::info!("create: object {} created on backend", record.object_id);
                Ok(EntryView {
                    id: record.object_id,
                    title,
                    content,
                    created_at: now_ms(),
                    updated_at: None,
                })
            }
            Err(err) => {
                self.fall_back("create", err)?;
                Ok(self.store.append(title, content).await.into())
            }
        }
    }

    pub async fn get_entry(&self, id: &str) -> Result<EntryView, GatewayError> {
        match self.backend.open_object(id).await {
            Ok(record) => Ok(project_record(&record, now_ms())),
            Err(err) => {
                self.fall_back("get", err)?;
                self.store
                    .get(id)
                    .await
                    .map(EntryView::from)
                    .ok_or_else(GatewayError::entry_not_found)
            }
        }
    }

    pub async fn update_entry(
        &self,
        id: &str,
        payload: EntryPayload,
    ) -> Result<EntryView, GatewayError> {
        let (title, content) = required_fields(payload)?;
        let requested = entry_details(&title, &content);

        match self.backend.update_object(id, requested.clone()).await {
            Ok(()) => {
                let now = now_ms();
                let mut view = project_record(
                    &ObjectRecord {
                        object_id: id.to_string(),
                        details: requested,
                    },
                    now,
                );
                view.updated_at = Some(now);
                Ok(view)
            }
            Err(err) => {
                self.fall_back("update", err)?;
                let patch = EntryPatch {
                    title: Some(title),
                    content: Some(content),
                };
                self.store
                    .update(id, patch)
                    .await
                    .map(EntryView::from)
                    .ok_or_else(GatewayError::entry_not_found)
            }
        }
    }

    pub async fn delete_entry(&self, id: &str) -> Result<DeleteResponse, GatewayError> {
        match self.backend.delete_objects(vec![id.to_string()]).await {
            Ok(()) => Ok(DeleteResponse {
                message: MSG_DELETED.to_string(),
                id: id.to_string(),
                deleted_entry: None,
            }),
            Err(err) => {
                self.fall_back("delete", err)?;
                let removed = self
                    .store
                    .remove(id)
                    .await
                    .ok_or_else(GatewayError::entry_not_found)?;
                Ok(DeleteResponse {
                    message: MSG_DELETED.to_string(),
                    id: id.to_string(),
                    deleted_entry: Some(removed.into()),
                })
            }
        }
    }

    /// Backend version check. The error is returned as-is so the caller can
    /// report it without consulting the store.
    pub async fn test_connection(&self) -> Result<Value, RpcError> {
        self.backend.test_connection().await
    }

    pub async fn app_version(&self) -> Result<Value, GatewayError> {
        Ok(self.backend.test_connection().await?)
    }

    pub async fn workspaces(&self) -> Result<Value, GatewayError> {
        Ok(self.backend.list_workspaces().await?)
    }
}

/// Extracts `title` and `content` or rejects the request when either is
/// missing or falsy.
fn required_fields(payload: EntryPayload) -> Result<(String, String), GatewayError> {
    match (field_text(payload.title), field_text(payload.content)) {
        (Some(title), Some(content)) => Ok((title, content)),
        _ => Err(GatewayError::fields_required()),
    }
}

fn field_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) => Some(text).filter(|text| !text.is_empty()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
