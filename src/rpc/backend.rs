use super::client::RpcError;
use super::protocol::{Details, ObjectRecord, SearchFilter};

use async_trait::async_trait;
use serde_json::Value;

/// The operations the gateway needs from the backend service.
///
/// Each method maps to exactly one backend call and never retries; the
/// caller decides what to do on failure.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Version check used as a liveness probe. Returns the backend's raw response.
    async fn test_connection(&self) -> Result<Value, RpcError>;

    async fn search_objects(
        &self,
        filters: Vec<SearchFilter>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ObjectRecord>, RpcError>;

    async fn create_object(
        &self,
        type_key: &str,
        details: Details,
        template_id: &str,
    ) -> Result<ObjectRecord, RpcError>;

    async fn open_object(&self, object_id: &str) -> Result<ObjectRecord, RpcError>;

    /// Sets the given details. The backend does not echo the updated object.
    async fn update_object(&self, object_id: &str, details: Details) -> Result<(), RpcError>;

    async fn delete_objects(&self, object_ids: Vec<String>) -> Result<(), RpcError>;

    async fn list_workspaces(&self) -> Result<Value, RpcError>;
}
