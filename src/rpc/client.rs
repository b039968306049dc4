use super::backend::ObjectBackend;
use super::pb;
use super::pb::client_commands_client::ClientCommandsClient;
use super::protocol::*;
use crate::config::BackendConfig;

use async_trait::async_trait;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RpcError {
    /// Could not open a connection (refused, DNS failure, reset).
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    /// Connecting or waiting for the response exceeded the configured bound.
    #[error("backend timed out: {0}")]
    Timeout(String),
    /// The call went through but the backend rejected it, either with a
    /// gRPC status or with a non-zero code in the response's `error` field.
    #[error("backend error {code}: {message}")]
    Backend { code: i64, message: String },
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
    #[error("failed to set up backend connection: {0}")]
    Setup(String),
}

impl RpcError {
    fn from_status(method: &str, status: Status) -> Self {
        match status.code() {
            Code::Unavailable => RpcError::Unreachable(format!("{}: {}", method, status.message())),
            Code::DeadlineExceeded => RpcError::Timeout(format!("{}: {}", method, status.message())),
            code => RpcError::Backend {
                code: i64::from(i32::from(code)),
                message: status.message().to_string(),
            },
        }
    }
}

/// Turns the `error` field every backend response carries into a result.
fn check_response(method: &str, error: Option<pb::ResponseError>) -> Result<(), RpcError> {
    match error {
        Some(err) if err.code != 0 => {
            tracing::debug!("RPC {} rejected: {} {}", method, err.code, err.description);
            Err(RpcError::Backend {
                code: i64::from(err.code),
                message: err.description,
            })
        }
        _ => Ok(()),
    }
}

/// The single outbound connection handle to the backend.
///
/// Built once at startup and shared by every request. The channel connects
/// on first use and reconnects on demand, each attempt bounded by
/// `connect_timeout`. Clones of the generated client share that channel.
pub struct RpcConnection {
    client: ClientCommandsClient<Channel>,
    endpoint: String,
    request_timeout: Duration,
}

impl RpcConnection {
    pub fn new(config: &BackendConfig) -> Result<Arc<Self>, RpcError> {
        let endpoint = config.endpoint_url();
        let channel = Endpoint::from_shared(endpoint.clone())
            .map_err(|e| RpcError::Setup(format!("{}: {}", endpoint, e)))?
            .connect_timeout(config.connect_timeout)
            .connect_lazy();

        Ok(Arc::new(Self {
            client: ClientCommandsClient::new(channel),
            endpoint,
            request_timeout: config.request_timeout,
        }))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn client(&self) -> ClientCommandsClient<Channel> {
        self.client.clone()
    }

    /// Awaits one unary call, bounded by the request timeout. No retry.
    async fn call<T, F>(&self, method: &str, call: F) -> Result<T, RpcError>
    where
        F: Future<Output = Result<tonic::Response<T>, Status>>,
    {
        tracing::debug!("RPC {} -> {}", method, self.endpoint);

        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(Ok(response)) => Ok(response.into_inner()),
            Ok(Err(status)) => Err(RpcError::from_status(method, status)),
            Err(_) => Err(RpcError::Timeout(format!(
                "{}: no response within {:?}",
                method, self.request_timeout
            ))),
        }
    }
}

/// Typed wrappers over the backend methods the gateway uses.
pub struct RpcClient {
    connection: Arc<RpcConnection>,
    space_id: String,
}

impl RpcClient {
    pub fn new(connection: Arc<RpcConnection>, space_id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            connection,
            space_id: space_id.into(),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Arc<Self>, RpcError> {
        let connection = RpcConnection::new(config)?;
        Ok(Self::new(connection, config.space_id.clone()))
    }
}

#[async_trait]
impl ObjectBackend for RpcClient {
    async fn test_connection(&self) -> Result<Value, RpcError> {
        let mut client = self.connection.client();
        let response = self
            .connection
            .call(
                METHOD_APP_GET_VERSION,
                client.app_get_version(pb::AppGetVersionRequest {}),
            )
            .await?;
        check_response(METHOD_APP_GET_VERSION, response.error)?;

        Ok(json!({
            "version": response.version,
            "details": response.details,
        }))
    }

    async fn search_objects(
        &self,
        filters: Vec<SearchFilter>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ObjectRecord>, RpcError> {
        let request = pb::ObjectSearchRequest {
            space_id: self.space_id.clone(),
            filters: filters.into_iter().map(Into::into).collect(),
            limit: i32::try_from(limit).unwrap_or(i32::MAX),
            offset: i32::try_from(offset).unwrap_or(i32::MAX),
            ..Default::default()
        };

        let mut client = self.connection.client();
        let response = self
            .connection
            .call(METHOD_OBJECT_SEARCH, client.object_search(request))
            .await?;
        check_response(METHOD_OBJECT_SEARCH, response.error)?;

        Ok(response
            .records
            .into_iter()
            .map(ObjectRecord::from_search_record)
            .collect())
    }

    async fn create_object(
        &self,
        type_key: &str,
        details: Details,
        template_id: &str,
    ) -> Result<ObjectRecord, RpcError> {
        let request = pb::ObjectCreateRequest {
            details: Some(struct_from_details(&details)),
            template_id: template_id.to_string(),
            space_id: self.space_id.clone(),
            object_type_unique_key: type_key.to_string(),
        };

        let mut client = self.connection.client();
        let response = self
            .connection
            .call(METHOD_OBJECT_CREATE, client.object_create(request))
            .await?;
        check_response(METHOD_OBJECT_CREATE, response.error)?;

        if response.object_id.is_empty() {
            return Err(RpcError::MalformedResponse(format!(
                "{}: response carries no objectId",
                METHOD_OBJECT_CREATE
            )));
        }

        Ok(ObjectRecord {
            object_id: response.object_id,
            details: response.details.map(details_from_struct).unwrap_or(details),
        })
    }

    async fn open_object(&self, object_id: &str) -> Result<ObjectRecord, RpcError> {
        let request = pb::ObjectOpenRequest {
            context_id: object_id.to_string(),
            object_id: object_id.to_string(),
            space_id: self.space_id.clone(),
        };

        let mut client = self.connection.client();
        let response = self
            .connection
            .call(METHOD_OBJECT_OPEN, client.object_open(request))
            .await?;
        check_response(METHOD_OBJECT_OPEN, response.error)?;

        // The view lists details for the object and its dependencies; the
        // object's own entry is the one matching the requested id.
        let details = response
            .object_view
            .and_then(|view| view.details.into_iter().find(|entry| entry.id == object_id))
            .ok_or_else(|| {
                RpcError::MalformedResponse(format!(
                    "{}: response carries no details for {}",
                    METHOD_OBJECT_OPEN, object_id
                ))
            })?;

        Ok(ObjectRecord {
            object_id: object_id.to_string(),
            details: details.details.map(details_from_struct).unwrap_or_default(),
        })
    }

    async fn update_object(&self, object_id: &str, details: Details) -> Result<(), RpcError> {
        let request = pb::ObjectSetDetailsRequest {
            context_id: object_id.to_string(),
            details: detail_assignments(&details),
        };

        let mut client = self.connection.client();
        let response = self
            .connection
            .call(METHOD_OBJECT_SET_DETAILS, client.object_set_details(request))
            .await?;
        check_response(METHOD_OBJECT_SET_DETAILS, response.error)
    }

    async fn delete_objects(&self, object_ids: Vec<String>) -> Result<(), RpcError> {
        let request = pb::ObjectListDeleteRequest { object_ids };

        let mut client = self.connection.client();
        let response = self
            .connection
            .call(METHOD_OBJECT_LIST_DELETE, client.object_list_delete(request))
            .await?;
        check_response(METHOD_OBJECT_LIST_DELETE, response.error)
    }

    async fn list_workspaces(&self) -> Result<Value, RpcError> {
        let mut client = self.connection.client();
        let response = self
            .connection
            .call(
                METHOD_WORKSPACE_GET_ALL,
                client.workspace_get_all(pb::WorkspaceGetAllRequest {}),
            )
            .await?;
        check_response(METHOD_WORKSPACE_GET_ALL, response.error)?;

        Ok(json!({ "workspaceIds": response.workspace_ids }))
    }
}
