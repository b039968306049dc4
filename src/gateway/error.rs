use super::protocol::ErrorResponse;
use crate::rpc::client::RpcError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::any::Any;
use thiserror::Error;

pub const MSG_FIELDS_REQUIRED: &str = "Title and content are required";
pub const MSG_ENTRY_NOT_FOUND: &str = "Entry not found";
pub const MSG_INTERNAL: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Required input missing or empty. Raised before the backend or store is touched.
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    /// Backend failure on a path with no fallback, or with fallback disabled.
    #[error(transparent)]
    Backend(#[from] RpcError),
    /// A handler panicked. The cause is logged, not returned.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn fields_required() -> Self {
        GatewayError::InvalidInput(MSG_FIELDS_REQUIRED.to_string())
    }

    pub fn entry_not_found() -> Self {
        GatewayError::NotFound(MSG_ENTRY_NOT_FOUND.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Backend(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Response for a request whose handler panicked. Installed on the router
/// through `CatchPanicLayer` so the client gets `500 {error}` instead of a
/// dropped connection.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let cause = if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else {
        "unknown panic payload"
    };
    tracing::error!("Handler panicked: {}", cause);

    GatewayError::Internal(MSG_INTERNAL.to_string()).into_response()
}
