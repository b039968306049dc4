use super::envelope::EntryView;
use super::error::GatewayError;
use super::protocol::*;
use super::service::Gateway;

use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use std::sync::Arc;

pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

pub async fn handle_test_connection(
    Extension(gateway): Extension<Arc<Gateway>>,
) -> (StatusCode, Json<ConnectionStatusResponse>) {
    match gateway.test_connection().await {
        Ok(data) => (
            StatusCode::OK,
            Json(ConnectionStatusResponse {
                status: "connected".to_string(),
                message: "Backend reachable".to_string(),
                data: Some(data),
            }),
        ),
        Err(e) => {
            tracing::warn!("Connection test failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ConnectionStatusResponse {
                    status: "error".to_string(),
                    message: e.to_string(),
                    data: None,
                }),
            )
        }
    }
}

pub async fn handle_list_entries(
    Extension(gateway): Extension<Arc<Gateway>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<EntryView>>, GatewayError> {
    let (limit, offset) = params.page();
    let entries = gateway.list_entries(limit, offset).await?;
    Ok(Json(entries))
}

// A missing or undecodable body is treated as an empty payload so that it
// gets the same 400 as a payload with empty fields.
pub async fn handle_create_entry(
    Extension(gateway): Extension<Arc<Gateway>>,
    payload: Option<Json<EntryPayload>>,
) -> Result<(StatusCode, Json<EntryView>), GatewayError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let entry = gateway.create_entry(payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn handle_get_entry(
    Extension(gateway): Extension<Arc<Gateway>>,
    Path(id): Path<String>,
) -> Result<Json<EntryView>, GatewayError> {
    Ok(Json(gateway.get_entry(&id).await?))
}

pub async fn handle_update_entry(
    Extension(gateway): Extension<Arc<Gateway>>,
    Path(id): Path<String>,
    payload: Option<Json<EntryPayload>>,
) -> Result<Json<EntryView>, GatewayError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    Ok(Json(gateway.update_entry(&id, payload).await?))
}

pub async fn handle_delete_entry(
    Extension(gateway): Extension<Arc<Gateway>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, GatewayError> {
    Ok(Json(gateway.delete_entry(&id).await?))
}

pub async fn handle_workspaces(
    Extension(gateway): Extension<Arc<Gateway>>,
) -> Result<Json<Value>, GatewayError> {
    Ok(Json(gateway.workspaces().await?))
}

pub async fn handle_app_version(
    Extension(gateway): Extension<Arc<Gateway>>,
) -> Result<Json<Value>, GatewayError> {
    Ok(Json(gateway.app_version().await?))
}
