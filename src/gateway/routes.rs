use super::error::panic_response;
use super::handlers::*;
use super::protocol::*;
use super::service::Gateway;

use axum::extract::Extension;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

/// The public HTTP surface of the gateway.
pub fn router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route(ENDPOINT_TEST_CONNECTION, get(handle_test_connection))
        .route(
            ENDPOINT_OBJECTS,
            get(handle_list_entries).post(handle_create_entry),
        )
        .route(
            ENDPOINT_OBJECT,
            get(handle_get_entry)
                .put(handle_update_entry)
                .delete(handle_delete_entry),
        )
        .route(ENDPOINT_WORKSPACES, get(handle_workspaces))
        .route(ENDPOINT_APP_VERSION, get(handle_app_version))
        .layer(Extension(gateway))
        .layer(CatchPanicLayer::custom(panic_response))
}
