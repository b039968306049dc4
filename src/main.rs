use object_gateway::config::GatewayConfig;
use object_gateway::gateway::routes::router;
use object_gateway::gateway::service::Gateway;
use object_gateway::journal::store::FallbackStore;
use object_gateway::rpc::client::RpcClient;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::load()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let listen_addr = config.listen_addr().await?;

    // 1. Backend connection (built once, shared by every request):
    let backend = RpcClient::from_config(&config.backend)?;
    tracing::info!("Backend gRPC endpoint {}", config.backend.endpoint_url());

    // 2. Fallback store:
    let store = FallbackStore::seeded();
    if config.fallback_enabled {
        tracing::info!("Fallback store enabled ({} seeded entries)", store.len().await);
    } else {
        tracing::info!("Fallback store disabled, backend errors are returned to clients");
    }

    // 3. Translator + HTTP router:
    let gateway = Arc::new(
        Gateway::new(backend, store, config.fallback_enabled)
            .with_object_type_key(config.backend.object_type_key.clone()),
    );
    let app = router(gateway);

    // 4. Start HTTP server:
    tracing::info!("HTTP server listening on {}", listen_addr);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
