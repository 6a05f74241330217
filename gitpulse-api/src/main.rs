//! GitPulse API Server Entry Point
//!
//! Bootstraps configuration, connects the Redis cache store, and starts the
//! Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use gitpulse_api::telemetry::init_tracing;
use gitpulse_api::{create_api_router, ApiError, ApiResult, AppConfig};
use gitpulse_core::{CacheStore, RedisStore, RetryPolicy, SearchClient};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing();

    let config = AppConfig::from_env();

    let cache: Arc<dyn CacheStore> = Arc::new(
        RedisStore::connect(&config.redis_url())
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to connect to Redis: {}", e)))?,
    );
    tracing::info!(store = "redis", "Cache store connected");

    let search = Arc::new(
        SearchClient::new(config.github_base_url.clone(), RetryPolicy::default()).map_err(
            |e| ApiError::internal_error(format!("Failed to build search client: {}", e)),
        )?,
    );

    let app = create_api_router(search, cache, &config);

    let addr = config.bind_addr()?;
    tracing::info!(%addr, "Starting GitPulse API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
