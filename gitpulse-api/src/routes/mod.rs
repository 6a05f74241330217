//! REST API Routes Module
//!
//! Route handlers plus the router builder that assembles the full HTTP
//! surface:
//! - Repository proxy endpoints under /repositories
//! - Health check endpoints under /health
//! - OpenAPI spec and Swagger UI (feature-gated)
//! - Fully permissive CORS (mirrored origin, credentials allowed)
//! - Per-route rate limiting applied globally

pub mod health;
pub mod repositories;

use std::sync::Arc;

use axum::{
    extract::OriginalUri,
    middleware::from_fn_with_state,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use gitpulse_core::{CacheStore, SearchClient};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::middleware::{rate_limit_middleware, RateLimitState};
use repositories::RepositoriesState;

// Re-export route creation functions for convenience
pub use health::create_router as health_router;
pub use repositories::create_router as repositories_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
///
/// Only wired up directly when the Swagger UI (which serves the spec itself)
/// is disabled.
#[cfg(all(feature = "openapi", not(feature = "swagger-ui")))]
async fn openapi_json() -> impl axum::response::IntoResponse {
    use utoipa::OpenApi;

    axum::Json(crate::openapi::ApiDoc::openapi())
}

// ============================================================================
// FALLBACK
// ============================================================================

/// Structured 404 for unknown routes.
async fn fallback_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::route_not_found(uri.path())
}

// ============================================================================
// ROUTER BUILDER
// ============================================================================

/// Create the complete API router.
///
/// # Middleware Order (outer to inner)
/// 1. CORS (outermost) - handles preflight requests
/// 2. Trace - request/response logging
/// 3. Rate Limiting - rejects floods before any cache or upstream work
pub fn create_api_router(
    search: Arc<SearchClient>,
    cache: Arc<dyn CacheStore>,
    config: &AppConfig,
) -> Router {
    let repositories_state = Arc::new(RepositoriesState::new(search, cache.clone()));
    let rate_limit_state =
        RateLimitState::new(config.rate_limit_enabled, config.rate_limit_per_minute);

    #[allow(unused_mut)]
    let mut router = Router::new()
        .nest("/repositories", repositories::create_router(repositories_state))
        .nest("/health", health::create_router(cache))
        .fallback(fallback_not_found);

    #[cfg(all(feature = "openapi", not(feature = "swagger-ui")))]
    {
        router = router.route("/openapi.json", axum::routing::get(openapi_json));
    }

    // Swagger UI serves /openapi.json itself
    #[cfg(feature = "swagger-ui")]
    {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        router = router.merge(
            SwaggerUi::new("/swagger-ui").url("/openapi.json", crate::openapi::ApiDoc::openapi()),
        );
    }

    router
        .layer(from_fn_with_state(rate_limit_state, rate_limit_middleware))
        .layer(TraceLayer::new_for_http())
        // Mirrors the request origin so credentialed cross-origin calls work
        // with the allow-everything policy.
        .layer(CorsLayer::very_permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use gitpulse_core::{MemoryStore, RetryPolicy};
    use tower::ServiceExt; // for `oneshot`

    fn test_router() -> Router {
        let search = Arc::new(
            SearchClient::new("http://127.0.0.1:9", RetryPolicy::immediate(1)).unwrap(),
        );
        let cache: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        create_api_router(search, cache, &AppConfig::default())
    }

    #[tokio::test]
    async fn test_unknown_route_returns_structured_404() {
        let app = test_router();

        let request = Request::builder()
            .uri("/invalid-url")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, crate::error::ErrorCode::RouteNotFound);
    }

    #[tokio::test]
    async fn test_health_ping_is_routed() {
        let app = test_router();

        let request = Request::builder()
            .uri("/health/ping")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
