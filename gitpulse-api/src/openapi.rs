//! OpenAPI Documentation
//!
//! Aggregates the route annotations and schemas into a single OpenAPI
//! document served at /openapi.json.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GitPulse API",
        description = "Cached, rate-limited HTTP proxy over the GitHub repository-search API",
    ),
    paths(
        crate::routes::repositories::get_top_repositories,
        crate::routes::repositories::get_repositories_since,
        crate::routes::health::ping,
        crate::routes::health::liveness,
        crate::routes::health::readiness,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        HealthResponse,
        HealthStatus,
        HealthDetails,
        ComponentHealth,
    )),
    tags(
        (name = "Repositories", description = "Repository search proxy endpoints"),
        (name = "Health", description = "Service health endpoints"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();

        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/repositories/popular/{top_n}".to_string()));
        assert!(paths.contains(&"/repositories/popular".to_string()));
        assert!(paths.contains(&"/health/ready".to_string()));
    }
}
