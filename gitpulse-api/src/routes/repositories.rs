//! Repository REST API Routes
//!
//! The two proxy endpoints over the upstream repository search:
//! - `GET /repositories/popular/{top_n}` - top repositories by stars
//! - `GET /repositories/popular?since_date=..` - popular repositories
//!   created since a date, optionally filtered by language
//!
//! Both validate their arguments before any cache or network work, run the
//! upstream fetch through the cache wrapper under an explicit logical
//! operation name, and return the upstream payload's `items` array verbatim.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{OriginalUri, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use gitpulse_core::{cached, extract_items, CacheOp, CacheStore, SearchClient, SearchParams};

use crate::error::{ApiError, ApiResult};

// ============================================================================
// ROUTE CONSTANTS
// ============================================================================

/// Search expression for the "top repositories" route.
const POPULAR_QUERY: &str = "stars:>=1";

/// Cache TTL for `GET /repositories/popular/{top_n}`.
pub const TOP_REPOSITORIES_TTL: Duration = Duration::from_secs(300);

/// Cache TTL for `GET /repositories/popular`.
pub const SINCE_REPOSITORIES_TTL: Duration = Duration::from_secs(120);

/// Page size applied when the since-date route omits `top_n`.
const DEFAULT_SINCE_PAGE_SIZE: u32 = 100;

// ============================================================================
// STATE
// ============================================================================

/// Shared state for the repository routes.
#[derive(Clone)]
pub struct RepositoriesState {
    pub search: Arc<SearchClient>,
    pub cache: Arc<dyn CacheStore>,
}

impl RepositoriesState {
    pub fn new(search: Arc<SearchClient>, cache: Arc<dyn CacheStore>) -> Self {
        Self { search, cache }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /repositories/popular/{top_n} - Top repositories by star count
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/repositories/popular/{top_n}",
    tag = "Repositories",
    params(
        ("top_n" = u32, Path, description = "Number of top repositories to fetch (1-100)"),
    ),
    responses(
        (status = 200, description = "Repository items ordered by stars descending", body = Object),
        (status = 400, description = "Invalid top_n", body = ApiError),
        (status = 429, description = "Rate limit exceeded", body = ApiError),
        (status = 502, description = "Upstream search unavailable", body = ApiError),
    ),
))]
pub async fn get_top_repositories(
    State(state): State<Arc<RepositoriesState>>,
    OriginalUri(uri): OriginalUri,
    Path(top_n): Path<String>,
    Query(raw_query): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let top_n: u32 = top_n
        .parse()
        .map_err(|_| ApiError::invalid_input("top_n must be an integer"))?;
    let params = SearchParams::new(POPULAR_QUERY, top_n)?;

    let op = CacheOp {
        name: "get_top_repositories",
        path: uri.path(),
        params: &raw_query,
    };

    let search = &state.search;
    let params = &params;
    let items = cached(
        state.cache.as_ref(),
        op,
        TOP_REPOSITORIES_TTL,
        move || async move {
            let payload = search.search_repositories(params).await?;
            Ok::<_, ApiError>(extract_items(payload)?)
        },
    )
    .await?;

    Ok(Json(items))
}

/// GET /repositories/popular - Popular repositories created since a date
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/repositories/popular",
    tag = "Repositories",
    params(
        ("since_date" = String, Query, description = "Creation-date lower bound, e.g. 2023-06-01"),
        ("language" = Option<String>, Query, description = "Optional language filter"),
        ("top_n" = Option<u32>, Query, description = "Page size (1-100, default 100)"),
    ),
    responses(
        (status = 200, description = "Repository items ordered by stars descending", body = Object),
        (status = 400, description = "Missing or invalid query parameters", body = ApiError),
        (status = 429, description = "Rate limit exceeded", body = ApiError),
        (status = 502, description = "Upstream search unavailable", body = ApiError),
    ),
))]
pub async fn get_repositories_since(
    State(state): State<Arc<RepositoriesState>>,
    OriginalUri(uri): OriginalUri,
    Query(raw_query): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let since_date = raw_query
        .get("since_date")
        .ok_or_else(|| ApiError::missing_field("since_date"))?;
    let language = raw_query.get("language").filter(|l| !l.is_empty());
    let top_n = match raw_query.get("top_n") {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ApiError::invalid_input("top_n must be an integer"))?,
        None => DEFAULT_SINCE_PAGE_SIZE,
    };

    // The date is forwarded to the upstream as-is; its format is not
    // validated here.
    let mut search_query = format!("created:>{since_date}");
    if let Some(language) = language {
        search_query.push_str(&format!(" language:{language}"));
    }
    let params = SearchParams::new(search_query, top_n)?;

    let op = CacheOp {
        name: "get_repositories_since",
        path: uri.path(),
        params: &raw_query,
    };

    let search = &state.search;
    let params = &params;
    let items = cached(
        state.cache.as_ref(),
        op,
        SINCE_REPOSITORIES_TTL,
        move || async move {
            let payload = search.search_repositories(params).await?;
            Ok::<_, ApiError>(extract_items(payload)?)
        },
    )
    .await?;

    Ok(Json(items))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the repository routes router.
pub fn create_router(state: Arc<RepositoriesState>) -> Router {
    Router::new()
        .route("/popular/:top_n", get(get_top_repositories))
        .route("/popular", get(get_repositories_since))
        .with_state(state)
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

    /// A client pointed at a closed port: any attempted fetch fails fast, so
    /// a non-502 response proves validation rejected the request before any
    /// network call.
    fn test_app() -> Router {
        let search = Arc::new(
            SearchClient::new("http://127.0.0.1:9", RetryPolicy::immediate(1)).unwrap(),
        );
        let cache: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        let state = Arc::new(RepositoriesState::new(search, cache));

        Router::new().nest("/repositories", create_router(state))
    }

    async fn status_of(path: &str) -> StatusCode {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        test_app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_non_integer_top_n_is_rejected() {
        assert_eq!(
            status_of("/repositories/popular/ten").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_zero_top_n_is_rejected() {
        assert_eq!(
            status_of("/repositories/popular/0").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_oversized_top_n_is_rejected() {
        assert_eq!(
            status_of("/repositories/popular/500").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_missing_since_date_is_rejected() {
        assert_eq!(
            status_of("/repositories/popular").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_non_integer_page_size_is_rejected() {
        assert_eq!(
            status_of("/repositories/popular?since_date=2023-06-01&top_n=lots").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_ttl_constants_match_route_contract() {
        assert_eq!(TOP_REPOSITORIES_TTL, Duration::from_secs(300));
        assert_eq!(SINCE_REPOSITORIES_TTL, Duration::from_secs(120));
    }
}
