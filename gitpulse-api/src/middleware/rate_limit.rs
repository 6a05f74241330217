//! Rate Limiting Middleware
//!
//! Per-route, per-client admission control. Every (route, client) pair gets
//! its own fixed quota (10 requests/minute by default); when the window is
//! exceeded the request is rejected with 429 before any cache or upstream
//! work happens. Counters are process-local; there is no cross-node
//! coordination.

use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{clock::DefaultClock, Quota, RateLimiter};

use crate::error::ApiError;

/// Type alias for the rate limiter we use.
type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    DefaultClock,
>;

// ============================================================================
// STATE
// ============================================================================

/// Key for rate limiting - the matched route template plus the client address.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    route: String,
    client: IpAddr,
}

/// State for rate limiting middleware.
#[derive(Clone)]
pub struct RateLimitState {
    /// Whether rate limiting is enabled at all.
    enabled: bool,
    /// Requests per minute allowed per (route, client) pair.
    per_minute: u32,
    /// Per-key rate limiters - uses DashMap for lock-free concurrent access.
    limiters: Arc<DashMap<RateLimitKey, Arc<DirectRateLimiter>>>,
}

impl RateLimitState {
    /// Create new rate limit state.
    pub fn new(enabled: bool, per_minute: u32) -> Self {
        Self {
            enabled,
            per_minute,
            limiters: Arc::new(DashMap::new()),
        }
    }

    /// Get or create a rate limiter for the given key.
    fn get_or_create_limiter(&self, key: &RateLimitKey) -> Arc<DirectRateLimiter> {
        let limiter = self.limiters.entry(key.clone()).or_insert_with(|| {
            let quota =
                Quota::per_minute(NonZeroU32::new(self.per_minute).unwrap_or(NonZeroU32::MIN));
            Arc::new(RateLimiter::direct(quota))
        });

        limiter.clone()
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Error type for rate limit middleware.
pub struct RateLimitError {
    /// Seconds until the rate limit window resets.
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        use axum::http::HeaderValue;

        let error = ApiError::too_many_requests(Some(self.retry_after));
        let status = StatusCode::TOO_MANY_REQUESTS;

        let mut response = (status, axum::Json(error)).into_response();
        let headers = response.headers_mut();
        headers.insert(
            axum::http::header::HeaderName::from_static("retry-after"),
            HeaderValue::from_str(&self.retry_after.to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("60")),
        );

        response
    }
}

// ============================================================================
// CLIENT IDENTITY
// ============================================================================

/// Extract the client IP from the request, considering proxy headers.
fn extract_client_ip(request: &Request) -> IpAddr {
    // Check X-Forwarded-For header first (for proxied requests)
    if let Some(forwarded_for) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        // X-Forwarded-For can contain multiple IPs, take the first one
        if let Some(first_ip) = forwarded_for.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse() {
                return ip;
            }
        }
    }

    // Check X-Real-IP header
    if let Some(real_ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
    {
        if let Ok(ip) = real_ip.trim().parse() {
            return ip;
        }
    }

    // Fall back to the connection address when served with connect info
    if let Some(ConnectInfo(addr)) = request
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
    {
        return addr.ip();
    }

    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

/// Identify the route being limited: the matched route template, so that
/// `/repositories/popular/5` and `/repositories/popular/10` share a window.
fn extract_route(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Rate limiting middleware.
///
/// When rate limited, returns 429 Too Many Requests with a Retry-After
/// header; admitted responses carry an x-ratelimit-limit header.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    use axum::http::HeaderValue;

    // Skip if rate limiting is disabled
    if !state.enabled {
        return Ok(next.run(request).await);
    }

    let key = RateLimitKey {
        route: extract_route(&request),
        client: extract_client_ip(&request),
    };

    let limiter = state.get_or_create_limiter(&key);

    match limiter.check() {
        Ok(_) => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();

            headers.insert(
                axum::http::header::HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from_str(&state.per_minute.to_string())
                    .unwrap_or_else(|_| HeaderValue::from_static("10")),
            );

            Ok(response)
        }
        Err(not_until) => {
            let retry_after = not_until
                .wait_time_from(governor::clock::Clock::now(&DefaultClock::default()))
                .as_secs()
                .max(1); // Minimum 1 second

            tracing::debug!(
                route = %key.route,
                client = %key.client,
                retry_after,
                "request rejected by rate limiter"
            );

            Err(RateLimitError { retry_after })
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
