//! GitHub repository-search client.
//!
//! A narrow client for `GET /search/repositories` against a fixed base URL.
//! Each call issues one HTTP GET per attempt under the retry policy; any
//! non-200 status and any transport failure are retryable. Parameter
//! validation happens in [`SearchParams::new`], before any network call.

use serde_json::Value;

use crate::error::{ParamsError, UpstreamError};
use crate::retry::{retry, RetryPolicy};

/// Default upstream base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Repository search endpoint, relative to the base URL.
const SEARCH_REPOSITORIES: &str = "search/repositories";

/// GitHub caps `per_page` at 100.
const MAX_PAGE_SIZE: u32 = 100;

/// GitHub rejects requests without a User-Agent.
const USER_AGENT: &str = concat!("gitpulse/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SEARCH PARAMETERS
// ============================================================================

/// Validated parameters for a repository search.
///
/// The rendered query string always carries the fixed shape
/// `q`, `sort=stars`, `order=desc`, `per_page`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    query: String,
    per_page: u32,
}

impl SearchParams {
    /// Validate and build search parameters.
    pub fn new(query: impl Into<String>, per_page: u32) -> Result<Self, ParamsError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(ParamsError::EmptyQuery);
        }
        if per_page == 0 || per_page > MAX_PAGE_SIZE {
            return Err(ParamsError::PageSizeOutOfRange { got: per_page });
        }

        Ok(Self { query, per_page })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Render the query-string pairs for the search endpoint.
    pub fn as_query(&self) -> [(&'static str, String); 4] {
        [
            ("q", self.query.clone()),
            ("sort", "stars".to_string()),
            ("order", "desc".to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

// ============================================================================
// SEARCH CLIENT
// ============================================================================

/// HTTP client for the upstream search API with bounded retries.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl SearchClient {
    /// Build a client against `base_url` with the given retry policy.
    pub fn new(base_url: impl Into<String>, retry: RetryPolicy) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| UpstreamError::Transport {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    /// Search repositories, retrying failed attempts per the policy.
    ///
    /// Returns the raw upstream JSON payload. Callers that only want the
    /// result list should pass it through [`extract_items`].
    pub async fn search_repositories(&self, params: &SearchParams) -> Result<Value, UpstreamError> {
        retry(&self.retry, |attempt| {
            self.attempt(SEARCH_REPOSITORIES, params, attempt)
        })
        .await
    }

    /// One GET attempt. Non-200 statuses are reported as retryable failures.
    async fn attempt(
        &self,
        endpoint: &str,
        params: &SearchParams,
        attempt: u32,
    ) -> Result<Value, UpstreamError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, attempt, "fetching upstream search results");

        let response = self
            .http
            .get(&url)
            .query(&params.as_query())
            .send()
            .await
            .map_err(|e| UpstreamError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| UpstreamError::Transport {
            reason: e.to_string(),
        })
    }
}

/// Extract the `items` array from an upstream search payload.
pub fn extract_items(mut payload: Value) -> Result<Value, UpstreamError> {
    match payload.get_mut("items") {
        Some(items) => Ok(items.take()),
        None => Err(UpstreamError::MalformedPayload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_render_fixed_shape() {
        let params = SearchParams::new("stars:>=1", 10).unwrap();

        assert_eq!(
            params.as_query(),
            [
                ("q", "stars:>=1".to_string()),
                ("sort", "stars".to_string()),
                ("order", "desc".to_string()),
                ("per_page", "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_reject_empty_query() {
        assert_eq!(
            SearchParams::new("", 10).unwrap_err(),
            ParamsError::EmptyQuery
        );
        assert_eq!(
            SearchParams::new("   ", 10).unwrap_err(),
            ParamsError::EmptyQuery
        );
    }

    #[test]
    fn test_params_reject_out_of_range_page_size() {
        assert_eq!(
            SearchParams::new("stars:>=1", 0).unwrap_err(),
            ParamsError::PageSizeOutOfRange { got: 0 }
        );
        assert_eq!(
            SearchParams::new("stars:>=1", 101).unwrap_err(),
            ParamsError::PageSizeOutOfRange { got: 101 }
        );
        assert!(SearchParams::new("stars:>=1", 100).is_ok());
    }

    #[test]
    fn test_extract_items() {
        let payload = json!({"total_count": 2, "items": [{"name": "a"}, {"name": "b"}]});
        let items = extract_items(payload).unwrap();
        assert_eq!(items, json!([{"name": "a"}, {"name": "b"}]));
    }

    #[test]
    fn test_extract_items_missing_field() {
        let payload = json!({"total_count": 0});
        assert!(matches!(
            extract_items(payload).unwrap_err(),
            UpstreamError::MalformedPayload
        ));
    }

    #[tokio::test]
    async fn test_search_returns_upstream_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search/repositories")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("q".into(), "stars:>=1".into()),
                mockito::Matcher::UrlEncoded("sort".into(), "stars".into()),
                mockito::Matcher::UrlEncoded("order".into(), "desc".into()),
                mockito::Matcher::UrlEncoded("per_page".into(), "5".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": [{"name": "octocat"}]}"#)
            .create_async()
            .await;

        let client = SearchClient::new(server.url(), RetryPolicy::immediate(3)).unwrap();
        let params = SearchParams::new("stars:>=1", 5).unwrap();
        let payload = client.search_repositories(&params).await.unwrap();

        assert_eq!(payload["items"][0]["name"], "octocat");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_200_exhausts_all_attempts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search/repositories")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .expect(3)
            .create_async()
            .await;

        let client = SearchClient::new(server.url(), RetryPolicy::immediate(3)).unwrap();
        let params = SearchParams::new("stars:>=1", 5).unwrap();
        let err = client.search_repositories(&params).await.unwrap_err();

        match err {
            UpstreamError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, UpstreamError::Status { status: 403 }));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        mock.assert_async().await;
    }
}
