//! Error types for GitPulse core operations

use thiserror::Error;

/// Cache layer errors.
///
/// `Decode` and `Encode` are codec failures and are fatal for the request
/// that hit them; callers must not fall back to a cacheless path.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store operation failed: {reason}")]
    Store { reason: String },

    #[error("cached payload could not be decoded: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("response could not be encoded for caching: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    pub fn store(reason: impl Into<String>) -> Self {
        CacheError::Store {
            reason: reason.into(),
        }
    }
}

/// Upstream search API errors.
///
/// `Status` and `Transport` are per-attempt failures and are absorbed by the
/// retry loop; only `RetriesExhausted` and `MalformedPayload` reach callers.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed with status {status}")]
    Status { status: u16 },

    #[error("upstream transport error: {reason}")]
    Transport { reason: String },

    #[error("upstream payload is missing the 'items' field")]
    MalformedPayload,

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<UpstreamError>,
    },
}

/// Search parameter validation errors, raised before any network call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("search query must not be empty")]
    EmptyQuery,

    #[error("page size must be between 1 and 100, got {got}")]
    PageSizeOutOfRange { got: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_preserves_last_error() {
        let err = UpstreamError::RetriesExhausted {
            attempts: 3,
            last: Box::new(UpstreamError::Status { status: 502 }),
        };

        let display = err.to_string();
        assert!(display.contains("3 attempts"));
        assert!(display.contains("status 502"));
    }

    #[test]
    fn test_params_error_messages() {
        assert_eq!(
            ParamsError::EmptyQuery.to_string(),
            "search query must not be empty"
        );
        assert!(ParamsError::PageSizeOutOfRange { got: 500 }
            .to_string()
            .contains("500"));
    }
}
