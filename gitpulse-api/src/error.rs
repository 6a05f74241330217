//! Error Types for the GitPulse API
//!
//! This module defines error handling for the HTTP layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.
//! The conversions from core errors keep retries-exhausted failures
//! distinguishable from cache faults and from client errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use gitpulse_core::{CacheError, ParamsError, UpstreamError};

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur while serving a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Required query parameter is missing
    MissingField,

    /// Request contains invalid input data
    InvalidInput,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// No route matches the requested path
    RouteNotFound,

    // ========================================================================
    // Throttling Errors (429)
    // ========================================================================
    /// Request rate limit exceeded
    TooManyRequests,

    // ========================================================================
    // Upstream Errors (502)
    // ========================================================================
    /// Upstream search failed after all retry attempts
    UpstreamUnavailable,

    /// Upstream returned a payload without the expected shape
    UpstreamInvalid,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// Cached payload could not be decoded
    CacheCorrupted,

    /// Response could not be encoded or written to the cache
    CacheWriteFailed,

    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Validation errors
            ErrorCode::ValidationFailed
            | ErrorCode::MissingField
            | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,

            // Not found errors
            ErrorCode::RouteNotFound => StatusCode::NOT_FOUND,

            // Throttling errors
            ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,

            // Upstream errors
            ErrorCode::UpstreamUnavailable | ErrorCode::UpstreamInvalid => StatusCode::BAD_GATEWAY,

            // Server errors
            ErrorCode::CacheCorrupted
            | ErrorCode::CacheWriteFailed
            | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            // Validation
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidInput => "Invalid input data",

            // Not Found
            ErrorCode::RouteNotFound => "Route not found",

            // Throttling
            ErrorCode::TooManyRequests => "Rate limit exceeded",

            // Upstream
            ErrorCode::UpstreamUnavailable => "Upstream search is unavailable",
            ErrorCode::UpstreamInvalid => "Upstream returned an invalid payload",

            // Server
            ErrorCode::CacheCorrupted => "Cache deserialization error",
            ErrorCode::CacheWriteFailed => "Cache serialization error",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create a ValidationFailed error.
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a RouteNotFound error.
    pub fn route_not_found(path: impl fmt::Display) -> Self {
        Self::new(ErrorCode::RouteNotFound, format!("No route for {}", path))
    }

    /// Create a TooManyRequests error.
    pub fn too_many_requests(retry_after_secs: Option<u64>) -> Self {
        let message = match retry_after_secs {
            Some(secs) => format!("Rate limit exceeded. Retry after {} seconds", secs),
            None => "Rate limit exceeded".to_string(),
        };
        Self::new(ErrorCode::TooManyRequests, message)
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling in
/// Axum, so handlers can return `Result<Json<T>, ApiError>` directly.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM CORE ERRORS
// ============================================================================

/// Convert cache layer failures into API errors.
///
/// Codec failures keep the exact messages clients already depend on; store
/// failures stay generic to avoid leaking connection details.
impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        tracing::error!("Cache error: {:?}", err);

        match err {
            CacheError::Decode { .. } => ApiError::from_code(ErrorCode::CacheCorrupted),
            CacheError::Encode { .. } => ApiError::from_code(ErrorCode::CacheWriteFailed),
            CacheError::Store { .. } => ApiError::internal_error("Cache store operation failed"),
        }
    }
}

/// Convert upstream failures into API errors.
///
/// Retries-exhausted must stay distinguishable from a plain single-attempt
/// failure; both map to 502 but carry different messages, and only the
/// exhausted form is expected to reach this boundary in practice.
impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        tracing::error!("Upstream error: {:?}", err);

        match err {
            UpstreamError::RetriesExhausted { attempts, last } => ApiError::new(
                ErrorCode::UpstreamUnavailable,
                format!("Upstream search failed after {} attempts: {}", attempts, last),
            ),
            UpstreamError::MalformedPayload => ApiError::from_code(ErrorCode::UpstreamInvalid),
            other => ApiError::new(ErrorCode::UpstreamUnavailable, other.to_string()),
        }
    }
}

/// Convert parameter validation failures into API errors.
impl From<ParamsError> for ApiError {
    fn from(err: ParamsError) -> Self {
        ApiError::validation_failed(err.to_string())
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(
            ErrorCode::ValidationFailed.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::MissingField.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::RouteNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::TooManyRequests.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ErrorCode::UpstreamUnavailable.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ErrorCode::CacheCorrupted.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_constructors() {
        let err = ApiError::missing_field("since_date");
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("since_date"));

        let err = ApiError::too_many_requests(Some(30));
        assert_eq!(err.code, ErrorCode::TooManyRequests);
        assert!(err.message.contains("30"));
    }

    #[test]
    fn test_retries_exhausted_stays_distinguishable() {
        let exhausted: ApiError = UpstreamError::RetriesExhausted {
            attempts: 3,
            last: Box::new(UpstreamError::Status { status: 500 }),
        }
        .into();
        let single: ApiError = UpstreamError::Status { status: 500 }.into();

        assert_eq!(exhausted.code, ErrorCode::UpstreamUnavailable);
        assert!(exhausted.message.contains("3 attempts"));
        assert_ne!(exhausted.message, single.message);
    }

    #[test]
    fn test_cache_error_conversions_use_original_messages() {
        let corrupt = serde_json::from_slice::<serde_json::Value>(b"not json").unwrap_err();
        let err: ApiError = CacheError::Decode { source: corrupt }.into();
        assert_eq!(err.code, ErrorCode::CacheCorrupted);
        assert_eq!(err.message, "Cache deserialization error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::validation_failed("page size must be between 1 and 100, got 0");
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("VALIDATION_FAILED"));
        assert!(json.contains("page size"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }
}
