//! Structured API error handling for the Stacklens API.
//!
//! Every error variant carries a correlation ID that links the failure to
//! its request trace. Callers always receive either a complete envelope or
//! an explicit error response - there is no silent truncation and no
//! partial envelope: if any store query behind a search fails, the whole
//! request fails.
//!
//! Malformed query parameters are NOT errors; the search routes coerce them
//! to defaults before the engine ever sees them.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use stacklens_common::CorrelationId;
use stacklens_search::SearchError;
use thiserror::Error;
use tracing::{error, warn};

/// Structured API error types with correlation IDs for request tracking
#[derive(Debug, Error)]
pub enum ApiError {
    /// A store query behind the search failed.
    ///
    /// Fatal for the request: no partial envelope is returned, and this
    /// core does not retry (retry policy belongs to the transport layer).
    #[error("Search failed (correlation: {correlation_id})")]
    SearchFailed { correlation_id: CorrelationId },

    /// The store is unreachable or the request timed out.
    ///
    /// Clients should back off and retry after the indicated delay.
    #[error(
        "Service temporarily unavailable. Retry after {retry_after_seconds}s (correlation: {correlation_id})"
    )]
    ServiceUnavailable {
        retry_after_seconds: u64,
        correlation_id: CorrelationId,
    },
}

impl ApiError {
    /// Get the correlation ID from any error variant
    pub const fn correlation_id(&self) -> &CorrelationId {
        match self {
            Self::SearchFailed { correlation_id }
            | Self::ServiceUnavailable { correlation_id, .. } => correlation_id,
        }
    }

    /// Get the HTTP status code for this error
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::SearchFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable machine-readable error code for the response body
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SearchFailed { .. } => "SEARCH_FAILED",
            Self::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
        }
    }

    /// Map an engine error onto the API taxonomy: connectivity failures are
    /// retryable 503s, everything else is a 500
    pub fn from_search_error(err: &SearchError, correlation_id: CorrelationId) -> Self {
        if err.is_connectivity() {
            Self::ServiceUnavailable {
                retry_after_seconds: 30,
                correlation_id,
            }
        } else {
            Self::SearchFailed { correlation_id }
        }
    }
}

/// Error response sent to API clients.
///
/// Internal details (SQL, connection strings) never reach this struct; the
/// correlation ID is the handle for support and log digging.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Correlation ID for tracking and support
    pub correlation_id: CorrelationId,
    /// When to retry (for transient errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let correlation_id = self.correlation_id().clone();

        match &self {
            Self::SearchFailed { .. } => {
                error!(
                    correlation_id = %correlation_id,
                    error = %self,
                    "Search request failed"
                );
            }
            Self::ServiceUnavailable { .. } => {
                warn!(
                    correlation_id = %correlation_id,
                    error = %self,
                    "Service unavailable"
                );
            }
        }

        let retry_after = match &self {
            Self::ServiceUnavailable {
                retry_after_seconds,
                ..
            } => Some(*retry_after_seconds),
            Self::SearchFailed { .. } => None,
        };

        let body = ApiErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            correlation_id: correlation_id.clone(),
            retry_after,
        };

        let mut response = (status, Json(body)).into_response();

        // Add correlation ID to response headers for client tracking
        if let Ok(header_value) = correlation_id.to_string().parse() {
            response
                .headers_mut()
                .insert("X-Correlation-ID", header_value);
        }

        response
    }
}

/// Result type for API operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        let failed = ApiError::SearchFailed {
            correlation_id: CorrelationId::new(),
        };
        assert_eq!(failed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failed.code(), "SEARCH_FAILED");

        let unavailable = ApiError::ServiceUnavailable {
            retry_after_seconds: 30,
            correlation_id: CorrelationId::new(),
        };
        assert_eq!(unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
