//! Response types for the tax calculator API.
//!
//! This module defines the error responses of the HTTP API. Errors are
//! returned as plain text; the code is only used in logs.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::TaxError;

/// API error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: &'static str,
    /// Human-readable error message, sent as the response body.
    pub message: String,
}

impl ApiError {
    /// The query string could not be turned into parameters.
    pub fn invalid_params(error: impl std::fmt::Display) -> Self {
        Self {
            code: "INVALID_PARAMS",
            message: format!("failed to parse request params: {error}"),
        }
    }

    /// The cache lookup or upstream request failed.
    pub fn retrieval_failed(error: impl std::fmt::Display) -> Self {
        Self {
            code: "RETRIEVAL_FAILED",
            message: format!("failed to retrieve or request: {error}"),
        }
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.error.message,
        )
            .into_response()
    }
}

impl From<TaxError> for ApiErrorResponse {
    fn from(error: TaxError) -> Self {
        match error {
            TaxError::InvalidParams { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::invalid_params(&error),
            },
            TaxError::Validation { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::retrieval_failed(&error),
            },
            // Unknown state codes stay a server error, as do discovery,
            // transport, decode and rate-limit failures.
            _ => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::retrieval_failed(&error),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiscoveryError;

    #[test]
    fn test_invalid_params_maps_to_400() {
        let response: ApiErrorResponse = TaxError::InvalidParams {
            message: "salary must be specified".to_string(),
        }
        .into();

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.error.message,
            "failed to parse request params: salary must be specified"
        );
    }

    #[test]
    fn test_negative_amount_maps_to_400() {
        let response: ApiErrorResponse =
            TaxError::validation("salary amount must be non-negative").into();

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "RETRIEVAL_FAILED");
    }

    #[test]
    fn test_unknown_jurisdiction_maps_to_500() {
        let response: ApiErrorResponse = TaxError::UnknownJurisdiction {
            code: "ZZ".to_string(),
        }
        .into();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.error.message,
            "failed to retrieve or request: no jurisdiction found for code: ZZ"
        );
    }

    #[test]
    fn test_upstream_failures_map_to_500() {
        let errors = [
            TaxError::Discovery(DiscoveryError::VersionNotFound {
                message: "no GA entry".to_string(),
            }),
            TaxError::Transport {
                message: "connection refused".to_string(),
            },
            TaxError::Decode {
                message: "expected value".to_string(),
            },
            TaxError::RateLimit {
                message: "wait canceled".to_string(),
            },
        ];

        for error in errors {
            let response: ApiErrorResponse = error.into();
            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
