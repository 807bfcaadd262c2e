//! Pet-shop backend REST API plumbing.
//!
//! The storefront is a client of the pet-shop backend. Every outbound
//! request goes through a single [`ApiClient`] instance so that
//! unauthorized responses can be observed centrally, no matter which
//! part of the application issued the request.
//!
//! # Modules
//!
//! - [`client`] - the intercepted HTTP client (the one outbound hook point)

pub mod client;

pub use client::{ApiClient, ApiResponse, UnauthorizedObserver};

use thiserror::Error;

use pawprint_core::ApiKeyError;

/// Errors that can occur when talking to the pet-shop backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Status {
        /// HTTP status returned by the backend.
        status: reqwest::StatusCode,
        /// Server-provided message, or a generic status message.
        message: String,
    },

    /// Response body could not be parsed as the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured backend base URL is not a valid URL.
    #[error("invalid backend base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// The backend returned an empty body where an API key was expected.
    #[error("invalid API key in response: {0}")]
    ApiKey(#[from] ApiKeyError),
}

impl BackendError {
    /// Whether this error is an unauthorized rejection, as opposed to
    /// any other kind of failure. Callers use this to decide between
    /// full session teardown and local-only clearing.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Status { status, .. } if *status == reqwest::StatusCode::UNAUTHORIZED
        )
    }
}

/// Generic error body shape used by backend endpoints on non-success
/// statuses: `{"message": "..."}` with any other fields ignored.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unauthorized_only_for_401() {
        let unauthorized = BackendError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            message: "no".to_owned(),
        };
        assert!(unauthorized.is_unauthorized());

        let server_error = BackendError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".to_owned(),
        };
        assert!(!server_error.is_unauthorized());
    }

    #[test]
    fn test_error_body_is_lenient() {
        let body: ErrorBody = serde_json::from_str(r#"{"message":"taken","code":9}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("taken"));

        let empty: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(empty.message.is_none());
    }
}
