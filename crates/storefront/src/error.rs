//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors
//! to Sentry before responding to the client. Route handlers return
//! `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;
use crate::services::session::SessionError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Session operation failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Visitor is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn is_server_side(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Backend(error) => !error.is_unauthorized(),
            Self::Session(SessionError::Backend(error)) => !error.is_unauthorized(),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry
        if self.is_server_side() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Backend(error) | Self::Session(SessionError::Backend(error)) => {
                if error.is_unauthorized() {
                    StatusCode::UNAUTHORIZED
                } else {
                    StatusCode::BAD_GATEWAY
                }
            }
            Self::Session(SessionError::Unauthorized) | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // A 401 from the storefront's own API follows the same wire
        // contract as the backend middleware, so one client-side handler
        // covers both.
        if status == StatusCode::UNAUTHORIZED {
            let message = match &self {
                Self::Unauthorized(message) => message.clone(),
                _ => "Your session has expired, please sign in again".to_owned(),
            };
            return (
                status,
                Json(json!({
                    "success": false,
                    "error": "unauthorized",
                    "message": message,
                    "redirect": "/auth",
                })),
            )
                .into_response();
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Backend(_) | Self::Session(_) => "Upstream service error".to_owned(),
            Self::Internal(_) => "Internal server error".to_owned(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
