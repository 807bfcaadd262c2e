//! Unauthorized wire contract and teardown event.
//!
//! Any backend endpoint may reject a request with HTTP 401 and a
//! structured JSON body. The storefront's interceptor and session
//! provider both consume that body; the route guard emits the same shape
//! for unauthenticated API writes.

use serde::{Deserialize, Serialize};

/// Structured 401 body emitted by the backend's auth middleware.
///
/// All fields are lenient: a plain 401 with an empty or foreign body
/// deserializes to the `Default` value and is treated as a generic
/// unauthorized response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnauthorizedResponse {
    /// Always `false` in rejections.
    #[serde(default)]
    pub success: bool,
    /// Error code; `"unauthorized"` marks the session-rejection contract.
    #[serde(default)]
    pub error: Option<String>,
    /// Human-readable reason, shown on the auth page.
    #[serde(default)]
    pub message: Option<String>,
    /// Path the client should navigate to, typically `/auth`.
    #[serde(default)]
    pub redirect: Option<String>,
}

impl UnauthorizedResponse {
    /// Whether this body matches the recognized session-rejection
    /// contract (as opposed to some other 401-shaped response).
    #[must_use]
    pub fn is_session_rejection(&self) -> bool {
        self.error.as_deref() == Some("unauthorized") && self.redirect.is_some()
    }

    /// Convert a recognized rejection into a teardown event.
    ///
    /// Returns `None` when the body does not match the contract.
    #[must_use]
    pub fn into_event(self) -> Option<UnauthorizedEvent> {
        if !self.is_session_rejection() {
            return None;
        }
        Some(UnauthorizedEvent {
            redirect_path: self.redirect.unwrap_or_else(|| "/auth".to_owned()),
            message: self.message,
        })
    }
}

/// Transient teardown event derived from an unauthorized response.
///
/// Not stored: produced by the interceptor (or the guard), recorded as
/// the single pending redirect, and consumed exactly once by whichever
/// handler ends up issuing the navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnauthorizedEvent {
    /// Path to navigate to.
    pub redirect_path: String,
    /// Human-readable reason carried into the auth page query string.
    pub message: Option<String>,
}

impl UnauthorizedEvent {
    /// The generic event used when a 401 arrives without a recognized
    /// structured body.
    #[must_use]
    pub fn session_expired() -> Self {
        Self {
            redirect_path: "/auth".to_owned(),
            message: Some("Your session has expired, please sign in again".to_owned()),
        }
    }

    /// The event recorded by a user-initiated logout.
    #[must_use]
    pub fn logged_out() -> Self {
        Self {
            redirect_path: "/".to_owned(),
            message: None,
        }
    }
}
