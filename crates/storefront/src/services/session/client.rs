//! Backend session endpoints.
//!
//! Exchanges credentials for API keys and API keys for user profiles.
//! Network traffic goes through the intercepted [`ApiClient`]; the
//! credential slot is written here on successful login/register so no
//! other component touches it directly.

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use pawprint_core::{ApiKey, UserProfile};

use crate::backend::{ApiClient, BackendError};
use crate::services::credentials::CredentialStore;

/// Header carrying the session API key on authenticated requests.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Registration payload for `POST /user/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterInput {
    /// Display name.
    pub name: String,
    /// Contact email, also the login identifier.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Plain password; the backend owns hashing.
    pub password: String,
}

/// Login payload for `POST /user/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginInput {
    /// Login identifier.
    pub email: String,
    /// Plain password.
    pub password: String,
}

/// Client for the backend's user-session endpoints.
#[derive(Clone)]
pub struct SessionClient {
    api: ApiClient,
    credentials: Arc<dyn CredentialStore>,
}

impl SessionClient {
    /// Create a new session client.
    #[must_use]
    pub fn new(api: ApiClient, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { api, credentials }
    }

    /// Register a new account and store the returned API key.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Status`] carrying the server-provided
    /// message (or a generic HTTP-status message) on non-success.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: &RegisterInput) -> Result<ApiKey, BackendError> {
        self.obtain_key("user/register", input).await
    }

    /// Log in and store the returned API key.
    ///
    /// # Errors
    ///
    /// Same contract as [`SessionClient::register`], against the login
    /// endpoint.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: &LoginInput) -> Result<ApiKey, BackendError> {
        self.obtain_key("user/login", input).await
    }

    /// Fetch the current user's profile using the given key.
    ///
    /// # Errors
    ///
    /// Failures carry the HTTP status so callers can tell an
    /// unauthorized rejection apart from other backend trouble.
    #[instrument(skip_all)]
    pub async fn fetch_profile(&self, key: &ApiKey) -> Result<UserProfile, BackendError> {
        let request = self
            .api
            .request(Method::GET, "user")?
            .header(API_KEY_HEADER, key.expose());
        let response = self.api.execute(request).await?;

        if !response.status().is_success() {
            return Err(BackendError::Status {
                status: response.status(),
                message: response.error_message(),
            });
        }

        response.json()
    }

    /// Tell the backend to invalidate the server-side session.
    ///
    /// Best-effort: every failure is absorbed and logged. Local clearing
    /// is the teardown coordinator's job, so logout must never block it.
    #[instrument(skip_all)]
    pub async fn logout(&self) {
        let request = match self.api.request(Method::POST, "user/logout") {
            Ok(request) => request,
            Err(error) => {
                tracing::warn!(%error, "cannot build backend logout request");
                return;
            }
        };

        match self.api.execute(request).await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(status = %response.status(), "backend logout rejected");
            }
            Err(error) => {
                tracing::warn!(%error, "backend logout failed");
            }
        }
    }

    /// POST `input` to `path` and parse the plain-text API key from the
    /// response body, persisting it on success.
    async fn obtain_key<T: Serialize + ?Sized>(
        &self,
        path: &str,
        input: &T,
    ) -> Result<ApiKey, BackendError> {
        let request = self.api.request(Method::POST, path)?.json(input);
        let response = self.api.execute(request).await?;

        if !response.status().is_success() {
            return Err(BackendError::Status {
                status: response.status(),
                message: response.error_message(),
            });
        }

        let key = ApiKey::parse(&response.text())?;
        self.credentials.save(&key);
        Ok(key)
    }
}
