//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{ApiClient, BackendError};
use crate::config::StorefrontConfig;
use crate::services::credentials::{CredentialStore, FileCredentialStore};
use crate::services::session::{SessionClient, SessionProvider};

/// Application state shared across all handlers.
///
/// All service instances are constructed here, exactly once per
/// process, and live as long as the state does - there are no
/// module-level singletons. The unauthorized observer is installed
/// during construction, so the 401 hook is live before the first
/// outbound request.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    session: SessionProvider,
}

impl AppState {
    /// Create the application state with the file-backed credential
    /// slot from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend base URL is invalid or the HTTP
    /// client cannot be constructed.
    pub fn new(config: StorefrontConfig) -> Result<Self, BackendError> {
        let credentials: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(&config.credential_file));
        Self::with_credential_store(config, credentials)
    }

    /// Create the application state with an explicit credential store.
    ///
    /// # Errors
    ///
    /// Same contract as [`AppState::new`].
    pub fn with_credential_store(
        config: StorefrontConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, BackendError> {
        let api = ApiClient::new(&config.api_url)?;
        let session_client = SessionClient::new(api.clone(), Arc::clone(&credentials));
        let session = SessionProvider::new(session_client, credentials, config.profile_ttl);

        // Single registration of the 401 hook point.
        api.install_unauthorized_observer(session.teardown());

        Ok(Self {
            inner: Arc::new(AppStateInner { config, session }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the session provider.
    #[must_use]
    pub fn session(&self) -> &SessionProvider {
        &self.inner.session
    }
}
