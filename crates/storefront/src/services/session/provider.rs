//! Shared observable session state.
//!
//! The provider is the single owner of [`SessionState`]. Consumers read
//! a snapshot with [`SessionProvider::state`] or subscribe to changes
//! through a watch channel; all mutations flow through the operations
//! here (or through the teardown coordinator, which the provider owns).
//!
//! The last successfully fetched profile is cached for a short
//! freshness window so bursts of [`SessionProvider::refetch`] calls
//! don't hammer the backend; `invalidate_profile` forces the next call
//! to fetch live.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::watch;

use pawprint_core::{ApiKey, UnauthorizedEvent, UserProfile};

use crate::services::credentials::CredentialStore;
use crate::services::session::SessionError;
use crate::services::session::client::{LoginInput, RegisterInput, SessionClient};
use crate::services::session::teardown::TeardownCoordinator;

/// The client-side record of the currently authenticated user.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// The authenticated user, if any. Non-null only after a successful
    /// profile fetch with a stored credential.
    pub user: Option<UserProfile>,
    /// Whether a profile fetch is in flight.
    pub loading: bool,
    /// Whether [`SessionProvider::init`] has completed. Until then the
    /// state is the pre-hydration default and must not be trusted.
    pub initialized: bool,
}

impl SessionState {
    const fn initial() -> Self {
        Self {
            user: None,
            loading: true,
            initialized: false,
        }
    }
}

/// Reactive, process-wide session container.
///
/// Cheaply cloneable; all clones share one state.
#[derive(Clone)]
pub struct SessionProvider {
    inner: Arc<SessionProviderInner>,
}

struct SessionProviderInner {
    session: SessionClient,
    credentials: Arc<dyn CredentialStore>,
    state: watch::Sender<SessionState>,
    profile_cache: Cache<(), UserProfile>,
    teardown: Arc<TeardownCoordinator>,
}

impl SessionProvider {
    /// Create a new provider.
    ///
    /// `profile_ttl` is the freshness window for the cached profile.
    #[must_use]
    pub fn new(
        session: SessionClient,
        credentials: Arc<dyn CredentialStore>,
        profile_ttl: Duration,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        let profile_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(profile_ttl)
            .build();

        let teardown = Arc::new(TeardownCoordinator::new(
            session.clone(),
            Arc::clone(&credentials),
            state.clone(),
            profile_cache.clone(),
        ));

        Self {
            inner: Arc::new(SessionProviderInner {
                session,
                credentials,
                state,
                profile_cache,
                teardown,
            }),
        }
    }

    /// Snapshot of the current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to session state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// The teardown coordinator, for wiring into the API client's
    /// unauthorized hook at process start.
    #[must_use]
    pub fn teardown(&self) -> Arc<TeardownCoordinator> {
        Arc::clone(&self.inner.teardown)
    }

    /// Hydrate the session from the credential slot.
    ///
    /// Runs once at process start, before the server accepts traffic:
    /// loads the stored credential and, if present, fetches the profile.
    /// An unauthorized rejection runs the full teardown; any other
    /// failure only clears local state. Always finishes with
    /// `loading == false` and `initialized == true`.
    pub async fn init(&self) {
        if let Some(key) = self.inner.credentials.load() {
            // Errors are already handled (and logged) inside load_user;
            // hydration itself never fails.
            let _ = self.load_user(&key).await;
        }

        self.inner.state.send_modify(|state| {
            state.loading = false;
            state.initialized = true;
        });
    }

    /// Adopt a freshly issued credential and fetch its profile.
    ///
    /// Persists the key, re-arms the teardown epoch, and populates the
    /// session state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Unauthorized`] if the backend rejects the
    /// new key (teardown has then already run), or
    /// [`SessionError::Backend`] for other failures.
    pub async fn login(&self, key: ApiKey) -> Result<UserProfile, SessionError> {
        self.inner.credentials.save(&key);
        self.inner.teardown.rearm();
        self.inner.profile_cache.invalidate(&()).await;
        self.load_user(&key).await
    }

    /// Sign in with email and password.
    ///
    /// Exchanges the credentials for an API key, then adopts it. Returns
    /// the key (for the caller's session cookie) and the fetched
    /// profile.
    ///
    /// # Errors
    ///
    /// Propagates the login endpoint's error with the server-provided
    /// message, or any failure from adopting the key.
    pub async fn sign_in(&self, input: &LoginInput) -> Result<(ApiKey, UserProfile), SessionError> {
        let key = self.inner.session.login(input).await?;
        let profile = self.login(key.clone()).await?;
        Ok((key, profile))
    }

    /// Register a new account, then adopt the issued key.
    ///
    /// # Errors
    ///
    /// Same contract as [`SessionProvider::sign_in`], against the
    /// registration endpoint.
    pub async fn sign_up(
        &self,
        input: &RegisterInput,
    ) -> Result<(ApiKey, UserProfile), SessionError> {
        let key = self.inner.session.register(input).await?;
        let profile = self.login(key.clone()).await?;
        Ok((key, profile))
    }

    /// Current profile, served from the freshness cache when warm.
    ///
    /// Within the freshness window this returns the cached profile
    /// without touching the backend. After expiry (or an explicit
    /// [`SessionProvider::invalidate_profile`]) it fetches live using
    /// the stored credential. `Ok(None)` means signed out.
    ///
    /// # Errors
    ///
    /// See [`SessionProvider::login`] for the failure contract of the
    /// live fetch.
    pub async fn refetch(&self) -> Result<Option<UserProfile>, SessionError> {
        if let Some(profile) = self.inner.profile_cache.get(&()).await {
            return Ok(Some(profile));
        }

        match self.inner.credentials.load() {
            Some(key) => self.load_user(&key).await.map(Some),
            None => {
                self.clear_auth().await;
                Ok(None)
            }
        }
    }

    /// Drop the cached profile so the next [`SessionProvider::refetch`]
    /// fetches live.
    pub async fn invalidate_profile(&self) {
        self.inner.profile_cache.invalidate(&()).await;
    }

    /// Sign out.
    ///
    /// Tells the backend best-effort, then clears credential, cache, and
    /// state, and records a pending navigation home. Never fails: local
    /// sign-out succeeds even when the backend call does not.
    pub async fn logout(&self) {
        self.inner.session.logout().await;
        self.inner
            .teardown
            .clear_local(Some(UnauthorizedEvent::logged_out()))
            .await;
    }

    /// Clear the in-memory auth state and profile cache only.
    ///
    /// Used on non-auth fetch failures: no network call, no
    /// credential clear, no redirect.
    pub async fn clear_auth(&self) {
        self.inner.profile_cache.invalidate(&()).await;
        self.inner.state.send_modify(|state| {
            state.user = None;
            state.loading = false;
        });
    }

    /// Consume the pending navigation recorded by teardown or logout.
    #[must_use]
    pub fn take_redirect(&self) -> Option<UnauthorizedEvent> {
        self.inner.teardown.take_redirect()
    }

    /// Fetch the profile with `key` and publish the outcome.
    async fn load_user(&self, key: &ApiKey) -> Result<UserProfile, SessionError> {
        self.inner.state.send_modify(|state| state.loading = true);

        match self.inner.session.fetch_profile(key).await {
            Ok(profile) => {
                self.inner.profile_cache.insert((), profile.clone()).await;
                self.inner.state.send_modify(|state| {
                    state.user = Some(profile.clone());
                    state.loading = false;
                });
                Ok(profile)
            }
            Err(error) if error.is_unauthorized() => {
                // The interceptor has normally torn the session down
                // before this error surfaces; run() is idempotent, so
                // this only matters when the hook is not installed.
                self.inner.teardown.run(None).await;
                Err(SessionError::Unauthorized)
            }
            Err(error) => {
                tracing::error!(%error, "failed to load user profile");
                self.clear_auth().await;
                Err(SessionError::Backend(error))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use crate::backend::ApiClient;
    use crate::services::credentials::MemoryCredentialStore;

    /// Provider wired to an in-memory credential slot and a backend
    /// address nothing listens on. Good enough for every path that must
    /// not depend on the network succeeding.
    fn provider_without_backend() -> (SessionProvider, Arc<MemoryCredentialStore>) {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let credentials = Arc::new(MemoryCredentialStore::new());
        let store: Arc<dyn CredentialStore> = credentials.clone();
        let session = SessionClient::new(api, Arc::clone(&store));
        let provider = SessionProvider::new(session, store, Duration::from_secs(300));
        (provider, credentials)
    }

    #[test]
    fn test_initial_state_is_unhydrated() {
        let (provider, _) = provider_without_backend();
        let state = provider.state();
        assert!(state.user.is_none());
        assert!(state.loading);
        assert!(!state.initialized);
    }

    #[tokio::test]
    async fn test_init_without_credential_hydrates_signed_out() {
        let (provider, _) = provider_without_backend();
        provider.init().await;

        let state = provider.state();
        assert!(state.user.is_none());
        assert!(!state.loading);
        assert!(state.initialized);
        assert!(provider.take_redirect().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_observe_hydration() {
        let (provider, _) = provider_without_backend();
        let mut receiver = provider.subscribe();

        provider.init().await;

        receiver.changed().await.unwrap();
        assert!(receiver.borrow().initialized);
    }

    #[tokio::test]
    async fn test_teardown_redirect_is_consumed_once() {
        let (provider, _) = provider_without_backend();
        let teardown = provider.teardown();

        // The backend logout inside run() fails (nothing listens) and
        // must be absorbed.
        teardown.run(None).await;

        let event = provider.take_redirect().unwrap();
        assert_eq!(event.redirect_path, "/auth");
        assert!(provider.take_redirect().is_none());
    }

    #[tokio::test]
    async fn test_repeated_teardown_does_not_requeue_redirect() {
        let (provider, _) = provider_without_backend();
        let teardown = provider.teardown();

        teardown.run(None).await;
        assert!(provider.take_redirect().is_some());

        // Same epoch: a late 401 after the redirect was consumed.
        teardown.run(None).await;
        assert!(provider.take_redirect().is_none());
    }

    #[tokio::test]
    async fn test_teardown_clears_credential_slot() {
        let (provider, credentials) = provider_without_backend();
        credentials.save(&ApiKey::parse("stale").unwrap());

        provider.teardown().run(None).await;

        assert!(credentials.load().is_none());
        assert!(provider.state().user.is_none());
    }

    #[tokio::test]
    async fn test_rearm_discards_stale_redirect() {
        let (provider, _) = provider_without_backend();
        let teardown = provider.teardown();

        teardown.run(None).await;
        teardown.rearm();

        assert!(provider.take_redirect().is_none());
    }

    #[tokio::test]
    async fn test_clear_auth_does_not_touch_credentials() {
        let (provider, credentials) = provider_without_backend();
        credentials.save(&ApiKey::parse("still-here").unwrap());

        provider.clear_auth().await;

        assert!(!provider.state().loading);
        assert_eq!(credentials.load().unwrap().expose(), "still-here");
        assert!(provider.take_redirect().is_none());
    }
}
