//! Exactly-once session teardown.
//!
//! Any number of concurrent requests can fail with 401 at the same
//! moment - including a 401 provoked by the teardown's own best-effort
//! logout call. The coordinator collapses all of them into one teardown
//! per session epoch: one backend logout, one credential clear, one
//! pending redirect. There are no locks to lean on in this protocol;
//! correctness rests on the atomic epoch guard and on the pending
//! redirect being consumed at most once.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use moka::future::Cache;
use tokio::sync::watch;

use pawprint_core::{UnauthorizedEvent, UserProfile};

use crate::backend::UnauthorizedObserver;
use crate::services::credentials::CredentialStore;
use crate::services::session::client::SessionClient;
use crate::services::session::provider::SessionState;

/// Coordinates the clearing of credential, session state, and cookie
/// plus the redirect, triggered by an unauthorized signal.
pub struct TeardownCoordinator {
    /// Set by the first teardown of the current session epoch; re-armed
    /// on successful login.
    torn_down: AtomicBool,
    session: SessionClient,
    credentials: Arc<dyn CredentialStore>,
    state: watch::Sender<SessionState>,
    profile_cache: Cache<(), UserProfile>,
    /// The one pending navigation. Whoever takes it also expires the
    /// client-visible session cookie.
    pending_redirect: Mutex<Option<UnauthorizedEvent>>,
}

impl TeardownCoordinator {
    pub(crate) fn new(
        session: SessionClient,
        credentials: Arc<dyn CredentialStore>,
        state: watch::Sender<SessionState>,
        profile_cache: Cache<(), UserProfile>,
    ) -> Self {
        Self {
            torn_down: AtomicBool::new(false),
            session,
            credentials,
            state,
            profile_cache,
            pending_redirect: Mutex::new(None),
        }
    }

    /// Run the unauthorized teardown.
    ///
    /// The first invocation per epoch performs the side effects; every
    /// later or concurrent invocation (a late 401, a racing request, the
    /// teardown's own logout traffic) is a no-op.
    pub async fn run(&self, event: Option<UnauthorizedEvent>) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            tracing::debug!("teardown already ran for this session epoch, ignoring");
            return;
        }

        let event = event.unwrap_or_else(UnauthorizedEvent::session_expired);
        tracing::warn!(redirect = %event.redirect_path, "unauthorized session, tearing down");

        // Best-effort server-side invalidation; local clearing below
        // happens regardless of the outcome.
        self.session.logout().await;

        self.clear_local(Some(event)).await;
    }

    /// Clear credential slot, profile cache, and in-memory state, and
    /// record the pending navigation. Shared by the unauthorized path
    /// and user-initiated logout.
    pub(crate) async fn clear_local(&self, pending: Option<UnauthorizedEvent>) {
        self.credentials.clear();
        self.profile_cache.invalidate(&()).await;
        self.state.send_modify(|state| {
            state.user = None;
            state.loading = false;
        });

        if let Some(event) = pending {
            *self.lock_pending() = Some(event);
        }
    }

    /// Re-enable teardown after a successful login, discarding any
    /// unconsumed redirect from the previous epoch.
    pub(crate) fn rearm(&self) {
        self.torn_down.store(false, Ordering::SeqCst);
        *self.lock_pending() = None;
    }

    /// Take the pending redirect, if any. Consumes it: the second caller
    /// sees `None`, so the navigation (and the cookie expiry that rides
    /// on it) is issued at most once.
    pub fn take_redirect(&self) -> Option<UnauthorizedEvent> {
        self.lock_pending().take()
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<UnauthorizedEvent>> {
        self.pending_redirect
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl UnauthorizedObserver for TeardownCoordinator {
    fn unauthorized(
        &self,
        event: Option<UnauthorizedEvent>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.run(event))
    }
}
