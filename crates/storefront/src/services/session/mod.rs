//! Client-side session subsystem.
//!
//! The storefront holds one authenticated session against the pet-shop
//! backend. This module owns its whole lifecycle:
//!
//! - [`client`] - the backend session endpoints (register, login,
//!   profile, logout)
//! - [`provider`] - the shared observable session state
//! - [`teardown`] - the exactly-once unauthorized teardown coordinator
//!
//! All session state mutations flow through the provider's operations;
//! nothing else writes the credential slot or the watch channel.

pub mod client;
pub mod provider;
pub mod teardown;

pub use client::{LoginInput, RegisterInput, SessionClient};
pub use provider::{SessionProvider, SessionState};
pub use teardown::TeardownCoordinator;

use thiserror::Error;

use crate::backend::BackendError;

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend rejected the session credential. By the time callers
    /// see this, teardown has already run; consult
    /// [`SessionProvider::take_redirect`] for the pending navigation.
    #[error("session rejected by the backend")]
    Unauthorized,

    /// Any non-auth backend failure. Auth state has been cleared
    /// locally; no teardown or redirect was triggered.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
