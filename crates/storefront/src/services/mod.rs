//! Application services for the storefront.
//!
//! - [`credentials`] - the single persisted API-key slot
//! - [`session`] - session provider, backend session client, teardown

pub mod credentials;
pub mod session;

pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use session::{SessionClient, SessionError, SessionProvider, SessionState};
