//! Core types for Pawprint.
//!
//! This module provides type-safe wrappers for the session subsystem's
//! domain concepts.

pub mod credential;
pub mod id;
pub mod unauthorized;
pub mod user;

pub use credential::{ApiKey, ApiKeyError};
pub use id::UserId;
pub use unauthorized::{UnauthorizedEvent, UnauthorizedResponse};
pub use user::UserProfile;
