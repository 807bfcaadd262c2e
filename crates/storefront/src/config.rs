//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PAWPRINT_API_URL` - Base URL of the pet-shop backend REST API
//! - `PAWPRINT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `PAWPRINT_HOST` - Bind address (default: 127.0.0.1)
//! - `PAWPRINT_PORT` - Listen port (default: 3000)
//! - `PAWPRINT_CREDENTIAL_FILE` - Credential slot path (default: data/api_key)
//! - `PAWPRINT_PROFILE_TTL_SECS` - Profile freshness window (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default profile freshness window, in seconds.
const DEFAULT_PROFILE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Base URL of the pet-shop backend REST API
    pub api_url: String,
    /// Path of the persisted credential slot
    pub credential_file: PathBuf,
    /// Freshness window for the cached user profile
    pub profile_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or
    /// invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("PAWPRINT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PAWPRINT_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("PAWPRINT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PAWPRINT_PORT".to_owned(), e.to_string()))?;
        let base_url = get_required_env("PAWPRINT_BASE_URL")?;
        let api_url = get_required_env("PAWPRINT_API_URL")?;
        let credential_file =
            PathBuf::from(get_env_or_default("PAWPRINT_CREDENTIAL_FILE", "data/api_key"));
        let profile_ttl_secs = get_env_or_default(
            "PAWPRINT_PROFILE_TTL_SECS",
            &DEFAULT_PROFILE_TTL_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("PAWPRINT_PROFILE_TTL_SECS".to_owned(), e.to_string())
        })?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            base_url,
            api_url,
            credential_file,
            profile_ttl: Duration::from_secs(profile_ttl_secs),
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn use_secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
