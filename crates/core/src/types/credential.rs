//! Opaque API credential type.
//!
//! The backend hands out a bearer key as plain text on login/register.
//! The key authenticates the session; its contents are opaque to the
//! storefront and are never inspected, only stored and replayed.

use secrecy::{ExposeSecret, SecretString};

/// Errors that can occur when constructing an [`ApiKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyError {
    /// The input string is empty or whitespace-only.
    #[error("API key cannot be empty")]
    Empty,
}

/// An opaque API key authenticating a user session to the backend.
///
/// Wraps [`SecretString`] so the key is zeroized on drop and redacted in
/// `Debug` output. The key is not validated beyond being non-empty.
///
/// ## Examples
///
/// ```
/// use pawprint_core::ApiKey;
///
/// let key = ApiKey::parse("a1b2c3d4").unwrap();
/// assert_eq!(key.expose(), "a1b2c3d4");
/// assert!(ApiKey::parse("   ").is_err());
/// ```
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Parse an `ApiKey` from a string.
    ///
    /// Surrounding whitespace is trimmed; the backend returns the key as
    /// a plain-text body and some transports append a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`ApiKeyError::Empty`] if the input is empty after
    /// trimming.
    pub fn parse(s: &str) -> Result<Self, ApiKeyError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ApiKeyError::Empty);
        }
        Ok(Self(SecretString::from(trimmed)))
    }

    /// Expose the key for use in a request header or storage slot.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let key = ApiKey::parse("  abc123\n").unwrap();
        assert_eq!(key.expose(), "abc123");
    }

    #[test]
    fn test_parse_empty_rejected() {
        assert_eq!(ApiKey::parse("").unwrap_err(), ApiKeyError::Empty);
        assert_eq!(ApiKey::parse(" \n\t").unwrap_err(), ApiKeyError::Empty);
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = ApiKey::parse("super-secret-key").unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-key"));
    }

    #[test]
    fn test_clone_preserves_key() {
        let key = ApiKey::parse("abc").unwrap();
        assert_eq!(key.clone().expose(), "abc");
    }
}
