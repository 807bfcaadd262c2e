//! Session cookie helpers.
//!
//! The `user_token` cookie is what the route guard keys on. It is set by
//! the storefront on successful login/register and expired client-side
//! whenever the session is torn down - the backend may already consider
//! the session dead by then, so expiry never waits on it.

use axum_extra::extract::cookie::{Cookie, SameSite};

/// Credential cookie read by the route guard.
pub const SESSION_COOKIE_NAME: &str = "user_token";

/// Build the session cookie for a freshly issued API key.
///
/// `secure` should be true when the storefront is served over HTTPS.
#[must_use]
pub fn session_cookie(value: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, value.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Build an expired session cookie (epoch `Expires`, `Max-Age=0`).
#[must_use]
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc123", true);
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_expired_cookie_is_a_removal() {
        let cookie = expired_session_cookie();
        let encoded = cookie.to_string();
        assert!(encoded.contains("user_token="));
        assert!(encoded.contains("Max-Age=0"));
        assert!(encoded.contains("1970"));
    }
}
