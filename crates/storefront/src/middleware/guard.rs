//! Edge route guard.
//!
//! Runs before any handler and decides, per request, whether it may
//! proceed, gets redirected to the auth page, or is rejected with a
//! structured 401. The guard is stateless: it looks only at the inbound
//! request's credential cookie, method, and path - never at the session
//! provider, whose state belongs to the storefront's own backend
//! session, not to the visitor.
//!
//! Path matching is prefix-based against two explicit lists; anything
//! not listed is implicitly public.

use axum::{
    Json,
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde_json::json;

use super::session::SESSION_COOKIE_NAME;

/// State-changing endpoints that require a credential.
const PROTECTED_WRITE_ENDPOINTS: &[&str] =
    &["/api/order/create", "/api/order/user", "/api/feedback"];

/// Pages and read APIs that require a credential. `/personal` covers all
/// of its subpages by prefix.
const PROTECTED_READ_PAGES: &[&str] = &["/personal", "/api/user/profile", "/api/user/orders"];

/// Paths the guard never inspects: build output, favicon, health.
const EXEMPT_PREFIXES: &[&str] = &["/static", "/favicon.ico", "/health"];

/// The auth page prefix; signed-in visitors are bounced away from it.
const AUTH_PAGE: &str = "/auth";

/// Edge middleware enforcing the auth policy table.
pub async fn route_guard(jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if is_exempt(&path) {
        return next.run(request).await;
    }

    let has_credential = jar
        .get(SESSION_COOKIE_NAME)
        .is_some_and(|cookie| !cookie.value().is_empty());
    let method = request.method().clone();

    if is_write(&method) && matches_prefix(&path, PROTECTED_WRITE_ENDPOINTS) && !has_credential {
        return reject_write(&path);
    }

    if is_read(&method) && matches_prefix(&path, PROTECTED_READ_PAGES) && !has_credential {
        return redirect_to_auth(&path, None);
    }

    // Signed-in visitors loading the auth page are sent where they were
    // headed (the `redirect` query param) or home. Page loads only: the
    // auth action endpoints (login/logout POSTs) must stay reachable.
    if has_credential && is_read(&method) && is_auth_page(&path) {
        let target =
            redirect_target(request.uri().query()).unwrap_or_else(|| "/".to_owned());
        return Redirect::to(&target).into_response();
    }

    next.run(request).await
}

fn is_exempt(path: &str) -> bool {
    matches_prefix(path, EXEMPT_PREFIXES)
}

fn is_auth_page(path: &str) -> bool {
    path == AUTH_PAGE || path.starts_with("/auth/")
}

fn is_write(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn is_read(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

fn matches_prefix(path: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix))
}

/// Extract and validate the `redirect` query parameter.
///
/// Only internal paths are honored; absolute and protocol-relative URLs
/// fall back to the home path.
fn redirect_target(query: Option<&str>) -> Option<String> {
    let query = query?;
    let raw = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("redirect="))?;
    let decoded = urlencoding::decode(raw).ok()?.into_owned();
    if decoded.starts_with('/') && !decoded.starts_with("//") {
        Some(decoded)
    } else {
        None
    }
}

/// Reject an unauthenticated write: structured 401 for API paths, a
/// redirect with a readable reason for page paths.
fn reject_write(path: &str) -> Response {
    if path.starts_with("/api/") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "error": "unauthorized",
                "message": "Sign in is required to perform this action",
                "redirect": "/auth",
            })),
        )
            .into_response();
    }

    redirect_to_auth(path, Some("Sign in is required to complete checkout"))
}

fn redirect_to_auth(path: &str, message: Option<&str>) -> Response {
    let mut location = format!("{AUTH_PAGE}?redirect={}", urlencoding::encode(path));
    if let Some(message) = message {
        location.push_str("&message=");
        location.push_str(&urlencoding::encode(message));
    }
    Redirect::to(&location).into_response()
}
