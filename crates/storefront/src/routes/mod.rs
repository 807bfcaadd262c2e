//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                   - Home page
//! GET  /health             - Liveness check
//! GET  /health/ready       - Readiness (session hydrated)
//!
//! # Auth
//! GET  /auth               - Auth page (redirect/message/error in query)
//! POST /auth/login         - Login action
//! POST /auth/register      - Register action
//! POST /auth/logout        - Logout action
//!
//! # Account (requires credential cookie, enforced by the route guard)
//! GET  /personal           - Account overview
//! GET  /personal/profile   - Profile page
//! GET  /api/user/profile   - Profile JSON
//! ```

pub mod account;
pub mod auth;
pub mod home;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use pawprint_core::UnauthorizedEvent;

use crate::middleware;
use crate::state::AppState;

/// Assemble the full application router: health endpoints, pages, and
/// the edge middleware (route guard + request id).
///
/// Outer concerns (static assets, tracing, Sentry) are layered on in
/// `main`; integration tests drive this router directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(axum::middleware::from_fn(middleware::route_guard))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .with_state(state)
}

/// Page and API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .merge(auth_routes())
        .merge(account_routes())
}

/// Create the auth routes router.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", get(auth::auth_page))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/logout", post(auth::logout))
        .layer(middleware::auth_rate_limiter())
}

/// Create the account routes router.
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/personal", get(account::overview))
        .route("/personal/profile", get(account::profile_page))
        .route("/api/user/profile", get(account::profile_api))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Ready once the session provider has hydrated from the credential
/// slot, so the process never serves pages from pre-hydration state.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.session().state().initialized {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Build the `Location` value for a pending teardown navigation.
pub(crate) fn event_location(event: &UnauthorizedEvent) -> String {
    match &event.message {
        Some(message) => format!(
            "{}?message={}",
            event.redirect_path,
            urlencoding::encode(message)
        ),
        None => event.redirect_path.clone(),
    }
}

/// Minimal HTML escaping for the inline page fragments.
pub(crate) fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
