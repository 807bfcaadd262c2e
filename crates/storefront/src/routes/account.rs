//! Account route handlers.
//!
//! These pages sit behind the route guard, but the guard only proves a
//! cookie was present - the storefront's backend session can still be
//! dead (expired key, cleared slot). Handlers therefore consume the
//! provider's pending teardown navigation when the profile cannot be
//! served, expiring the session cookie on the way out.

use axum::{
    Json,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use pawprint_core::{UnauthorizedEvent, UserProfile};

use crate::error::AppError;
use crate::middleware::expired_session_cookie;
use crate::routes::{escape_html, event_location};
use crate::services::session::SessionError;
use crate::state::AppState;

/// Display the account overview.
pub async fn overview(State(state): State<AppState>, jar: CookieJar) -> Response {
    match state.session().refetch().await {
        Ok(Some(profile)) => Html(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>My account - Pawprint</title></head>
<body>
  <h1>Welcome back, {}</h1>
  <nav>
    <a href="/personal/profile">Profile</a>
    <form method="post" action="/auth/logout"><button type="submit">Sign out</button></form>
  </nav>
</body>
</html>"#,
            escape_html(&profile.name)
        ))
        .into_response(),
        Ok(None) | Err(SessionError::Unauthorized) => signed_out_response(&state, jar),
        Err(error) => AppError::from(error).into_response(),
    }
}

/// Display the profile page.
pub async fn profile_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    match state.session().refetch().await {
        Ok(Some(profile)) => Html(render_profile(&profile)).into_response(),
        Ok(None) | Err(SessionError::Unauthorized) => signed_out_response(&state, jar),
        // Non-auth backend trouble surfaces as an error, never as a
        // redirect: the session may still be fine.
        Err(error) => AppError::from(error).into_response(),
    }
}

/// Profile as JSON, for client-side consumers.
pub async fn profile_api(
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, AppError> {
    match state.session().refetch().await {
        Ok(Some(profile)) => Ok(Json(profile)),
        Ok(None) => Err(AppError::Unauthorized(
            "Sign in is required to view your profile".to_owned(),
        )),
        Err(error) => Err(error.into()),
    }
}

/// Redirect a signed-out visitor to the auth page, consuming the
/// pending teardown navigation and expiring the session cookie.
fn signed_out_response(state: &AppState, jar: CookieJar) -> Response {
    let event = state
        .session()
        .take_redirect()
        .unwrap_or_else(UnauthorizedEvent::session_expired);
    let location = event_location(&event);
    (jar.add(expired_session_cookie()), Redirect::to(&location)).into_response()
}

fn render_profile(profile: &UserProfile) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Profile - Pawprint</title></head>
<body>
  <h1>Your profile</h1>
  <dl>
    <dt>Name</dt><dd>{name}</dd>
    <dt>Email</dt><dd>{email}</dd>
    <dt>Phone</dt><dd>{phone}</dd>
    <dt>Discount</dt><dd>{discount}%</dd>
    <dt>Orders</dt><dd>{orders}</dd>
  </dl>
</body>
</html>"#,
        name = escape_html(&profile.name),
        email = escape_html(&profile.email),
        phone = escape_html(&profile.phone),
        discount = profile.discount_percent,
        orders = profile.total_orders,
    )
}
