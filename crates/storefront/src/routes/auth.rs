//! Authentication route handlers.
//!
//! The auth page is the landing spot for every unauthorized redirect in
//! the system; the `redirect` query param is threaded through the forms
//! so a successful sign-in continues to the page the visitor wanted.

use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::backend::BackendError;
use crate::middleware::{expired_session_cookie, session_cookie};
use crate::routes::escape_html;
use crate::services::session::{LoginInput, RegisterInput, SessionError};
use crate::state::AppState;

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Form & Query Types
// =============================================================================

/// Query parameters for the auth page.
#[derive(Debug, Deserialize)]
pub struct AuthPageQuery {
    /// Where to continue after a successful sign-in.
    pub redirect: Option<String>,
    /// Reason the visitor landed here (e.g. "session expired").
    pub message: Option<String>,
    /// Inline form error from a failed attempt.
    pub error: Option<String>,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Hidden field carrying the auth page's `redirect` param.
    pub redirect: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirm: String,
    pub redirect: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the auth page.
pub async fn auth_page(Query(query): Query<AuthPageQuery>) -> Html<String> {
    let notice = query.message.as_deref().map_or_else(String::new, |message| {
        format!(r#"<p class="notice">{}</p>"#, escape_html(message))
    });
    let error = query.error.as_deref().map_or_else(String::new, |error| {
        format!(r#"<p class="error">{}</p>"#, escape_html(error))
    });
    let redirect_field = query.redirect.as_deref().map_or_else(String::new, |target| {
        format!(
            r#"<input type="hidden" name="redirect" value="{}">"#,
            escape_html(target)
        )
    });

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Sign in - Pawprint</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <h1>Sign in</h1>
  {notice}
  {error}
  <form method="post" action="/auth/login">
    {redirect_field}
    <input type="email" name="email" placeholder="Email" required>
    <input type="password" name="password" placeholder="Password" required>
    <button type="submit">Sign in</button>
  </form>
  <h2>New here?</h2>
  <form method="post" action="/auth/register">
    {redirect_field}
    <input type="text" name="name" placeholder="Name" required>
    <input type="email" name="email" placeholder="Email" required>
    <input type="tel" name="phone" placeholder="Phone" required>
    <input type="password" name="password" placeholder="Password" required>
    <input type="password" name="password_confirm" placeholder="Repeat password" required>
    <button type="submit">Create account</button>
  </form>
</body>
</html>"#
    ))
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let input = LoginInput {
        email: form.email,
        password: form.password,
    };

    match state.session().sign_in(&input).await {
        Ok((key, _profile)) => signed_in_response(&state, jar, key.expose(), form.redirect.as_deref()),
        Err(error) => {
            tracing::warn!(%error, "login failed");
            retry_response(form.redirect.as_deref(), &form_error(&error))
        }
    }
}

/// Handle registration form submission.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.password_confirm {
        return retry_response(form.redirect.as_deref(), "Passwords do not match");
    }
    if form.password.len() < MIN_PASSWORD_LENGTH {
        return retry_response(
            form.redirect.as_deref(),
            "Password must be at least 8 characters",
        );
    }

    let input = RegisterInput {
        name: form.name,
        email: form.email,
        phone: form.phone,
        password: form.password,
    };

    match state.session().sign_up(&input).await {
        Ok((key, _profile)) => signed_in_response(&state, jar, key.expose(), form.redirect.as_deref()),
        Err(error) => {
            tracing::warn!(%error, "registration failed");
            retry_response(form.redirect.as_deref(), &form_error(&error))
        }
    }
}

/// Handle logout.
///
/// Local sign-out always succeeds; the response expires the session
/// cookie and issues the pending navigation (home).
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    state.session().logout().await;

    let target = state
        .session()
        .take_redirect()
        .map_or_else(|| "/".to_owned(), |event| event.redirect_path);

    (jar.add(expired_session_cookie()), Redirect::to(&target)).into_response()
}

// =============================================================================
// Helpers
// =============================================================================

/// Set the session cookie and continue to the requested page.
fn signed_in_response(
    state: &AppState,
    jar: CookieJar,
    key: &str,
    redirect: Option<&str>,
) -> Response {
    let jar = jar.add(session_cookie(key, state.config().use_secure_cookies()));
    let target = redirect
        .filter(|target| target.starts_with('/') && !target.starts_with("//"))
        .unwrap_or("/");
    (jar, Redirect::to(target)).into_response()
}

/// Send the visitor back to the auth page with an inline error.
fn retry_response(redirect: Option<&str>, message: &str) -> Response {
    let mut location = format!("/auth?error={}", urlencoding::encode(message));
    if let Some(redirect) = redirect {
        location.push_str("&redirect=");
        location.push_str(&urlencoding::encode(redirect));
    }
    Redirect::to(&location).into_response()
}

/// Human-readable form error for a failed sign-in/sign-up.
fn form_error(error: &SessionError) -> String {
    match error {
        // The backend's own message (wrong password, email taken, ...)
        SessionError::Backend(BackendError::Status { message, .. }) => message.clone(),
        SessionError::Unauthorized => "Invalid email or password".to_owned(),
        SessionError::Backend(_) => {
            "The service is temporarily unavailable, please try again".to_owned()
        }
    }
}
