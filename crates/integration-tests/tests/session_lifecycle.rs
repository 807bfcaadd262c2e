//! Session lifecycle tests against the mock backend.
//!
//! Covers hydration, the profile freshness window, the exactly-once
//! teardown under concurrent 401s, and logout's never-fails contract.

use std::time::Duration;

use axum::http::{StatusCode, header};
use tower::ServiceExt;

use pawprint_integration_tests::{
    LogoutMode, ProfileMode, TestApp, WRONG_PASSWORD, get_request, post_form, read_body,
};
use pawprint_storefront::config::StorefrontConfig;
use pawprint_storefront::state::AppState;

// =============================================================================
// Hydration
// =============================================================================

#[tokio::test]
async fn hydration_with_valid_credential_signs_in() {
    let app = TestApp::spawn().await;
    app.seed_credential();

    app.state.session().init().await;

    let session = app.state.session().state();
    let user = session.user.expect("user is set after hydration");
    assert_eq!(user.email, "dana@example.com");
    assert!(!session.loading);
    assert!(session.initialized);
    assert_eq!(app.backend.state.profile_calls(), 1);
}

#[tokio::test]
async fn hydration_without_credential_is_signed_out() {
    let app = TestApp::spawn().await;

    app.state.session().init().await;

    let session = app.state.session().state();
    assert!(session.user.is_none());
    assert!(!session.loading);
    assert!(session.initialized);
    assert_eq!(app.backend.state.profile_calls(), 0);
}

#[tokio::test]
async fn hydration_with_rejected_credential_tears_down() {
    let app = TestApp::spawn().await;
    app.seed_credential();
    app.backend
        .state
        .set_profile_mode(ProfileMode::UnauthorizedContract);

    app.state.session().init().await;

    let session = app.state.session().state();
    assert!(session.user.is_none());
    assert!(session.initialized);

    // Full teardown: backend logout, credential gone, redirect pending.
    assert_eq!(app.backend.state.logout_calls(), 1);
    assert!(!app.credential_present());
    let event = app
        .state
        .session()
        .take_redirect()
        .expect("redirect pending after teardown");
    assert_eq!(event.redirect_path, "/auth");
    assert_eq!(event.message.as_deref(), Some("Session expired"));
}

#[tokio::test]
async fn hydration_with_backend_error_clears_without_redirect() {
    let app = TestApp::spawn().await;
    app.seed_credential();
    app.backend.state.set_profile_mode(ProfileMode::ServerError);

    app.state.session().init().await;

    let session = app.state.session().state();
    assert!(session.user.is_none());
    assert!(session.initialized);

    // Local clear only: no teardown, no redirect, credential kept.
    assert_eq!(app.backend.state.logout_calls(), 0);
    assert!(app.credential_present());
    assert!(app.state.session().take_redirect().is_none());
}

// =============================================================================
// Freshness window
// =============================================================================

#[tokio::test]
async fn refetch_within_window_reuses_cached_profile() {
    let app = TestApp::spawn().await;
    app.seed_credential();
    app.state.session().init().await;
    assert_eq!(app.backend.state.profile_calls(), 1);

    let first = app.state.session().refetch().await.expect("refetch ok");
    let second = app.state.session().refetch().await.expect("refetch ok");

    assert!(first.is_some());
    assert!(second.is_some());
    assert_eq!(app.backend.state.profile_calls(), 1, "cache served both");
}

#[tokio::test]
async fn refetch_after_invalidation_fetches_live() {
    let app = TestApp::spawn().await;
    app.seed_credential();
    app.state.session().init().await;
    assert_eq!(app.backend.state.profile_calls(), 1);

    app.state.session().invalidate_profile().await;
    let profile = app.state.session().refetch().await.expect("refetch ok");

    assert!(profile.is_some());
    assert_eq!(app.backend.state.profile_calls(), 2);
}

#[tokio::test]
async fn refetch_after_window_expiry_fetches_live() {
    let app = TestApp::spawn_with_ttl(Duration::from_millis(50)).await;
    app.seed_credential();
    app.state.session().init().await;
    assert_eq!(app.backend.state.profile_calls(), 1);

    tokio::time::sleep(Duration::from_millis(120)).await;

    let profile = app.state.session().refetch().await.expect("refetch ok");
    assert!(profile.is_some());
    assert_eq!(app.backend.state.profile_calls(), 2);
}

// =============================================================================
// Exactly-once teardown
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_401s_tear_down_exactly_once() {
    let app = TestApp::spawn().await;
    app.seed_credential();
    app.state.session().init().await;
    assert!(app.state.session().state().user.is_some());

    // The backend session dies; every in-flight profile fetch now 401s.
    app.backend
        .state
        .set_profile_mode(ProfileMode::UnauthorizedContract);
    app.state.session().invalidate_profile().await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let session = app.state.session().clone();
            tokio::spawn(async move { session.refetch().await })
        })
        .collect();
    for task in tasks {
        let _ = task.await.expect("task completes");
    }

    // One backend logout, one credential clear, one pending redirect -
    // no matter how many rejections raced.
    assert_eq!(app.backend.state.logout_calls(), 1);
    assert!(!app.credential_present());
    assert!(app.state.session().state().user.is_none());

    let event = app
        .state
        .session()
        .take_redirect()
        .expect("one redirect pending");
    assert_eq!(event.redirect_path, "/auth");
    assert!(
        app.state.session().take_redirect().is_none(),
        "redirect is consumed at most once"
    );
}

#[tokio::test]
async fn bare_401_without_contract_body_still_tears_down() {
    let app = TestApp::spawn().await;
    app.seed_credential();
    app.backend
        .state
        .set_profile_mode(ProfileMode::UnauthorizedBare);

    app.state.session().init().await;

    assert_eq!(app.backend.state.logout_calls(), 1);
    assert!(!app.credential_present());
    let event = app
        .state
        .session()
        .take_redirect()
        .expect("redirect pending");
    assert_eq!(event.redirect_path, "/auth");
    assert!(event.message.is_some(), "generic teardown carries a reason");
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn logout_clears_locally_when_backend_fails() {
    let app = TestApp::spawn().await;
    app.seed_credential();
    app.state.session().init().await;
    assert!(app.state.session().state().user.is_some());

    app.backend.state.set_logout_mode(LogoutMode::ServerError);
    app.state.session().logout().await;

    assert_eq!(app.backend.state.logout_calls(), 1);
    assert!(app.state.session().state().user.is_none());
    assert!(!app.credential_present());

    let event = app
        .state
        .session()
        .take_redirect()
        .expect("navigation home pending");
    assert_eq!(event.redirect_path, "/");
}

#[tokio::test]
async fn logout_clears_locally_when_backend_is_unreachable() {
    // Reserve a port, then drop the listener so connections are refused.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let dead_addr = listener.local_addr().expect("addr");
    drop(listener);

    let dir = tempfile::tempdir().expect("tempdir");
    let credential_path = dir.path().join("api_key");
    std::fs::write(&credential_path, "stale-key").expect("seed");

    let config = StorefrontConfig {
        host: "127.0.0.1".parse().expect("ip"),
        port: 0,
        base_url: "http://localhost:3000".to_owned(),
        api_url: format!("http://{dead_addr}"),
        credential_file: credential_path.clone(),
        profile_ttl: Duration::from_secs(300),
        sentry_dsn: None,
    };
    let state = AppState::new(config).expect("state");

    state.session().logout().await;

    assert!(state.session().state().user.is_none());
    assert!(!credential_path.exists());
}

// =============================================================================
// HTTP flows
// =============================================================================

#[tokio::test]
async fn login_flow_sets_cookie_and_redirects() {
    let app = TestApp::spawn().await;
    app.state.session().init().await;

    let response = app
        .router
        .clone()
        .oneshot(post_form(
            "/auth/login",
            "email=dana%40example.com&password=hunter2secret&redirect=%2Fpersonal%2Fprofile",
            None,
        ))
        .await
        .expect("router responds");

    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("location header");
    assert_eq!(location, "/personal/profile");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie set")
        .to_str()
        .expect("ascii cookie");
    assert!(set_cookie.contains("user_token=test-key-123"));
    assert!(set_cookie.contains("HttpOnly"));

    assert!(app.state.session().state().user.is_some());
    assert!(app.credential_present());
}

#[tokio::test]
async fn login_failure_returns_inline_error() {
    let app = TestApp::spawn().await;
    app.state.session().init().await;

    let response = app
        .router
        .clone()
        .oneshot(post_form(
            "/auth/login",
            &format!("email=dana%40example.com&password={WRONG_PASSWORD}"),
            None,
        ))
        .await
        .expect("router responds");

    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location");
    assert!(location.starts_with("/auth?error="), "location: {location}");
    assert!(location.contains("Invalid%20email%20or%20password"));
    assert!(app.state.session().state().user.is_none());
}

#[tokio::test]
async fn register_flow_signs_in() {
    let app = TestApp::spawn().await;
    app.state.session().init().await;

    let response = app
        .router
        .clone()
        .oneshot(post_form(
            "/auth/register",
            "name=Dana&email=dana%40example.com&phone=%2B15550100\
             &password=hunter2secret&password_confirm=hunter2secret",
            None,
        ))
        .await
        .expect("router responds");

    assert!(response.status().is_redirection());
    assert!(app.state.session().state().user.is_some());
    assert!(app.credential_present());
}

#[tokio::test]
async fn register_password_mismatch_never_reaches_backend() {
    let app = TestApp::spawn().await;

    let response = app
        .router
        .clone()
        .oneshot(post_form(
            "/auth/register",
            "name=Dana&email=dana%40example.com&phone=%2B15550100\
             &password=hunter2secret&password_confirm=different",
            None,
        ))
        .await
        .expect("router responds");

    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location");
    assert!(location.contains("Passwords%20do%20not%20match"));
    assert_eq!(
        app.backend
            .state
            .register_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn profile_api_serves_json_for_live_session() {
    let app = TestApp::spawn().await;
    app.seed_credential();
    app.state.session().init().await;

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/user/profile", Some("tok")))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    assert!(body.contains("dana@example.com"));
    assert!(body.contains("discountPercent"));
}

#[tokio::test]
async fn profile_page_redirects_when_backend_session_dies() {
    let app = TestApp::spawn().await;
    app.seed_credential();
    app.state.session().init().await;

    // Visitor still has a cookie, but the backend session is dead.
    app.backend
        .state
        .set_profile_mode(ProfileMode::UnauthorizedContract);
    app.state.session().invalidate_profile().await;

    let response = app
        .router
        .clone()
        .oneshot(get_request("/personal/profile", Some("tok")))
        .await
        .expect("router responds");

    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location");
    assert!(location.starts_with("/auth"), "location: {location}");
    assert!(location.contains("message="));

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("cookie expired")
        .to_str()
        .expect("ascii cookie");
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn logout_flow_expires_cookie_and_goes_home() {
    let app = TestApp::spawn().await;
    app.seed_credential();
    app.state.session().init().await;

    let response = app
        .router
        .clone()
        .oneshot(post_form("/auth/logout", "", Some("tok")))
        .await
        .expect("router responds");

    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("location header");
    assert_eq!(location, "/");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("cookie expired")
        .to_str()
        .expect("ascii cookie");
    assert!(set_cookie.contains("user_token="));
    assert!(set_cookie.contains("Max-Age=0"));

    assert!(app.state.session().state().user.is_none());
    assert!(!app.credential_present());
}
