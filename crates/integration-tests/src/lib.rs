//! Integration test harness for Pawprint.
//!
//! Spawns an in-process mock of the pet-shop backend on an ephemeral
//! port and builds the storefront router against it. Tests drive the
//! router with `tower::ServiceExt::oneshot`, so the whole stack - route
//! guard, session provider, interceptor, teardown - is exercised
//! without any external services.
//!
//! The mock counts calls per endpoint and can be switched into failure
//! modes mid-test, which is how the exactly-once teardown and
//! freshness-window properties are observed.

// Test support crate: panicking on broken fixtures is the right move.
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use pawprint_storefront::config::StorefrontConfig;
use pawprint_storefront::routes;
use pawprint_storefront::state::AppState;

/// The API key the mock backend issues on login/register.
pub const TEST_API_KEY: &str = "test-key-123";

/// Password the mock backend rejects with 401.
pub const WRONG_PASSWORD: &str = "wrong-password";

// =============================================================================
// Mock pet-shop backend
// =============================================================================

/// Behavior of the mock `GET /user` endpoint.
#[derive(Debug, Clone, Copy)]
pub enum ProfileMode {
    /// Return the sample profile for the test key.
    Success,
    /// 401 with the structured backend contract body.
    UnauthorizedContract,
    /// Bare 401 without a recognizable body.
    UnauthorizedBare,
    /// 500 without a body.
    ServerError,
}

/// Behavior of the mock `POST /user/logout` endpoint.
#[derive(Debug, Clone, Copy)]
pub enum LogoutMode {
    /// 200.
    Success,
    /// 500.
    ServerError,
}

/// Shared observable state of the mock backend.
pub struct MockBackendState {
    pub login_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    profile_mode: Mutex<ProfileMode>,
    logout_mode: Mutex<LogoutMode>,
}

impl MockBackendState {
    fn new() -> Self {
        Self {
            login_calls: AtomicUsize::new(0),
            register_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            profile_mode: Mutex::new(ProfileMode::Success),
            logout_mode: Mutex::new(LogoutMode::Success),
        }
    }

    pub fn set_profile_mode(&self, mode: ProfileMode) {
        *self.profile_mode.lock().unwrap() = mode;
    }

    pub fn set_logout_mode(&self, mode: LogoutMode) {
        *self.logout_mode.lock().unwrap() = mode;
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }
}

/// In-process mock of the pet-shop backend REST API.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<MockBackendState>,
}

impl MockBackend {
    /// Bind an ephemeral port and serve the mock endpoints.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockBackendState::new());

        let router = Router::new()
            .route("/user/register", post(mock_register))
            .route("/user/login", post(mock_login))
            .route("/user", get(mock_profile))
            .route("/user/logout", post(mock_logout))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state }
    }

    /// Base URL of the mock backend.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// The profile the mock backend serves for [`TEST_API_KEY`].
pub fn sample_profile() -> serde_json::Value {
    json!({
        "id": 12,
        "name": "Dana",
        "phone": "+15550100",
        "email": "dana@example.com",
        "discountPercent": 5,
        "totalOrders": 17,
        "uuid": "7f5f2a4e-9c1d-4a67-9f40-2b8f8a1f3c21"
    })
}

async fn mock_login(State(state): State<Arc<MockBackendState>>, body: String) -> Response {
    state.login_calls.fetch_add(1, Ordering::SeqCst);

    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    if parsed.get("password").and_then(serde_json::Value::as_str) == Some(WRONG_PASSWORD) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid email or password"})),
        )
            .into_response();
    }

    TEST_API_KEY.into_response()
}

async fn mock_register(State(state): State<Arc<MockBackendState>>, body: String) -> Response {
    state.register_calls.fetch_add(1, Ordering::SeqCst);

    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    if parsed.get("email").and_then(serde_json::Value::as_str) == Some("taken@example.com") {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "email already registered"})),
        )
            .into_response();
    }

    TEST_API_KEY.into_response()
}

async fn mock_profile(State(state): State<Arc<MockBackendState>>, headers: HeaderMap) -> Response {
    state.profile_calls.fetch_add(1, Ordering::SeqCst);

    let mode = *state.profile_mode.lock().unwrap();
    match mode {
        ProfileMode::Success => {
            let key = headers
                .get("X-Api-Key")
                .and_then(|value| value.to_str().ok());
            if key == Some(TEST_API_KEY) {
                Json(sample_profile()).into_response()
            } else {
                StatusCode::UNAUTHORIZED.into_response()
            }
        }
        ProfileMode::UnauthorizedContract => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "error": "unauthorized",
                "message": "Session expired",
                "redirect": "/auth",
            })),
        )
            .into_response(),
        ProfileMode::UnauthorizedBare => StatusCode::UNAUTHORIZED.into_response(),
        ProfileMode::ServerError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn mock_logout(State(state): State<Arc<MockBackendState>>) -> Response {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);

    match *state.logout_mode.lock().unwrap() {
        LogoutMode::Success => StatusCode::OK.into_response(),
        LogoutMode::ServerError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

// =============================================================================
// Storefront under test
// =============================================================================

/// A storefront wired to a fresh mock backend and a temp credential
/// slot.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub backend: MockBackend,
    pub credential_path: PathBuf,
    _credential_dir: tempfile::TempDir,
}

impl TestApp {
    /// Spawn a storefront with the default 5-minute profile freshness
    /// window.
    pub async fn spawn() -> Self {
        Self::spawn_with_ttl(Duration::from_secs(300)).await
    }

    /// Spawn a storefront with a custom profile freshness window.
    pub async fn spawn_with_ttl(profile_ttl: Duration) -> Self {
        let backend = MockBackend::spawn().await;
        let dir = tempfile::tempdir().unwrap();
        let credential_path = dir.path().join("api_key");

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost:3000".to_owned(),
            api_url: backend.url(),
            credential_file: credential_path.clone(),
            profile_ttl,
            sentry_dsn: None,
        };

        let state = AppState::new(config).unwrap();
        let router = routes::router(state.clone());

        Self {
            router,
            state,
            backend,
            credential_path,
            _credential_dir: dir,
        }
    }

    /// Write [`TEST_API_KEY`] into the credential slot, as a previous
    /// session would have.
    pub fn seed_credential(&self) {
        std::fs::write(&self.credential_path, TEST_API_KEY).unwrap();
    }

    /// Whether the credential slot currently holds a key.
    pub fn credential_present(&self) -> bool {
        std::fs::read_to_string(&self.credential_path)
            .map(|contents| !contents.trim().is_empty())
            .unwrap_or(false)
    }
}

// =============================================================================
// Request helpers
// =============================================================================

/// Build a GET request, optionally carrying the session cookie.
///
/// Sets `x-forwarded-for` so rate-limited routes can key the request.
pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<axum::body::Body> {
    let mut builder = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.7");
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("user_token={token}"));
    }
    builder.body(axum::body::Body::empty()).unwrap()
}

/// Build a POST request with a urlencoded form body.
///
/// Sets `x-forwarded-for` so the auth rate limiter can key the request.
pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<axum::body::Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-forwarded-for", "203.0.113.7");
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("user_token={token}"));
    }
    builder.body(axum::body::Body::from(body.to_owned())).unwrap()
}

/// Read a response body to a string.
pub async fn read_body(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
