//! Intercepted HTTP client for the pet-shop backend.
//!
//! One [`ApiClient`] is constructed at process start and every outbound
//! backend call passes through [`ApiClient::execute`]. The client
//! observes each response: a 401 triggers the installed unauthorized
//! observer (the session teardown coordinator) before the response is
//! handed back, unmodified, to the original caller.
//!
//! This replaces the classic global-fetch-override trick with an
//! explicit decorator layer: the hook point is a field, installed once,
//! not a mutated global.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use pawprint_core::{UnauthorizedEvent, UnauthorizedResponse};

use super::{BackendError, ErrorBody};

/// Transport-level request timeout. Request deadlines are owned by the
/// transport; nothing above this layer implements its own timers.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Hook invoked by the client whenever a response carries status 401.
///
/// Implementations must tolerate concurrent and repeated invocation:
/// several in-flight requests can fail with 401 at the same time, and
/// the hook may fire re-entrantly from its own teardown traffic.
pub trait UnauthorizedObserver: Send + Sync {
    /// React to an unauthorized response.
    ///
    /// `event` is the parsed structured rejection when the body matched
    /// the backend contract, `None` for a bare 401.
    fn unauthorized(
        &self,
        event: Option<UnauthorizedEvent>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Client for the pet-shop backend REST API.
///
/// Cheaply cloneable; all clones share the underlying connection pool
/// and the single unauthorized hook point.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    unauthorized_observer: OnceLock<Weak<dyn UnauthorizedObserver>>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::BaseUrl`] if `base_url` is not a valid
    /// absolute URL, and [`BackendError::Http`] if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        // Url::join treats a base without a trailing slash as a file,
        // dropping its last path segment. Normalize once here.
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                unauthorized_observer: OnceLock::new(),
            }),
        })
    }

    /// Install the unauthorized observer.
    ///
    /// Called exactly once during application wiring; later calls are
    /// ignored with a warning. The client holds only a weak reference,
    /// so the observer's lifetime stays owned by the session provider.
    pub fn install_unauthorized_observer(&self, observer: Arc<dyn UnauthorizedObserver>) {
        let weak = Arc::downgrade(&observer);
        if self.inner.unauthorized_observer.set(weak).is_err() {
            tracing::warn!("unauthorized observer already installed, ignoring");
        }
    }

    /// Start building a request against the backend.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::BaseUrl`] if `path` cannot be joined onto
    /// the configured base URL.
    pub fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, BackendError> {
        let url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        Ok(self.inner.http.request(method, url))
    }

    /// Send a request and observe the response.
    ///
    /// The response is buffered in full (status, headers, body) and
    /// returned intact; on status 401 the installed observer runs to
    /// completion first. The 401 is never swallowed or altered here -
    /// callers still see exactly what the backend sent.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] on transport failure. Non-success
    /// statuses are not errors at this layer.
    pub async fn execute(&self, request: reqwest::RequestBuilder) -> Result<ApiResponse, BackendError> {
        let response = request.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        let response = ApiResponse { status, headers, body };

        if status == StatusCode::UNAUTHORIZED {
            self.notify_unauthorized(&response).await;
        }

        Ok(response)
    }

    /// Route a 401 through the installed observer.
    async fn notify_unauthorized(&self, response: &ApiResponse) {
        let Some(observer) = self
            .inner
            .unauthorized_observer
            .get()
            .and_then(Weak::upgrade)
        else {
            tracing::warn!("401 observed but no unauthorized observer is installed");
            return;
        };

        let event = response
            .json::<UnauthorizedResponse>()
            .ok()
            .and_then(UnauthorizedResponse::into_event);

        match &event {
            Some(event) => tracing::debug!(
                redirect = %event.redirect_path,
                "structured unauthorized response"
            ),
            None => tracing::debug!("generic unauthorized response"),
        }

        observer.unauthorized(event).await;
    }
}

/// A fully buffered backend response.
///
/// Buffering lets the interceptor inspect the body on 401 while callers
/// keep complete access to the original status, headers, and payload.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Parse`] if the body is not valid JSON of
    /// the expected shape.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, BackendError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// The body as text (lossy UTF-8).
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The server-provided error message, falling back to a generic
    /// message derived from the HTTP status.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.json::<ErrorBody>()
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("HTTP {}", self.status))
    }

    #[cfg(test)]
    pub(crate) fn fake(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }
}
