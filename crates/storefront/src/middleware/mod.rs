//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (correlation id on every request)
//! 4. Route guard (edge auth gate, before any handler)
//! 5. Rate limiting (auth endpoints only, via the auth router)

pub mod guard;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use guard::route_guard;
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::{SESSION_COOKIE_NAME, expired_session_cookie, session_cookie};
