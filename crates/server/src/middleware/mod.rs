//! HTTP middleware stack for the blog server.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, transaction naming)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, `PostgreSQL` or in-memory store)
//! 4. Security headers (CSP, frame options, etc.)
//!
//! The authentication gate is not a layer: handlers opt in by taking a
//! [`RequireUser`] argument.

pub mod auth;
pub mod security_headers;
pub mod session;

pub use auth::{GateError, RequireUser, authenticate, set_session_user};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
