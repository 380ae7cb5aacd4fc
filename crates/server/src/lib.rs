//! Inkpost blog server library.
//!
//! This crate provides the blog as a library, allowing the binary, the CLI
//! and the integration tests to share one router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::security_headers_middleware;
use crate::state::AppState;

/// Build the application router.
///
/// Routes are served first; anything unmatched falls through to static
/// files under the configured public directory, which is also where
/// uploaded images are served from.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let public_dir = ServeDir::new(&state.config().public_dir);
    let body_limit = DefaultBodyLimit::max(state.config().max_upload_bytes);

    Router::new()
        .merge(routes::routes())
        .fallback_service(public_dir)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
