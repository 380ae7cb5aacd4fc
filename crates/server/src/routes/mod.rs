//! HTTP route handlers for the blog.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page (login and register forms)
//! POST /register               - Create an account and log in
//! POST /login                  - Log in
//! GET  /logout                 - Destroy the session
//!
//! # Requires a session
//! GET  /dashboard              - List every post
//! GET  /blog/{post_id}         - Post detail
//! GET  /create-post            - New post form (admin)
//! POST /create-post            - Create a post with optional image (admin)
//! POST /delete-post/{post_id}  - Delete a post (admin owner)
//!
//! # Health
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (probes the store)
//! ```
//!
//! Anything else falls through to the static file service.

pub mod auth;
pub mod health;
pub mod home;
pub mod posts;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the complete router for the blog.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/dashboard", get(posts::dashboard))
        .route("/blog/{post_id}", get(posts::show))
        .route(
            "/create-post",
            get(posts::create_page).post(posts::create),
        )
        .route("/delete-post/{post_id}", post(posts::delete))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
}
