//! Database operations for the blog.
//!
//! # Tables (schema `blog`)
//!
//! - `users` - Accounts with username, password hash and role
//! - `posts` - Blog posts, each owned by a user
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Backends
//!
//! Handlers talk to the [`BlogStore`] trait. [`PgStore`] is the production
//! implementation; [`MemoryStore`] keeps everything in process for tests and
//! local development.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p inkpost-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;
pub mod posts;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use inkpost_core::{PostId, Role, UserId, Username};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use posts::PostRepository;
pub use users::UserRepository;

use crate::models::{BlogPost, NewPost, PostWithAuthor, User};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence operations needed by the route handlers.
///
/// `Send + Sync` so an `Arc<dyn BlogStore>` can live in the shared
/// application state.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Create a user.
    ///
    /// Fails with `RepositoryError::Conflict` if the username is taken.
    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
        role: &Role,
    ) -> Result<User, RepositoryError>;

    /// Find a user by ID.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Find a user by username.
    async fn get_user_by_username(&self, username: &str)
    -> Result<Option<User>, RepositoryError>;

    /// Find a user by username together with their password hash.
    async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// List every blog post in ascending ID order.
    async fn list_posts(&self) -> Result<Vec<BlogPost>, RepositoryError>;

    /// Find a post by ID, including its author's username.
    async fn get_post(&self, id: PostId) -> Result<Option<PostWithAuthor>, RepositoryError>;

    /// Create a post.
    ///
    /// Fails with `RepositoryError::Conflict` if the owning user does not exist.
    async fn create_post(&self, post: &NewPost) -> Result<BlogPost, RepositoryError>;

    /// Delete a post. Returns `true` if a post was deleted.
    async fn delete_post(&self, id: PostId) -> Result<bool, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Shared handle to the active store.
pub type StoreHandle = Arc<dyn BlogStore>;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map unique and foreign-key violations to `RepositoryError::Conflict`.
fn map_constraint_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("{what} already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Conflict(format!("{what} references a missing row"));
        }
    }
    RepositoryError::Database(e)
}
