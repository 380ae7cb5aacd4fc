//! A blog store whose post operations fail on demand.
//!
//! User operations go to an inner [`MemoryStore`] so tests can still
//! register and log in before hitting the broken half.

use std::sync::Arc;

use async_trait::async_trait;
use inkpost_core::{PostId, Role, UserId, Username};
use inkpost_server::db::{BlogStore, MemoryStore, RepositoryError};
use inkpost_server::models::{BlogPost, NewPost, PostWithAuthor, User};

/// Which post operations fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFailure {
    /// Listing and fetching posts fail.
    Reads,
    /// Creating and deleting posts fail.
    Writes,
}

/// Wraps a [`MemoryStore`], failing the post operations chosen by [`PostFailure`].
pub struct FailingPostStore {
    inner: Arc<MemoryStore>,
    failure: PostFailure,
}

impl FailingPostStore {
    /// Wrap `inner`, failing `failure` operations.
    #[must_use]
    pub const fn new(inner: Arc<MemoryStore>, failure: PostFailure) -> Self {
        Self { inner, failure }
    }

    fn check(&self, op: PostFailure) -> Result<(), RepositoryError> {
        if self.failure == op {
            return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl BlogStore for FailingPostStore {
    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
        role: &Role,
    ) -> Result<User, RepositoryError> {
        self.inner.create_user(username, password_hash, role).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.get_user(id).await
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        self.inner.get_user_by_username(username).await
    }

    async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        self.inner.get_password_hash(username).await
    }

    async fn list_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        self.check(PostFailure::Reads)?;
        self.inner.list_posts().await
    }

    async fn get_post(&self, id: PostId) -> Result<Option<PostWithAuthor>, RepositoryError> {
        self.check(PostFailure::Reads)?;
        self.inner.get_post(id).await
    }

    async fn create_post(&self, post: &NewPost) -> Result<BlogPost, RepositoryError> {
        self.check(PostFailure::Writes)?;
        self.inner.create_post(post).await
    }

    async fn delete_post(&self, id: PostId) -> Result<bool, RepositoryError> {
        self.check(PostFailure::Writes)?;
        self.inner.delete_post(id).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.inner.ping().await
    }
}
