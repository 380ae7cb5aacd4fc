//! `PostgreSQL`-backed [`BlogStore`].

use async_trait::async_trait;
use inkpost_core::{PostId, Role, UserId, Username};
use sqlx::PgPool;

use super::{BlogStore, PostRepository, RepositoryError, UserRepository};
use crate::models::{BlogPost, NewPost, PostWithAuthor, User};

/// Store backed by a `PostgreSQL` connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }

    fn posts(&self) -> PostRepository<'_> {
        PostRepository::new(&self.pool)
    }
}

#[async_trait]
impl BlogStore for PgStore {
    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
        role: &Role,
    ) -> Result<User, RepositoryError> {
        self.users().create(username, password_hash, role).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.users().get_by_id(id).await
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        self.users().get_by_username(username).await
    }

    async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        self.users().get_password_hash(username).await
    }

    async fn list_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        self.posts().list().await
    }

    async fn get_post(&self, id: PostId) -> Result<Option<PostWithAuthor>, RepositoryError> {
        self.posts().get_with_author(id).await
    }

    async fn create_post(&self, post: &NewPost) -> Result<BlogPost, RepositoryError> {
        self.posts().create(post).await
    }

    async fn delete_post(&self, id: PostId) -> Result<bool, RepositoryError> {
        self.posts().delete(id).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
