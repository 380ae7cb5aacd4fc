//! Blog post repository for database operations.

use inkpost_core::{PostId, UserId, Username};
use sqlx::PgPool;

use super::{RepositoryError, map_constraint_error};
use crate::models::{BlogPost, NewPost, PostWithAuthor};

/// Raw `blog.posts` row.
#[derive(sqlx::FromRow)]
struct PostRow {
    id: i32,
    title: String,
    description: String,
    image: String,
    user_id: i32,
}

/// `blog.posts` row joined with the author's username.
#[derive(sqlx::FromRow)]
struct PostWithAuthorRow {
    id: i32,
    title: String,
    description: String,
    image: String,
    user_id: i32,
    username: String,
}

impl PostRow {
    fn into_post(self) -> BlogPost {
        BlogPost {
            id: PostId::new(self.id),
            title: self.title,
            description: self.description,
            image: self.image,
            user_id: UserId::new(self.user_id),
        }
    }
}

/// Repository for blog post database operations.
pub struct PostRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all posts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let rows: Vec<PostRow> = sqlx::query_as(
            r"
            SELECT id, title, description, image, user_id
            FROM blog.posts
            ORDER BY id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(PostRow::into_post).collect())
    }

    /// Get a post and its author's username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the author's username is invalid.
    pub async fn get_with_author(
        &self,
        id: PostId,
    ) -> Result<Option<PostWithAuthor>, RepositoryError> {
        let row: Option<PostWithAuthorRow> = sqlx::query_as(
            r"
            SELECT p.id, p.title, p.description, p.image, p.user_id, u.username
            FROM blog.posts p
            JOIN blog.users u ON u.id = p.user_id
            WHERE p.id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let author = Username::parse(&r.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Some(PostWithAuthor {
            post: BlogPost {
                id: PostId::new(r.id),
                title: r.title,
                description: r.description,
                image: r.image,
                user_id: UserId::new(r.user_id),
            },
            author,
        }))
    }

    /// Create a new post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owning user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, post: &NewPost) -> Result<BlogPost, RepositoryError> {
        let row: PostRow = sqlx::query_as(
            r"
            INSERT INTO blog.posts (title, description, image, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, image, user_id
            ",
        )
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.image)
        .bind(post.user_id.as_i32())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "post owner"))?;

        Ok(row.into_post())
    }

    /// Delete a post by ID.
    ///
    /// # Returns
    ///
    /// Returns `true` if the post was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: PostId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM blog.posts
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
