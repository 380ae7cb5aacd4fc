//! In-process [`BlogStore`] for tests and local development.
//!
//! Mirrors the constraints of the `PostgreSQL` schema: usernames are unique,
//! posts must reference an existing user, IDs are assigned sequentially
//! starting at 1.

use std::collections::BTreeMap;

use async_trait::async_trait;
use inkpost_core::{PostId, Role, UserId, Username};
use tokio::sync::RwLock;

use super::{BlogStore, RepositoryError};
use crate::models::{BlogPost, NewPost, PostWithAuthor, User};

#[derive(Default)]
struct Inner {
    users: BTreeMap<UserId, (User, String)>,
    posts: BTreeMap<PostId, BlogPost>,
    next_user_id: i32,
    next_post_id: i32,
}

impl Inner {
    fn find_by_username(&self, username: &str) -> Option<&(User, String)> {
        self.users
            .values()
            .find(|(user, _)| user.username.as_str() == username)
    }
}

/// Store that keeps users and posts in memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
        role: &Role,
    ) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.find_by_username(username.as_str()).is_some() {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }

        inner.next_user_id += 1;
        let user = User {
            id: UserId::new(inner.next_user_id),
            username: username.clone(),
            role: role.clone(),
        };
        inner
            .users
            .insert(user.id, (user.clone(), password_hash.to_owned()));

        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.find_by_username(username).map(|(user, _)| user.clone()))
    }

    async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.find_by_username(username).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.posts.values().cloned().collect())
    }

    async fn get_post(&self, id: PostId) -> Result<Option<PostWithAuthor>, RepositoryError> {
        let inner = self.inner.read().await;
        let Some(post) = inner.posts.get(&id) else {
            return Ok(None);
        };

        let (author, _) = inner.users.get(&post.user_id).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("post {id} has no owner"))
        })?;

        Ok(Some(PostWithAuthor {
            post: post.clone(),
            author: author.username.clone(),
        }))
    }

    async fn create_post(&self, post: &NewPost) -> Result<BlogPost, RepositoryError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&post.user_id) {
            return Err(RepositoryError::Conflict(
                "post owner references a missing row".to_owned(),
            ));
        }

        inner.next_post_id += 1;
        let created = BlogPost {
            id: PostId::new(inner.next_post_id),
            title: post.title.clone(),
            description: post.description.clone(),
            image: post.image.clone(),
            user_id: post.user_id,
        };
        inner.posts.insert(created.id, created.clone());

        Ok(created)
    }

    async fn delete_post(&self, id: PostId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        Ok(inner.posts.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
