//! Blog post domain types and the authorization rules around them.

use inkpost_core::{PostId, UserId, Username};

use super::User;

/// Image path used when a post is created without an upload.
pub const DEFAULT_IMAGE: &str = "/img/default.jpg";

/// A blog post (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogPost {
    /// Unique post ID.
    pub id: PostId,
    /// Post title.
    pub title: String,
    /// Post body.
    pub description: String,
    /// Public path of the post image.
    pub image: String,
    /// Owning user.
    pub user_id: UserId,
}

/// A blog post joined with its author's username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostWithAuthor {
    /// The post itself.
    pub post: BlogPost,
    /// Username of the owning user.
    pub author: Username,
}

/// Data required to create a blog post.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Post title.
    pub title: String,
    /// Post body.
    pub description: String,
    /// Public image path.
    pub image: String,
    /// Owning user.
    pub user_id: UserId,
}

/// Whether `user` may create posts.
///
/// Role only: every post is owned by its creator, so there is nothing else to check.
#[must_use]
pub fn can_create_post(user: &User) -> bool {
    user.is_admin()
}

/// Whether `user` may delete `post`.
///
/// Requires the admin role and ownership of the post.
#[must_use]
pub fn can_delete_post(user: &User, post: &BlogPost) -> bool {
    user.is_admin() && user.id == post.user_id
}
