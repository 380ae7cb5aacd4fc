//! Domain models for the blog.

pub mod post;
pub mod session;
pub mod user;

pub use post::{BlogPost, DEFAULT_IMAGE, NewPost, PostWithAuthor, can_create_post, can_delete_post};
pub use session::{SessionContext, session_keys};
pub use user::User;
