//! Post route handlers.
//!
//! Every handler here sits behind [`RequireUser`]. Creation needs the admin
//! role; deletion needs the admin role and ownership of the post.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    response::{IntoResponse, Redirect},
};
use inkpost_core::PostId;
use tracing::instrument;

use crate::error::{AppError, OrRedirect, Result};
use crate::filters;
use crate::middleware::RequireUser;
use crate::models::{
    BlogPost, DEFAULT_IMAGE, NewPost, PostWithAuthor, User, can_create_post, can_delete_post,
};
use crate::services::UploadedFile;
use crate::state::AppState;

const DASHBOARD_FAILED: &str = "Error fetching dashboard data.";
const FETCH_POST_FAILED: &str = "Error fetching blog post.";
const CREATE_POST_FAILED: &str = "Error creating blog post.";
const DELETE_POST_FAILED: &str = "Error deleting blog post.";

/// Multipart field carrying the optional image.
pub const IMAGE_FIELD: &str = "image";

// =============================================================================
// Templates
// =============================================================================

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: User,
    pub posts: Vec<BlogPost>,
    pub can_create: bool,
}

/// Post detail template.
#[derive(Template, WebTemplate)]
#[template(path = "blog.html")]
pub struct BlogTemplate {
    pub user: User,
    pub post: PostWithAuthor,
    pub can_delete: bool,
}

/// New post form template.
#[derive(Template, WebTemplate)]
#[template(path = "create_post.html")]
pub struct CreatePostTemplate {
    pub user: User,
}

// =============================================================================
// Handlers
// =============================================================================

/// List every post.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let posts = state
        .store()
        .list_posts()
        .await
        .or_redirect(DASHBOARD_FAILED)?;

    Ok(DashboardTemplate {
        can_create: can_create_post(&user),
        user,
        posts,
    })
}

/// Show a single post.
///
/// An ID that is not a number is handled like one that does not exist.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse> {
    let post_id = parse_post_id(&post_id)?;
    let post = state
        .store()
        .get_post(post_id)
        .await
        .or_redirect(FETCH_POST_FAILED)?
        .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;

    Ok(BlogTemplate {
        can_delete: can_delete_post(&user, &post.post),
        user,
        post,
    })
}

/// Display the new post form.
pub async fn create_page(RequireUser(user): RequireUser) -> Result<impl IntoResponse> {
    if !can_create_post(&user) {
        return Err(AppError::AuthorizationDenied {
            redirect_to: "/dashboard".to_string(),
        }
        .into());
    }

    Ok(CreatePostTemplate { user })
}

/// Create a post from a multipart form.
///
/// The role is checked against a fresh copy of the user before anything is
/// written to disk.
#[instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Redirect> {
    let multipart = multipart
        .map_err(|e| AppError::BadRequest(e.body_text()))
        .or_redirect(CREATE_POST_FAILED)?;
    let form = CreatePostForm::read(multipart)
        .await
        .or_redirect(CREATE_POST_FAILED)?;

    let author = state
        .store()
        .get_user(user.id)
        .await
        .or_redirect(CREATE_POST_FAILED)?
        .filter(can_create_post)
        .ok_or_else(|| AppError::AuthorizationDenied {
            redirect_to: "/dashboard".to_string(),
        })?;

    let image = match &form.image {
        Some(file) => state
            .images()
            .save(file)
            .await
            .or_redirect(CREATE_POST_FAILED)?,
        None => DEFAULT_IMAGE.to_string(),
    };

    let post = state
        .store()
        .create_post(&NewPost {
            title: form.title,
            description: form.description,
            image,
            user_id: author.id,
        })
        .await
        .or_redirect(CREATE_POST_FAILED)?;

    tracing::info!(post_id = %post.id, image = %post.image, "Post created");
    Ok(Redirect::to("/dashboard"))
}

/// Delete a post owned by the current admin.
///
/// Anyone else is sent back to the post without a message.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
) -> Result<Redirect> {
    let post_id = parse_post_id(&post_id)?;
    let found = state
        .store()
        .get_post(post_id)
        .await
        .or_redirect(DELETE_POST_FAILED)?
        .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;

    if !can_delete_post(&user, &found.post) {
        return Err(AppError::AuthorizationDenied {
            redirect_to: format!("/blog/{post_id}"),
        }
        .into());
    }

    let deleted = state
        .store()
        .delete_post(post_id)
        .await
        .or_redirect(DELETE_POST_FAILED)?;
    if deleted {
        tracing::info!(%post_id, "Post deleted");
    }

    Ok(Redirect::to("/dashboard"))
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_post_id(raw: &str) -> std::result::Result<PostId, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("post {raw:?}")))
}

/// Fields of the new post form.
struct CreatePostForm {
    title: String,
    description: String,
    image: Option<UploadedFile>,
}

impl CreatePostForm {
    /// Read the whole multipart body.
    ///
    /// A file part without a filename is what browsers send when no file was
    /// chosen, and counts as no image. Unknown fields are skipped.
    async fn read(mut multipart: Multipart) -> std::result::Result<Self, AppError> {
        let mut title = None;
        let mut description = None;
        let mut image = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "title" => title = Some(field.text().await?),
                "description" => description = Some(field.text().await?),
                IMAGE_FIELD => {
                    let filename = field.file_name().unwrap_or_default().to_owned();
                    let bytes = field.bytes().await?;
                    if filename.is_empty() {
                        continue;
                    }
                    if image.is_some() {
                        return Err(AppError::BadRequest("more than one image".to_string()));
                    }
                    image = Some(UploadedFile {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
                other => tracing::debug!(field = %other, "Ignoring unknown form field"),
            }
        }

        Ok(Self {
            title: title.ok_or(AppError::MissingField("title"))?,
            description: description.ok_or(AppError::MissingField("description"))?,
            image,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post_id() {
        assert_eq!(parse_post_id("7").unwrap(), PostId::new(7));
        assert!(matches!(parse_post_id("abc"), Err(AppError::NotFound(_))));
        assert!(matches!(parse_post_id("7.5"), Err(AppError::NotFound(_))));
        assert!(matches!(parse_post_id("12abc"), Err(AppError::NotFound(_))));
        assert!(matches!(parse_post_id(" 12"), Err(AppError::NotFound(_))));
        assert!(matches!(parse_post_id(""), Err(AppError::NotFound(_))));
    }
}
