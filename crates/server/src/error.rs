//! Unified error handling with Sentry integration.
//!
//! Every failure ends in a redirect. Handlers attach a human-readable message
//! to an [`AppError`] with [`OrRedirect::or_redirect`]; the resulting
//! [`HandlerError`] logs the cause, reports server errors to Sentry, and sends
//! the browser back to the landing page with the message in the `error`
//! query parameter. Missing posts and failed ownership checks are the two
//! silent exceptions.

use axum::response::{IntoResponse, Redirect, Response};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, UploadError};

/// Application-level error type for the blog.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Storing an upload failed.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Reading or writing the session failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Malformed multipart body.
    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// Required form field absent or empty.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found. Redirects to the dashboard without a message.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Role or ownership check failed. Redirects to `redirect_to` without a message.
    #[error("Authorization denied")]
    AuthorizationDenied {
        /// Where to send the user instead.
        redirect_to: String,
    },
}

impl AppError {
    /// Whether this error indicates a server-side fault worth reporting.
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Upload(_) | Self::Session(_)
        ) || matches!(self, Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash))
    }
}

/// An [`AppError`] paired with the message shown to the user.
#[derive(Debug)]
pub struct HandlerError {
    error: AppError,
    message: &'static str,
}

impl HandlerError {
    /// Pair an error with a user-facing message.
    #[must_use]
    pub const fn new(error: AppError, message: &'static str) -> Self {
        Self { error, message }
    }

    /// The underlying error.
    #[must_use]
    pub const fn error(&self) -> &AppError {
        &self.error
    }
}

impl From<AppError> for HandlerError {
    fn from(error: AppError) -> Self {
        Self::new(error, GENERIC_ERROR)
    }
}

/// Message used when a handler did not provide one.
pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self.error {
            AppError::NotFound(what) => {
                tracing::debug!(%what, "Not found, redirecting to dashboard");
                Redirect::to("/dashboard").into_response()
            }
            AppError::AuthorizationDenied { redirect_to } => {
                tracing::warn!(%redirect_to, "Authorization denied");
                Redirect::to(&redirect_to).into_response()
            }
            error => {
                if error.is_server_error() {
                    let event_id = sentry::capture_error(&error);
                    tracing::error!(
                        error = %error,
                        sentry_event_id = %event_id,
                        "Request error"
                    );
                } else {
                    tracing::warn!(error = %error, "Request rejected");
                }
                redirect_home_with_error(self.message).into_response()
            }
        }
    }
}

/// Attach a user-facing message to a fallible result.
pub trait OrRedirect<T> {
    /// Convert the error into a [`HandlerError`] carrying `message`.
    ///
    /// # Errors
    ///
    /// Returns the converted error if `self` is `Err`.
    fn or_redirect(self, message: &'static str) -> Result<T>;
}

impl<T, E> OrRedirect<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn or_redirect(self, message: &'static str) -> Result<T> {
        self.map_err(|e| HandlerError::new(e.into(), message))
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, HandlerError>;

/// Landing page URL carrying `message` in the `error` query parameter.
#[must_use]
pub fn home_with_error(message: &str) -> String {
    format!("/?error={}", urlencoding::encode(message))
}

/// Redirect to the landing page with an error message.
#[must_use]
pub fn redirect_home_with_error(message: &str) -> Redirect {
    Redirect::to(&home_with_error(message))
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_owned()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{StatusCode, header::LOCATION};

    use super::*;

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[test]
    fn test_home_with_error_encodes_message() {
        assert_eq!(
            home_with_error("Invalid username or password."),
            "/?error=Invalid%20username%20or%20password."
        );
        assert_eq!(home_with_error("a&b=c"), "/?error=a%26b%3Dc");
    }

    #[test]
    fn test_server_error_redirects_home_with_message() {
        let err = HandlerError::new(
            AppError::Database(RepositoryError::Database(sqlx::Error::PoolClosed)),
            "Error fetching dashboard data.",
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&response),
            "/?error=Error%20fetching%20dashboard%20data."
        );
    }

    #[test]
    fn test_client_error_redirects_home_with_message() {
        let err = HandlerError::new(
            AppError::MissingField("title"),
            "Error creating blog post.",
        );
        let response = err.into_response();
        assert_eq!(location(&response), "/?error=Error%20creating%20blog%20post.");
    }

    #[test]
    fn test_not_found_is_silent() {
        let err = HandlerError::new(AppError::NotFound("post 9".into()), "unused");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
    }

    #[test]
    fn test_authorization_denied_is_silent() {
        let err = HandlerError::new(
            AppError::AuthorizationDenied {
                redirect_to: "/blog/3".into(),
            },
            "unused",
        );
        assert_eq!(location(&err.into_response()), "/blog/3");
    }

    #[test]
    fn test_or_redirect_keeps_message() {
        let result: std::result::Result<(), RepositoryError> =
            Err(RepositoryError::Database(sqlx::Error::PoolClosed));
        let err = result.or_redirect("Error fetching blog post.").unwrap_err();
        assert!(matches!(err.error(), AppError::Database(_)));
        assert_eq!(
            location(&err.into_response()),
            "/?error=Error%20fetching%20blog%20post."
        );
    }

    #[test]
    fn test_server_error_classification() {
        let unavailable = RepositoryError::Database(sqlx::Error::PoolClosed);
        assert!(AppError::Database(unavailable).is_server_error());
        assert!(AppError::Auth(AuthError::PasswordHash).is_server_error());
        assert!(!AppError::Auth(AuthError::InvalidCredentials).is_server_error());
        assert!(!AppError::MissingField("title").is_server_error());
    }
}
