//! Authentication gate and extractors.
//!
//! [`authenticate`] decides whether a [`SessionContext`] names an existing
//! user. [`RequireUser`] runs it for every protected route and turns a
//! failure into a redirect to the landing page.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use inkpost_core::UserId;
use thiserror::Error;
use tower_sessions::Session;

use crate::db::{BlogStore, RepositoryError};
use crate::error::{redirect_home_with_error, set_sentry_user};
use crate::models::{SessionContext, User, session_keys};
use crate::state::AppState;

/// Why the gate refused a request.
#[derive(Debug, Error)]
pub enum GateError {
    /// The session carries no user ID.
    #[error("no user in session")]
    Unauthenticated,

    /// The session names a user that no longer exists.
    #[error("session user {0} not found")]
    StaleSession(UserId),

    /// The user lookup failed.
    #[error("user lookup failed: {0}")]
    StoreUnavailable(#[from] RepositoryError),
}

impl GateError {
    /// Message shown on the landing page.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "User not authenticated.",
            Self::StaleSession(_) => "User not found.",
            Self::StoreUnavailable(_) => "Error fetching user.",
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match &self {
            Self::Unauthenticated => tracing::debug!("Rejected anonymous request"),
            Self::StaleSession(user_id) => {
                tracing::warn!(%user_id, "Session references a missing user");
            }
            Self::StoreUnavailable(e) => {
                let event_id = sentry::capture_error(e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "User lookup failed");
            }
        }
        redirect_home_with_error(self.message()).into_response()
    }
}

/// Resolve the session's user against the store.
///
/// Never touches the session itself.
///
/// # Errors
///
/// Returns `GateError::Unauthenticated` when the context has no user,
/// `GateError::StaleSession` when the user no longer exists, and
/// `GateError::StoreUnavailable` when the lookup fails.
pub async fn authenticate(
    store: &dyn BlogStore,
    ctx: &SessionContext,
) -> Result<User, GateError> {
    let user_id = ctx.user_id.ok_or(GateError::Unauthenticated)?;
    store
        .get_user(user_id)
        .await?
        .ok_or(GateError::StaleSession(user_id))
}

/// Extractor that requires an authenticated user.
///
/// If the session does not resolve to a user, the request is redirected to
/// the landing page with an error message.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = GateError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let ctx = match parts.extensions.get::<Session>() {
            Some(session) => SessionContext::load(session).await,
            None => SessionContext::anonymous(),
        };

        let user = authenticate(state.store(), &ctx).await?;
        set_sentry_user(&user.id, user.username.as_str());

        Ok(Self(user))
    }
}

/// Helper to store the logged-in user's ID in the session.
///
/// The session ID is cycled first so a pre-login session ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_session_user(
    session: &Session,
    user_id: UserId,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::USER_ID, user_id).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use axum::http::header::LOCATION;
    use inkpost_core::{PostId, Role, Username};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{BlogPost, NewPost, PostWithAuthor};

    /// A store whose every call fails.
    struct UnavailableStore;

    #[async_trait]
    impl BlogStore for UnavailableStore {
        async fn create_user(
            &self,
            _: &Username,
            _: &str,
            _: &Role,
        ) -> Result<User, RepositoryError> {
            Err(sqlx::Error::PoolClosed.into())
        }
        async fn get_user(&self, _: UserId) -> Result<Option<User>, RepositoryError> {
            Err(sqlx::Error::PoolClosed.into())
        }
        async fn get_user_by_username(&self, _: &str) -> Result<Option<User>, RepositoryError> {
            Err(sqlx::Error::PoolClosed.into())
        }
        async fn get_password_hash(
            &self,
            _: &str,
        ) -> Result<Option<(User, String)>, RepositoryError> {
            Err(sqlx::Error::PoolClosed.into())
        }
        async fn list_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
            Err(sqlx::Error::PoolClosed.into())
        }
        async fn get_post(&self, _: PostId) -> Result<Option<PostWithAuthor>, RepositoryError> {
            Err(sqlx::Error::PoolClosed.into())
        }
        async fn create_post(&self, _: &NewPost) -> Result<BlogPost, RepositoryError> {
            Err(sqlx::Error::PoolClosed.into())
        }
        async fn delete_post(&self, _: PostId) -> Result<bool, RepositoryError> {
            Err(sqlx::Error::PoolClosed.into())
        }
        async fn ping(&self) -> Result<(), RepositoryError> {
            Err(sqlx::Error::PoolClosed.into())
        }
    }

    fn location(err: GateError) -> String {
        err.into_response()
            .headers()
            .get(LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_anonymous_is_unauthenticated() {
        let store = MemoryStore::new();
        let err = authenticate(&store, &SessionContext::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Unauthenticated));
        assert_eq!(location(err), "/?error=User%20not%20authenticated.");
    }

    #[tokio::test]
    async fn test_missing_user_is_stale_session() {
        let store = MemoryStore::new();
        let ctx = SessionContext::for_user(UserId::new(42));
        let err = authenticate(&store, &ctx).await.unwrap_err();
        assert!(matches!(err, GateError::StaleSession(id) if id == UserId::new(42)));
        assert_eq!(location(err), "/?error=User%20not%20found.");
    }

    #[tokio::test]
    async fn test_store_failure_is_store_unavailable() {
        let ctx = SessionContext::for_user(UserId::new(1));
        let err = authenticate(&UnavailableStore, &ctx).await.unwrap_err();
        assert!(matches!(err, GateError::StoreUnavailable(_)));
        assert_eq!(location(err), "/?error=Error%20fetching%20user.");
    }

    #[tokio::test]
    async fn test_existing_user_is_resolved() {
        let store = MemoryStore::new();
        let username = Username::parse("alice").unwrap();
        let created = store
            .create_user(&username, "hash", &Role::admin())
            .await
            .unwrap();

        let user = authenticate(&store, &SessionContext::for_user(created.id))
            .await
            .unwrap();
        assert_eq!(user, created);
        assert!(user.is_admin());
    }
}
