//! Session-related types.
//!
//! The session holds nothing but the authenticated user's ID.

use inkpost_core::UserId;
use tower_sessions::Session;

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the logged-in user's ID.
    pub const USER_ID: &str = "user_id";
}

/// Per-request view of the session.
///
/// Read once from the session store and handed to the authentication gate,
/// so handlers never reach into ambient session state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionContext {
    /// The user ID stored at login or registration, if any.
    pub user_id: Option<UserId>,
}

impl SessionContext {
    /// A context with no authenticated user.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// A context referencing the given user.
    #[must_use]
    pub const fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// Read the context from a session.
    ///
    /// A session that cannot be loaded or decoded is treated as anonymous.
    pub async fn load(session: &Session) -> Self {
        match session.get::<UserId>(session_keys::USER_ID).await {
            Ok(user_id) => Self { user_id },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session, treating as anonymous");
                Self::anonymous()
            }
        }
    }
}
