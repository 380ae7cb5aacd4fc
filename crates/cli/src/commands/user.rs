//! User management commands.

use inkpost_core::{Role, UserId};
use inkpost_server::db::PgStore;
use inkpost_server::services::AuthService;

use super::{CommandError, connect};

/// Create a new user.
///
/// Goes through the same registration path as the web form, so the password
/// is hashed identically.
///
/// # Errors
///
/// Returns `CommandError::Auth` if the username is blank or taken, or the
/// password is empty.
pub async fn create(username: &str, password: &str, role: &str) -> Result<UserId, CommandError> {
    let pool = connect().await?;
    let store = PgStore::new(pool);

    let user = AuthService::new(&store)
        .register(username, password, Role::from(role))
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );
    Ok(user.id)
}
