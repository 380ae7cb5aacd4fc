//! User domain types.

use inkpost_core::{Role, UserId, Username};

/// A registered user (domain type).
///
/// The password hash is deliberately absent; it is only ever read
/// alongside the user during login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// Role chosen at registration.
    pub role: Role,
}

impl User {
    /// Whether this user holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
