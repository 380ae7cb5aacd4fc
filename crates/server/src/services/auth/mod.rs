//! Authentication service.
//!
//! Provides username/password registration and login.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use inkpost_core::{Role, Username};

use crate::db::{BlogStore, RepositoryError};
use crate::models::User;

/// Authentication service.
///
/// Handles user registration and login against any [`BlogStore`].
pub struct AuthService<'a> {
    store: &'a dyn BlogStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn BlogStore) -> Self {
        Self { store }
    }

    /// Register a new user with username, password and role.
    ///
    /// The role is taken as given, so a caller may register as `admin`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username is blank.
    /// Returns `AuthError::MissingPassword` if the password is empty.
    /// Returns `AuthError::UserAlreadyExists` if the username is already registered.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }

        let password_hash = hash_password(password)?;

        let user = self
            .store
            .create_user(&username, &password_hash, &role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user does not exist or
    /// the password is wrong; the two cases are not distinguished.
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .store
            .get_password_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// A malformed stored hash is reported as invalid credentials.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
