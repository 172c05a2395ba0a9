//! Admin authentication service.
//!
//! Admins log in with a username and password, either through the login form
//! (which then sets a session) or with HTTP Basic credentials on each API
//! request. Passwords are stored as Argon2id PHC strings.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::db::{AdminUserStore, RepositoryError};
use crate::models::AdminUser;

/// Minimum password length for newly provisioned admins.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Admin authentication service.
pub struct AuthService<'a> {
    users: &'a dyn AdminUserStore,
}

impl<'a> AuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn AdminUserStore) -> Self {
        Self { users }
    }

    /// Check a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user does not exist or
    /// the password does not match.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminUser, AuthError> {
        let user = self
            .users
            .get_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, user.password_hash.expose_secret())?;

        Ok(user)
    }

    /// Provision a new admin with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername`, `AuthError::WeakPassword`, or
    /// `AuthError::UserAlreadyExists` if the username is taken.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn create_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminUser, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::InvalidUsername(
                "username must not be empty".to_owned(),
            ));
        }
        validate_password(password)?;

        let hash = hash_password(password)?;

        let user = self
            .users
            .create(username, &hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(admin_id = %user.id, "Admin user created");
        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
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

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or an unparseable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryAdminUserStore;

    #[test]
    fn test_hash_is_not_plaintext_and_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_create_then_verify() {
        let store = MemoryAdminUserStore::new();
        let auth = AuthService::new(&store);

        let created = auth.create_admin("admin", "s3cret-pass").await.unwrap();
        let verified = auth.verify_credentials("admin", "s3cret-pass").await.unwrap();

        assert_eq!(created.id, verified.id);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_the_same() {
        let store = MemoryAdminUserStore::new();
        let auth = AuthService::new(&store);
        auth.create_admin("admin", "s3cret-pass").await.unwrap();

        let unknown = auth.verify_credentials("nobody", "s3cret-pass").await;
        let wrong = auth.verify_credentials("admin", "not-the-pass").await;

        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_admin_rejected() {
        let store = MemoryAdminUserStore::new();
        let auth = AuthService::new(&store);
        auth.create_admin("admin", "s3cret-pass").await.unwrap();

        assert!(matches!(
            auth.create_admin("admin", "other-pass").await,
            Err(AuthError::UserAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_short_password_and_blank_username_rejected() {
        let store = MemoryAdminUserStore::new();
        let auth = AuthService::new(&store);

        assert!(matches!(
            auth.create_admin("admin", "short").await,
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            auth.create_admin("   ", "long-enough").await,
            Err(AuthError::InvalidUsername(_))
        ));
    }
}
