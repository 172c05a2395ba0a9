//! Database operations for the Contact Desk `PostgreSQL` schema.
//!
//! # Schema: `desk`
//!
//! ## Tables
//!
//! - `contact` - Inbound contact messages
//! - `admin_user` - Admin credentials (Argon2id password hashes)
//! - `session` - tower-sessions storage for the admin panel
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p contact-desk-cli -- migrate
//! ```
//!
//! # Stores
//!
//! Handlers and services depend on the [`ContactStore`] and [`AdminUserStore`]
//! traits. The `PostgreSQL` repositories implement them for production and
//! [`memory`] provides in-process implementations for tests.

pub mod admin_users;
pub mod contacts;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use contact_desk_core::{Contact, ContactDraft, ContactId};

use crate::models::AdminUser;

pub use admin_users::AdminUserRepository;
pub use contacts::ContactRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence port for contact records.
///
/// Every mutating method is a single statement, so a failure leaves no
/// partially-applied row behind.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// All contacts, newest first (`created_at DESC, id DESC`).
    async fn list_all(&self) -> Result<Vec<Contact>, RepositoryError>;

    /// Load one contact by id.
    async fn get_by_id(&self, id: ContactId) -> Result<Option<Contact>, RepositoryError>;

    /// Insert a new contact; the store assigns `id` and `created_at`.
    async fn create(&self, draft: &ContactDraft) -> Result<Contact, RepositoryError>;

    /// Overwrite name, email and message. Returns `None` when no row has `id`.
    async fn update(
        &self,
        id: ContactId,
        draft: &ContactDraft,
    ) -> Result<Option<Contact>, RepositoryError>;

    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: ContactId) -> Result<bool, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Persistence port for admin credentials.
#[async_trait]
pub trait AdminUserStore: Send + Sync {
    /// Look up an admin by exact username.
    async fn get_by_username(&self, username: &str) -> Result<Option<AdminUser>, RepositoryError>;

    /// Insert a new admin.
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    async fn create(&self, username: &str, password_hash: &str)
    -> Result<AdminUser, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
fn conflict_or_database(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}
