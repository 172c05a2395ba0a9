//! Admin user domain type.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use contact_desk_core::AdminUserId;

/// An admin user (domain type).
#[derive(Debug, Clone)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Login name, unique across admins.
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: SecretString,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
}
