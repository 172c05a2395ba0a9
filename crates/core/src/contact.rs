//! The persisted contact record.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{ContactId, Email};

/// One inbound contact message as stored.
///
/// `id` and `created_at` are assigned by the store on insert and are never
/// changed by an update.
///
/// Serializes as `{id, name, email, message, created_at}` with `created_at`
/// as an RFC 3339 timestamp or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: Email,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
}
