//! Contact repository for database operations.
//!
//! Queries are checked at runtime (`sqlx::query_as`) so the crate builds
//! without a live database or an offline query cache.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use contact_desk_core::{Contact, ContactDraft, ContactId, Email};

use super::{ContactStore, RepositoryError};

const CONTACT_COLUMNS: &str = "id, name, email, message, created_at";

/// Newest first. Rows without a timestamp sort after all others, matching
/// the in-memory store.
const NEWEST_FIRST: &str = "created_at DESC NULLS LAST, id DESC";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` contact queries.
#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    id: i32,
    name: String,
    email: String,
    message: String,
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = RepositoryError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: ContactId::new(row.id),
            name: row.name,
            email,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` repository for contact records.
#[derive(Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for ContactRepository {
    async fn list_all(&self) -> Result<Vec<Contact>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM desk.contact ORDER BY {NEWEST_FIRST}"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get_by_id(&self, id: ContactId) -> Result<Option<Contact>, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM desk.contact WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn create(&self, draft: &ContactDraft) -> Result<Contact, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "INSERT INTO desk.contact (name, email, message) \
             VALUES ($1, $2, $3) \
             RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.message)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(
        &self,
        id: ContactId,
        draft: &ContactDraft,
    ) -> Result<Option<Contact>, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "UPDATE desk.contact SET name = $2, email = $3, message = $4 \
             WHERE id = $1 \
             RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.message)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: ContactId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM desk.contact WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
