//! Contact service.
//!
//! Runs validation before touching the store and turns store results into a
//! typed outcome. Route handlers reach it through [`super::use_cases`].

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use contact_desk_core::{Contact, ContactId, ContactSubmission, ValidationErrors};

use crate::db::{ContactStore, RepositoryError};

/// Errors returned by contact operations.
#[derive(Debug, Error)]
pub enum ContactError {
    /// One or more fields failed validation.
    #[error("validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    /// No contact has the requested id.
    #[error("contact not found")]
    NotFound,

    /// The store rejected or could not complete the operation.
    #[error("persistence failed: {0}")]
    PersistenceFailed(#[from] RepositoryError),
}

/// Orchestrates validation and persistence of contact records.
#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn ContactStore>,
}

impl ContactService {
    /// Create a new contact service over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a new contact.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::ValidationFailed` with every failing field, or
    /// `ContactError::PersistenceFailed` if the insert fails.
    #[instrument(skip(self, submission))]
    pub async fn create_contact(
        &self,
        submission: ContactSubmission,
    ) -> Result<Contact, ContactError> {
        let draft = submission
            .into_draft()
            .map_err(ContactError::ValidationFailed)?;

        let contact = self.store.create(&draft).await?;
        tracing::info!(contact_id = %contact.id, "Contact created");
        Ok(contact)
    }

    /// All contacts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::PersistenceFailed` if the store cannot be read.
    #[instrument(skip(self))]
    pub async fn list_contacts(&self) -> Result<Vec<Contact>, ContactError> {
        Ok(self.store.list_all().await?)
    }

    /// Load a single contact.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::NotFound` if no contact has `id`.
    #[instrument(skip(self), fields(contact_id = %id))]
    pub async fn get_contact(&self, id: ContactId) -> Result<Contact, ContactError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(ContactError::NotFound)
    }

    /// Validate and overwrite name, email and message of an existing contact.
    ///
    /// Validation runs before the lookup, so an invalid body against a
    /// missing id reports the validation errors.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::ValidationFailed`, `ContactError::NotFound`, or
    /// `ContactError::PersistenceFailed`.
    #[instrument(skip(self, submission), fields(contact_id = %id))]
    pub async fn update_contact(
        &self,
        id: ContactId,
        submission: ContactSubmission,
    ) -> Result<Contact, ContactError> {
        let draft = submission
            .into_draft()
            .map_err(ContactError::ValidationFailed)?;

        let contact = self
            .store
            .update(id, &draft)
            .await?
            .ok_or(ContactError::NotFound)?;
        tracing::info!("Contact updated");
        Ok(contact)
    }

    /// Permanently remove a contact.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::NotFound` if no contact has `id`.
    #[instrument(skip(self), fields(contact_id = %id))]
    pub async fn delete_contact(&self, id: ContactId) -> Result<(), ContactError> {
        if !self.store.delete(id).await? {
            return Err(ContactError::NotFound);
        }
        tracing::info!("Contact deleted");
        Ok(())
    }

    /// Check that the underlying store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::PersistenceFailed` if the store does not answer.
    pub async fn ping(&self) -> Result<(), ContactError> {
        Ok(self.store.ping().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use contact_desk_core::Field;

    use super::*;
    use crate::db::memory::MemoryContactStore;

    fn service() -> (ContactService, Arc<MemoryContactStore>) {
        let store = Arc::new(MemoryContactStore::new());
        (ContactService::new(store.clone()), store)
    }

    fn valid() -> ContactSubmission {
        ContactSubmission::new(
            "  Alice  ",
            "alice@example.com",
            "  This is a long enough message  ",
        )
    }

    #[tokio::test]
    async fn test_create_persists_exactly_one_trimmed_record() {
        let (service, store) = service();

        let contact = service.create_contact(valid()).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert!(contact.created_at.is_some());
        assert_eq!(contact.name, "Alice");
        assert_eq!(contact.email.as_str(), "alice@example.com");
        assert_eq!(contact.message, "This is a long enough message");
    }

    #[tokio::test]
    async fn test_create_then_read_round_trips() {
        let (service, _) = service();

        let created = service.create_contact(valid()).await.unwrap();
        let loaded = service.get_contact(created.id).await.unwrap();

        assert_eq!(created, loaded);
    }

    #[tokio::test]
    async fn test_create_reports_all_validation_errors() {
        let (service, store) = service();

        let err = service
            .create_contact(ContactSubmission::new("A", "bad", "short"))
            .await
            .unwrap_err();

        let ContactError::ValidationFailed(errors) = err else {
            panic!("expected validation failure, got {err:?}");
        };
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(Field::Email), Some("Invalid email format"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_surfaces_persistence_failure() {
        let (service, store) = service();
        store.set_unavailable(true);

        let err = service.create_contact(valid()).await.unwrap_err();
        assert!(matches!(err, ContactError::PersistenceFailed(_)));
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found_and_creates_nothing() {
        let (service, store) = service();

        let err = service
            .update_contact(ContactId::new(42), valid())
            .await
            .unwrap_err();

        assert!(matches!(err, ContactError::NotFound));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_validates_before_lookup() {
        let (service, _) = service();

        let err = service
            .update_contact(ContactId::new(42), ContactSubmission::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ContactError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_timestamp() {
        let (service, _) = service();
        let created = service.create_contact(valid()).await.unwrap();

        let updated = service
            .update_contact(
                created.id,
                ContactSubmission::new("Bob", "bob@example.org", "A completely new message"),
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Bob");
        assert_eq!(updated.email.as_str(), "bob@example.org");
    }

    #[tokio::test]
    async fn test_delete_twice_second_is_not_found() {
        let (service, _) = service();
        let created = service.create_contact(valid()).await.unwrap();

        service.delete_contact(created.id).await.unwrap();
        let err = service.delete_contact(created.id).await.unwrap_err();

        assert!(matches!(err, ContactError::NotFound));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (service, _) = service();
        let first = service.create_contact(valid()).await.unwrap();
        let second = service.create_contact(valid()).await.unwrap();

        let ids: Vec<ContactId> = service
            .list_contacts()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();

        assert_eq!(ids, vec![second.id, first.id]);
    }
}
