//! One type per client intent.
//!
//! Route handlers construct the use case they need from the shared
//! [`ContactService`] and call `execute`. Each use case delegates to exactly
//! one service operation and has the same contract.

use contact_desk_core::{Contact, ContactId, ContactSubmission};

use super::contacts::{ContactError, ContactService};

/// Submit a new contact message.
pub struct CreateContact<'a> {
    service: &'a ContactService,
}

impl<'a> CreateContact<'a> {
    #[must_use]
    pub const fn new(service: &'a ContactService) -> Self {
        Self { service }
    }

    /// See [`ContactService::create_contact`].
    ///
    /// # Errors
    ///
    /// Returns `ContactError::ValidationFailed` or `ContactError::PersistenceFailed`.
    pub async fn execute(&self, submission: ContactSubmission) -> Result<Contact, ContactError> {
        self.service.create_contact(submission).await
    }
}

/// List every stored contact.
pub struct ListContacts<'a> {
    service: &'a ContactService,
}

impl<'a> ListContacts<'a> {
    #[must_use]
    pub const fn new(service: &'a ContactService) -> Self {
        Self { service }
    }

    /// See [`ContactService::list_contacts`].
    ///
    /// # Errors
    ///
    /// Returns `ContactError::PersistenceFailed` if the store cannot be read.
    pub async fn execute(&self) -> Result<Vec<Contact>, ContactError> {
        self.service.list_contacts().await
    }
}

/// Overwrite an existing contact.
pub struct UpdateContact<'a> {
    service: &'a ContactService,
}

impl<'a> UpdateContact<'a> {
    #[must_use]
    pub const fn new(service: &'a ContactService) -> Self {
        Self { service }
    }

    /// See [`ContactService::update_contact`].
    ///
    /// # Errors
    ///
    /// Returns `ContactError::ValidationFailed`, `ContactError::NotFound`, or
    /// `ContactError::PersistenceFailed`.
    pub async fn execute(
        &self,
        id: ContactId,
        submission: ContactSubmission,
    ) -> Result<Contact, ContactError> {
        self.service.update_contact(id, submission).await
    }
}

/// Permanently delete a contact.
pub struct DeleteContact<'a> {
    service: &'a ContactService,
}

impl<'a> DeleteContact<'a> {
    #[must_use]
    pub const fn new(service: &'a ContactService) -> Self {
        Self { service }
    }

    /// See [`ContactService::delete_contact`].
    ///
    /// # Errors
    ///
    /// Returns `ContactError::NotFound` or `ContactError::PersistenceFailed`.
    pub async fn execute(&self, id: ContactId) -> Result<(), ContactError> {
        self.service.delete_contact(id).await
    }
}
