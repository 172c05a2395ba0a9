//! In-process stores.
//!
//! Behave like the `PostgreSQL` repositories (sequential ids, newest-first
//! listing, unique usernames) without a database. Used by the router tests
//! and by anything that needs a throwaway store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::Mutex;

use contact_desk_core::{AdminUserId, Contact, ContactDraft, ContactId};

use super::{AdminUserStore, ContactStore, RepositoryError};
use crate::models::AdminUser;

#[derive(Default)]
struct ContactTable {
    last_id: i32,
    rows: BTreeMap<ContactId, Contact>,
}

/// In-memory [`ContactStore`].
#[derive(Default)]
pub struct MemoryContactStore {
    table: Mutex<ContactTable>,
    unavailable: AtomicBool,
}

impl MemoryContactStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored contacts.
    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    /// True when no contacts are stored.
    pub async fn is_empty(&self) -> bool {
        self.table.lock().await.rows.is_empty()
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn list_all(&self) -> Result<Vec<Contact>, RepositoryError> {
        self.check_available()?;
        let table = self.table.lock().await;
        let mut contacts: Vec<Contact> = table.rows.values().cloned().collect();
        contacts.sort_by(newest_first);
        Ok(contacts)
    }

    async fn get_by_id(&self, id: ContactId) -> Result<Option<Contact>, RepositoryError> {
        self.check_available()?;
        Ok(self.table.lock().await.rows.get(&id).cloned())
    }

    async fn create(&self, draft: &ContactDraft) -> Result<Contact, RepositoryError> {
        self.check_available()?;
        let mut table = self.table.lock().await;
        table.last_id += 1;
        let contact = Contact {
            id: ContactId::new(table.last_id),
            name: draft.name.clone(),
            email: draft.email.clone(),
            message: draft.message.clone(),
            created_at: Some(Utc::now()),
        };
        table.rows.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn update(
        &self,
        id: ContactId,
        draft: &ContactDraft,
    ) -> Result<Option<Contact>, RepositoryError> {
        self.check_available()?;
        let mut table = self.table.lock().await;
        Ok(table.rows.get_mut(&id).map(|contact| {
            contact.name.clone_from(&draft.name);
            contact.email = draft.email.clone();
            contact.message.clone_from(&draft.message);
            contact.clone()
        }))
    }

    async fn delete(&self, id: ContactId) -> Result<bool, RepositoryError> {
        self.check_available()?;
        Ok(self.table.lock().await.rows.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_available()
    }
}

/// `created_at DESC NULLS LAST, id DESC`.
fn newest_first(a: &Contact, b: &Contact) -> std::cmp::Ordering {
    match (a.created_at, b.created_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
    .then(b.id.cmp(&a.id))
}

/// In-memory [`AdminUserStore`].
#[derive(Default)]
pub struct MemoryAdminUserStore {
    users: Mutex<Vec<AdminUser>>,
}

impl MemoryAdminUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminUserStore for MemoryAdminUserStore {
    async fn get_by_username(&self, username: &str) -> Result<Option<AdminUser>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.username == username) {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }

        let next_id = i32::try_from(users.len() + 1)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let user = AdminUser {
            id: AdminUserId::new(next_id),
            username: username.to_owned(),
            password_hash: SecretString::from(password_hash.to_owned()),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use contact_desk_core::ContactSubmission;

    use super::*;

    fn draft(name: &str) -> ContactDraft {
        ContactSubmission::new(name, "someone@example.com", "A message long enough")
            .into_draft()
            .unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_never_reused() {
        let store = MemoryContactStore::new();
        let first = store.create(&draft("First")).await.unwrap();
        assert!(store.delete(first.id).await.unwrap());
        let second = store.create(&draft("Second")).await.unwrap();

        assert_eq!(first.id, ContactId::new(1));
        assert_eq!(second.id, ContactId::new(2));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryContactStore::new();
        store.create(&draft("Older")).await.unwrap();
        store.create(&draft("Newer")).await.unwrap();

        let names: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Newer", "Older"]);
    }

    #[tokio::test]
    async fn test_missing_timestamps_sort_last() {
        let store = MemoryContactStore::new();
        let undated = store.create(&draft("Undated")).await.unwrap();
        store.create(&draft("Dated")).await.unwrap();
        store
            .table
            .lock()
            .await
            .rows
            .get_mut(&undated.id)
            .unwrap()
            .created_at = None;

        let names: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Dated", "Undated"]);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = MemoryContactStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.create(&draft("Nobody")).await,
            Err(RepositoryError::Database(_))
        ));
        assert!(store.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryAdminUserStore::new();
        store.create("admin", "hash").await.unwrap();
        assert!(matches!(
            store.create("admin", "other").await,
            Err(RepositoryError::Conflict(_))
        ));
    }
}
