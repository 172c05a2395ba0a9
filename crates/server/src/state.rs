//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AnalyzeConfig;
use crate::db::{AdminUserStore, ContactStore};
use crate::services::{ClassifierError, ContactService, ImageClassifier};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Stores and the classifier are trait objects
/// so that tests can substitute in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    contacts: ContactService,
    admin_users: Arc<dyn AdminUserStore>,
    classifier: Arc<dyn ImageClassifier>,
    http: reqwest::Client,
    analyze: AnalyzeConfig,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns `ClassifierError::Setup` if the image download client cannot
    /// be built.
    pub fn new(
        contacts: Arc<dyn ContactStore>,
        admin_users: Arc<dyn AdminUserStore>,
        classifier: Arc<dyn ImageClassifier>,
        analyze: AnalyzeConfig,
    ) -> Result<Self, ClassifierError> {
        let http = reqwest::Client::builder()
            .timeout(analyze.timeout)
            .build()
            .map_err(|e| ClassifierError::Setup(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                contacts: ContactService::new(contacts),
                admin_users,
                classifier,
                http,
                analyze,
            }),
        })
    }

    /// Get the contact service.
    #[must_use]
    pub fn contacts(&self) -> &ContactService {
        &self.inner.contacts
    }

    /// Get the admin user store.
    #[must_use]
    pub fn admin_users(&self) -> &dyn AdminUserStore {
        self.inner.admin_users.as_ref()
    }

    /// Get the image classifier.
    #[must_use]
    pub fn classifier(&self) -> &dyn ImageClassifier {
        self.inner.classifier.as_ref()
    }

    /// HTTP client used to download images by URL.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Image analysis limits and endpoint settings.
    #[must_use]
    pub fn analyze_config(&self) -> &AnalyzeConfig {
        &self.inner.analyze
    }
}
