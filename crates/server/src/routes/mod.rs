//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Public API
//! POST   /api/contact              - Submit a contact message
//! POST   /api/analyze              - Classify an uploaded or linked image
//!
//! # Admin API (session or HTTP Basic credentials)
//! GET    /admin/api/contacts       - List contacts, newest first
//! PUT    /admin/api/contacts/{id}  - Update a contact
//! DELETE /admin/api/contacts/{id}  - Delete a contact
//!
//! # Admin panel (session)
//! GET    /admin                    - Redirect to dashboard
//! GET    /admin/login              - Login form
//! POST   /admin/login              - Check credentials, start session
//! GET    /admin/logout             - End session
//! POST   /admin/logout             - End session
//! GET    /admin/dashboard          - Contact table with edit/delete
//! ```

use axum::Router;

use crate::state::AppState;

pub mod admin_api;
pub mod admin_ui;
pub mod analyze;
pub mod contact;

/// Build the application routes.
///
/// `max_upload_bytes` bounds the request body accepted by `/api/analyze`.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(contact::router())
        .merge(analyze::router(max_upload_bytes))
        .merge(admin_api::router())
        .merge(admin_ui::router())
}
