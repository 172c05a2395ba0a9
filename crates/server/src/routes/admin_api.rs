//! Machine-facing admin API for contacts.
//!
//! Every handler takes [`RequireApiAdmin`] first, so authentication is
//! checked before the path or body is looked at.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
    routing::{get, put},
};
use serde_json::{Value, json};
use tracing::instrument;

use contact_desk_core::{Contact, ContactId, ContactSubmission};

use super::contact::ContactEnvelope;
use crate::error::AppError;
use crate::middleware::RequireApiAdmin;
use crate::services::{DeleteContact, ListContacts, UpdateContact};
use crate::state::AppState;

/// Build the admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/api/contacts", get(list))
        .route("/admin/api/contacts/{id}", put(update).delete(remove))
}

/// Non-integer ids match no contact.
fn contact_id(path: Result<Path<i32>, PathRejection>) -> Result<ContactId, AppError> {
    path.map(|Path(id)| ContactId::new(id))
        .map_err(|_| AppError::NotFound("Contact not found".to_owned()))
}

/// List all contacts, newest first.
///
/// GET /admin/api/contacts
#[instrument(skip_all, fields(admin = %admin.username))]
async fn list(
    RequireApiAdmin(admin): RequireApiAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Contact>>, AppError> {
    let contacts = ListContacts::new(state.contacts()).execute().await?;
    Ok(Json(contacts))
}

/// Overwrite a contact's name, email and message.
///
/// PUT /admin/api/contacts/{id}
#[instrument(skip_all, fields(admin = %admin.username))]
async fn update(
    RequireApiAdmin(admin): RequireApiAdmin,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<Json<ContactEnvelope>, AppError> {
    let id = contact_id(path)?;
    let Json(submission) = body?;

    let contact = UpdateContact::new(state.contacts())
        .execute(id, submission)
        .await?;

    Ok(Json(ContactEnvelope {
        message: "Contact updated successfully",
        contact,
    }))
}

/// Permanently delete a contact.
///
/// DELETE /admin/api/contacts/{id}
#[instrument(skip_all, fields(admin = %admin.username))]
async fn remove(
    RequireApiAdmin(admin): RequireApiAdmin,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let id = contact_id(path)?;

    DeleteContact::new(state.contacts()).execute(id).await?;

    Ok(Json(json!({ "message": "Contact deleted" })))
}
