//! Public contact submission endpoint.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use serde::Serialize;
use tracing::instrument;

use contact_desk_core::{Contact, ContactSubmission};

use crate::error::AppError;
use crate::services::CreateContact;
use crate::state::AppState;

/// Envelope for a contact that was just written.
#[derive(Debug, Serialize)]
pub struct ContactEnvelope {
    pub message: &'static str,
    pub contact: Contact,
}

/// Build the contact router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/contact", post(submit))
}

/// Submit a contact message.
///
/// POST /api/contact
///
/// Responds 201 with the stored contact, or 400 with the failing fields.
#[instrument(skip(state, body))]
async fn submit(
    State(state): State<AppState>,
    body: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactEnvelope>), AppError> {
    let Json(submission) = body?;

    let contact = CreateContact::new(state.contacts())
        .execute(submission)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ContactEnvelope {
            message: "Submitted successfully",
            contact,
        }),
    ))
}
