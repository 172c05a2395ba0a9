//! Authentication extractors for admin routes.
//!
//! - [`RequireAdminSession`] guards the HTML panel and redirects to the login
//!   form when no admin is logged in.
//! - [`RequireApiAdmin`] guards `/admin/api/*`. It accepts a logged-in session
//!   or HTTP Basic credentials checked against the admin user store, and
//!   answers 401 otherwise.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Path of the login form.
pub const LOGIN_PATH: &str = "/admin/login";

/// Error returned when admin authentication is required but missing.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// The credential store could not be queried.
    Unavailable,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Authentication required" })),
            )
                .into_response(),
            Self::Unavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

/// Extractor that requires a logged-in admin session.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAdminSession(admin): RequireAdminSession) -> impl IntoResponse {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
pub struct RequireAdminSession(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireAdminSession
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_admin(parts)
            .await
            .map(Self)
            .ok_or(AdminAuthRejection::RedirectToLogin)
    }
}

/// Extractor for the machine-facing admin API.
pub struct RequireApiAdmin(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireApiAdmin {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(admin) = session_admin(parts).await {
            return Ok(Self(admin));
        }

        let (username, password) =
            basic_credentials(&parts.headers).ok_or(AdminAuthRejection::Unauthorized)?;

        match AuthService::new(state.admin_users())
            .verify_credentials(&username, &password)
            .await
        {
            Ok(user) => Ok(Self(CurrentAdmin::from(&user))),
            Err(AuthError::InvalidCredentials) => {
                tracing::warn!(username = %username, "Rejected admin API credentials");
                Err(AdminAuthRejection::Unauthorized)
            }
            Err(e) => {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Credential check failed");
                Err(AdminAuthRejection::Unavailable)
            }
        }
    }
}

/// Read the logged-in admin from the session, if any.
async fn session_admin(parts: &Parts) -> Option<CurrentAdmin> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
}

/// Decode `Authorization: Basic <base64(username:password)>`.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_owned(), password.to_owned()))
}

/// Helper to set the current admin in the session.
///
/// The session id is cycled first so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}
