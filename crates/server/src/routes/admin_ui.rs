//! Admin panel: login form and contact dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use contact_desk_core::Contact;

use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::{RequireAdminSession, clear_current_admin, set_current_admin};
use crate::models::{CurrentAdmin, session_keys};
use crate::services::{AuthError, AuthService, ListContacts};
use crate::state::AppState;

const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Contact row for the dashboard table.
pub struct ContactView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: String,
}

impl From<Contact> for ContactView {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id.as_i32(),
            name: contact.name,
            email: contact.email.into_inner(),
            message: contact.message,
            submitted_at: contact.created_at.map_or_else(
                || "-".to_owned(),
                |ts| ts.format("%Y-%m-%d %H:%M UTC").to_string(),
            ),
        }
    }
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
    pub username: String,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub admin: CurrentAdmin,
    pub contacts: Vec<ContactView>,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Build the admin panel router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(index))
        .route("/admin/login", get(login_page).post(login))
        .route("/admin/logout", get(logout).post(logout))
        .route(DASHBOARD_PATH, get(dashboard))
}

/// GET /admin
async fn index() -> Redirect {
    Redirect::to(DASHBOARD_PATH)
}

/// Render the login form, or skip it when already logged in.
///
/// GET /admin/login
async fn login_page(session: Session) -> Response {
    let logged_in = session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .is_some();

    if logged_in {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    LoginTemplate {
        error: None,
        username: String::new(),
    }
    .into_response()
}

/// Check credentials and start an admin session.
///
/// POST /admin/login
#[instrument(skip_all, fields(username = %form.username))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user = match AuthService::new(state.admin_users())
        .verify_credentials(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Admin login failed");
            return Ok(LoginTemplate {
                error: Some("Invalid credentials"),
                username: form.username,
            }
            .into_response());
        }
        Err(e) => return Err(AppError::Internal(e.to_string())),
    };

    set_current_admin(&session, &CurrentAdmin::from(&user))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    tracing::info!(admin_id = %user.id, "Admin logged in");
    Ok(Redirect::to(DASHBOARD_PATH).into_response())
}

/// End the admin session.
///
/// GET|POST /admin/logout
async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to clear admin session");
    }
    Redirect::to(LOGIN_PATH)
}

/// Contact table with edit and delete controls.
///
/// GET /admin/dashboard
#[instrument(skip_all, fields(admin = %admin.username))]
async fn dashboard(
    RequireAdminSession(admin): RequireAdminSession,
    State(state): State<AppState>,
) -> Result<DashboardTemplate, AppError> {
    let contacts = ListContacts::new(state.contacts())
        .execute()
        .await?
        .into_iter()
        .map(ContactView::from)
        .collect();

    Ok(DashboardTemplate { admin, contacts })
}
