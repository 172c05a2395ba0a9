//! HTTP middleware for the server.
//!
//! # Layer order (outermost first, as wired in `main`)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (`http_request` span)
//! 3. CORS (answers preflights before routing)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Admin routes are guarded per handler by the extractors in [`auth`].

pub mod auth;
pub mod cors;
pub mod session;

pub use auth::{
    AdminAuthRejection, RequireAdminSession, RequireApiAdmin, clear_current_admin,
    set_current_admin,
};
pub use cors::cors_layer;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_layer};
