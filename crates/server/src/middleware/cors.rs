//! Cross-origin access for the browser frontend.
//!
//! The contact form is served from a different origin than this API, so
//! every route answers CORS preflights. Credentials are never allowed
//! cross-origin; the admin panel is same-origin.

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::CorsOrigins;

/// Build the CORS layer for the configured origins.
///
/// Methods and request headers are unrestricted. Origins that cannot be
/// used as a header value are skipped with a warning.
#[must_use]
pub fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::from(Any),
        CorsOrigins::List(list) => AllowOrigin::list(list.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|e| tracing::warn!(%origin, error = %e, "Skipping CORS origin"))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
