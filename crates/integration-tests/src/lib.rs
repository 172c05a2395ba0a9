//! Integration tests for Contact Desk against a running server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p contact-desk-cli -- migrate
//! cargo run -p contact-desk-cli -- admin create -u it-admin
//! cargo run -p contact-desk-server &
//! DESK_TEST_ADMIN_PASSWORD=... cargo test -p contact-desk-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `DESK_TEST_BASE_URL` - Server under test (default: <http://localhost:5000>)
//! - `DESK_TEST_ADMIN_USER` - Admin username (default: `it-admin`)
//! - `DESK_TEST_ADMIN_PASSWORD` - Admin password

use reqwest::Client;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("DESK_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Admin username and password for Basic auth and the login form.
#[must_use]
pub fn admin_credentials() -> (String, String) {
    let user = std::env::var("DESK_TEST_ADMIN_USER").unwrap_or_else(|_| "it-admin".to_string());
    let password = std::env::var("DESK_TEST_ADMIN_PASSWORD").unwrap_or_default();
    (user, password)
}

/// Client that keeps cookies and does not follow redirects.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}
