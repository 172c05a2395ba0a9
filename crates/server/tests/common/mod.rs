//! Shared helpers for router tests.
//!
//! Builds the real router over in-memory stores, a tower-sessions
//! `MemoryStore` and a classifier stub that returns a fixed prediction.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tower::util::ServiceExt;
use tower_sessions::MemoryStore;

use contact_desk_server::config::{AnalyzeConfig, CorsOrigins};
use contact_desk_server::db::memory::{MemoryAdminUserStore, MemoryContactStore};
use contact_desk_server::middleware::{SESSION_COOKIE_NAME, cors_layer, session_layer};
use contact_desk_server::services::{
    AuthService, ClassifierError, ImageClassifier, ImageInput, Prediction,
};
use contact_desk_server::{AppState, build_router};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// Classifier stub: fixed answer, or a failure when `fail` is set.
pub struct StubClassifier {
    pub fail: bool,
}

#[async_trait]
impl ImageClassifier for StubClassifier {
    async fn classify(&self, _image: &ImageInput) -> Result<Prediction, ClassifierError> {
        if self.fail {
            return Err(ClassifierError::InvalidResponse("model unavailable".to_owned()));
        }
        Ok(Prediction {
            label: "tabby cat".to_owned(),
            confidence: 0.75,
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub contacts: Arc<MemoryContactStore>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_classifier(StubClassifier { fail: false }).await
    }

    pub async fn with_classifier(classifier: StubClassifier) -> Self {
        Self::build(classifier, &CorsOrigins::Any).await
    }

    pub async fn with_cors_origins(origins: &CorsOrigins) -> Self {
        Self::build(StubClassifier { fail: false }, origins).await
    }

    async fn build(classifier: StubClassifier, cors_origins: &CorsOrigins) -> Self {
        let contacts = Arc::new(MemoryContactStore::new());
        let admin_users = Arc::new(MemoryAdminUserStore::new());
        AuthService::new(admin_users.as_ref())
            .create_admin(ADMIN_USER, ADMIN_PASSWORD)
            .await
            .expect("Should create test admin");

        let analyze = AnalyzeConfig {
            max_upload_bytes: 1024,
            ..AnalyzeConfig::default()
        };

        let state = AppState::new(contacts.clone(), admin_users, Arc::new(classifier), analyze)
            .expect("Should build state");
        let router = build_router(
            state,
            session_layer(MemoryStore::default(), false),
            cors_layer(cors_origins),
        );

        Self { router, contacts }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    /// Log in through the form and return the session cookie.
    pub async fn login(&self) -> String {
        let body = format!("username={ADMIN_USER}&password={ADMIN_PASSWORD}");
        let response = self
            .send(
                Request::post("/admin/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .expect("Should build request"),
            )
            .await;
        assert!(response.status().is_redirection(), "login should redirect");
        session_cookie(&response).expect("Login should set a session cookie")
    }
}

/// `name=value` of the session cookie set by `response`, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(SESSION_COOKIE_NAME))
        .and_then(|v| v.split(';').next())
        .map(str::to_owned)
}

pub fn basic_auth(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Should build request")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Should parse JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).expect("Body should be UTF-8")
}
