//! Router tests for cross-origin access from the contact-form frontend.

mod common;

use axum::{
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use serde_json::json;

use contact_desk_server::config::CorsOrigins;

use common::TestApp;

const FRONTEND: &str = "http://frontend.example";

fn preflight(uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri(uri)
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .expect("Should build request")
}

fn allow_origin(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_preflight_allows_any_origin_by_default() {
    let app = TestApp::new().await;

    for uri in ["/api/contact", "/api/analyze"] {
        let response = app.send(preflight(uri, FRONTEND)).await;

        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(allow_origin(&response), Some("*"), "{uri}");
        assert!(
            response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS)
        );
    }
}

#[tokio::test]
async fn test_cross_origin_submission_carries_allow_origin() {
    let app = TestApp::new().await;

    let response = app
        .send(
            Request::post("/api/contact")
                .header(header::ORIGIN, FRONTEND)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "name": "Alice",
                        "email": "alice@example.com",
                        "message": "Hello from another origin"
                    })
                    .to_string(),
                ))
                .expect("Should build request"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(allow_origin(&response), Some("*"));
}

#[tokio::test]
async fn test_configured_origins_are_the_only_ones_allowed() {
    let app =
        TestApp::with_cors_origins(&CorsOrigins::List(vec![FRONTEND.to_string()])).await;

    let response = app.send(preflight("/api/contact", FRONTEND)).await;
    assert_eq!(allow_origin(&response), Some(FRONTEND));

    let response = app
        .send(preflight("/api/contact", "http://elsewhere.example"))
        .await;
    assert_eq!(allow_origin(&response), None);
}
