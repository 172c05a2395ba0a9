//! Live tests for the public contact endpoint and the admin contact API.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - The server running (cargo run -p contact-desk-server)
//! - An admin created with `cdesk admin create` matching `DESK_TEST_ADMIN_*`

use contact_desk_integration_tests::{admin_credentials, base_url, client};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn submit(body: &Value) -> (StatusCode, Value) {
    let resp = client()
        .post(format!("{}/api/contact", base_url()))
        .json(body)
        .send()
        .await
        .expect("Failed to submit contact");
    let status = resp.status();
    (status, resp.json().await.expect("Response is not JSON"))
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_submit_valid_contact() {
    let (status, body) = submit(&json!({
        "name": "  Integration Tester ",
        "email": "tester@example.com",
        "message": "This is a long enough message"
    }))
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Submitted successfully");
    assert_eq!(body["contact"]["name"], "Integration Tester");
    assert!(body["contact"]["id"].is_i64());
    assert!(body["contact"]["created_at"].is_string());
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_submit_invalid_contact_lists_every_field() {
    let (status, body) = submit(&json!({"name": "A", "email": "bad", "message": "short"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"].as_object().map(serde_json::Map::len), Some(3));
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_admin_api_requires_credentials() {
    let resp = client()
        .get(format!("{}/admin/api/contacts", base_url()))
        .send()
        .await
        .expect("Failed to list contacts");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("Response is not JSON");
    assert_eq!(body["message"], "Authentication required");
}

#[tokio::test]
#[ignore = "Requires running server and admin credentials"]
async fn test_admin_update_then_delete_lifecycle() {
    let (user, password) = admin_credentials();
    let base = base_url();
    let http = client();

    let (_, created) = submit(&json!({
        "name": "Lifecycle",
        "email": "lifecycle@example.com",
        "message": "Message that will be edited"
    }))
    .await;
    let id = created["contact"]["id"].as_i64().expect("id");

    let resp = http
        .put(format!("{base}/admin/api/contacts/{id}"))
        .basic_auth(&user, Some(&password))
        .json(&json!({
            "name": "Edited",
            "email": "edited@example.com",
            "message": "Message after the edit"
        }))
        .send()
        .await
        .expect("Failed to update");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Response is not JSON");
    assert_eq!(body["contact"]["name"], "Edited");
    assert_eq!(body["contact"]["created_at"], created["contact"]["created_at"]);

    let list: Value = http
        .get(format!("{base}/admin/api/contacts"))
        .basic_auth(&user, Some(&password))
        .send()
        .await
        .expect("Failed to list")
        .json()
        .await
        .expect("Response is not JSON");
    assert!(
        list.as_array()
            .expect("array")
            .iter()
            .any(|c| c["id"] == json!(id))
    );

    for expected in [StatusCode::OK, StatusCode::NOT_FOUND] {
        let resp = http
            .delete(format!("{base}/admin/api/contacts/{id}"))
            .basic_auth(&user, Some(&password))
            .send()
            .await
            .expect("Failed to delete");
        assert_eq!(resp.status(), expected);
    }
}
