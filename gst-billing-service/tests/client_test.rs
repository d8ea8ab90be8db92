//! Client registry integration tests.

mod common;

use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn create_and_fetch_client() {
    let app = TestApp::spawn().await;

    let client_id = app.seed_client("Acme Traders", "Karnataka", "ABCDE").await;

    let response = app
        .client
        .get(app.url(&format!("/api/clients/{}", client_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["client_name"], json!("Acme Traders"));
    assert_eq!(body["data"]["client_state"], json!("Karnataka"));
    assert_eq!(body["data"]["is_active"], json!(true));
    assert!(body["timestamp"].is_string());

    app.cleanup().await;
}

#[tokio::test]
async fn duplicate_gst_number_conflicts() {
    let app = TestApp::spawn().await;

    app.seed_client("Acme Traders", "Karnataka", "ABCDE").await;

    let response = app
        .client
        .post(app.url("/api/clients"))
        .json(&json!({
            "client_name": "Copycat Corp",
            "client_address": "Elsewhere",
            "client_state": "Karnataka",
            "client_gst_number": "29ABCDE1234F1Z5",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));

    app.cleanup().await;
}

#[tokio::test]
async fn malformed_gst_number_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/clients"))
        .json(&json!({
            "client_name": "Bad GST Ltd",
            "client_address": "Somewhere",
            "client_state": "Karnataka",
            "client_gst_number": "not-a-gstin",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn missing_required_field_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/clients"))
        .json(&json!({
            "client_name": "",
            "client_address": "Somewhere",
            "client_state": "Karnataka",
            "client_gst_number": "29ABCDE1234F1Z5",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn update_patches_only_provided_fields() {
    let app = TestApp::spawn().await;
    let client_id = app.seed_client("Acme Traders", "Karnataka", "ABCDE").await;

    let response = app
        .client
        .put(app.url(&format!("/api/clients/{}", client_id)))
        .json(&json!({ "client_mobile": "9876543210" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["client_mobile"], json!("9876543210"));
    // Untouched fields keep their values.
    assert_eq!(body["data"]["client_name"], json!("Acme Traders"));

    app.cleanup().await;
}

#[tokio::test]
async fn deactivated_client_leaves_listing_and_cannot_be_invoiced() {
    let app = TestApp::spawn().await;
    app.seed_company("Karnataka").await;
    let client_id = app.seed_client("Acme Traders", "Karnataka", "ABCDE").await;
    let item_id = app.seed_item("Widget", "50.00", "9", "9", "18").await;

    let response = app
        .client
        .delete(app.url(&format!("/api/clients/{}", client_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = app
        .client
        .get(app.url("/api/clients"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let response = app
        .create_invoice(client_id, "2026-08-30", &[(item_id, "1")])
        .await;
    assert_eq!(response.status(), 404);

    app.cleanup().await;
}

#[tokio::test]
async fn list_clients_supports_search() {
    let app = TestApp::spawn().await;
    app.seed_client("Acme Traders", "Karnataka", "ABCDE").await;
    app.seed_client("Bharat Mills", "Tamil Nadu", "KLMNO").await;

    let body: Value = app
        .client
        .get(app.url("/api/clients?search=bharat"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let clients = body["data"].as_array().unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0]["client_name"], json!("Bharat Mills"));

    app.cleanup().await;
}

#[tokio::test]
async fn unknown_client_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/api/clients/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));

    app.cleanup().await;
}
