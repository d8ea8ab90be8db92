//! Catalog item integration tests.

mod common;

use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn create_and_fetch_item() {
    let app = TestApp::spawn().await;

    let item_id = app.seed_item("Laptop Stand", "1499.00", "9", "9", "18").await;

    let response = app
        .client
        .get(app.url(&format!("/api/items/{}", item_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["item_name"], json!("Laptop Stand"));
    assert_eq!(body["data"]["price"], json!("1499.00"));
    assert_eq!(body["data"]["igst_rate"], json!("18.00"));

    app.cleanup().await;
}

#[tokio::test]
async fn rate_above_bound_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/items"))
        .json(&json!({
            "item_name": "Luxury Import",
            "cgst_rate": "14.5",
            "sgst_rate": "14.5",
            "igst_rate": "29",
            "price": "100.00",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));

    app.cleanup().await;
}

#[tokio::test]
async fn boundary_rates_are_accepted() {
    let app = TestApp::spawn().await;

    app.seed_item("Exempt Good", "10.00", "0", "0", "0").await;
    app.seed_item("Luxury Good", "10.00", "14", "14", "28").await;

    app.cleanup().await;
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/items"))
        .json(&json!({
            "item_name": "Refund Trick",
            "cgst_rate": "9",
            "sgst_rate": "9",
            "igst_rate": "18",
            "price": "-5.00",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn update_validates_patched_rates() {
    let app = TestApp::spawn().await;
    let item_id = app.seed_item("Widget", "50.00", "9", "9", "18").await;

    let response = app
        .client
        .put(app.url(&format!("/api/items/{}", item_id)))
        .json(&json!({ "igst_rate": "40" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = app
        .client
        .put(app.url(&format!("/api/items/{}", item_id)))
        .json(&json!({ "igst_rate": "12" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["igst_rate"], json!("12.00"));

    app.cleanup().await;
}

#[tokio::test]
async fn deactivated_item_leaves_listing() {
    let app = TestApp::spawn().await;
    let item_id = app.seed_item("Widget", "50.00", "9", "9", "18").await;

    let response = app
        .client
        .delete(app.url(&format!("/api/items/{}", item_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = app
        .client
        .get(app.url("/api/items"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    app.cleanup().await;
}
