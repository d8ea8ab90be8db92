//! Common test utilities for gst-billing-service integration tests.

use gst_billing_service::config::{BillingConfig, DatabaseConfig, Environment};
use gst_billing_service::startup::Application;
use serde_json::{json, Value};
use service_core::config::Config as CommonConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Once;
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,gst_billing_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A running service instance backed by its own PostgreSQL schema, so
/// tests never share company rows or invoice counters.
pub struct TestApp {
    pub address: String,
    pub pool: PgPool,
    pub client: reqwest::Client,
    base_url: String,
    schema: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        init_tracing();

        let base_url = std::env::var("TEST_DATABASE_URL")
            .expect("TEST_DATABASE_URL must be set - use scripts/integ-tests.sh to run tests");

        let schema = format!("test_{}", Uuid::new_v4().simple());

        let admin_pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&base_url)
            .await
            .expect("Failed to connect to test database");
        sqlx::query(&format!("CREATE SCHEMA \"{}\"", schema))
            .execute(&admin_pool)
            .await
            .expect("Failed to create test schema");
        admin_pool.close().await;

        // Scope every connection of this instance to its own schema.
        let separator = if base_url.contains('?') { '&' } else { '?' };
        let database_url = format!(
            "{}{}options=-csearch_path%3D{}",
            base_url, separator, schema
        );

        let config = BillingConfig {
            common: CommonConfig { port: 0 },
            environment: Environment::Dev,
            service_name: "gst-billing-service-test".to_string(),
            log_level: "debug".to_string(),
            database: DatabaseConfig {
                url: database_url,
                max_connections: 5,
                min_connections: 1,
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build application");
        let port = app.port();
        let pool = app.db().pool().clone();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let address = format!("http://127.0.0.1:{}", port);
        let client = reqwest::Client::new();

        // Wait for the server to come up.
        let mut attempts = 0;
        loop {
            match client.get(format!("{}/health", address)).send().await {
                Ok(resp) if resp.status().is_success() => break,
                _ if attempts < 20 => {
                    attempts += 1;
                    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
                }
                Ok(resp) => panic!("Health check not ready: {}", resp.status()),
                Err(e) => panic!("Failed to reach server after 20 attempts: {}", e),
            }
        }

        Self {
            address,
            pool,
            client,
            base_url,
            schema,
        }
    }

    /// Drop the schema this instance was running against.
    pub async fn cleanup(self) {
        self.pool.close().await;
        let admin_pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&self.base_url)
            .await
            .expect("Failed to connect for cleanup");
        sqlx::query(&format!("DROP SCHEMA \"{}\" CASCADE", self.schema))
            .execute(&admin_pool)
            .await
            .expect("Failed to drop test schema");
        admin_pool.close().await;
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Store a seller profile so invoices can be issued.
    pub async fn seed_company(&self, state: &str) {
        let response = self
            .client
            .put(self.url("/api/company"))
            .json(&json!({
                "company_name": "Deccan Supplies Pvt Ltd",
                "company_address": "21 Residency Road, Bengaluru",
                "company_state": state,
                "company_gst_number": "29AAACD1234E1Z6",
            }))
            .send()
            .await
            .expect("Failed to call PUT /api/company");
        assert_eq!(response.status(), 200, "seed_company failed");
    }

    /// Register a client and return its id. The GST number's first two
    /// digits are arbitrary state codes; uniqueness comes from the infix.
    pub async fn seed_client(&self, name: &str, state: &str, gst_infix: &str) -> i64 {
        let response = self
            .client
            .post(self.url("/api/clients"))
            .json(&json!({
                "client_name": name,
                "client_address": "14 MG Road",
                "client_state": state,
                "client_gst_number": format!("29{}1234F1Z5", gst_infix),
            }))
            .send()
            .await
            .expect("Failed to call POST /api/clients");
        assert_eq!(response.status(), 201, "seed_client failed");
        let body: Value = response.json().await.expect("Invalid JSON");
        body["data"]["id"].as_i64().expect("Missing client id")
    }

    /// Add a catalog item and return its id.
    pub async fn seed_item(&self, name: &str, price: &str, cgst: &str, sgst: &str, igst: &str) -> i64 {
        let response = self
            .client
            .post(self.url("/api/items"))
            .json(&json!({
                "item_name": name,
                "hsn_code": "8471",
                "cgst_rate": cgst,
                "sgst_rate": sgst,
                "igst_rate": igst,
                "price": price,
            }))
            .send()
            .await
            .expect("Failed to call POST /api/items");
        assert_eq!(response.status(), 201, "seed_item failed");
        let body: Value = response.json().await.expect("Invalid JSON");
        body["data"]["id"].as_i64().expect("Missing item id")
    }

    /// Issue an invoice for one or more (item_id, quantity) lines.
    pub async fn create_invoice(
        &self,
        client_id: i64,
        invoice_date: &str,
        lines: &[(i64, &str)],
    ) -> reqwest::Response {
        let items: Vec<Value> = lines
            .iter()
            .map(|(item_id, quantity)| json!({ "item_id": item_id, "quantity": quantity }))
            .collect();
        self.client
            .post(self.url("/api/invoices"))
            .json(&json!({
                "client_id": client_id,
                "invoice_date": invoice_date,
                "invoice_items": items,
            }))
            .send()
            .await
            .expect("Failed to call POST /api/invoices")
    }
}
