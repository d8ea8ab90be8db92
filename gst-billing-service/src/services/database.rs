//! Database service for the GST billing service.

use crate::models::{
    Client, Company, CreateClient, CreateItem, Invoice, InvoiceLine, InvoiceStatus, InvoiceSummary,
    Item, ListInvoicesFilter, UpdateClient, UpdateCompany, UpdateItem,
};
use crate::services::metrics::DB_QUERY_DURATION;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

/// Outcome of a cancellation request for an existing invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    AlreadyCancelled,
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "gst-billing-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Company Operations
    // -------------------------------------------------------------------------

    /// Get the seller company profile (singleton row).
    #[instrument(skip(self))]
    pub async fn get_company(&self) -> Result<Option<Company>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_company"])
            .start_timer();

        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, company_name, company_address, company_state, company_gst_number,
                company_email, company_phone, bank_name, bank_account_number, bank_ifsc_code,
                upi_id, updated_at
            FROM company
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get company: {}", e)))?;

        timer.observe_duration();

        Ok(company)
    }

    /// Create or replace the seller company profile.
    #[instrument(skip(self, input))]
    pub async fn upsert_company(&self, input: &UpdateCompany) -> Result<Company, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["upsert_company"])
            .start_timer();

        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO company (
                id, company_name, company_address, company_state, company_gst_number,
                company_email, company_phone, bank_name, bank_account_number, bank_ifsc_code, upi_id
            )
            VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                company_name = EXCLUDED.company_name,
                company_address = EXCLUDED.company_address,
                company_state = EXCLUDED.company_state,
                company_gst_number = EXCLUDED.company_gst_number,
                company_email = EXCLUDED.company_email,
                company_phone = EXCLUDED.company_phone,
                bank_name = EXCLUDED.bank_name,
                bank_account_number = EXCLUDED.bank_account_number,
                bank_ifsc_code = EXCLUDED.bank_ifsc_code,
                upi_id = EXCLUDED.upi_id,
                updated_at = NOW()
            RETURNING id, company_name, company_address, company_state, company_gst_number,
                company_email, company_phone, bank_name, bank_account_number, bank_ifsc_code,
                upi_id, updated_at
            "#,
        )
        .bind(&input.company_name)
        .bind(&input.company_address)
        .bind(&input.company_state)
        .bind(&input.company_gst_number)
        .bind(&input.company_email)
        .bind(&input.company_phone)
        .bind(&input.bank_name)
        .bind(&input.bank_account_number)
        .bind(&input.bank_ifsc_code)
        .bind(&input.upi_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update company: {}", e)))?;

        timer.observe_duration();

        info!(company_name = %company.company_name, "Company profile updated");

        Ok(company)
    }

    // -------------------------------------------------------------------------
    // Client Operations
    // -------------------------------------------------------------------------

    /// Register a new client.
    #[instrument(skip(self, input))]
    pub async fn create_client(&self, input: &CreateClient) -> Result<Client, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (
                client_name, client_address, client_state, client_gst_number,
                client_mobile, client_email, bank_name, bank_account_number, bank_ifsc_code
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, client_name, client_address, client_state, client_gst_number,
                client_mobile, client_email, bank_name, bank_account_number, bank_ifsc_code,
                is_active, created_at
            "#,
        )
        .bind(&input.client_name)
        .bind(&input.client_address)
        .bind(&input.client_state)
        .bind(&input.client_gst_number)
        .bind(&input.client_mobile)
        .bind(&input.client_email)
        .bind(&input.bank_name)
        .bind(&input.bank_account_number)
        .bind(&input.bank_ifsc_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Client with GST number {} already exists",
                    input.client_gst_number
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create client: {}", e)),
        })?;

        timer.observe_duration();

        info!(client_id = %client.id, "Client created");

        Ok(client)
    }

    /// Get a client by id.
    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn get_client(&self, client_id: i64) -> Result<Option<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, client_name, client_address, client_state, client_gst_number,
                client_mobile, client_email, bank_name, bank_account_number, bank_ifsc_code,
                is_active, created_at
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get client: {}", e)))?;

        timer.observe_duration();

        Ok(client)
    }

    /// List active clients, optionally filtered by name or GST number.
    #[instrument(skip(self))]
    pub async fn list_clients(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_clients"])
            .start_timer();

        let term = search.map(|s| format!("%{}%", s));
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, client_name, client_address, client_state, client_gst_number,
                client_mobile, client_email, bank_name, bank_account_number, bank_ifsc_code,
                is_active, created_at
            FROM clients
            WHERE is_active = TRUE
              AND ($1::text IS NULL OR client_name ILIKE $1 OR client_gst_number ILIKE $1)
            ORDER BY client_name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&term)
        .bind(limit.clamp(1, 100))
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list clients: {}", e)))?;

        timer.observe_duration();

        Ok(clients)
    }

    /// Patch a client; omitted fields keep their prior values.
    #[instrument(skip(self, input), fields(client_id = %client_id))]
    pub async fn update_client(
        &self,
        client_id: i64,
        input: &UpdateClient,
    ) -> Result<Option<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET client_name = COALESCE($2, client_name),
                client_address = COALESCE($3, client_address),
                client_state = COALESCE($4, client_state),
                client_mobile = COALESCE($5, client_mobile),
                client_email = COALESCE($6, client_email),
                bank_name = COALESCE($7, bank_name),
                bank_account_number = COALESCE($8, bank_account_number),
                bank_ifsc_code = COALESCE($9, bank_ifsc_code)
            WHERE id = $1 AND is_active = TRUE
            RETURNING id, client_name, client_address, client_state, client_gst_number,
                client_mobile, client_email, bank_name, bank_account_number, bank_ifsc_code,
                is_active, created_at
            "#,
        )
        .bind(client_id)
        .bind(&input.client_name)
        .bind(&input.client_address)
        .bind(&input.client_state)
        .bind(&input.client_mobile)
        .bind(&input.client_email)
        .bind(&input.bank_name)
        .bind(&input.bank_account_number)
        .bind(&input.bank_ifsc_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update client: {}", e)))?;

        timer.observe_duration();

        Ok(client)
    }

    /// Soft-delete a client (clears the active flag).
    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn deactivate_client(&self, client_id: i64) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["deactivate_client"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE clients SET is_active = FALSE WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(client_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to deactivate client: {}", e))
        })?;

        timer.observe_duration();

        let deactivated = result.rows_affected() > 0;
        if deactivated {
            info!(client_id = %client_id, "Client deactivated");
        }

        Ok(deactivated)
    }

    // -------------------------------------------------------------------------
    // Item Operations
    // -------------------------------------------------------------------------

    /// Add a catalog item.
    #[instrument(skip(self, input))]
    pub async fn create_item(&self, input: &CreateItem) -> Result<Item, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_item"])
            .start_timer();

        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (
                item_name, description, hsn_code, unit, cgst_rate, sgst_rate, igst_rate, price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, item_name, description, hsn_code, unit, cgst_rate, sgst_rate,
                igst_rate, price, is_active, created_at
            "#,
        )
        .bind(&input.item_name)
        .bind(&input.description)
        .bind(&input.hsn_code)
        .bind(&input.unit)
        .bind(input.cgst_rate)
        .bind(input.sgst_rate)
        .bind(input.igst_rate)
        .bind(input.price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create item: {}", e)))?;

        timer.observe_duration();

        info!(item_id = %item.id, "Catalog item created");

        Ok(item)
    }

    /// Get a catalog item by id.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn get_item(&self, item_id: i64) -> Result<Option<Item>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_item"])
            .start_timer();

        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, item_name, description, hsn_code, unit, cgst_rate, sgst_rate,
                igst_rate, price, is_active, created_at
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get item: {}", e)))?;

        timer.observe_duration();

        Ok(item)
    }

    /// List active catalog items, optionally filtered by name or HSN code.
    #[instrument(skip(self))]
    pub async fn list_items(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Item>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_items"])
            .start_timer();

        let term = search.map(|s| format!("%{}%", s));
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, item_name, description, hsn_code, unit, cgst_rate, sgst_rate,
                igst_rate, price, is_active, created_at
            FROM items
            WHERE is_active = TRUE
              AND ($1::text IS NULL OR item_name ILIKE $1 OR hsn_code ILIKE $1)
            ORDER BY item_name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&term)
        .bind(limit.clamp(1, 100))
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list items: {}", e)))?;

        timer.observe_duration();

        Ok(items)
    }

    /// Patch a catalog item; omitted fields keep their prior values.
    #[instrument(skip(self, input), fields(item_id = %item_id))]
    pub async fn update_item(
        &self,
        item_id: i64,
        input: &UpdateItem,
    ) -> Result<Option<Item>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_item"])
            .start_timer();

        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET item_name = COALESCE($2, item_name),
                description = COALESCE($3, description),
                hsn_code = COALESCE($4, hsn_code),
                unit = COALESCE($5, unit),
                cgst_rate = COALESCE($6, cgst_rate),
                sgst_rate = COALESCE($7, sgst_rate),
                igst_rate = COALESCE($8, igst_rate),
                price = COALESCE($9, price)
            WHERE id = $1 AND is_active = TRUE
            RETURNING id, item_name, description, hsn_code, unit, cgst_rate, sgst_rate,
                igst_rate, price, is_active, created_at
            "#,
        )
        .bind(item_id)
        .bind(&input.item_name)
        .bind(&input.description)
        .bind(&input.hsn_code)
        .bind(&input.unit)
        .bind(input.cgst_rate)
        .bind(input.sgst_rate)
        .bind(input.igst_rate)
        .bind(input.price)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update item: {}", e)))?;

        timer.observe_duration();

        Ok(item)
    }

    /// Soft-delete a catalog item (clears the active flag).
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn deactivate_item(&self, item_id: i64) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["deactivate_item"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE items SET is_active = FALSE WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(item_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to deactivate item: {}", e))
        })?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Invoice Read Operations
    // -------------------------------------------------------------------------

    /// Get an invoice header by id.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_invoice(&self, invoice_id: i64) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, invoice_number, invoice_date, client_id, status,
                shipping_address, shipping_state, eway_bill_number, eway_bill_date, dc_number,
                subtotal, total_cgst, total_sgst, total_igst, total_tax, grand_total,
                notes, terms_and_conditions, created_at, cancelled_at
            FROM invoices
            WHERE id = $1
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        timer.observe_duration();

        Ok(invoice)
    }

    /// Get the lines of an invoice.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_invoice_lines(&self, invoice_id: i64) -> Result<Vec<InvoiceLine>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice_lines"])
            .start_timer();

        let lines = sqlx::query_as::<_, InvoiceLine>(
            r#"
            SELECT id, invoice_id, item_id, item_name, description, hsn_code,
                quantity, unit_price, taxable_value, cgst_rate, cgst_amount,
                sgst_rate, sgst_amount, igst_rate, igst_amount, line_total, gst_type, created_at
            FROM invoice_items
            WHERE invoice_id = $1
            ORDER BY id
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice lines: {}", e))
        })?;

        timer.observe_duration();

        Ok(lines)
    }

    /// List invoice headers joined with the client name.
    #[instrument(skip(self, filter))]
    pub async fn list_invoices(
        &self,
        filter: &ListInvoicesFilter,
    ) -> Result<Vec<InvoiceSummary>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let term = filter.search.as_deref().map(|s| format!("%{}%", s));
        let invoices = sqlx::query_as::<_, InvoiceSummary>(
            r#"
            SELECT i.id, i.invoice_number, i.invoice_date, i.client_id, c.client_name,
                i.status, i.subtotal, i.total_tax, i.grand_total, i.created_at
            FROM invoices i
            JOIN clients c ON c.id = i.client_id
            WHERE ($1::bigint IS NULL OR i.client_id = $1)
              AND ($2::text IS NULL OR i.invoice_number ILIKE $2)
              AND ($3::date IS NULL OR i.invoice_date >= $3)
              AND ($4::date IS NULL OR i.invoice_date <= $4)
            ORDER BY i.invoice_date DESC, i.invoice_number DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.client_id)
        .bind(&term)
        .bind(filter.from_date)
        .bind(filter.to_date)
        .bind(filter.limit.unwrap_or(50).clamp(1, 100))
        .bind(filter.offset.unwrap_or(0).max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e)))?;

        timer.observe_duration();

        Ok(invoices)
    }

    // -------------------------------------------------------------------------
    // Invoice Cancellation
    // -------------------------------------------------------------------------

    /// Cancel a finalized invoice. Idempotent: cancelling an already
    /// cancelled invoice reports `AlreadyCancelled` without touching the
    /// row. Rows are never deleted and totals are never recomputed.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn cancel_invoice(
        &self,
        invoice_id: i64,
    ) -> Result<Option<CancelOutcome>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["cancel_invoice"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET status = $2, cancelled_at = NOW()
            WHERE id = $1 AND status = $3
            "#,
        )
        .bind(invoice_id)
        .bind(InvoiceStatus::Cancelled.as_str())
        .bind(InvoiceStatus::Finalized.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to cancel invoice: {}", e))
        })?;

        let outcome = if result.rows_affected() > 0 {
            info!(invoice_id = %invoice_id, "Invoice cancelled");
            Some(CancelOutcome::Cancelled)
        } else {
            // Distinguish "already cancelled" from "no such invoice".
            self.get_invoice(invoice_id)
                .await?
                .map(|_| CancelOutcome::AlreadyCancelled)
        };

        timer.observe_duration();

        Ok(outcome)
    }
}
