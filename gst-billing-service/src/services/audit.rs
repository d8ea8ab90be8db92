//! Best-effort audit trail.
//!
//! Events are recorded on a spawned task after the triggering operation has
//! committed; an insert failure is logged and swallowed so the audit trail
//! can never change the outcome of the operation it describes.

use serde_json::Value;
use sqlx::postgres::PgPool;
use tracing::warn;

/// Append-only recorder of create/update/delete events.
#[derive(Clone)]
pub struct AuditSink {
    pool: PgPool,
}

impl AuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Queue an audit event. Returns immediately; the insert runs
    /// fire-and-forget.
    pub fn record(
        &self,
        action: &str,
        entity_type: &str,
        entity_id: i64,
        old_values: Option<Value>,
        new_values: Option<Value>,
    ) {
        let pool = self.pool.clone();
        let action = action.to_string();
        let entity_type = entity_type.to_string();

        tokio::spawn(async move {
            let result = sqlx::query(
                r#"
                INSERT INTO audit_logs (action, entity_type, entity_id, old_values, new_values)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&action)
            .bind(&entity_type)
            .bind(entity_id)
            .bind(old_values)
            .bind(new_values)
            .execute(&pool)
            .await;

            if let Err(e) = result {
                warn!(
                    action = %action,
                    entity_type = %entity_type,
                    entity_id = entity_id,
                    error = %e,
                    "Audit logging failed"
                );
            }
        });
    }
}
