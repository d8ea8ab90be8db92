//! Monthly invoice number allocation.
//!
//! Numbers follow `INV-{YYYYMM}-{NNNNN}` with the five-digit sequence
//! restarting at 1 each calendar month. Allocation is an atomic upsert on a
//! per-period counter row, so concurrent callers can never observe the same
//! value; counting existing rows and adding one is exactly the race this
//! replaces. The caller runs the allocation inside the invoice creation
//! transaction, which both serializes same-month writers via the counter
//! row lock and rolls the increment back together with a failed insert.

use chrono::{Datelike, NaiveDate};
use service_core::error::AppError;
use sqlx::PgConnection;

/// Month bucket for a given issue date, e.g. `202608`.
pub fn period_for(date: NaiveDate) -> String {
    format!("{:04}{:02}", date.year(), date.month())
}

/// Render a sequence value as the externally visible identifier.
pub fn format_invoice_number(period: &str, sequence: i64) -> String {
    format!("INV-{}-{:05}", period, sequence)
}

/// Reserve the next number in the issue date's month bucket.
pub async fn allocate(
    conn: &mut PgConnection,
    invoice_date: NaiveDate,
) -> Result<String, AppError> {
    let period = period_for(invoice_date);

    let sequence: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO invoice_sequences (period, last_value)
        VALUES ($1, 1)
        ON CONFLICT (period)
        DO UPDATE SET last_value = invoice_sequences.last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(&period)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        AppError::DatabaseError(anyhow::anyhow!("Failed to allocate invoice number: {}", e))
    })?;

    Ok(format_invoice_number(&period, sequence))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_uses_calendar_month() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(period_for(date), "202608");

        let january = NaiveDate::from_ymd_opt(2027, 1, 2).unwrap();
        assert_eq!(period_for(january), "202701");
    }

    #[test]
    fn number_is_zero_padded_to_five_digits() {
        assert_eq!(format_invoice_number("202608", 1), "INV-202608-00001");
        assert_eq!(format_invoice_number("202608", 42), "INV-202608-00042");
        assert_eq!(format_invoice_number("202608", 99999), "INV-202608-99999");
        assert_eq!(format_invoice_number("202608", 100000), "INV-202608-100000");
    }
}
