//! Services module for the GST billing service.

pub mod audit;
pub mod database;
pub mod invoice;
pub mod metrics;
pub mod sequence;
pub mod tax;

pub use audit::AuditSink;
pub use database::{CancelOutcome, Database};
pub use metrics::{get_metrics, init_metrics};
