//! Incident store abstraction

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{IncidentRow, Result};

/// Result of one bulk insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Rows accepted into the batch and sent
    pub written: usize,
    /// Rows the store refused individually; the rest of the batch still went out
    pub failed: usize,
}

/// Durable destination for incident rows
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// Send `rows` as one bulk write
    ///
    /// Individual row failures are reported in the outcome. An `Err` means
    /// the batch as a whole was not sent.
    async fn insert_batch(&self, rows: &[IncidentRow]) -> Result<InsertOutcome>;

    /// Close out incident `id` at `end`
    ///
    /// Applies only where the stored end is still unset or later than `end`,
    /// so an earlier deletion is never overwritten by a later one.
    async fn set_end_timestamp(&self, id: &str, end: DateTime<Utc>) -> Result<()>;

    /// Connectivity check used at startup
    async fn ping(&self) -> Result<()>;

    /// Release connections
    async fn close(&self) -> Result<()>;
}
