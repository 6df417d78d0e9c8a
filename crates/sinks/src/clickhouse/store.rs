//! ClickHouse incident store

use async_trait::async_trait;
use beacon_config::ClickHouseConfig;
use chrono::{DateTime, Utc};
use clickhouse::{Client, insert::Insert};
use tracing::{debug, warn};

use super::build_client;
use super::tables::IncidentRow;
use crate::{IncidentStore, InsertOutcome, Result};

/// Store writing to a ClickHouse table over HTTP
pub struct ClickHouseStore {
    client: Client,
    table: String,
}

impl ClickHouseStore {
    /// Create a store from configuration (no connection is made yet)
    pub fn new(config: &ClickHouseConfig) -> Self {
        Self::with_client(build_client(config), &config.table)
    }

    /// Create a store around an existing client
    pub fn with_client(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Table this store writes to
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Conditional close-out mutation for `table`
    ///
    /// Binds: end millis, id, end millis.
    pub(crate) fn end_timestamp_sql(table: &str) -> String {
        format!(
            "ALTER TABLE {table} UPDATE end_timestamp = fromUnixTimestamp64Milli(toInt64(?)) \
             WHERE id = ? AND (end_timestamp = toDateTime64(0, 3) \
             OR end_timestamp > fromUnixTimestamp64Milli(toInt64(?)))"
        )
    }
}

#[async_trait]
impl IncidentStore for ClickHouseStore {
    async fn insert_batch(&self, rows: &[IncidentRow]) -> Result<InsertOutcome> {
        let mut insert: Insert<IncidentRow> = self.client.insert(&self.table).await?;
        let mut outcome = InsertOutcome::default();

        for row in rows {
            match insert.write(row).await {
                Ok(()) => outcome.written += 1,
                Err(e) => {
                    outcome.failed += 1;
                    warn!(error = %e, id = %row.id, "failed to append incident row");
                }
            }
        }

        insert.end().await?;
        debug!(table = %self.table, rows = outcome.written, "incident batch inserted");
        Ok(outcome)
    }

    async fn set_end_timestamp(&self, id: &str, end: DateTime<Utc>) -> Result<()> {
        let millis = end.timestamp_millis();
        self.client
            .query(&Self::end_timestamp_sql(&self.table))
            .bind(millis)
            .bind(id)
            .bind(millis)
            .execute()
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.client.query("SELECT 1").execute().await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // HTTP client; pooled connections are released on drop
        debug!(table = %self.table, "clickhouse store closed");
        Ok(())
    }
}
