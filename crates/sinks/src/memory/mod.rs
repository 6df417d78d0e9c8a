//! In-memory incident store
//!
//! Keeps rows in a vector and applies end-timestamp updates with the same
//! conditional semantics as the ClickHouse mutation. Failure injection hooks
//! let tests exercise the writer's error paths.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::{END_TIMESTAMP_UNSET, IncidentRow, IncidentStore, InsertOutcome, Result, StoreError};

/// Vector-backed store
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<IncidentRow>>,
    batches: AtomicUsize,
    /// Upcoming `insert_batch` calls to fail as a whole
    fail_sends: AtomicUsize,
    /// Row ids to refuse individually
    reject_ids: Mutex<HashSet<String>>,
    unavailable: AtomicBool,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored row, in insertion order
    pub fn rows(&self) -> Vec<IncidentRow> {
        self.rows.lock().clone()
    }

    /// Rows stored for `id`
    pub fn rows_for(&self, id: &str) -> Vec<IncidentRow> {
        self.rows
            .lock()
            .iter()
            .filter(|r| r.id == id)
            .cloned()
            .collect()
    }

    /// Number of successful bulk inserts
    pub fn batch_count(&self) -> usize {
        self.batches.load(Ordering::Relaxed)
    }

    /// Fail the next `n` batch sends
    pub fn fail_next_sends(&self, n: usize) {
        self.fail_sends.store(n, Ordering::Relaxed);
    }

    /// Refuse rows with this id
    pub fn reject_id(&self, id: impl Into<String>) {
        self.reject_ids.lock().insert(id.into());
    }

    /// Make `ping` fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl IncidentStore for MemoryStore {
    async fn insert_batch(&self, rows: &[IncidentRow]) -> Result<InsertOutcome> {
        self.ensure_open()?;

        let injected = self
            .fail_sends
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::Unavailable("injected send failure".into()));
        }

        let rejected = self.reject_ids.lock().clone();
        let mut outcome = InsertOutcome::default();
        let mut stored = self.rows.lock();
        for row in rows {
            if rejected.contains(&row.id) {
                outcome.failed += 1;
            } else {
                stored.push(row.clone());
                outcome.written += 1;
            }
        }
        self.batches.fetch_add(1, Ordering::Relaxed);
        Ok(outcome)
    }

    async fn set_end_timestamp(&self, id: &str, end: DateTime<Utc>) -> Result<()> {
        self.ensure_open()?;

        let millis = end.timestamp_millis();
        for row in self.rows.lock().iter_mut().filter(|r| r.id == id) {
            if row.end_timestamp == END_TIMESTAMP_UNSET || row.end_timestamp > millis {
                row.end_timestamp = millis;
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("memory store marked unavailable".into()));
        }
        self.ensure_open()
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}
