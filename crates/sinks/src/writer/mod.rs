//! Batched incident writer
//!
//! Buffers incidents behind a mutex and sends them to an [`IncidentStore`]
//! when the buffer reaches `batch_size` or every `flush_interval`, whichever
//! comes first. The lock is held only to append or swap the buffer; store
//! I/O always happens outside it.
//!
//! A batch the store fails to take is logged, counted and dropped. There is
//! no retry queue.
//!
//! End-timestamp updates that arrive while a batch is being sent are kept
//! and re-applied once the send returns, so a deletion never misses a row
//! that was neither buffered nor stored at the time.

mod metrics;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use beacon_config::ClickHouseConfig;
use beacon_protocol::Incident;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub use metrics::{BATCH_SIZE_BUCKETS, WriterMetrics, WriterMetricsHandle};

use crate::{END_TIMESTAMP_UNSET, IncidentRow, IncidentStore, Result};

/// Writer batching parameters
#[derive(Debug, Clone, Copy)]
pub struct WriterConfig {
    /// Default: 100
    pub batch_size: usize,
    /// Default: 5s
    pub flush_interval: Duration,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            flush_interval: Duration::from_secs(5),
        }
    }
}

impl From<&ClickHouseConfig> for WriterConfig {
    fn from(config: &ClickHouseConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            flush_interval: config.flush_interval,
        }
    }
}

/// Batches swapped out of the buffer and not yet returned by the store
#[derive(Default)]
struct InFlight {
    batches: usize,
    /// Earliest end per id requested while a batch was in flight
    ends: HashMap<String, DateTime<Utc>>,
}

/// State shared between callers and the flush timer
///
/// Lock order: `buffer` before `in_flight`.
struct Shared {
    store: Arc<dyn IncidentStore>,
    buffer: Mutex<Vec<IncidentRow>>,
    in_flight: Mutex<InFlight>,
    batch_size: usize,
    metrics: Arc<WriterMetrics>,
}

impl Shared {
    /// Swap the buffer out under the lock, then send it without the lock
    async fn flush(&self) {
        let batch = {
            let mut buffer = self.buffer.lock();
            if buffer.is_empty() {
                return;
            }
            self.in_flight.lock().batches += 1;
            std::mem::replace(&mut *buffer, Vec::with_capacity(self.batch_size))
        };
        self.metrics.pending.set(0);

        let start = Instant::now();
        match self.store.insert_batch(&batch).await {
            Ok(outcome) => {
                self.metrics.record_batch(outcome.written, outcome.failed);
                if outcome.failed > 0 {
                    warn!(
                        written = outcome.written,
                        failed = outcome.failed,
                        "some incident rows were rejected"
                    );
                }
                debug!(rows = outcome.written, "incident batch flushed");
            }
            Err(e) => {
                self.metrics.record_send_error(batch.len());
                error!(error = %e, rows = batch.len(), "failed to send incident batch, dropping it");
            }
        }
        self.metrics.flush_duration.observe_duration(start.elapsed());

        self.finish_batch().await;
    }

    /// Re-apply end updates that raced the last in-flight batch
    async fn finish_batch(&self) {
        let ends = {
            let mut in_flight = self.in_flight.lock();
            in_flight.batches -= 1;
            if in_flight.batches > 0 {
                return;
            }
            std::mem::take(&mut in_flight.ends)
        };

        for (id, end) in ends {
            match self.store.set_end_timestamp(&id, end).await {
                Ok(()) => self.metrics.end_updates.inc(),
                Err(e) => {
                    self.metrics.end_update_errors.inc();
                    warn!(id = %id, error = %e, "failed to re-apply end timestamp after flush");
                }
            }
        }
    }
}

/// Size- and time-triggered batch writer
///
/// Shared by every worker behind an `Arc`.
pub struct IncidentWriter {
    shared: Arc<Shared>,
    timer: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    closed: AtomicBool,
}

impl IncidentWriter {
    /// Create a writer and start its flush timer
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        store: Arc<dyn IncidentStore>,
        config: WriterConfig,
        metrics: Arc<WriterMetrics>,
    ) -> Self {
        let batch_size = config.batch_size.max(1);
        let shared = Arc::new(Shared {
            store,
            buffer: Mutex::new(Vec::with_capacity(batch_size)),
            in_flight: Mutex::new(InFlight::default()),
            batch_size,
            metrics,
        });

        let cancel = CancellationToken::new();
        let timer = tokio::spawn(run_timer(
            Arc::clone(&shared),
            config.flush_interval,
            cancel.clone(),
        ));

        Self {
            shared,
            timer: Mutex::new(Some(timer)),
            cancel,
            closed: AtomicBool::new(false),
        }
    }

    /// Buffer an incident, flushing if the buffer reached `batch_size`
    ///
    /// When this call triggers the flush, the buffer is empty by the time it
    /// returns.
    pub async fn insert(&self, incident: &Incident) {
        let row = IncidentRow::from(incident);

        let should_flush = {
            let mut buffer = self.shared.buffer.lock();
            buffer.push(row);
            self.shared.metrics.pending.set(buffer.len() as i64);
            buffer.len() >= self.shared.batch_size || self.closed.load(Ordering::Relaxed)
        };

        if should_flush {
            self.shared.flush().await;
        }
    }

    /// Send whatever is buffered now; no-op when empty
    pub async fn flush(&self) {
        self.shared.flush().await;
    }

    /// Close out incident `id` at `deleted_at` unless an earlier end is stored
    ///
    /// Applies to buffered rows, rows in a batch still being sent, and rows
    /// already in the store.
    ///
    /// # Errors
    ///
    /// Returns the store error; the caller decides whether to log it.
    pub async fn set_end_timestamp(&self, id: &str, deleted_at: DateTime<Utc>) -> Result<()> {
        // Rows still buffered would miss the store-side update
        let millis = deleted_at.timestamp_millis();
        {
            let mut buffer = self.shared.buffer.lock();
            for row in buffer.iter_mut().filter(|r| r.id == id) {
                if row.end_timestamp == END_TIMESTAMP_UNSET || row.end_timestamp > millis {
                    row.end_timestamp = millis;
                }
            }

            // Rows in an unfinished send get the update once it returns
            let mut in_flight = self.shared.in_flight.lock();
            if in_flight.batches > 0 {
                in_flight
                    .ends
                    .entry(id.to_string())
                    .and_modify(|end| *end = (*end).min(deleted_at))
                    .or_insert(deleted_at);
            }
        }

        match self.shared.store.set_end_timestamp(id, deleted_at).await {
            Ok(()) => {
                self.shared.metrics.end_updates.inc();
                Ok(())
            }
            Err(e) => {
                self.shared.metrics.end_update_errors.inc();
                Err(e)
            }
        }
    }

    /// Rows currently buffered
    pub fn pending(&self) -> usize {
        self.shared.buffer.lock().len()
    }

    /// Metrics handle for the reporter
    pub fn metrics_handle(&self, id: impl Into<String>) -> WriterMetricsHandle {
        WriterMetricsHandle::new(id, Arc::clone(&self.shared.metrics))
    }

    /// Stop the timer, wait for it, flush what is left, then close the store
    ///
    /// Inserts arriving after this point are flushed immediately.
    ///
    /// # Errors
    ///
    /// Returns the store's close error; the final flush logs its own failures.
    pub async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Relaxed);
        self.cancel.cancel();

        let timer = self.timer.lock().take();
        if let Some(handle) = timer
            && let Err(e) = handle.await
        {
            warn!(error = %e, "incident writer timer task failed");
        }

        self.shared.flush().await;
        info!(
            rows_inserted = self.shared.metrics.rows_inserted.get(),
            rows_dropped = self.shared.metrics.rows_dropped.get(),
            "incident writer drained"
        );

        self.shared.store.close().await
    }
}

async fn run_timer(shared: Arc<Shared>, flush_interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => shared.flush().await,
        }
    }

    debug!("incident writer timer stopped");
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;
