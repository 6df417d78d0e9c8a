//! Incident writer metrics

use std::sync::Arc;

use beacon_metrics::{ComponentSnapshot, Counter, DURATION_BUCKETS, Gauge, Histogram, MetricsProvider};

/// Bounds for rows-per-flush
pub const BATCH_SIZE_BUCKETS: &[f64] = &[1.0, 5.0, 10.0, 25.0, 50.0, 100.0];

/// Metrics for the batched incident writer
#[derive(Debug)]
pub struct WriterMetrics {
    /// Rows written to the store
    pub rows_inserted: Counter,
    /// Rows refused individually by the store
    pub row_errors: Counter,
    /// Batches the store failed to take
    pub send_errors: Counter,
    /// Rows lost with failed batches
    pub rows_dropped: Counter,
    /// Successful end-timestamp updates
    pub end_updates: Counter,
    pub end_update_errors: Counter,
    /// Rows currently buffered
    pub pending: Gauge,
    pub batch_size: Histogram,
    pub flush_duration: Histogram,
}

impl Default for WriterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl WriterMetrics {
    pub fn new() -> Self {
        Self {
            rows_inserted: Counter::new(),
            row_errors: Counter::new(),
            send_errors: Counter::new(),
            rows_dropped: Counter::new(),
            end_updates: Counter::new(),
            end_update_errors: Counter::new(),
            pending: Gauge::new(),
            batch_size: Histogram::new(BATCH_SIZE_BUCKETS),
            flush_duration: Histogram::new(DURATION_BUCKETS),
        }
    }

    /// Record a batch the store accepted
    #[inline]
    pub fn record_batch(&self, written: usize, failed: usize) {
        self.rows_inserted.add(written as u64);
        self.row_errors.add(failed as u64);
        self.batch_size.observe((written + failed) as f64);
    }

    /// Record a batch the store failed to take
    #[inline]
    pub fn record_send_error(&self, rows: usize) {
        self.send_errors.inc();
        self.rows_dropped.add(rows as u64);
    }
}

/// Handle for accessing writer metrics
///
/// Holds an Arc to the metrics, so it stays valid however long the writer
/// lives.
#[derive(Clone)]
pub struct WriterMetricsHandle {
    id: String,
    metrics: Arc<WriterMetrics>,
}

impl WriterMetricsHandle {
    pub fn new(id: impl Into<String>, metrics: Arc<WriterMetrics>) -> Self {
        Self {
            id: id.into(),
            metrics,
        }
    }
}

impl MetricsProvider for WriterMetricsHandle {
    fn component_id(&self) -> &str {
        &self.id
    }

    fn component_type(&self) -> &str {
        "incident_writer"
    }

    fn snapshot(&self) -> ComponentSnapshot {
        let m = &self.metrics;
        ComponentSnapshot::new(&self.id, self.component_type())
            .counter("rows_inserted", m.rows_inserted.get())
            .counter("row_errors", m.row_errors.get())
            .counter("send_errors", m.send_errors.get())
            .counter("rows_dropped", m.rows_dropped.get())
            .counter("end_updates", m.end_updates.get())
            .counter("end_update_errors", m.end_update_errors.get())
            .gauge("pending", m.pending.get())
            .histogram("batch_size", m.batch_size.snapshot())
            .histogram("flush_duration", m.flush_duration.snapshot())
    }
}
