//! Worker pool metrics
//!
//! Counters follow a message through the coordinator:
//! `received → enqueued → processed | errors`, or `received → dropped`.

use std::sync::Arc;
use std::time::Duration;

use beacon_metrics::{ComponentSnapshot, Counter, Gauge, Histogram, MetricsProvider};
use beacon_protocol::MessageKind;

/// Metrics for the ingestion coordinator
#[derive(Debug)]
pub struct PoolMetrics {
    /// Messages handed to a submitter
    pub received: Counter,
    pub enqueued: Counter,
    /// Messages refused because the queue was full or closed
    pub dropped: Counter,
    /// Messages handled without error
    pub processed: Counter,
    pub errors: Counter,
    pub situations: Counter,
    pub deletions: Counter,
    /// Messages waiting in the queue
    pub queue_depth: Gauge,
    pub process_duration: Histogram,
}

impl Default for PoolMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolMetrics {
    pub fn new() -> Self {
        Self {
            received: Counter::new(),
            enqueued: Counter::new(),
            dropped: Counter::new(),
            processed: Counter::new(),
            errors: Counter::new(),
            situations: Counter::new(),
            deletions: Counter::new(),
            queue_depth: Gauge::new(),
            process_duration: Histogram::durations(),
        }
    }

    #[inline]
    pub fn record_processed(&self, kind: MessageKind, elapsed: Duration) {
        self.processed.inc();
        match kind {
            MessageKind::Situation => self.situations.inc(),
            MessageKind::Deletion => self.deletions.inc(),
        }
        self.process_duration.observe_duration(elapsed);
    }

    #[inline]
    pub fn record_error(&self, elapsed: Duration) {
        self.errors.inc();
        self.process_duration.observe_duration(elapsed);
    }

    /// Get a provider handle for the reporter
    pub fn handle(self: &Arc<Self>, id: impl Into<String>) -> PoolMetricsHandle {
        PoolMetricsHandle {
            id: id.into(),
            metrics: Arc::clone(self),
        }
    }
}

/// Reporter view of [`PoolMetrics`]
#[derive(Clone)]
pub struct PoolMetricsHandle {
    id: String,
    metrics: Arc<PoolMetrics>,
}

impl MetricsProvider for PoolMetricsHandle {
    fn component_id(&self) -> &str {
        &self.id
    }

    fn component_type(&self) -> &str {
        "worker_pool"
    }

    fn snapshot(&self) -> ComponentSnapshot {
        let m = &self.metrics;
        ComponentSnapshot::new(&self.id, self.component_type())
            .counter("received", m.received.get())
            .counter("enqueued", m.enqueued.get())
            .counter("dropped", m.dropped.get())
            .counter("processed", m.processed.get())
            .counter("errors", m.errors.get())
            .counter("situations", m.situations.get())
            .counter("deletions", m.deletions.get())
            .gauge("queue_depth", m.queue_depth.get())
            .histogram("process_duration", m.process_duration.snapshot())
    }
}
