//! Beacon - Metrics
//!
//! Internal metrics collection and reporting for observability.
//!
//! # Overview
//!
//! This crate provides:
//! - Atomic counters, gauges and fixed-bucket histograms
//! - The `MetricsProvider` trait components implement to expose snapshots
//! - `MetricsReporter`, which logs every provider at a configured interval
//!
//! # Metrics Handle Pattern
//!
//! Components receive an `Arc<...Metrics>` in their constructor and provide a
//! `metrics_handle()` returning a lightweight handle that implements
//! `MetricsProvider`. There is no process-wide registry: the binary collects
//! handles and hands them to the reporter and the ops endpoint.
//!
//! ```text
//! Component (owns Arc<Metrics>)
//!     │
//!     ├──► metrics_handle() → Handle (clones Arc, implements MetricsProvider)
//!     │
//!     └──► run() [consumes self, Arc keeps metrics alive]
//! ```
//!
//! # Example
//!
//! ```ignore
//! use beacon_metrics::{MetricsProvider, MetricsReporter};
//! use std::sync::Arc;
//!
//! let writer = IncidentWriter::new(store, config, Arc::new(WriterMetrics::new()));
//! let handle: Arc<dyn MetricsProvider> = Arc::new(writer.metrics_handle());
//!
//! let reporter = MetricsReporter::builder()
//!     .config(config.metrics.clone())
//!     .provider(handle)
//!     .build();
//! tokio::spawn(reporter.run(cancel.clone()));
//! ```

pub mod format;
mod histogram;
mod reporter;
mod snapshot;
mod traits;

pub use format::{HumanFormatter, JsonFormatter, MetricsFormatter};
pub use histogram::{DURATION_BUCKETS, Histogram};
pub use reporter::{MetricsReporter, MetricsReporterBuilder};
pub use snapshot::{ComponentSnapshot, HistogramSnapshot, MetricValue};
pub use traits::MetricsProvider;

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Atomic counter wrapper for convenient metric operations
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Create a new counter initialized to 0
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Increment the counter by `val` (relaxed ordering for performance)
    #[inline]
    pub fn add(&self, val: u64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    /// Increment the counter by 1
    #[inline]
    pub fn inc(&self) {
        self.add(1);
    }

    /// Get the current value (relaxed ordering)
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Atomic gauge for values that go up and down (queue depth, pending rows)
#[derive(Debug, Default)]
pub struct Gauge(AtomicI64);

impl Gauge {
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicI64::new(0))
    }

    #[inline]
    pub fn set(&self, val: i64) {
        self.0.store(val, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}
