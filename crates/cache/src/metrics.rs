//! Cache metrics

use std::sync::Arc;

use beacon_metrics::{ComponentSnapshot, Counter, DURATION_BUCKETS, Histogram, MetricsProvider};

/// Metrics for the live location cache
#[derive(Debug)]
pub struct CacheMetrics {
    pub stores: Counter,
    pub store_errors: Counter,
    pub removes: Counter,
    pub remove_errors: Counter,
    /// Lookups that found nothing
    pub misses: Counter,
    /// Entries removed because their sentinel expired
    pub expired: Counter,
    /// Stored values that failed to decode
    pub decode_errors: Counter,
    pub sweep_duration: Histogram,
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self {
            stores: Counter::new(),
            store_errors: Counter::new(),
            removes: Counter::new(),
            remove_errors: Counter::new(),
            misses: Counter::new(),
            expired: Counter::new(),
            decode_errors: Counter::new(),
            sweep_duration: Histogram::new(DURATION_BUCKETS),
        }
    }

    /// Get a provider handle for the reporter
    pub fn handle(self: &Arc<Self>, id: impl Into<String>) -> CacheMetricsHandle {
        CacheMetricsHandle {
            id: id.into(),
            metrics: Arc::clone(self),
        }
    }
}

/// Reporter view of [`CacheMetrics`]
#[derive(Clone)]
pub struct CacheMetricsHandle {
    id: String,
    metrics: Arc<CacheMetrics>,
}

impl MetricsProvider for CacheMetricsHandle {
    fn component_id(&self) -> &str {
        &self.id
    }

    fn component_type(&self) -> &str {
        "location_cache"
    }

    fn snapshot(&self) -> ComponentSnapshot {
        let m = &self.metrics;
        ComponentSnapshot::new(&self.id, self.component_type())
            .counter("stores", m.stores.get())
            .counter("store_errors", m.store_errors.get())
            .counter("removes", m.removes.get())
            .counter("remove_errors", m.remove_errors.get())
            .counter("misses", m.misses.get())
            .counter("expired", m.expired.get())
            .counter("decode_errors", m.decode_errors.get())
            .histogram("sweep_duration", m.sweep_duration.snapshot())
    }
}
