//! Route resolution metrics

use std::sync::Arc;
use std::time::Duration;

use beacon_metrics::{ComponentSnapshot, Counter, DURATION_BUCKETS, Histogram, MetricsProvider};

/// Bounds (meters) for resolved route distances
pub const DISTANCE_BUCKETS: &[f64] = &[
    100.0, 500.0, 1_000.0, 5_000.0, 10_000.0, 50_000.0, 100_000.0,
];

/// Per-outcome request counters plus latency and distance distributions
#[derive(Debug)]
pub struct RouteMetrics {
    pub success: Counter,
    pub errors: Counter,
    /// Service answered but returned no route
    pub fallbacks: Counter,
    pub duration: Histogram,
    pub distance: Histogram,
}

impl Default for RouteMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteMetrics {
    pub fn new() -> Self {
        Self {
            success: Counter::new(),
            errors: Counter::new(),
            fallbacks: Counter::new(),
            duration: Histogram::new(DURATION_BUCKETS),
            distance: Histogram::new(DISTANCE_BUCKETS),
        }
    }

    #[inline]
    pub fn record_success(&self, distance_meters: f64) {
        self.success.inc();
        self.distance.observe(distance_meters);
    }

    #[inline]
    pub fn record_error(&self) {
        self.errors.inc();
    }

    #[inline]
    pub fn record_fallback(&self) {
        self.fallbacks.inc();
    }

    #[inline]
    pub fn record_duration(&self, elapsed: Duration) {
        self.duration.observe_duration(elapsed);
    }

    /// Handle for the reporter
    pub fn handle(self: &Arc<Self>, id: impl Into<String>) -> RouteMetricsHandle {
        RouteMetricsHandle {
            id: id.into(),
            metrics: Arc::clone(self),
        }
    }
}

/// Handle for accessing route metrics
#[derive(Clone)]
pub struct RouteMetricsHandle {
    id: String,
    metrics: Arc<RouteMetrics>,
}

impl MetricsProvider for RouteMetricsHandle {
    fn component_id(&self) -> &str {
        &self.id
    }

    fn component_type(&self) -> &str {
        "osrm"
    }

    fn snapshot(&self) -> ComponentSnapshot {
        let m = &self.metrics;
        ComponentSnapshot::new(&self.id, self.component_type())
            .counter("success", m.success.get())
            .counter("errors", m.errors.get())
            .counter("fallbacks", m.fallbacks.get())
            .histogram("request_duration", m.duration.snapshot())
            .histogram("distance_meters", m.distance.snapshot())
    }
}
