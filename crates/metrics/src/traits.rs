//! Metrics provider trait
//!
//! Components implement this (usually through a handle holding an `Arc` to
//! their metrics) so the reporter and the ops endpoint can collect snapshots
//! without knowing the concrete types.

use crate::ComponentSnapshot;

/// Trait for components to provide metrics to the reporter
pub trait MetricsProvider: Send + Sync {
    /// Unique identifier for this component instance
    fn component_id(&self) -> &str;

    /// Component type (e.g., "mqtt", "clickhouse", "cache", "osrm", "worker_pool")
    fn component_type(&self) -> &str;

    /// Get a snapshot of current metrics
    fn snapshot(&self) -> ComponentSnapshot;
}
