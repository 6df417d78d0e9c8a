//! Source metrics

use std::sync::Arc;

use beacon_metrics::{ComponentSnapshot, Counter, Gauge, MetricsProvider};

/// Metrics for a message source
#[derive(Debug, Default)]
pub struct SourceMetrics {
    pub messages_received: Counter,
    pub bytes_received: Counter,
    /// Messages the ingestion queue refused
    pub messages_dropped: Counter,
    pub connection_errors: Counter,
    /// Successful connections after the first
    pub reconnects: Counter,
    /// 1 while connected to the broker
    pub connected: Gauge,
}

impl SourceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn message_received(&self, bytes: usize) {
        self.messages_received.inc();
        self.bytes_received.add(bytes as u64);
    }

    /// Get a provider handle for the reporter
    pub fn handle(self: &Arc<Self>, id: impl Into<String>) -> SourceMetricsHandle {
        SourceMetricsHandle {
            id: id.into(),
            metrics: Arc::clone(self),
        }
    }
}

/// Reporter view of [`SourceMetrics`]
#[derive(Clone)]
pub struct SourceMetricsHandle {
    id: String,
    metrics: Arc<SourceMetrics>,
}

impl MetricsProvider for SourceMetricsHandle {
    fn component_id(&self) -> &str {
        &self.id
    }

    fn component_type(&self) -> &str {
        "mqtt"
    }

    fn snapshot(&self) -> ComponentSnapshot {
        let m = &self.metrics;
        ComponentSnapshot::new(&self.id, self.component_type())
            .counter("messages_received", m.messages_received.get())
            .counter("bytes_received", m.bytes_received.get())
            .counter("messages_dropped", m.messages_dropped.get())
            .counter("connection_errors", m.connection_errors.get())
            .counter("reconnects", m.reconnects.get())
            .gauge("connected", m.connected.get())
    }
}
