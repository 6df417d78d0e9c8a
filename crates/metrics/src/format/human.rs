//! Human-readable metrics formatter
//!
//! # Example Output
//!
//! ```text
//! [metrics] worker_pool (pool): dropped=0 processed=1.2K (+120) processing_errors=3 queue_depth=0
//! [metrics] traffic_incidents (clickhouse): flush_duration=n:24 avg:18.3ms rows_inserted=1.2K (+118)
//! ```

use std::fmt::Write;

use super::{MetricsFormatter, format_count, format_seconds};
use crate::{ComponentSnapshot, MetricValue};

/// Human-readable metrics formatter
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter;

impl HumanFormatter {
    /// Create a new human formatter
    pub fn new() -> Self {
        Self
    }
}

impl MetricsFormatter for HumanFormatter {
    fn format_component(
        &self,
        snapshot: &ComponentSnapshot,
        previous: Option<&ComponentSnapshot>,
    ) -> String {
        let mut output = format!(
            "[metrics] {} ({}):",
            snapshot.id, snapshot.component_type
        );

        for (name, value) in &snapshot.values {
            match value {
                MetricValue::Counter(v) => {
                    let _ = write!(output, " {}={}", name, format_count(*v));
                    if let Some(prev) = previous {
                        let delta = v.saturating_sub(prev.counter_value(name));
                        if delta > 0 {
                            let _ = write!(output, " (+{})", format_count(delta));
                        }
                    }
                }
                MetricValue::Gauge(v) => {
                    let _ = write!(output, " {name}={v}");
                }
                MetricValue::Histogram(h) => {
                    let _ = write!(output, " {}=n:{}", name, format_count(h.count));
                    if let Some(mean) = h.mean() {
                        // Duration histograms are recorded in seconds
                        if name.ends_with("duration") {
                            let _ = write!(output, " avg:{}", format_seconds(mean));
                        } else {
                            let _ = write!(output, " avg:{mean:.1}");
                        }
                    }
                }
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HistogramSnapshot;

    #[test]
    fn test_format_component_with_delta() {
        let prev = ComponentSnapshot::new("pool", "worker_pool").counter("processed", 10);
        let snap = ComponentSnapshot::new("pool", "worker_pool")
            .counter("processed", 25)
            .gauge("queue_depth", 3);

        let line = HumanFormatter::new().format_component(&snap, Some(&prev));
        assert_eq!(
            line,
            "[metrics] pool (worker_pool): processed=25 (+15) queue_depth=3"
        );
    }

    #[test]
    fn test_format_duration_histogram() {
        let snap = ComponentSnapshot::new("store", "clickhouse").histogram(
            "flush_duration",
            HistogramSnapshot {
                bounds: vec![1.0],
                counts: vec![2, 0],
                count: 2,
                sum: 0.04,
            },
        );

        let line = HumanFormatter::new().format_component(&snap, None);
        assert!(line.contains("flush_duration=n:2 avg:20.0ms"), "{line}");
    }
}
