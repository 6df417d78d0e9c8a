//! Metrics output formatters
//!
//! Formats component snapshots for human-readable or JSON output.

mod human;
mod json;

pub use human::HumanFormatter;
pub use json::JsonFormatter;

use crate::ComponentSnapshot;

/// Trait for metrics formatters
pub trait MetricsFormatter: Send + Sync {
    /// Format one component; `previous` is the snapshot from the last report
    fn format_component(
        &self,
        snapshot: &ComponentSnapshot,
        previous: Option<&ComponentSnapshot>,
    ) -> String;
}

/// Format large counts with K/M suffixes
pub fn format_count(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 10_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Format seconds as a short latency string
pub fn format_seconds(secs: f64) -> String {
    if secs >= 1.0 {
        format!("{secs:.2}s")
    } else {
        format!("{:.1}ms", secs * 1000.0)
    }
}
