//! JSON metrics formatter
//!
//! One JSON object per component, suitable for log shipping.

use super::MetricsFormatter;
use crate::ComponentSnapshot;

/// JSON metrics formatter
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

impl MetricsFormatter for JsonFormatter {
    fn format_component(
        &self,
        snapshot: &ComponentSnapshot,
        _previous: Option<&ComponentSnapshot>,
    ) -> String {
        serde_json::to_string(snapshot).unwrap_or_else(|e| {
            format!(r#"{{"id":"{}","error":"{}"}}"#, snapshot.id, e)
        })
    }
}
