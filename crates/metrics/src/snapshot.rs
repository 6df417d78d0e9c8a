//! Point-in-time metric values

use std::collections::BTreeMap;

use serde::Serialize;

/// Copy of a histogram's state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistogramSnapshot {
    /// Inclusive upper bounds; `counts` has one extra overflow slot
    pub bounds: Vec<f64>,
    pub counts: Vec<u64>,
    pub count: u64,
    pub sum: f64,
}

impl HistogramSnapshot {
    /// Average observation, if any were recorded
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// A single named metric value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Counter(u64),
    Gauge(i64),
    Histogram(HistogramSnapshot),
}

/// Everything one component exposes at a point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComponentSnapshot {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub values: BTreeMap<&'static str, MetricValue>,
}

impl ComponentSnapshot {
    pub fn new(id: impl Into<String>, component_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_type: component_type.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn counter(mut self, name: &'static str, value: u64) -> Self {
        self.values.insert(name, MetricValue::Counter(value));
        self
    }

    pub fn gauge(mut self, name: &'static str, value: i64) -> Self {
        self.values.insert(name, MetricValue::Gauge(value));
        self
    }

    pub fn histogram(mut self, name: &'static str, value: HistogramSnapshot) -> Self {
        self.values.insert(name, MetricValue::Histogram(value));
        self
    }

    /// Counter value by name (0 when absent or not a counter)
    pub fn counter_value(&self, name: &str) -> u64 {
        match self.values.get(name) {
            Some(MetricValue::Counter(v)) => *v,
            _ => 0,
        }
    }
}
