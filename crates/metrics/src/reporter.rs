//! Periodic metrics reporter
//!
//! Collects snapshots from every registered provider at the configured
//! interval and writes them through `tracing`.

use std::collections::HashMap;
use std::sync::Arc;

use beacon_config::{MetricsConfig, MetricsFormat};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{ComponentSnapshot, HumanFormatter, JsonFormatter, MetricsFormatter, MetricsProvider};

/// Builder for constructing a MetricsReporter
#[derive(Default)]
pub struct MetricsReporterBuilder {
    config: Option<MetricsConfig>,
    providers: Vec<Arc<dyn MetricsProvider>>,
}

impl MetricsReporterBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metrics configuration
    pub fn config(mut self, config: MetricsConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Register a metrics provider
    pub fn provider(mut self, provider: Arc<dyn MetricsProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Register multiple metrics providers
    pub fn providers(mut self, providers: Vec<Arc<dyn MetricsProvider>>) -> Self {
        self.providers.extend(providers);
        self
    }

    /// Build the MetricsReporter
    pub fn build(self) -> MetricsReporter {
        let config = self.config.unwrap_or_default();
        let formatter: Box<dyn MetricsFormatter> = match config.format {
            MetricsFormat::Human => Box::new(HumanFormatter::new()),
            MetricsFormat::Json => Box::new(JsonFormatter::new()),
        };

        MetricsReporter {
            config,
            formatter,
            providers: self.providers,
            previous: HashMap::new(),
        }
    }
}

/// Metrics reporter
///
/// Reports every registered provider at a configured interval.
pub struct MetricsReporter {
    config: MetricsConfig,
    formatter: Box<dyn MetricsFormatter>,
    providers: Vec<Arc<dyn MetricsProvider>>,
    previous: HashMap<String, ComponentSnapshot>,
}

impl MetricsReporter {
    /// Create a new builder
    pub fn builder() -> MetricsReporterBuilder {
        MetricsReporterBuilder::new()
    }

    /// Run the reporter until cancellation
    ///
    /// This is the main entry point - spawn this as a tokio task.
    pub async fn run(mut self, cancel: CancellationToken) {
        if !self.config.enabled {
            info!("metrics reporting disabled");
            return;
        }

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; skip it so the first report
        // covers a full interval.
        ticker.tick().await;

        info!(
            interval_secs = self.config.interval.as_secs(),
            format = ?self.config.format,
            providers = self.providers.len(),
            "metrics reporter started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    // Final report so shutdown totals are visible
                    self.report();
                    info!("metrics reporter shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.report();
                }
            }
        }
    }

    /// Collect and report metrics once, returning the formatted lines
    pub fn report(&mut self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let snapshot = provider.snapshot();
            let line = self
                .formatter
                .format_component(&snapshot, self.previous.get(&snapshot.id));
            info!("{}", line);
            lines.push(line);
            self.previous.insert(snapshot.id.clone(), snapshot);
        }

        lines
    }
}
