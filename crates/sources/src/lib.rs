//! Beacon - Sources
//!
//! Transports that receive feed messages and hand them to the ingestion
//! queue through a [`Submitter`](beacon_pipeline::Submitter).
//!
//! # Available Sources
//!
//! - **MQTT** - subscribes to the feed topic tree (`beacon/#`)
//!
//! # Lifecycle
//!
//! ```ignore
//! let source = MqttSource::connect(&config.mqtt, metrics).await?; // fatal on failure
//! let task = tokio::spawn(source.run(submitter, cancel.clone()));
//! // ...
//! cancel.cancel(); // unsubscribe, disconnect, drop the submitter
//! ```

mod error;
mod metrics;
pub mod mqtt;

pub use error::{Result, SourceError};
pub use metrics::{SourceMetrics, SourceMetricsHandle};
pub use mqtt::MqttSource;
