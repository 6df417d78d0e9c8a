//! Beacon - Pipeline
//!
//! The ingestion coordinator between the MQTT source and the stores.
//!
//! # Architecture
//!
//! ```text
//!                       bounded MPMC queue
//! [MQTT source] ──try_send──► [ Message ... ] ──recv──► [Worker 0] ─┐
//!   (Submitter)    full → drop                 ├──recv──► [Worker 1] ─┼─► MessageProcessor
//!                                               └──recv──► [Worker N] ─┘     │
//!                                                                            ├─► LocationCache
//!                                                                            └─► IncidentWriter
//! ```
//!
//! Submitting never blocks the transport: when the queue is full the message
//! is dropped and counted. Workers exit once every [`Submitter`] is dropped
//! and the queue is drained.

mod error;
mod metrics;
mod pool;
mod processor;

pub use error::{PipelineError, Result};
pub use metrics::{PoolMetrics, PoolMetricsHandle};
pub use pool::{Message, Submitter, WorkerPool};
pub use processor::{MessageHandler, MessageProcessor};

/// Default queue capacity
pub const DEFAULT_QUEUE_SIZE: usize = 1024;

/// Default number of workers
pub const DEFAULT_WORKER_COUNT: usize = 8;
