//! Beacon - Sinks
//!
//! Durable storage for the incident history.
//!
//! # Architecture
//!
//! Workers hand transformed incidents to a shared [`IncidentWriter`], which
//! buffers them and flushes to an [`IncidentStore`] on a size or time trigger.
//!
//! ```text
//! [Worker] ──insert──┐
//! [Worker] ──insert──┼──► [IncidentWriter buffer] ──flush──► [IncidentStore]
//! [Timer]  ──flush───┘         (mutex, append/swap only)      (bulk insert)
//! ```
//!
//! # Available Stores
//!
//! | Store | Purpose |
//! |-------|---------|
//! | `clickhouse` | `traffic_incidents` table over HTTP |
//! | `memory` | In-process store for tests and dry runs |

/// ClickHouse store - analytics database
pub mod clickhouse;

/// In-memory store - tests and `--dry-run`
pub mod memory;

mod error;
mod store;
mod writer;

pub use error::{Result, StoreError};
pub use store::{IncidentStore, InsertOutcome};
pub use writer::{IncidentWriter, WriterConfig, WriterMetrics, WriterMetricsHandle};

// Row type shared by every store
pub use clickhouse::IncidentRow;

/// Epoch milliseconds used for "not ended yet"
pub const END_TIMESTAMP_UNSET: i64 = 0;
