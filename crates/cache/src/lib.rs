//! Beacon - Live Location Cache
//!
//! Holds the current [`MapLocation`](beacon_protocol::MapLocation) of every
//! active incident for map consumers.
//!
//! The backing store only expires whole keys, so each hash field gets a
//! companion sentinel key that carries the expiry:
//!
//! ```text
//! map:incidents          HASH  id -> MapLocation JSON
//! incident:<id>:expire   STRING "1", EX ttl
//! ```
//!
//! Readers sweep the hash before listing or counting: any field whose
//! sentinel is gone has expired and is removed.

mod cache;
mod error;
pub mod kv;
mod metrics;
mod ttl;

pub use cache::{ActiveCounter, LocationCache};
pub use error::{CacheError, Result};
pub use kv::{KvStore, MemoryKvStore, RedisStore};
pub use metrics::{CacheMetrics, CacheMetricsHandle};
pub use ttl::calculate_ttl;
