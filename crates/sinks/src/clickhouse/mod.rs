//! ClickHouse Store - Incident history table
//!
//! Writes [`IncidentRow`]s to `traffic_incidents` with the row-based
//! clickhouse client and applies conditional end-timestamp mutations for
//! deletions.
//!
//! # Tables
//!
//! | Table | Purpose |
//! |-------|---------|
//! | traffic_incidents | One row per processed situation event |

mod config;
mod store;
pub mod tables;

pub use config::build_client;
pub use store::ClickHouseStore;
pub use tables::IncidentRow;
