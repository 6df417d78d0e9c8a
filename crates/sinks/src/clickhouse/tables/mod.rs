//! ClickHouse table row types

mod incidents;

pub use incidents::IncidentRow;

#[cfg(test)]
#[path = "incidents_test.rs"]
mod incidents_test;
