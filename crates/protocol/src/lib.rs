//! Beacon Protocol - Core types shared across the ingestion pipeline
//!
//! This crate provides the foundational types that flow through the pipeline:
//! - `Event` / `DeletionEvent` - DATEX II wire payloads published by the feed
//! - `TopicInfo` - Hierarchical MQTT topic classification
//! - `Incident` - Flattened analytic record persisted to ClickHouse
//! - `MapLocation` - Live-view geometry record held in the location cache
//!
//! # Topic Format
//!
//! ```text
//! beacon/v1/{country}/{region}/{category}/{event_type...}
//! ```
//!
//! `category == "deletions"` marks a deletion; anything else is a situation.

mod error;
mod event;
mod incident;
mod location;
mod topic;

pub use error::ProtocolError;
pub use event::{
    Cause, Coordinates, Delays, DeletionEvent, Event, Impact, LinearLocation, Location,
    LocationPoint, PointLocation, RoadInfo, Validity,
};
pub use incident::Incident;
pub use location::{GeometryKind, MapLocation};
pub use topic::{DELETIONS_CATEGORY, MessageKind, TopicInfo, classify};

// Re-export bytes for convenience
pub use bytes::Bytes;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Wildcard subscription covering every beacon topic
pub const SUBSCRIPTION_TOPIC: &str = "beacon/#";
