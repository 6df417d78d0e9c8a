//! Beacon - Transform
//!
//! Turns a decoded [`Event`](beacon_protocol::Event) into the flattened
//! [`Incident`](beacon_protocol::Incident) persisted to ClickHouse and, when
//! the event carries usable coordinates, the
//! [`MapLocation`](beacon_protocol::MapLocation) held in the live cache.
//!
//! # Architecture
//!
//! ```text
//! Event ──► Geometry::of ──► (segment) RouteProvider::resolve
//!   │                              │
//!   ├──────────► to_incident ◄─────┤   length from routed distance
//!   │                              │
//!   └──────────► to_map_location ◄─┘   path, distance, duration
//! ```
//!
//! Only [`RecordTransformer::transform`] touches I/O (route resolution for
//! segments); the projection functions are pure.

mod geometry;
mod icons;
mod incident;
mod location;
mod transformer;

pub use geometry::Geometry;
pub use icons::{DEFAULT_ICON, icon_for};
pub use incident::to_incident;
pub use location::to_map_location;
pub use transformer::{RecordTransformer, Transformed};

#[cfg(test)]
#[path = "transformer_test.rs"]
mod transformer_test;
