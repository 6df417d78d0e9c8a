//! Beacon Routing - Road path resolution between two points
//!
//! Linear incidents are drawn along the road network rather than as a
//! straight line. A [`RouteProvider`] turns two endpoints into a path with a
//! distance and duration.
//!
//! # Failure Model
//!
//! Resolution never returns an error. Network failures, non-success
//! statuses and empty result sets all degrade to a two-point straight line
//! with zero distance and duration, and are classified in [`RouteMetrics`].
//!
//! # Example
//!
//! ```ignore
//! let metrics = Arc::new(RouteMetrics::new());
//! let osrm = OsrmRouteService::new(&config.routing, Arc::clone(&metrics))?;
//! let route = osrm.resolve(from, to).await;
//! ```

mod error;
mod metrics;
mod osrm;
mod provider;

pub use error::{Result, RoutingError};
pub use metrics::{DISTANCE_BUCKETS, RouteMetrics, RouteMetricsHandle};
pub use osrm::OsrmRouteService;
pub use provider::{RouteProvider, RouteResult, StraightLineProvider};
