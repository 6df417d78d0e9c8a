//! Route provider abstraction

use async_trait::async_trait;
use beacon_protocol::Coordinates;

/// A resolved (or degraded) route
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub path: Vec<Coordinates>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl RouteResult {
    /// Two-point path with no distance or duration
    pub fn straight_line(from: Coordinates, to: Coordinates) -> Self {
        Self {
            path: vec![from, to],
            distance_meters: 0.0,
            duration_seconds: 0.0,
        }
    }
}

/// Resolves a road path between two points
///
/// Implementations must not fail: they return
/// [`RouteResult::straight_line`] when no route can be obtained.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn resolve(&self, from: Coordinates, to: Coordinates) -> RouteResult;
}

/// Provider used when routing is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineProvider;

#[async_trait]
impl RouteProvider for StraightLineProvider {
    async fn resolve(&self, from: Coordinates, to: Coordinates) -> RouteResult {
        RouteResult::straight_line(from, to)
    }
}
