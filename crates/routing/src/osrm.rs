//! OSRM HTTP route service

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use beacon_config::RoutingConfig;
use beacon_protocol::Coordinates;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{Result, RouteMetrics, RouteProvider, RouteResult, RoutingError};

/// Route provider backed by an OSRM `route` service
pub struct OsrmRouteService {
    base_url: String,
    client: reqwest::Client,
    metrics: Arc<RouteMetrics>,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// `[lon, lat]` pairs
    coordinates: Vec<[f64; 2]>,
}

impl OsrmRouteService {
    /// Create a service from routing configuration
    ///
    /// # Errors
    ///
    /// Returns error if the URL is not http(s) or the HTTP client cannot be built.
    pub fn new(config: &RoutingConfig, metrics: Arc<RouteMetrics>) -> Result<Self> {
        Self::with_timeout(&config.osrm_url, config.timeout, metrics)
    }

    /// Create a service for `base_url` with a per-request timeout
    pub fn with_timeout(
        base_url: &str,
        timeout: Duration,
        metrics: Arc<RouteMetrics>,
    ) -> Result<Self> {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(RoutingError::InvalidUrl {
                url: base_url.to_string(),
                message: "expected an http:// or https:// URL",
            });
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            metrics,
        })
    }

    /// Request URL for a pair of points (OSRM takes lon,lat order)
    pub fn route_url(&self, from: Coordinates, to: Coordinates) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, from.lon, from.lat, to.lon, to.lat
        )
    }

    /// `Ok(None)` when OSRM answered without a usable route
    async fn fetch(&self, from: Coordinates, to: Coordinates) -> Result<Option<RouteResult>> {
        let response = self
            .client
            .get(self.route_url(from, to))
            .send()
            .await?
            .error_for_status()?;

        let body: OsrmResponse = response.json().await?;

        let Some(route) = body.routes.into_iter().next() else {
            return Ok(None);
        };
        if route.geometry.coordinates.is_empty() {
            return Ok(None);
        }

        Ok(Some(RouteResult {
            path: route
                .geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| Coordinates::new(lat, lon))
                .collect(),
            distance_meters: route.distance,
            duration_seconds: route.duration,
        }))
    }
}

#[async_trait]
impl RouteProvider for OsrmRouteService {
    async fn resolve(&self, from: Coordinates, to: Coordinates) -> RouteResult {
        let start = Instant::now();
        let outcome = self.fetch(from, to).await;
        self.metrics.record_duration(start.elapsed());

        match outcome {
            Ok(Some(route)) => {
                self.metrics.record_success(route.distance_meters);
                route
            }
            Ok(None) => {
                self.metrics.record_fallback();
                debug!(
                    from_lat = from.lat,
                    from_lon = from.lon,
                    to_lat = to.lat,
                    to_lon = to.lon,
                    "osrm returned no route, using straight line"
                );
                RouteResult::straight_line(from, to)
            }
            Err(e) => {
                self.metrics.record_error();
                warn!(error = %e, "osrm request failed, using straight line");
                RouteResult::straight_line(from, to)
            }
        }
    }
}
