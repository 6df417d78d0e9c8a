//! Record transformer

use std::sync::Arc;

use beacon_protocol::{Event, Incident, MapLocation, TopicInfo};
use beacon_routing::RouteProvider;
use chrono::Utc;

use crate::{Geometry, to_incident, to_map_location};

/// Output of transforming one event
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub incident: Incident,
    /// `None` when the event has no usable geometry
    pub location: Option<MapLocation>,
}

/// Converts events into incidents and map locations
///
/// Cheap to clone; workers share one instance.
#[derive(Clone)]
pub struct RecordTransformer {
    routes: Arc<dyn RouteProvider>,
}

impl RecordTransformer {
    pub fn new(routes: Arc<dyn RouteProvider>) -> Self {
        Self { routes }
    }

    /// Transform one event
    ///
    /// Segments are resolved through the route provider; points and events
    /// without usable geometry never touch it.
    pub async fn transform(&self, event: &Event, topic: &TopicInfo<'_>, raw_json: &str) -> Transformed {
        let geometry = Geometry::of(event);

        let route = match geometry {
            Some(Geometry::Segment { from, to }) => Some(self.routes.resolve(from, to).await),
            _ => None,
        };

        let incident = to_incident(event, topic, raw_json, geometry, route.as_ref(), Utc::now());
        let location =
            geometry.map(|g| to_map_location(event, topic.event_type, g, route));

        if location.is_none() {
            tracing::debug!(id = %event.id, "event has no usable geometry, skipping map location");
        }

        Transformed { incident, location }
    }
}
