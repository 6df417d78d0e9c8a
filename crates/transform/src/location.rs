//! Event to MapLocation projection

use beacon_protocol::{Event, MapLocation};
use beacon_routing::RouteResult;

use crate::{Geometry, icon_for};

/// Build the live-map record for an event with usable geometry
///
/// Segments take their path, distance and duration from `route`; when no
/// route is given the segment is drawn as a straight line.
pub fn to_map_location(
    event: &Event,
    event_type: &str,
    geometry: Geometry,
    route: Option<RouteResult>,
) -> MapLocation {
    let severity = match event.severity.as_deref() {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => "unknown".to_string(),
    };

    let mut location = MapLocation {
        id: event.id.clone(),
        kind: geometry.kind(),
        icon: icon_for(event_type).to_string(),
        severity,
        event_type: event_type.to_string(),
        point: None,
        path: Vec::new(),
        distance: 0.0,
        duration: 0.0,
    };

    match geometry {
        Geometry::Point(coords) => location.point = Some(coords),
        Geometry::Segment { from, to } => {
            let route = route.unwrap_or_else(|| RouteResult::straight_line(from, to));
            location.path = route.path;
            location.distance = route.distance_meters;
            location.duration = route.duration_seconds;
        }
    }

    location
}
