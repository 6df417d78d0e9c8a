//! Event to Incident projection

use beacon_protocol::{Event, Incident, TopicInfo};
use beacon_routing::RouteResult;
use chrono::{DateTime, Utc};

use crate::Geometry;

/// Flatten an event into its analytic record
///
/// `geometry` and `route` come from [`Geometry::of`] and the route provider;
/// `now` stamps events whose validity has no start time.
pub fn to_incident(
    event: &Event,
    topic: &TopicInfo<'_>,
    raw_json: &str,
    geometry: Option<Geometry>,
    route: Option<&RouteResult>,
    now: DateTime<Utc>,
) -> Incident {
    let timestamp = event.start_time().unwrap_or(now);

    let mut inc = Incident::new(event.id.clone(), timestamp);
    inc.version = event.version;
    // An end before the start would break ordering queries; treat it as
    // ending at the start.
    inc.end_timestamp = event.end_time().map(|end| end.max(timestamp));
    inc.province = topic.region.to_string();
    inc.record_type = topic.event_type.to_string();
    inc.name = owned(&event.name);
    inc.severity = owned(&event.severity);
    inc.probability = owned(&event.probability);
    inc.mobility = owned(&event.mobility);
    inc.raw_json = raw_json.to_string();
    inc.location_type = geometry.map(|g| g.kind());

    let location = &event.location;
    if let Some(linear) = &location.linear {
        inc.position = linear.from.coordinates;
        inc.to_position = Some(linear.to.coordinates);
        inc.direction = owned(&linear.direction);
        inc.km = linear.from.km.map(|km| km as f32);
        inc.to_km = linear.to.km.map(|km| km as f32);
        apply_admin(
            &mut inc,
            &linear.from.province,
            &linear.from.state,
            &linear.from.municipality,
        );
    } else if let Some(point) = &location.point {
        inc.position = point.coordinates;
        inc.direction = owned(&point.direction);
        apply_admin(&mut inc, &point.province, &point.state, &point.municipality);
    }

    if let Some(cause) = &event.cause {
        inc.cause_type = owned(&cause.cause_type);
        inc.cause_subtypes = cause.subtypes.clone();
    }

    inc.delay_minutes = event.delay_seconds().map(|secs| secs / 60.0);

    // First listed road wins
    if let Some(road) = location.roads.first() {
        inc.road_name = owned(&road.name);
        inc.road_number = owned(&road.number);
        inc.road_destination = owned(&road.destination);
    }

    inc.length_meters = route
        .map(|r| r.distance_meters)
        .filter(|d| *d > 0.0)
        .or(location.length);

    inc
}

/// Event-supplied administrative metadata takes precedence over the topic
fn apply_admin(
    inc: &mut Incident,
    province: &Option<String>,
    state: &Option<String>,
    municipality: &Option<String>,
) {
    if let Some(p) = non_empty(province) {
        inc.province = p.to_string();
    }
    if let Some(s) = non_empty(state) {
        inc.autonomous_community = s.to_string();
    }
    if let Some(m) = non_empty(municipality) {
        inc.municipality = m.to_string();
    }
}

#[inline]
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[inline]
fn owned(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
