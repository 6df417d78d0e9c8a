//! Tests for event transformation

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use beacon_protocol::{Coordinates, Event, GeometryKind, classify};
use beacon_routing::{RouteProvider, RouteResult};
use chrono::{TimeZone, Utc};

use crate::{Geometry, RecordTransformer, to_incident};

const TOPIC: &str = "beacon/v1/es/madrid/situations/roadworks";

/// Route provider returning a fixed three-point route
#[derive(Default)]
struct FixedRoute {
    calls: AtomicUsize,
    distance: f64,
}

#[async_trait]
impl RouteProvider for FixedRoute {
    async fn resolve(&self, from: Coordinates, to: Coordinates) -> RouteResult {
        self.calls.fetch_add(1, Ordering::Relaxed);
        RouteResult {
            path: vec![from, Coordinates::new(40.43, -3.75), to],
            distance_meters: self.distance,
            duration_seconds: 600.0,
        }
    }
}

fn transformer(distance: f64) -> (RecordTransformer, Arc<FixedRoute>) {
    let routes = Arc::new(FixedRoute {
        calls: AtomicUsize::new(0),
        distance,
    });
    (RecordTransformer::new(routes.clone()), routes)
}

fn event(json: &str) -> Event {
    Event::from_slice(json.as_bytes()).unwrap()
}

const LINEAR: &str = r#"{
    "id": "X1",
    "version": "2",
    "severity": "High",
    "probability": "certain",
    "location": {
        "linear": {
            "direction": "both",
            "from": {"coords": {"lat": 40.41, "lon": -3.70}, "state": "Comunidad de Madrid", "province": "Madrid", "municipality": "Getafe", "km": 12.5},
            "to": {"coords": {"lat": 40.45, "lon": -3.80}, "km": 15.0}
        },
        "length": 3500,
        "roads": [
            {"name": "Autovia del Sur", "number": "A-4", "destination": "Cordoba"},
            {"name": "Ronda", "number": "M-40"}
        ]
    },
    "validity": {"startTime": "2024-05-01T08:00:00Z", "endTime": "2024-05-01T18:00:00Z"},
    "cause": {"type": "roadworks", "subtypes": ["resurfacing", "lane_closure"]},
    "impact": {"delays": {"delay": 450}}
}"#;

#[tokio::test]
async fn test_linear_event_produces_segment() {
    let (t, routes) = transformer(4200.0);
    let ev = event(LINEAR);
    let topic = classify(TOPIC);

    let out = t.transform(&ev, &topic, LINEAR).await;

    assert_eq!(routes.calls.load(Ordering::Relaxed), 1);

    let loc = out.location.expect("segment location");
    assert_eq!(loc.kind, GeometryKind::Segment);
    assert_eq!(loc.icon, "🚧");
    assert_eq!(loc.severity, "high");
    assert_eq!(loc.event_type, "roadworks");
    assert_eq!(loc.path.len(), 3);
    assert_eq!(loc.distance, 4200.0);
    assert_eq!(loc.duration, 600.0);
    assert!(loc.point.is_none());

    let inc = out.incident;
    assert_eq!(inc.id, "X1");
    assert_eq!(inc.version, 2);
    assert_eq!(inc.timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap());
    assert_eq!(
        inc.end_timestamp,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap())
    );
    assert_eq!(inc.province, "Madrid");
    assert_eq!(inc.autonomous_community, "Comunidad de Madrid");
    assert_eq!(inc.municipality, "Getafe");
    assert_eq!(inc.record_type, "roadworks");
    assert_eq!(inc.location_type, Some(GeometryKind::Segment));
    assert_eq!(inc.direction, "both");
    assert_eq!(inc.position, Coordinates::new(40.41, -3.70));
    assert_eq!(inc.to_position, Some(Coordinates::new(40.45, -3.80)));
    assert_eq!(inc.km, Some(12.5));
    assert_eq!(inc.to_km, Some(15.0));
    assert_eq!(inc.cause_type, "roadworks");
    assert_eq!(inc.cause_subtypes, vec!["resurfacing", "lane_closure"]);
    assert_eq!(inc.road_name, "Autovia del Sur");
    assert_eq!(inc.road_number, "A-4");
    assert_eq!(inc.road_destination, "Cordoba");
    assert_eq!(inc.delay_minutes, Some(7.5));
    assert_eq!(inc.length_meters, Some(4200.0));
    assert_eq!(inc.raw_json, LINEAR);
}

#[tokio::test]
async fn test_zero_route_distance_uses_declared_length() {
    let (t, _) = transformer(0.0);
    let ev = event(LINEAR);
    let out = t.transform(&ev, &classify(TOPIC), LINEAR).await;
    assert_eq!(out.incident.length_meters, Some(3500.0));
}

#[tokio::test]
async fn test_point_event() {
    let json = r#"{
        "id": "P1",
        "severity": "",
        "location": {"point": {"coords": {"lat": 41.38, "lon": 2.17}, "direction": "north", "province": "Barcelona"}}
    }"#;
    let (t, routes) = transformer(1000.0);
    let out = t
        .transform(&event(json), &classify("beacon/v1/es/cataluna/situations/vehicle_obstruction"), json)
        .await;

    assert_eq!(routes.calls.load(Ordering::Relaxed), 0);

    let loc = out.location.unwrap();
    assert_eq!(loc.kind, GeometryKind::Point);
    assert_eq!(loc.point, Some(Coordinates::new(41.38, 2.17)));
    assert_eq!(loc.severity, "unknown");
    assert_eq!(loc.icon, "🚙");
    assert!(loc.path.is_empty());

    assert_eq!(out.incident.province, "Barcelona");
    assert_eq!(out.incident.direction, "north");
    assert_eq!(out.incident.to_position, None);
    assert_eq!(out.incident.length_meters, None);
}

#[tokio::test]
async fn test_zero_point_keeps_incident_without_location() {
    let json = r#"{"id": "Z1", "location": {"point": {"coords": {"lat": 0, "lon": 0}}}}"#;
    let (t, routes) = transformer(1000.0);
    let out = t.transform(&event(json), &classify(TOPIC), json).await;

    assert!(out.location.is_none());
    assert_eq!(out.incident.id, "Z1");
    assert_eq!(out.incident.location_type, None);
    assert_eq!(out.incident.province, "madrid");
    assert_eq!(routes.calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn test_linear_with_zero_endpoint_has_no_location() {
    let from_zero = r#"{"id": "L1", "location": {"linear": {
        "from": {"coords": {"lat": 0, "lon": 0}},
        "to": {"coords": {"lat": 40.45, "lon": -3.80}}}}}"#;
    let to_zero = r#"{"id": "L2", "location": {"linear": {
        "from": {"coords": {"lat": 40.45, "lon": -3.80}},
        "to": {"coords": {"lat": 0, "lon": 0}}}}}"#;

    let (t, routes) = transformer(1000.0);
    for json in [from_zero, to_zero] {
        let out = t.transform(&event(json), &classify(TOPIC), json).await;
        assert!(out.location.is_none());
        assert!(!out.incident.id.is_empty());
    }
    assert_eq!(routes.calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn test_no_location_at_all() {
    let json = r#"{"id": "N1"}"#;
    let (t, _) = transformer(1000.0);
    let out = t.transform(&event(json), &classify(TOPIC), json).await;
    assert!(out.location.is_none());
    assert_eq!(out.incident.position, Coordinates::default());
}

#[test]
fn test_missing_start_time_uses_processing_time() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let ev = event(r#"{"id": "T1", "validity": {"endTime": "2024-06-01T13:00:00Z"}}"#);
    let inc = to_incident(&ev, &classify(TOPIC), "", None, None, now);
    assert_eq!(inc.timestamp, now);
    assert_eq!(
        inc.end_timestamp,
        Some(Utc.with_ymd_and_hms(2024, 6, 1, 13, 0, 0).unwrap())
    );
}

#[test]
fn test_end_before_start_is_clamped() {
    let ev = event(
        r#"{"id": "T2", "validity": {"startTime": "2024-06-01T12:00:00Z", "endTime": "2024-06-01T11:00:00Z"}}"#,
    );
    let inc = to_incident(&ev, &classify(TOPIC), "", None, None, Utc::now());
    assert_eq!(inc.end_timestamp, Some(inc.timestamp));
}

#[test]
fn test_short_topic_leaves_fields_empty() {
    let ev = event(r#"{"id": "S1"}"#);
    let inc = to_incident(&ev, &classify("beacon/v1"), "", None, None, Utc::now());
    assert_eq!(inc.province, "");
    assert_eq!(inc.record_type, "");
}

#[test]
fn test_geometry_of() {
    let ev = event(r#"{"id": "G", "location": {"point": {"coords": {"lat": 1.0, "lon": 2.0}}}}"#);
    assert_eq!(
        Geometry::of(&ev),
        Some(Geometry::Point(Coordinates::new(1.0, 2.0)))
    );
}
