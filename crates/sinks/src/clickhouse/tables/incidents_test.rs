//! Tests for IncidentRow conversion

use beacon_protocol::{Coordinates, GeometryKind, Incident};
use chrono::{TimeZone, Utc};

use super::IncidentRow;

fn sample_incident() -> Incident {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let mut inc = Incident::new("X1", start);
    inc.version = 4;
    inc.province = "Madrid".into();
    inc.record_type = "roadworks".into();
    inc.location_type = Some(GeometryKind::Segment);
    inc.position = Coordinates::new(40.41, -3.70);
    inc.to_position = Some(Coordinates::new(40.45, -3.80));
    inc.km = Some(12.5);
    inc.cause_subtypes = vec!["resurfacing".into()];
    inc.delay_minutes = Some(7.5);
    inc.length_meters = Some(4200.0);
    inc
}

#[test]
fn test_row_from_incident() {
    let inc = sample_incident();
    let row = IncidentRow::from(&inc);

    assert_eq!(row.id, "X1");
    assert_eq!(row.version, 4);
    assert_eq!(row.timestamp, inc.timestamp.timestamp_millis());
    assert_eq!(row.end_timestamp, 0);
    assert!(row.is_open());
    assert_eq!(row.location_type, "segment");
    assert_eq!(row.geometry(), Some(GeometryKind::Segment));
    assert_eq!(row.lat, 40.41);
    assert_eq!(row.to_lon, -3.80);
    assert_eq!(row.km, Some(12.5));
    assert_eq!(row.to_km, None);
    assert_eq!(row.delay_minutes, 7.5);
    assert_eq!(row.length_meters, 4200.0);
    assert_eq!(row.cause_subtypes, vec!["resurfacing"]);
}

#[test]
fn test_row_with_end_timestamp() {
    let mut inc = sample_incident();
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    inc.end_timestamp = Some(end);

    let row = IncidentRow::from(&inc);
    assert_eq!(row.end_timestamp, end.timestamp_millis());
    assert!(!row.is_open());
}

#[test]
fn test_row_without_geometry() {
    let inc = Incident::new("N1", Utc::now());
    let row = IncidentRow::from(&inc);
    assert_eq!(row.location_type, "");
    assert_eq!(row.geometry(), None);
    assert_eq!(row.to_lat, 0.0);
    assert_eq!(row.length_meters, 0.0);
}
