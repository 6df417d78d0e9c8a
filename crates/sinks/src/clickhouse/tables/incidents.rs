//! Incident history row (traffic_incidents)

use beacon_protocol::{GeometryKind, Incident};
use clickhouse::Row;
use serde::Serialize;

use crate::END_TIMESTAMP_UNSET;

/// Row for the traffic_incidents table
///
/// ```sql
/// CREATE TABLE traffic_incidents (
///     id String,
///     version Int32,
///     timestamp DateTime64(3),
///     end_timestamp DateTime64(3),
///     province LowCardinality(String),
///     record_type LowCardinality(String),
///     severity LowCardinality(String),
///     probability LowCardinality(String),
///     lat Float64,
///     lon Float64,
///     km Nullable(Float32),
///     cause_type LowCardinality(String),
///     cause_subtypes Array(String),
///     road_name String,
///     road_number LowCardinality(String),
///     raw_json String CODEC(ZSTD(3)),
///     location_type LowCardinality(String),
///     name String,
///     direction LowCardinality(String),
///     length_meters Float64,
///     to_lat Float64,
///     to_lon Float64,
///     to_km Nullable(Float32),
///     municipality String,
///     autonomous_community LowCardinality(String),
///     delay_minutes Float64,
///     mobility LowCardinality(String),
///     road_destination String
/// ) ENGINE = MergeTree()
/// PARTITION BY toYYYYMM(timestamp)
/// ORDER BY (timestamp, province, id);
/// ```
#[derive(Debug, Clone, PartialEq, Row, Serialize)]
pub struct IncidentRow {
    pub id: String,
    pub version: i32,

    /// Milliseconds since epoch
    pub timestamp: i64,

    /// Milliseconds since epoch, 0 while the incident is open
    pub end_timestamp: i64,

    pub province: String,
    pub record_type: String,
    pub severity: String,
    pub probability: String,
    pub lat: f64,
    pub lon: f64,
    pub km: Option<f32>,
    pub cause_type: String,
    pub cause_subtypes: Vec<String>,
    pub road_name: String,
    pub road_number: String,
    pub raw_json: String,

    /// `point`, `segment`, or empty without usable geometry
    pub location_type: String,

    pub name: String,
    pub direction: String,
    pub length_meters: f64,
    pub to_lat: f64,
    pub to_lon: f64,
    pub to_km: Option<f32>,
    pub municipality: String,
    pub autonomous_community: String,
    pub delay_minutes: f64,
    pub mobility: String,
    pub road_destination: String,
}

impl From<&Incident> for IncidentRow {
    fn from(inc: &Incident) -> Self {
        let to = inc.to_position.unwrap_or_default();
        Self {
            id: inc.id.clone(),
            version: inc.version,
            timestamp: inc.timestamp.timestamp_millis(),
            end_timestamp: inc
                .end_timestamp
                .map_or(END_TIMESTAMP_UNSET, |t| t.timestamp_millis()),
            province: inc.province.clone(),
            record_type: inc.record_type.clone(),
            severity: inc.severity.clone(),
            probability: inc.probability.clone(),
            lat: inc.position.lat,
            lon: inc.position.lon,
            km: inc.km,
            cause_type: inc.cause_type.clone(),
            cause_subtypes: inc.cause_subtypes.clone(),
            road_name: inc.road_name.clone(),
            road_number: inc.road_number.clone(),
            raw_json: inc.raw_json.clone(),
            location_type: inc
                .location_type
                .map(|k| k.as_str())
                .unwrap_or_default()
                .to_string(),
            name: inc.name.clone(),
            direction: inc.direction.clone(),
            length_meters: inc.length_meters.unwrap_or_default(),
            to_lat: to.lat,
            to_lon: to.lon,
            to_km: inc.to_km,
            municipality: inc.municipality.clone(),
            autonomous_community: inc.autonomous_community.clone(),
            delay_minutes: inc.delay_minutes.unwrap_or_default(),
            mobility: inc.mobility.clone(),
            road_destination: inc.road_destination.clone(),
        }
    }
}

impl IncidentRow {
    /// Geometry kind parsed back from `location_type`
    pub fn geometry(&self) -> Option<GeometryKind> {
        match self.location_type.as_str() {
            "point" => Some(GeometryKind::Point),
            "segment" => Some(GeometryKind::Segment),
            _ => None,
        }
    }

    /// True while no end timestamp has been recorded
    #[inline]
    pub fn is_open(&self) -> bool {
        self.end_timestamp == END_TIMESTAMP_UNSET
    }
}
