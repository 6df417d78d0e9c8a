//! Flattened analytic record

use chrono::{DateTime, Utc};

use crate::{Coordinates, GeometryKind};

/// One row of incident history
///
/// Built from an [`Event`](crate::Event) by the transformer. Administrative
/// fields are empty strings when unknown; measurements the feed did not
/// supply stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    pub id: String,
    pub version: i32,

    /// Validity start, or processing time when the feed gave none
    pub timestamp: DateTime<Utc>,

    /// `None` until the incident is closed
    pub end_timestamp: Option<DateTime<Utc>>,

    pub province: String,
    pub autonomous_community: String,
    pub municipality: String,

    /// Event type path from the topic
    pub record_type: String,

    pub name: String,
    pub severity: String,
    pub probability: String,
    pub mobility: String,

    pub location_type: Option<GeometryKind>,
    pub direction: String,

    /// Point position, or the start of a segment
    pub position: Coordinates,

    /// End of a segment
    pub to_position: Option<Coordinates>,

    pub km: Option<f32>,
    pub to_km: Option<f32>,

    pub cause_type: String,
    pub cause_subtypes: Vec<String>,

    pub road_name: String,
    pub road_number: String,
    pub road_destination: String,

    pub delay_minutes: Option<f64>,
    pub length_meters: Option<f64>,

    /// Original payload, kept for auditability
    pub raw_json: String,
}

impl Incident {
    /// Blank incident for `id`, stamped at `timestamp`
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            version: 0,
            timestamp,
            end_timestamp: None,
            province: String::new(),
            autonomous_community: String::new(),
            municipality: String::new(),
            record_type: String::new(),
            name: String::new(),
            severity: String::new(),
            probability: String::new(),
            mobility: String::new(),
            location_type: None,
            direction: String::new(),
            position: Coordinates::default(),
            to_position: None,
            km: None,
            to_km: None,
            cause_type: String::new(),
            cause_subtypes: Vec::new(),
            road_name: String::new(),
            road_number: String::new(),
            road_destination: String::new(),
            delay_minutes: None,
            length_meters: None,
            raw_json: String::new(),
        }
    }
}
