//! Live-view map records

use serde::{Deserialize, Serialize};

use crate::Coordinates;

/// Geometry of a map location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Segment,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Segment => "segment",
        }
    }
}

/// Active incident as shown on the live map
///
/// Stored as JSON in the location cache, so the field names are part of the
/// contract with dashboard consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLocation {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: GeometryKind,

    pub icon: String,

    /// Lowercased, `unknown` when the feed gave none
    pub severity: String,

    #[serde(rename = "eventType", default, skip_serializing_if = "String::is_empty")]
    pub event_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<Coordinates>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Coordinates>,

    /// Routed length in meters (segments only)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub distance: f64,

    /// Routed travel time in seconds (segments only)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub duration: f64,
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}
