//! DATEX II wire payloads
//!
//! JSON representation of situation records and deletions as published by the
//! feed. Absent fields are `Option`s; empty administrative strings are treated
//! the same as absent ones by the accessors below.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{ProtocolError, Result};

/// A traffic situation record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Event {
    pub id: String,

    /// Published as a string by current feeds, as a number by older ones.
    /// Anything unparseable becomes 0.
    #[serde(default, deserialize_with = "deserialize_version")]
    pub version: i32,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub probability: Option<String>,

    #[serde(default)]
    pub severity: Option<String>,

    #[serde(default)]
    pub location: Location,

    #[serde(default)]
    pub validity: Option<Validity>,

    #[serde(default)]
    pub cause: Option<Cause>,

    #[serde(default)]
    pub mobility: Option<String>,

    #[serde(default)]
    pub impact: Option<Impact>,
}

impl Event {
    /// Decode a situation payload
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid JSON for this schema or
    /// carries an empty identifier.
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        let event: Event = serde_json::from_slice(payload)
            .map_err(|e| ProtocolError::invalid_payload("situation", e))?;
        if event.id.is_empty() {
            return Err(ProtocolError::MissingId);
        }
        Ok(event)
    }

    /// Validity start, if the feed supplied one
    #[inline]
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.validity.as_ref().and_then(|v| v.start_time)
    }

    /// Validity end, if the feed supplied one
    #[inline]
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.validity.as_ref().and_then(|v| v.end_time)
    }

    /// Estimated delay in seconds
    #[inline]
    pub fn delay_seconds(&self) -> Option<f64> {
        self.impact
            .as_ref()
            .and_then(|i| i.delays.as_ref())
            .and_then(|d| d.delay)
    }
}

fn deserialize_version<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawVersion {
        Int(i64),
        Str(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<RawVersion>::deserialize(deserializer)? {
        Some(RawVersion::Int(v)) => i32::try_from(v).unwrap_or(0),
        Some(RawVersion::Str(s)) => s.trim().parse().unwrap_or(0),
        Some(RawVersion::Other(_)) | None => 0,
    })
}

/// Where an incident happened: a road segment, a single point, or neither
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub linear: Option<LinearLocation>,

    #[serde(default)]
    pub point: Option<PointLocation>,

    /// Declared affected length in meters
    #[serde(default)]
    pub length: Option<f64>,

    #[serde(default)]
    pub roads: Vec<RoadInfo>,
}

/// Incident spanning a road segment
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LinearLocation {
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub from: LocationPoint,
    #[serde(default)]
    pub to: LocationPoint,
}

/// Incident at a single position
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PointLocation {
    #[serde(default, rename = "coords")]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub direction: Option<String>,
    /// Autonomous community
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub municipality: Option<String>,
}

/// One end of a linear location
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LocationPoint {
    #[serde(default, rename = "coords")]
    pub coordinates: Coordinates,
    /// Autonomous community
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub municipality: Option<String>,
    /// Kilometer marker on the road
    #[serde(default)]
    pub km: Option<f64>,
}

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// (0, 0) stands for "no coordinates"; it is open ocean, never a road
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lat == 0.0 && self.lon == 0.0
    }
}

/// Time window during which the incident is active
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Validity {
    #[serde(default, rename = "startTime")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, rename = "endTime")]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Cause {
    #[serde(default, rename = "type")]
    pub cause_type: Option<String>,
    #[serde(default)]
    pub subtypes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Impact {
    #[serde(default)]
    pub delays: Option<Delays>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Delays {
    /// Seconds
    #[serde(default)]
    pub delay: Option<f64>,
}

/// Affected road
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RoadInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}

/// Signals that an incident was resolved upstream
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeletionEvent {
    pub id: String,
    #[serde(rename = "deletedAt")]
    pub deleted_at: DateTime<Utc>,
}

impl DeletionEvent {
    /// Decode a deletion payload
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid JSON for this schema or
    /// carries an empty identifier.
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        let event: DeletionEvent = serde_json::from_slice(payload)
            .map_err(|e| ProtocolError::invalid_payload("deletion", e))?;
        if event.id.is_empty() {
            return Err(ProtocolError::MissingId);
        }
        Ok(event)
    }
}
