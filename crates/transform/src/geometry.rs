//! Usable geometry extraction

use beacon_protocol::{Coordinates, Event, GeometryKind};

/// Coordinates an event can be drawn with
///
/// (0, 0) means "absent", so a point at the origin or a segment with either
/// end at the origin has no geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Point(Coordinates),
    Segment { from: Coordinates, to: Coordinates },
}

impl Geometry {
    /// Usable geometry of `event`; linear locations take precedence
    pub fn of(event: &Event) -> Option<Self> {
        if let Some(linear) = &event.location.linear {
            let from = linear.from.coordinates;
            let to = linear.to.coordinates;
            if from.is_empty() || to.is_empty() {
                return None;
            }
            return Some(Self::Segment { from, to });
        }

        let point = event.location.point.as_ref()?.coordinates;
        (!point.is_empty()).then_some(Self::Point(point))
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Point(_) => GeometryKind::Point,
            Self::Segment { .. } => GeometryKind::Segment,
        }
    }
}
