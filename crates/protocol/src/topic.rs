//! MQTT topic classification
//!
//! Topics follow `root/version/country/region/category/event_type`. Missing
//! segments classify as empty strings; callers treat empty fields as unknown.

/// Category segment marking a deletion message
pub const DELETIONS_CATEGORY: &str = "deletions";

/// Whether a message creates/updates an incident or removes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Create or update an incident
    Situation,
    /// Close out an incident
    Deletion,
}

impl MessageKind {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Situation => "situation",
            Self::Deletion => "deletion",
        }
    }
}

/// Classified topic segments, borrowed from the topic string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicInfo<'a> {
    pub country: &'a str,
    pub region: &'a str,
    pub category: &'a str,
    /// Everything from the sixth segment on, so nested types such as
    /// `causes/roadworks` survive intact
    pub event_type: &'a str,
}

impl TopicInfo<'_> {
    /// True when the category segment is `deletions`
    #[inline]
    pub fn is_deletion(&self) -> bool {
        self.category == DELETIONS_CATEGORY
    }

    /// Message kind derived from the category
    #[inline]
    pub fn kind(&self) -> MessageKind {
        if self.is_deletion() {
            MessageKind::Deletion
        } else {
            MessageKind::Situation
        }
    }

    /// Last segment of the event type path (`causes/roadworks` -> `roadworks`)
    pub fn event_type_leaf(&self) -> &str {
        self.event_type
            .rsplit('/')
            .next()
            .unwrap_or(self.event_type)
    }
}

/// Split a topic into its classification segments
///
/// Never fails: short or malformed topics produce partial classifications.
pub fn classify(topic: &str) -> TopicInfo<'_> {
    let mut parts = topic.splitn(6, '/');
    // root and version are not part of the classification
    let _ = parts.next();
    let _ = parts.next();

    TopicInfo {
        country: parts.next().unwrap_or_default(),
        region: parts.next().unwrap_or_default(),
        category: parts.next().unwrap_or_default(),
        event_type: parts.next().unwrap_or_default(),
    }
}
