//! Category model for grouping campus events.
//!
//! The set of categories is closed. Labels are matched case-insensitively, and
//! the localized labels written by older clients (`lomba`, `pelatihan`,
//! `lainnya`) are accepted as aliases.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventCategory {
    Seminar,
    Workshop,
    Competition,
    Training,
    #[default]
    Other,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        EventCategory::Seminar,
        EventCategory::Workshop,
        EventCategory::Competition,
        EventCategory::Training,
        EventCategory::Other,
    ];

    /// Canonical lowercase label, as sent to the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seminar => "seminar",
            Self::Workshop => "workshop",
            Self::Competition => "competition",
            Self::Training => "training",
            Self::Other => "other",
        }
    }

    /// Get the display string for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Seminar => "Seminar",
            Self::Workshop => "Workshop",
            Self::Competition => "Competition",
            Self::Training => "Training",
            Self::Other => "Other",
        }
    }

    /// Match a label case-insensitively, including the localized aliases.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "seminar" => Some(Self::Seminar),
            "workshop" => Some(Self::Workshop),
            "competition" | "lomba" => Some(Self::Competition),
            "training" | "pelatihan" => Some(Self::Training),
            "other" | "lainnya" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a user-supplied category label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown category '{0}' (expected seminar, workshop, competition, training or other)")]
pub struct CategoryParseError(pub String);

impl FromStr for EventCategory {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

impl Serialize for EventCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Records come from an external backend; an unknown label must not make the
// whole list undecodable, so it degrades to `Other`.
impl<'de> Deserialize<'de> for EventCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Self::from_label(&raw).unwrap_or_else(|| {
            if !raw.trim().is_empty() {
                log::debug!("Unknown event category '{}', using 'other'", raw);
            }
            Self::Other
        }))
    }
}
