//! Derived event status.
//!
//! A status is always computed from an event and an instant; it is never
//! stored. See `services::classifier` for the computation.

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivedStatus {
    Upcoming,
    /// Only produced by [`ClassificationPolicy::WithOngoing`].
    Ongoing,
    Finished,
}

impl DerivedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Finished => "finished",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Ongoing => "Ongoing",
            Self::Finished => "Finished",
        }
    }
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DerivedStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upcoming" | "mendatang" => Ok(Self::Upcoming),
            "ongoing" | "berlangsung" => Ok(Self::Ongoing),
            "finished" | "selesai" => Ok(Self::Finished),
            other => Err(format!(
                "Unknown status '{}' (expected upcoming, ongoing or finished)",
                other
            )),
        }
    }
}

/// How an event instant is turned into a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassificationPolicy {
    /// Upcoming strictly before the event instant, finished from it onwards.
    #[default]
    Strict,
    /// Ongoing in `[instant, instant + window)`, finished afterwards.
    WithOngoing { window: Duration },
}

impl ClassificationPolicy {
    pub const DEFAULT_ONGOING_WINDOW_MINUTES: i64 = 60;

    /// Three-state policy used by participation statistics.
    pub fn with_ongoing_minutes(minutes: i64) -> Self {
        Self::WithOngoing {
            window: Duration::minutes(minutes.max(0)),
        }
    }

    pub fn profile() -> Self {
        Self::with_ongoing_minutes(Self::DEFAULT_ONGOING_WINDOW_MINUTES)
    }
}

/// Time until the classified event next changes status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Finite(StdDuration),
    /// Already finished; no further transition.
    Never,
    /// The event's date/time could not be parsed.
    Invalid,
}

impl Remaining {
    /// Reported duration. `Never` saturates, `Invalid` reads as zero.
    pub fn as_duration(&self) -> StdDuration {
        match self {
            Self::Finite(duration) => *duration,
            Self::Never => StdDuration::MAX,
            Self::Invalid => StdDuration::ZERO,
        }
    }

    /// The delay before the next status flip, if there is one ahead.
    pub fn next_transition(&self) -> Option<StdDuration> {
        match self {
            Self::Finite(duration) if !duration.is_zero() => Some(*duration),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: DerivedStatus,
    pub remaining: Remaining,
}

impl Classification {
    /// Safe default for events whose date/time cannot be parsed.
    pub fn invalid() -> Self {
        Self {
            status: DerivedStatus::Finished,
            remaining: Remaining::Invalid,
        }
    }

    pub fn is_upcoming(&self) -> bool {
        self.status == DerivedStatus::Upcoming
    }
}
