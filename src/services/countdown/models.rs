use std::time::Duration as StdDuration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Under this much time left a countdown is urgent.
pub const URGENT_THRESHOLD: StdDuration = StdDuration::from_secs(2 * SECS_PER_HOUR);
/// Under this much time left a countdown is "today".
pub const TODAY_THRESHOLD: StdDuration = StdDuration::from_secs(SECS_PER_DAY);
const WEEK_DAYS: u64 = 7;

/// Time left until a target instant, split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    #[serde(with = "duration_millis")]
    pub total: StdDuration,
    pub is_expired: bool,
    pub is_urgent: bool,
    pub is_today: bool,
}

impl CountdownSnapshot {
    pub fn expired() -> Self {
        Self {
            is_expired: true,
            ..Self::default()
        }
    }

    /// Always recomputed from the target; never derived from a previous
    /// snapshot, so repeated ticks cannot drift.
    pub fn at(target: DateTime<Local>, now: DateTime<Local>) -> Self {
        if target <= now {
            return Self::expired();
        }

        let total = (target - now).to_std().unwrap_or(StdDuration::ZERO);
        let secs = total.as_secs();

        Self {
            days: secs / SECS_PER_DAY,
            hours: (secs % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (secs % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: secs % SECS_PER_MINUTE,
            total,
            is_expired: false,
            is_urgent: total < URGENT_THRESHOLD,
            is_today: total < TODAY_THRESHOLD,
        }
    }

    /// Badge tier for the event card, `None` once expired.
    pub fn badge(&self) -> Option<CountdownBadge> {
        if self.is_expired {
            None
        } else if self.is_urgent {
            Some(CountdownBadge::Urgent)
        } else if self.is_today {
            Some(CountdownBadge::Today)
        } else if self.days < WEEK_DAYS {
            Some(CountdownBadge::ThisWeek)
        } else {
            Some(CountdownBadge::Later)
        }
    }

    /// Human-readable remaining time, `None` once expired.
    pub fn label(&self) -> Option<String> {
        let badge = self.badge()?;
        Some(match badge {
            CountdownBadge::Urgent => {
                format!("{}h {}m {}s left", self.hours, self.minutes, self.seconds)
            }
            CountdownBadge::Today => {
                format!("{} hours {} minutes left", self.hours, self.minutes)
            }
            CountdownBadge::ThisWeek => format!("{} days {} hours left", self.days, self.hours),
            CountdownBadge::Later => format!("{} days left", self.days),
        })
    }
}

/// Visual urgency of a running countdown, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownBadge {
    /// Under two hours.
    Urgent,
    /// Under a day.
    Today,
    /// Under a week.
    ThisWeek,
    Later,
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
