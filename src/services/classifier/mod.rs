//! Status classification.
//!
//! Every status badge, filter and statistic in the application goes through
//! this module. `now` is always a parameter; nothing here reads the clock.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Local};

use crate::models::event::Event;
use crate::models::status::{Classification, ClassificationPolicy, DerivedStatus, Remaining};
use crate::utils::date::{parse_date, parse_time, resolve_local, TemporalError};

/// Combine a calendar day and an optional wall-clock time into a local instant.
pub fn event_instant(date: &str, time: Option<&str>) -> Result<DateTime<Local>, TemporalError> {
    let date = parse_date(date)?;
    let time = parse_time(time)?;
    resolve_local(date.and_time(time))
}

/// Classify with the default strict policy.
///
/// Malformed input never fails: it is reported as finished with zero
/// remaining time and logged.
pub fn classify(date: &str, time: Option<&str>, now: DateTime<Local>) -> Classification {
    classify_with_policy(date, time, now, ClassificationPolicy::Strict)
}

pub fn classify_with_policy(
    date: &str,
    time: Option<&str>,
    now: DateTime<Local>,
    policy: ClassificationPolicy,
) -> Classification {
    match event_instant(date, time) {
        Ok(instant) => classify_instant(instant, now, policy),
        Err(err) => {
            log::warn!("Treating event dated {:?} as finished: {}", date, err);
            Classification::invalid()
        }
    }
}

pub fn classify_event(
    event: &Event,
    now: DateTime<Local>,
    policy: ClassificationPolicy,
) -> Classification {
    match event.instant() {
        Ok(instant) => classify_instant(instant, now, policy),
        Err(err) => {
            log::warn!("Event {} has an invalid schedule, treating as finished: {}", event.id, err);
            Classification::invalid()
        }
    }
}

pub fn classify_instant(
    instant: DateTime<Local>,
    now: DateTime<Local>,
    policy: ClassificationPolicy,
) -> Classification {
    if now < instant {
        return Classification {
            status: DerivedStatus::Upcoming,
            remaining: Remaining::Finite(positive_gap(now, instant)),
        };
    }

    match policy {
        ClassificationPolicy::Strict => finished(),
        ClassificationPolicy::WithOngoing { window } => {
            let Some(end) = instant.checked_add_signed(window) else {
                return finished();
            };
            if now < end {
                Classification {
                    status: DerivedStatus::Ongoing,
                    remaining: Remaining::Finite(positive_gap(now, end)),
                }
            } else {
                finished()
            }
        }
    }
}

fn finished() -> Classification {
    Classification {
        status: DerivedStatus::Finished,
        remaining: Remaining::Never,
    }
}

fn positive_gap(from: DateTime<Local>, to: DateTime<Local>) -> StdDuration {
    (to - from).to_std().unwrap_or(StdDuration::ZERO)
}
