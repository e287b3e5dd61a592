//! Collection-level statistics.
//!
//! Every event in one call is classified against the same `now`, so the
//! counts always add up even when the list is large.

use std::collections::HashMap;

use chrono::{DateTime, Local};

use crate::models::event::Event;
use crate::models::registration::Registration;
use crate::models::statistics::{ParticipationStatistics, Statistics};
use crate::models::status::ClassificationPolicy;
use crate::services::classifier::classify_event;

/// Dashboard counts under the strict policy.
pub fn aggregate(events: &[Event], now: DateTime<Local>) -> Statistics {
    events.iter().fold(Statistics::default(), |mut stats, event| {
        stats.record(classify_event(event, now, ClassificationPolicy::Strict).status);
        stats
    })
}

/// Counts under an explicit policy, keeping ongoing events separate.
pub fn aggregate_with_policy(
    events: &[Event],
    now: DateTime<Local>,
    policy: ClassificationPolicy,
) -> ParticipationStatistics {
    events.iter().fold(
        ParticipationStatistics {
            total: events.len(),
            ..Default::default()
        },
        |mut stats, event| {
            stats.record(classify_event(event, now, policy).status);
            stats
        },
    )
}

/// Profile statistics: the user's active registrations, classified by the
/// event they point at. Registrations for unknown events only count toward
/// `total`.
pub fn participation(
    registrations: &[Registration],
    events: &[Event],
    user_id: &str,
    now: DateTime<Local>,
    policy: ClassificationPolicy,
) -> ParticipationStatistics {
    let by_id: HashMap<&str, &Event> = events
        .iter()
        .map(|event| (event.id.as_str(), event))
        .collect();

    let mut stats = ParticipationStatistics::default();
    for registration in registrations
        .iter()
        .filter(|reg| reg.user_id == user_id && reg.is_active())
    {
        stats.total += 1;
        match by_id.get(registration.event_id.as_str()) {
            Some(event) => stats.record(classify_event(event, now, policy).status),
            None => log::debug!(
                "Registration {} points at unknown event {}",
                registration.id,
                registration.event_id
            ),
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn event(id: &str, date: &str, time: &str) -> Event {
        Event::builder()
            .id(id)
            .name(format!("Event {}", id))
            .date(date)
            .time(time)
            .build()
            .unwrap()
    }

    fn registration(id: &str, event_id: &str, user_id: &str) -> Registration {
        Registration {
            id: id.to_string(),
            event_id: event_id.to_string(),
            user_id: user_id.to_string(),
            status: None,
        }
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(aggregate(&[], now()), Statistics::default());
        assert_eq!(
            aggregate_with_policy(&[], now(), ClassificationPolicy::profile()),
            ParticipationStatistics::default()
        );
    }

    #[test]
    fn mixed_list_counts() {
        let events = vec![
            event("1", "2025-11-01", "09:00"),
            event("2", "2020-01-01", "00:00"),
        ];
        assert_eq!(
            aggregate(&events, now()),
            Statistics {
                total: 2,
                upcoming: 1,
                finished: 1
            }
        );
    }

    #[test]
    fn malformed_events_count_as_finished() {
        let mut broken = event("3", "2025-11-01", "");
        broken.date = "not-a-date".to_string();
        let events = vec![event("1", "2025-11-01", "09:00"), broken];

        let stats = aggregate(&events, now());
        assert_eq!(stats.total, 2);
        assert_eq!(stats.upcoming, 1);
        assert_eq!(stats.finished, 1);
    }

    #[test]
    fn policy_aggregation_separates_ongoing() {
        let start = now() + Duration::minutes(-30);
        let events = vec![
            event("1", &start.format("%Y-%m-%d").to_string(), &start.format("%H:%M").to_string()),
            event("2", "2025-11-01", "09:00"),
            event("3", "2020-01-01", "00:00"),
        ];

        let stats = aggregate_with_policy(&events, now(), ClassificationPolicy::profile());
        assert_eq!(
            stats,
            ParticipationStatistics {
                total: 3,
                upcoming: 1,
                ongoing: 1,
                finished: 1
            }
        );
    }

    #[test]
    fn participation_counts_only_the_users_active_registrations() {
        let events = vec![
            event("a", "2025-11-01", "09:00"),
            event("b", "2020-01-01", "00:00"),
        ];
        let mut cancelled = registration("r4", "a", "u1");
        cancelled.status = Some("cancelled".to_string());
        let registrations = vec![
            registration("r1", "a", "u1"),
            registration("r2", "b", "u1"),
            registration("r3", "a", "u2"),
            registration("r5", "deleted", "u1"),
            cancelled,
        ];

        let stats = participation(
            &registrations,
            &events,
            "u1",
            now(),
            ClassificationPolicy::profile(),
        );
        assert_eq!(
            stats,
            ParticipationStatistics {
                total: 3,
                upcoming: 1,
                ongoing: 0,
                finished: 1
            }
        );
    }

    #[test]
    fn participation_counts_any_status_that_is_not_withdrawn() {
        let events = vec![
            event("a", "2025-11-01", "09:00"),
            event("b", "2020-01-01", "00:00"),
        ];
        let mut confirmed = registration("r1", "a", "u");
        confirmed.status = Some("confirmed".to_string());
        let mut attended = registration("r2", "b", "u");
        attended.status = Some("attended".to_string());

        let stats = participation(
            &[confirmed, attended],
            &events,
            "u",
            now(),
            ClassificationPolicy::profile(),
        );
        assert_eq!(
            stats,
            ParticipationStatistics {
                total: 2,
                upcoming: 1,
                ongoing: 0,
                finished: 1
            }
        );
    }
}
