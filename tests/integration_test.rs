// Integration tests across classifier, aggregator, filter, scheduler and countdown

mod fixtures;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::sync::mpsc;

use campus_events::models::category::EventCategory;
use campus_events::models::event::Event;
use campus_events::models::registration::Registration;
use campus_events::models::statistics::{ParticipationStatistics, Statistics};
use campus_events::models::status::{ClassificationPolicy, DerivedStatus, Remaining};
use campus_events::services::aggregator::{aggregate, participation};
use campus_events::services::classifier::{classify, classify_event};
use campus_events::services::countdown::CountdownHandle;
use campus_events::services::dashboard::Dashboard;
use campus_events::services::filter::{filter, CategoryFilter, EventQuery};
use campus_events::services::scheduler::{next_wake, StatusScheduler, WakeReason};
use campus_events::services::source::{parse_events, EventCache, EventFilter, EventSource};
use campus_events::utils::clock::{Clock, MonotonicClock};

use fixtures::{dates, events};

#[test]
fn test_dashboard_statistics_scenario() {
    let list = vec![events::seminar_ai(), events::rust_workshop()];
    assert_eq!(
        aggregate(&list, dates::june_1_2025()),
        Statistics {
            total: 2,
            upcoming: 1,
            finished: 1
        }
    );
}

#[test]
fn test_malformed_date_is_finished_with_zero_remaining() {
    let classification = classify("not-a-date", None, dates::june_1_2025());
    assert_eq!(classification.status, DerivedStatus::Finished);
    assert_eq!(classification.remaining, Remaining::Invalid);
    assert_eq!(classification.remaining.as_duration(), StdDuration::ZERO);

    let list = vec![events::seminar_ai(), events::malformed()];
    let stats = aggregate(&list, dates::june_1_2025());
    assert_eq!(stats.total, 2);
    assert_eq!(stats.finished, 1);
    assert_eq!(next_wake(&[events::malformed()], dates::june_1_2025()), None);
}

#[test]
fn test_event_instant_itself_is_finished() {
    let start = dates::june_1_2025_morning();
    let event = events::starting_at("edge", start);

    let before = classify_event(&event, start - Duration::seconds(1), ClassificationPolicy::Strict);
    assert_eq!(before.status, DerivedStatus::Upcoming);
    assert_eq!(before.remaining, Remaining::Finite(StdDuration::from_secs(1)));

    let at = classify_event(&event, start, ClassificationPolicy::Strict);
    assert_eq!(at.status, DerivedStatus::Finished);
    assert_eq!(at.remaining, Remaining::Never);
}

#[test]
fn test_legacy_payload_flows_through_filter() {
    let list = parse_events(events::LEGACY_JSON).unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[2].category, EventCategory::Other);

    let query = EventQuery {
        category: CategoryFilter::Only(EventCategory::Competition),
        status: "mendatang".parse().unwrap(),
        ..Default::default()
    };
    let visible = filter(&list, &query, dates::june_1_2025());
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "Lomba Coding");

    assert_eq!(filter(&list, &EventQuery::default(), dates::june_1_2025()), list);
}

#[test]
fn test_record_without_date_is_listed_as_finished() {
    let body = r#"{"data":[
        {"id": 1, "name": "Seminar AI", "date": "2025-11-01"},
        {"id": 2, "name": "Broken", "date": null},
        {"id": 3, "name": null, "waktu": "10:00"}
    ]}"#;
    let list = parse_events(body).unwrap();
    assert_eq!(list.len(), 3);

    assert_eq!(
        aggregate(&list, dates::june_1_2025()),
        Statistics {
            total: 3,
            upcoming: 1,
            finished: 2
        }
    );
    assert_eq!(
        classify_event(&list[1], dates::june_1_2025(), ClassificationPolicy::Strict).remaining,
        Remaining::Invalid
    );
}

#[test]
fn test_profile_participation_with_ongoing_window() {
    let now = dates::june_1_2025_morning();
    let list = vec![
        events::starting_at("live", now - Duration::minutes(20)),
        events::starting_at("next", now + Duration::days(2)),
        events::starting_at("done", now - Duration::hours(2)),
    ];
    let registrations: Vec<Registration> = serde_json::from_str(
        r#"[
            {"id": 1, "eventId": "live", "userId": 7},
            {"id": 2, "eventId": "next", "userId": 7, "status": "registered"},
            {"id": 3, "eventId": "done", "userId": 7},
            {"id": 4, "eventId": "done", "userId": 8},
            {"id": 5, "eventId": "gone", "userId": 7}
        ]"#,
    )
    .unwrap();

    let stats = participation(&registrations, &list, "7", now, ClassificationPolicy::profile());
    assert_eq!(
        stats,
        ParticipationStatistics {
            total: 4,
            upcoming: 1,
            ongoing: 1,
            finished: 1
        }
    );
}

#[tokio::test]
async fn test_cache_serves_as_event_source() {
    let dir = TempDir::new().unwrap();
    let cache = EventCache::new(dir.path().join("events.json"));
    cache
        .store(&[events::seminar_ai(), events::rust_workshop()])
        .unwrap();

    let source: Box<dyn EventSource> = Box::new(cache);
    let listed = source.list_events(&EventFilter::default()).await.unwrap();
    assert_eq!(aggregate(&listed, dates::june_1_2025()).upcoming, 1);
    assert_eq!(source.get_event("2").await.unwrap().name, "Rust Workshop");
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_keeps_dashboard_current() {
    let anchor = dates::june_1_2025_morning();
    let clock = Arc::new(MonotonicClock::anchored_at(anchor));

    let mut dashboard = Dashboard::default();
    dashboard.set_events(vec![
        events::starting_at("a", anchor + Duration::seconds(5)),
        events::starting_at("b", anchor + Duration::seconds(100)),
        events::rust_workshop(),
    ]);
    let initial = dashboard.refresh(clock.now()).unwrap().statistics;
    assert_eq!(initial.upcoming, 2);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let scheduler = StatusScheduler::new(clock.clone()).with_fallback_interval(StdDuration::from_secs(3600));
    let handle = scheduler.schedule_next_wake(dashboard.events(), move |reason| {
        let _ = tx.send(reason);
    });

    assert_eq!(rx.recv().await, Some(WakeReason::StatusChange));
    let after_first = dashboard.refresh(clock.now()).unwrap().statistics;
    assert_eq!(after_first.upcoming, 1);
    assert_eq!(after_first.finished, 2);

    // An admin adds an event that starts before "b".
    dashboard.upsert_event(events::starting_at("c", anchor + Duration::seconds(30)));
    handle.update_events(dashboard.events());

    assert_eq!(rx.recv().await, Some(WakeReason::StatusChange));
    let elapsed = clock.now() - anchor;
    assert!(elapsed >= Duration::seconds(30) && elapsed < Duration::seconds(31));
    assert_eq!(dashboard.refresh(clock.now()).unwrap().statistics.upcoming, 1);

    assert_eq!(rx.recv().await, Some(WakeReason::StatusChange));
    assert_eq!(dashboard.refresh(clock.now()).unwrap().statistics.upcoming, 0);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_expires_at_event_start() {
    let anchor = dates::june_1_2025_morning();
    let clock = Arc::new(MonotonicClock::anchored_at(anchor));
    let event: Event = events::starting_at("soon", anchor + Duration::seconds(3601));

    let countdown = CountdownHandle::for_event(&event, clock.clone(), StdDuration::from_secs(1));
    let first = countdown.current();
    assert_eq!((first.hours, first.minutes, first.seconds), (1, 0, 1));
    assert_eq!(first.label().as_deref(), Some("1h 0m 1s left"));

    let mut rx = countdown.subscribe();
    while rx.changed().await.is_ok() {
        if rx.borrow_and_update().is_expired {
            break;
        }
    }

    assert!(countdown.current().is_expired);
    assert_eq!(countdown.current().label(), None);
    assert_eq!(
        classify_event(&event, clock.now(), ClassificationPolicy::Strict).status,
        DerivedStatus::Finished
    );
}
