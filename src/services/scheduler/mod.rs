//! Status-change scheduling.
//!
//! Instead of re-classifying every event on a fixed poll, the scheduler
//! sleeps exactly until the next event changes status. A slow fallback poll
//! runs alongside it to absorb wall-clock jumps.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Local};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::models::event::Event;
use crate::models::settings::Settings;
use crate::models::status::ClassificationPolicy;
use crate::services::classifier::classify_event;
use crate::utils::clock::Clock;

pub const DEFAULT_FALLBACK_INTERVAL: StdDuration = StdDuration::from_secs(60);

/// Delay until the earliest upcoming event becomes finished, under the
/// strict policy. `None` when nothing is left to change.
pub fn next_wake(events: &[Event], now: DateTime<Local>) -> Option<StdDuration> {
    next_wake_with_policy(events, now, ClassificationPolicy::Strict)
}

/// Like [`next_wake`], also counting the end of an ongoing window as a
/// transition.
pub fn next_wake_with_policy(
    events: &[Event],
    now: DateTime<Local>,
    policy: ClassificationPolicy,
) -> Option<StdDuration> {
    events
        .iter()
        .filter_map(|event| classify_event(event, now, policy).remaining.next_transition())
        .min()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// An event crossed a status boundary.
    StatusChange,
    /// The periodic safety poll.
    Fallback,
}

pub struct StatusScheduler {
    clock: Arc<dyn Clock>,
    policy: ClassificationPolicy,
    fallback_interval: StdDuration,
}

impl StatusScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            policy: ClassificationPolicy::Strict,
            fallback_interval: DEFAULT_FALLBACK_INTERVAL,
        }
    }

    pub fn from_settings(settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        Self::new(clock)
            .with_policy(settings.policy())
            .with_fallback_interval(settings.fallback_interval())
    }

    pub fn with_policy(mut self, policy: ClassificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// A zero interval is bumped to one second.
    pub fn with_fallback_interval(mut self, interval: StdDuration) -> Self {
        self.fallback_interval = interval.max(StdDuration::from_secs(1));
        self
    }

    /// Spawn the wake loop for `events`.
    ///
    /// `on_wake` runs on the scheduler task each time a status may have
    /// changed. It should hand work off rather than block. A panic inside it
    /// is logged and the loop carries on.
    pub fn schedule_next_wake<F>(&self, events: impl Into<Arc<[Event]>>, on_wake: F) -> WakeHandle
    where
        F: FnMut(WakeReason) + Send + 'static,
    {
        let (events_tx, events_rx) = watch::channel(events.into());
        let task = tokio::spawn(run_wake_loop(
            self.clock.clone(),
            self.policy,
            self.fallback_interval,
            events_rx,
            on_wake,
        ));

        WakeHandle {
            events_tx,
            task: Some(task),
        }
    }
}

/// Owner of a running wake loop. Dropping it stops the loop.
pub struct WakeHandle {
    events_tx: watch::Sender<Arc<[Event]>>,
    task: Option<JoinHandle<()>>,
}

impl WakeHandle {
    /// Replace the observed list. Any pending wake computed from the old
    /// list is discarded.
    pub fn update_events(&self, events: impl Into<Arc<[Event]>>) {
        self.events_tx.send_replace(events.into());
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("Status scheduler cancelled");
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for WakeHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_wake_loop<F>(
    clock: Arc<dyn Clock>,
    policy: ClassificationPolicy,
    fallback_interval: StdDuration,
    mut events_rx: watch::Receiver<Arc<[Event]>>,
    mut on_wake: F,
) where
    F: FnMut(WakeReason) + Send + 'static,
{
    let mut fallback = tokio::time::interval(fallback_interval);
    fallback.set_missed_tick_behavior(MissedTickBehavior::Delay);
    fallback.tick().await;

    loop {
        let events = events_rx.borrow_and_update().clone();
        let wake = next_wake_with_policy(&events, clock.now(), policy);
        match wake {
            Some(delay) => log::debug!("Next status change in {:?}", delay),
            None => log::debug!("No pending status change"),
        }

        let sleep = async move {
            match wake {
                Some(delay) => tokio::time::sleep(delay).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            changed = events_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = sleep => {
                // A list swap that landed while we slept makes this wake stale.
                if events_rx.has_changed().unwrap_or(true) {
                    continue;
                }
                fire(&mut on_wake, WakeReason::StatusChange);
            }
            _ = fallback.tick() => fire(&mut on_wake, WakeReason::Fallback),
        }
    }
}

fn fire<F: FnMut(WakeReason)>(on_wake: &mut F, reason: WakeReason) {
    log::debug!("Scheduler wake: {:?}", reason);
    if catch_unwind(AssertUnwindSafe(|| on_wake(reason))).is_err() {
        log::error!("Wake callback panicked ({:?}); scheduler keeps running", reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::MonotonicClock;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    const SLACK: StdDuration = StdDuration::from_millis(10);

    fn anchor() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    fn event_at(id: &str, at: DateTime<Local>) -> Event {
        Event::builder()
            .id(id)
            .name(format!("Event {}", id))
            .date(at.format("%Y-%m-%d").to_string())
            .time(at.format("%H:%M:%S").to_string())
            .build()
            .unwrap()
    }

    fn in_secs(id: &str, secs: i64) -> Event {
        event_at(id, anchor() + Duration::seconds(secs))
    }

    fn scheduler() -> StatusScheduler {
        StatusScheduler::new(Arc::new(MonotonicClock::anchored_at(anchor())))
            .with_fallback_interval(StdDuration::from_secs(3600))
    }

    fn recorder() -> (
        impl FnMut(WakeReason) + Send + 'static,
        mpsc::UnboundedReceiver<(WakeReason, Instant)>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let callback = move |reason| {
            let _ = tx.send((reason, Instant::now()));
        };
        (callback, rx)
    }

    fn assert_near(actual: StdDuration, expected_secs: u64) {
        let expected = StdDuration::from_secs(expected_secs);
        assert!(
            actual >= expected && actual < expected + SLACK,
            "woke after {:?}, expected {:?}",
            actual,
            expected
        );
    }

    #[test]
    fn next_wake_picks_earliest_positive_remaining() {
        let events = vec![in_secs("a", 100), in_secs("b", 5), in_secs("c", -60)];
        assert_eq!(next_wake(&events, anchor()), Some(StdDuration::from_secs(5)));
    }

    #[test]
    fn next_wake_is_none_without_pending_transitions() {
        assert_eq!(next_wake(&[], anchor()), None);

        let mut broken = in_secs("x", 30);
        broken.date = "garbage".to_string();
        let events = vec![in_secs("old", -5), broken];
        assert_eq!(next_wake(&events, anchor()), None);
    }

    #[test]
    fn next_wake_with_ongoing_counts_the_window_end() {
        let events = vec![in_secs("running", -600)];
        assert_eq!(next_wake(&events, anchor()), None);
        assert_eq!(
            next_wake_with_policy(&events, anchor(), ClassificationPolicy::profile()),
            Some(StdDuration::from_secs(3000))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn wakes_at_each_status_change() {
        let events = vec![in_secs("a", 5), in_secs("b", 100), in_secs("c", -3600)];
        let (callback, mut rx) = recorder();
        let started = Instant::now();

        let handle = scheduler().schedule_next_wake(events, callback);

        let (reason, at) = rx.recv().await.unwrap();
        assert_eq!(reason, WakeReason::StatusChange);
        assert_near(at - started, 5);

        let (reason, at) = rx.recv().await.unwrap();
        assert_eq!(reason, WakeReason::StatusChange);
        assert_near(at - started, 100);
        assert!(handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_the_list_discards_the_pending_wake() {
        let (callback, mut rx) = recorder();
        let handle = scheduler().schedule_next_wake(vec![in_secs("a", 5)], callback);

        tokio::time::sleep(StdDuration::from_secs(2)).await;
        handle.update_events(Vec::<Event>::new());

        let outcome = tokio::time::timeout(StdDuration::from_secs(30), rx.recv()).await;
        assert!(outcome.is_err(), "stale wake fired: {:?}", outcome);
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_the_list_reschedules() {
        let (callback, mut rx) = recorder();
        let started = Instant::now();
        let handle = scheduler().schedule_next_wake(vec![in_secs("late", 100)], callback);

        tokio::time::sleep(StdDuration::from_secs(1)).await;
        handle.update_events(vec![in_secs("late", 100), in_secs("soon", 10)]);

        let (reason, at) = rx.recv().await.unwrap();
        assert_eq!(reason, WakeReason::StatusChange);
        assert_near(at - started, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_callback_does_not_stop_the_loop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let started = Instant::now();

        let _handle = scheduler().schedule_next_wake(
            vec![in_secs("a", 5), in_secs("b", 10)],
            move |reason| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("render failed");
                }
                let _ = tx.send((reason, Instant::now()));
            },
        );

        let (_, at) = rx.recv().await.unwrap();
        assert_near(at - started, 10);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_the_loop() {
        let (callback, mut rx) = recorder();
        let mut handle = scheduler().schedule_next_wake(vec![in_secs("a", 5)], callback);

        handle.cancel();
        assert!(!handle.is_active());
        // The callback (and its sender) is dropped with the aborted task.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_loop() {
        let (callback, mut rx) = recorder();
        let handle = scheduler().schedule_next_wake(vec![in_secs("a", 5)], callback);

        drop(handle);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_poll_fires_without_transitions() {
        let (callback, mut rx) = recorder();
        let started = Instant::now();
        let scheduler = StatusScheduler::new(Arc::new(MonotonicClock::anchored_at(anchor())));

        let _handle = scheduler.schedule_next_wake(Vec::<Event>::new(), callback);

        let (reason, at) = rx.recv().await.unwrap();
        assert_eq!(reason, WakeReason::Fallback);
        assert_near(at - started, 60);
    }
}
