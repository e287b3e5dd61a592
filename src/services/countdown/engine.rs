//! Live countdowns.
//!
//! A [`CountdownHandle`] owns one ticking task per mounted countdown. The
//! task stops for good once the target passes, and is aborted when the
//! handle is dropped.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Local};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::models::{CountdownSnapshot, TODAY_THRESHOLD};
use crate::models::event::Event;
use crate::utils::clock::Clock;

pub const DEFAULT_TICK: StdDuration = StdDuration::from_secs(1);
/// Refresh period while the target is more than a day away.
pub const IDLE_TICK: StdDuration = StdDuration::from_secs(60);

pub struct CountdownHandle {
    receiver: watch::Receiver<CountdownSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl CountdownHandle {
    /// Start a 1 Hz countdown to `target`.
    ///
    /// Must be called from within a tokio runtime unless the target has
    /// already passed, in which case no task is spawned.
    pub fn start(target: DateTime<Local>, clock: Arc<dyn Clock>) -> Self {
        Self::start_with_tick(target, clock, DEFAULT_TICK)
    }

    pub fn start_with_tick(target: DateTime<Local>, clock: Arc<dyn Clock>, tick: StdDuration) -> Self {
        let initial = CountdownSnapshot::at(target, clock.now());
        let (sender, receiver) = watch::channel(initial);

        if initial.is_expired {
            return Self { receiver, task: None };
        }

        let task = tokio::spawn(run_countdown(target, clock, tick, sender));
        Self {
            receiver,
            task: Some(task),
        }
    }

    /// Countdown to an event's start. Events with an unparseable schedule
    /// yield an expired countdown.
    pub fn for_event(event: &Event, clock: Arc<dyn Clock>, tick: StdDuration) -> Self {
        match event.instant() {
            Ok(target) => Self::start_with_tick(target, clock, tick),
            Err(err) => {
                log::warn!("No countdown for event {}: {}", event.id, err);
                let (_, receiver) = watch::channel(CountdownSnapshot::expired());
                Self { receiver, task: None }
            }
        }
    }

    pub fn current(&self) -> CountdownSnapshot {
        *self.receiver.borrow()
    }

    /// A receiver notified whenever the displayed value changes.
    pub fn subscribe(&self) -> watch::Receiver<CountdownSnapshot> {
        self.receiver.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_countdown(
    target: DateTime<Local>,
    clock: Arc<dyn Clock>,
    tick: StdDuration,
    sender: watch::Sender<CountdownSnapshot>,
) {
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the initial value is already set.
    ticker.tick().await;

    let mut snapshot = *sender.borrow();
    loop {
        if snapshot.is_today {
            ticker.tick().await;
        } else {
            tokio::time::sleep(idle_wait(&snapshot, tick)).await;
            ticker.reset();
        }

        snapshot = CountdownSnapshot::at(target, clock.now());
        sender.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });

        if snapshot.is_expired {
            log::debug!("Countdown to {} expired", target);
            break;
        }
    }
}

/// Sleep for a far-off target: at most [`IDLE_TICK`], and never past the
/// point where the countdown enters its last day.
fn idle_wait(snapshot: &CountdownSnapshot, tick: StdDuration) -> StdDuration {
    snapshot
        .total
        .saturating_sub(TODAY_THRESHOLD)
        .min(IDLE_TICK)
        .max(tick)
}
