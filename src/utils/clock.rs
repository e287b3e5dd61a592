//! Time sources for the timed components.
//!
//! Pure functions take `now` as a parameter. Only the countdown and the
//! status scheduler read time, and they do it through [`Clock`] so tests can
//! drive them with tokio's paused clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local};

#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Wall-clock time anchored once and advanced by tokio's monotonic clock.
///
/// Under a runtime with paused time this advances only through
/// `tokio::time::advance` (or auto-advance), which keeps timer tests exact.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    anchor: DateTime<Local>,
    started: tokio::time::Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::anchored_at(Local::now())
    }

    pub fn anchored_at(anchor: DateTime<Local>) -> Self {
        Self {
            anchor,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Local> {
        let elapsed = self.started.elapsed();
        let elapsed = Duration::from_std(elapsed).unwrap_or_else(|_| Duration::days(36_500));
        self.anchor
            .checked_add_signed(elapsed)
            .unwrap_or(self.anchor)
    }
}

pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}
