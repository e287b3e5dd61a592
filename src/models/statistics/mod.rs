// Statistics module
// Collection-level counts derived from classified events

use serde::{Deserialize, Serialize};

use crate::models::status::DerivedStatus;

/// Dashboard counts. `total == upcoming + finished` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub upcoming: usize,
    pub finished: usize,
}

impl Statistics {
    /// Count one event. The strict policy never yields `Ongoing`; if a
    /// caller passes it anyway it is counted as started, i.e. finished.
    pub fn record(&mut self, status: DerivedStatus) {
        self.total += 1;
        match status {
            DerivedStatus::Upcoming => self.upcoming += 1,
            DerivedStatus::Ongoing | DerivedStatus::Finished => self.finished += 1,
        }
    }
}

/// Participation counts for the profile page.
///
/// `total` counts every registration of the user, including ones whose event
/// is no longer known, so it may exceed the sum of the other fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationStatistics {
    pub total: usize,
    pub upcoming: usize,
    pub ongoing: usize,
    pub finished: usize,
}

impl ParticipationStatistics {
    pub fn record(&mut self, status: DerivedStatus) {
        match status {
            DerivedStatus::Upcoming => self.upcoming += 1,
            DerivedStatus::Ongoing => self.ongoing += 1,
            DerivedStatus::Finished => self.finished += 1,
        }
    }

    pub fn classified(&self) -> usize {
        self.upcoming + self.ongoing + self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_total_consistent() {
        let mut stats = Statistics::default();
        stats.record(DerivedStatus::Upcoming);
        stats.record(DerivedStatus::Finished);
        stats.record(DerivedStatus::Ongoing);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.upcoming, 1);
        assert_eq!(stats.finished, 2);
        assert_eq!(stats.total, stats.upcoming + stats.finished);
    }

    #[test]
    fn test_participation_record() {
        let mut stats = ParticipationStatistics {
            total: 4,
            ..Default::default()
        };
        stats.record(DerivedStatus::Ongoing);
        stats.record(DerivedStatus::Upcoming);
        stats.record(DerivedStatus::Finished);

        assert_eq!(stats.classified(), 3);
        assert_eq!(stats.ongoing, 1);
        assert_eq!(stats.total, 4);
    }
}
