//! Event list filtering by text, category and status.

use std::str::FromStr;

use chrono::{DateTime, Local};

use crate::models::category::EventCategory;
use crate::models::event::Event;
use crate::models::status::{ClassificationPolicy, DerivedStatus};
use crate::services::classifier::classify_event;

const WILDCARDS: [&str; 3] = ["", "all", "semua"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(EventCategory),
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_wildcard(s) {
            return Ok(Self::All);
        }
        s.parse::<EventCategory>()
            .map(Self::Only)
            .map_err(|err| err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(DerivedStatus),
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_wildcard(s) {
            return Ok(Self::All);
        }
        s.parse::<DerivedStatus>().map(Self::Only)
    }
}

fn is_wildcard(s: &str) -> bool {
    let lowered = s.trim().to_lowercase();
    WILDCARDS.contains(&lowered.as_str())
}

/// User-entered predicates. The default query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub text: String,
    pub category: CategoryFilter,
    pub status: StatusFilter,
    /// Also match `text` against the description.
    pub search_description: bool,
}

impl EventQuery {
    pub fn is_noop(&self) -> bool {
        self.text.trim().is_empty()
            && self.category == CategoryFilter::All
            && self.status == StatusFilter::All
    }

    pub fn matches(&self, event: &Event, now: DateTime<Local>, policy: ClassificationPolicy) -> bool {
        let needle = self.text.trim().to_lowercase();
        self.matches_text(event, &needle)
            && self.matches_category(event)
            && self.matches_status(event, now, policy)
    }

    fn matches_text(&self, event: &Event, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        event.name.to_lowercase().contains(needle)
            || (self.search_description && event.description.to_lowercase().contains(needle))
    }

    fn matches_category(&self, event: &Event) -> bool {
        match self.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => event.category == category,
        }
    }

    // Classification is the most expensive predicate, so it runs last.
    fn matches_status(&self, event: &Event, now: DateTime<Local>, policy: ClassificationPolicy) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => classify_event(event, now, policy).status == status,
        }
    }
}

/// Visible subset under the strict policy, in input order.
pub fn filter(events: &[Event], query: &EventQuery, now: DateTime<Local>) -> Vec<Event> {
    filter_with_policy(events, query, now, ClassificationPolicy::Strict)
}

pub fn filter_with_policy(
    events: &[Event],
    query: &EventQuery,
    now: DateTime<Local>,
    policy: ClassificationPolicy,
) -> Vec<Event> {
    let needle = query.text.trim().to_lowercase();
    events
        .iter()
        .filter(|event| {
            query.matches_text(event, &needle)
                && query.matches_category(event)
                && query.matches_status(event, now, policy)
        })
        .cloned()
        .collect()
}
