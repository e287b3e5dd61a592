//! Derived dashboard state.
//!
//! Holds the current event snapshot and the user's query, and recomputes
//! the statistics and the visible list from one `now`. A refresh only hands
//! back a view when it differs from the last one, so callers can redraw on
//! every wake without redundant work downstream.

use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::models::event::Event;
use crate::models::statistics::Statistics;
use crate::models::status::{ClassificationPolicy, DerivedStatus};
use crate::services::aggregator::aggregate;
use crate::services::classifier::classify_event;
use crate::services::filter::EventQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleEvent {
    pub event: Event,
    pub status: DerivedStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    /// Counts over the whole collection, not just the visible subset.
    pub statistics: Statistics,
    pub visible: Vec<VisibleEvent>,
}

impl DashboardView {
    pub fn compute(
        events: &[Event],
        query: &EventQuery,
        now: DateTime<Local>,
        policy: ClassificationPolicy,
    ) -> Self {
        let visible = events
            .iter()
            .filter(|event| query.matches(event, now, policy))
            .map(|event| VisibleEvent {
                event: event.clone(),
                status: classify_event(event, now, policy).status,
            })
            .collect();

        Self {
            statistics: aggregate(events, now),
            visible,
        }
    }
}

#[derive(Debug)]
pub struct Dashboard {
    events: Arc<[Event]>,
    query: EventQuery,
    policy: ClassificationPolicy,
    view: Option<DashboardView>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(ClassificationPolicy::Strict)
    }
}

impl Dashboard {
    pub fn new(policy: ClassificationPolicy) -> Self {
        Self {
            events: Vec::<Event>::new().into(),
            query: EventQuery::default(),
            policy,
            view: None,
        }
    }

    /// The current snapshot, shared cheaply with the scheduler.
    pub fn events(&self) -> Arc<[Event]> {
        self.events.clone()
    }

    pub fn query(&self) -> &EventQuery {
        &self.query
    }

    pub fn policy(&self) -> ClassificationPolicy {
        self.policy
    }

    pub fn view(&self) -> Option<&DashboardView> {
        self.view.as_ref()
    }

    pub fn set_events(&mut self, events: impl Into<Arc<[Event]>>) {
        self.events = events.into();
    }

    pub fn set_query(&mut self, query: EventQuery) {
        self.query = query;
    }

    pub fn set_policy(&mut self, policy: ClassificationPolicy) {
        self.policy = policy;
    }

    /// Replace the event with the same id, or append it.
    pub fn upsert_event(&mut self, event: Event) {
        let mut events = self.events.to_vec();
        match events.iter_mut().find(|existing| existing.id == event.id) {
            Some(existing) => *existing = event,
            None => events.push(event),
        }
        self.events = events.into();
    }

    pub fn remove_event(&mut self, id: &str) -> bool {
        let before = self.events.len();
        let events: Vec<Event> = self.events.iter().filter(|e| e.id != id).cloned().collect();
        let removed = events.len() != before;
        if removed {
            self.events = events.into();
        }
        removed
    }

    /// Recompute against `now`. Returns the new view only if it changed.
    pub fn refresh(&mut self, now: DateTime<Local>) -> Option<&DashboardView> {
        let view = DashboardView::compute(&self.events, &self.query, now, self.policy);
        if self.view.as_ref() == Some(&view) {
            return None;
        }

        log::debug!(
            "Dashboard changed: {} visible, {} upcoming of {}",
            view.visible.len(),
            view.statistics.upcoming,
            view.statistics.total
        );
        self.view = Some(view);
        self.view.as_ref()
    }
}
