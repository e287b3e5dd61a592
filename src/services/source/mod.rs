//! Where events come from.
//!
//! The core only needs [`EventSource`]. [`ApiClient`] talks to the backend
//! and [`EventCache`] serves the last fetched list from disk.

mod api;
mod cache;

pub use api::{parse_events, ApiClient, EventPage};
pub use cache::EventCache;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::category::EventCategory;
use crate::models::event::Event;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server returned HTTP {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl SourceError {
    /// Message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Cannot reach the event server. Check your connection and try again.".to_string()
            }
            Self::Server { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Server { .. } => "The event server could not handle the request.".to_string(),
            Self::NotFound(_) => "Event not found.".to_string(),
            Self::Decode(_) => "The event server sent an unexpected response.".to_string(),
        }
    }

    /// Whether offering the user a retry makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Server { status, .. } => *status >= 500 || *status == 429,
            Self::NotFound(_) | Self::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Server-side list filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub location: Option<String>,
    pub category: Option<EventCategory>,
    /// 1-based.
    pub page: u32,
    pub limit: u32,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            location: None,
            category: None,
            page: 1,
            limit: 10,
        }
    }
}

impl EventFilter {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Query parameters in the order the backend documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(location) = self.location.as_deref().filter(|l| !l.trim().is_empty()) {
            pairs.push(("location", location.trim().to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.as_str().to_string()));
        }
        pairs.push(("page", self.page.max(1).to_string()));
        pairs.push(("limit", self.limit.max(1).to_string()));
        pairs
    }

    /// The same filter applied locally, for sources without a server.
    pub fn apply(&self, events: &[Event]) -> Vec<Event> {
        let location = self
            .location
            .as_deref()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty());
        let limit = self.limit.max(1) as usize;
        let skip = (self.page.max(1) as usize - 1).saturating_mul(limit);

        events
            .iter()
            .filter(|event| {
                location
                    .as_deref()
                    .map_or(true, |l| event.location.to_lowercase() == l)
            })
            .filter(|event| self.category.map_or(true, |c| event.category == c))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect()
    }
}

#[async_trait]
pub trait EventSource: Send + Sync {
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, SourceError>;

    async fn get_event(&self, id: &str) -> Result<Event, SourceError>;
}
