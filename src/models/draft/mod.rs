//! Event drafts submitted by admins.
//!
//! A draft is the editable form of an event before it is sent to the
//! backend. Validation needs the current instant because an event may not be
//! scheduled in the past.

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::models::category::EventCategory;
use crate::models::event::Event;
use crate::utils::date::{parse_date, parse_time};

pub const MIN_NAME_CHARS: usize = 5;
pub const MIN_DESCRIPTION_CHARS: usize = 20;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Event name is required")]
    NameRequired,
    #[error("Event name must be at least 5 characters")]
    NameTooShort,
    #[error("Description is required")]
    DescriptionRequired,
    #[error("Description must be at least 20 characters")]
    DescriptionTooShort,
    #[error("Date is required")]
    DateRequired,
    #[error("Date is not a valid calendar day")]
    DateInvalid,
    #[error("Date cannot be in the past")]
    DateInPast,
    #[error("Time is required")]
    TimeRequired,
    #[error("Time is not a valid HH:MM time")]
    TimeInvalid,
    #[error("Time must be in the future")]
    TimeInPast,
    #[error("Location is required")]
    LocationRequired,
}

impl DraftError {
    /// Name of the form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NameRequired | Self::NameTooShort => "name",
            Self::DescriptionRequired | Self::DescriptionTooShort => "description",
            Self::DateRequired | Self::DateInvalid | Self::DateInPast => "date",
            Self::TimeRequired | Self::TimeInvalid | Self::TimeInPast => "time",
            Self::LocationRequired => "location",
        }
    }
}

/// Editable event fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub category: EventCategory,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            date: String::new(),
            time: String::new(),
            location: String::new(),
            category: EventCategory::Seminar,
        }
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            date: event.date.clone(),
            time: event.time.clone().unwrap_or_default(),
            location: event.location.clone(),
            category: event.category,
        }
    }
}

impl EventDraft {
    /// Validate every field, collecting one error per failing field in form
    /// order (name, description, date, time, location).
    pub fn validate(&self, now: DateTime<Local>) -> Result<(), Vec<DraftError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(DraftError::NameRequired);
        } else if name.chars().count() < MIN_NAME_CHARS {
            errors.push(DraftError::NameTooShort);
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.push(DraftError::DescriptionRequired);
        } else if description.chars().count() < MIN_DESCRIPTION_CHARS {
            errors.push(DraftError::DescriptionTooShort);
        }

        let today = now.date_naive();
        let date = if self.date.trim().is_empty() {
            errors.push(DraftError::DateRequired);
            None
        } else {
            match parse_date(&self.date) {
                Ok(date) if date < today => {
                    errors.push(DraftError::DateInPast);
                    None
                }
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(DraftError::DateInvalid);
                    None
                }
            }
        };

        if self.time.trim().is_empty() {
            errors.push(DraftError::TimeRequired);
        } else {
            match parse_time(Some(&self.time)) {
                Ok(time) => {
                    if date == Some(today) && time <= now.time() {
                        errors.push(DraftError::TimeInPast);
                    }
                }
                Err(_) => errors.push(DraftError::TimeInvalid),
            }
        }

        if self.location.trim().is_empty() {
            errors.push(DraftError::LocationRequired);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The JSON body expected by the create/update endpoints.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name.trim(),
            "description": self.description.trim(),
            "date": self.date.trim(),
            "time": self.time.trim(),
            "location": self.location.trim(),
            "category": self.category,
        })
    }
}
