// Event module
// Campus event record as supplied by the data collaborator

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::category::EventCategory;
use crate::utils::date::{parse_date, parse_time, resolve_local, TemporalError};

/// A campus event.
///
/// The engine never mutates an event; it only derives facts from it. `date`
/// and `time` keep the raw strings the backend sent so that a malformed
/// record can still be listed (and classified as finished) instead of being
/// dropped at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, alias = "nama", deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, alias = "deskripsi", deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, alias = "tanggal", deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(
        default,
        alias = "waktu",
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<String>,
    #[serde(default, alias = "lokasi", deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, alias = "kategori")]
    pub category: EventCategory,
}

impl Event {
    /// Create a builder for constructing events with optional fields
    ///
    /// # Examples
    /// ```
    /// use campus_events::models::event::Event;
    ///
    /// let event = Event::builder()
    ///     .id("evt-1")
    ///     .name("Rust Workshop")
    ///     .date("2025-11-01")
    ///     .time("09:00")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(event.time.as_deref(), Some("09:00"));
    /// ```
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    /// The local date-time this event starts at (time defaults to midnight).
    pub fn naive_start(&self) -> Result<NaiveDateTime, TemporalError> {
        let date = parse_date(&self.date)?;
        let time = parse_time(self.time.as_deref())?;
        Ok(date.and_time(time))
    }

    /// The single instant obtained from the event's date and time.
    pub fn instant(&self) -> Result<DateTime<Local>, TemporalError> {
        resolve_local(self.naive_start()?)
    }

    /// Validate the identifying fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Event id cannot be empty".to_string());
        }

        if self.name.trim().is_empty() {
            return Err("Event name cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Builder for creating events with optional fields
#[derive(Debug, Default)]
pub struct EventBuilder {
    id: Option<String>,
    name: Option<String>,
    description: String,
    date: Option<String>,
    time: Option<String>,
    location: String,
    category: EventCategory,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the calendar day (`YYYY-MM-DD`); not validated here
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        let time = time.into();
        self.time = if time.trim().is_empty() { None } else { Some(time) };
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn category(mut self, category: EventCategory) -> Self {
        self.category = category;
        self
    }

    /// Build the event
    pub fn build(self) -> Result<Event, String> {
        let id = self.id.ok_or("Event id is required")?;
        let name = self.name.ok_or("Event name is required")?;
        let date = self.date.ok_or("Event date is required")?;

        let event = Event {
            id,
            name,
            description: self.description,
            date,
            time: self.time,
            location: self.location,
            category: self.category,
        };

        event.validate()?;
        Ok(event)
    }
}

pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Integer(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Integer(number) => number.to_string(),
    })
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}
