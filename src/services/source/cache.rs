use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{EventFilter, EventSource, SourceError};
use crate::models::event::Event;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CacheSnapshot {
    saved_at: Option<DateTime<Local>>,
    events: Vec<Event>,
}

/// Best-effort on-disk copy of the last fetched event list.
#[derive(Debug, Clone)]
pub struct EventCache {
    path: PathBuf,
}

impl EventCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached events; a missing cache file is an empty list.
    pub fn load(&self) -> Result<Vec<Event>> {
        Ok(self.load_snapshot()?.events)
    }

    /// When the cache was last written, if ever.
    pub fn saved_at(&self) -> Result<Option<DateTime<Local>>> {
        Ok(self.load_snapshot()?.saved_at)
    }

    pub fn store(&self, events: &[Event]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create dir {}", parent.display()))?;
        }

        let snapshot = CacheSnapshot {
            saved_at: Some(Local::now()),
            events: events.to_vec(),
        };
        let data = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write event cache to {}", self.path.display()))?;
        Ok(())
    }

    /// Store, logging instead of failing.
    pub fn store_best_effort(&self, events: &[Event]) {
        match self.store(events) {
            Ok(()) => log::debug!("Cached {} events at {}", events.len(), self.path.display()),
            Err(err) => log::warn!("Could not update event cache: {:#}", err),
        }
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }

    fn load_snapshot(&self) -> Result<CacheSnapshot> {
        if !self.path.exists() {
            return Ok(CacheSnapshot::default());
        }

        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read event cache from {}", self.path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("failed to deserialize event cache from {}", self.path.display()))
    }
}

#[async_trait]
impl EventSource for EventCache {
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, SourceError> {
        let events = self
            .load()
            .map_err(|err| SourceError::Decode(format!("{:#}", err)))?;
        Ok(filter.apply(&events))
    }

    async fn get_event(&self, id: &str) -> Result<Event, SourceError> {
        self.load()
            .map_err(|err| SourceError::Decode(format!("{:#}", err)))?
            .into_iter()
            .find(|event| event.id == id)
            .ok_or_else(|| SourceError::NotFound(format!("event {}", id)))
    }
}
