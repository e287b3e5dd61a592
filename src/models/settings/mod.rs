// Settings module
// Runtime configuration, loaded from TOML by services::settings

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use serde::{Deserialize, Serialize};

use crate::models::status::ClassificationPolicy;

/// Which classification policy the dashboard uses by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyName {
    #[default]
    Strict,
    WithOngoing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub fallback_poll_secs: u64,
    pub ongoing_window_minutes: i64,
    pub default_policy: PolicyName,
    pub countdown_tick_millis: u64,
    pub search_history_limit: usize,
    pub cache_path: Option<PathBuf>,
    pub page_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            api_token: None,
            fallback_poll_secs: 60,
            ongoing_window_minutes: ClassificationPolicy::DEFAULT_ONGOING_WINDOW_MINUTES,
            default_policy: PolicyName::Strict,
            countdown_tick_millis: 1000,
            search_history_limit: 5,
            cache_path: None,
            page_limit: 50,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if self.api_base_url.trim().is_empty() {
            return Err("api_base_url cannot be empty".to_string());
        }

        if self.fallback_poll_secs == 0 {
            return Err("fallback_poll_secs must be greater than zero".to_string());
        }

        if self.countdown_tick_millis == 0 {
            return Err("countdown_tick_millis must be greater than zero".to_string());
        }

        if self.ongoing_window_minutes < 0 {
            return Err("ongoing_window_minutes cannot be negative".to_string());
        }

        if self.page_limit == 0 {
            return Err("page_limit must be greater than zero".to_string());
        }

        Ok(())
    }

    pub fn policy(&self) -> ClassificationPolicy {
        match self.default_policy {
            PolicyName::Strict => ClassificationPolicy::Strict,
            PolicyName::WithOngoing => self.participation_policy(),
        }
    }

    /// Policy for profile statistics, which always distinguish ongoing events.
    pub fn participation_policy(&self) -> ClassificationPolicy {
        ClassificationPolicy::with_ongoing_minutes(self.ongoing_window_minutes)
    }

    pub fn fallback_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.fallback_poll_secs)
    }

    pub fn countdown_tick(&self) -> StdDuration {
        StdDuration::from_millis(self.countdown_tick_millis)
    }
}
