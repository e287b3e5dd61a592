//! Loading and saving [`Settings`].

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::Settings;

pub const CONFIG_FILE_NAME: &str = "campus-events.toml";
pub const API_URL_ENV: &str = "CAMPUS_EVENTS_API_URL";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "CampusEvents", "campus-events")
}

pub fn default_config_path() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.config_dir().join(CONFIG_FILE_NAME),
        None => {
            log::warn!("Unable to resolve project directory; using current dir for config");
            PathBuf::from(CONFIG_FILE_NAME)
        }
    }
}

fn default_data_path(file_name: &str) -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.data_dir().join(file_name),
        None => PathBuf::from(file_name),
    }
}

pub fn default_cache_path() -> PathBuf {
    default_data_path("events-cache.json")
}

pub fn default_history_path() -> PathBuf {
    default_data_path("search-history.json")
}

/// Load settings from `path`, or the platform config file when `None`.
///
/// A missing file yields defaults. The API URL environment variable wins
/// over the file.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    let mut settings = if path.exists() {
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        toml::from_str(&data)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))?
    } else {
        log::debug!("No settings file at {}, using defaults", path.display());
        Settings::default()
    };

    if let Ok(url) = env::var(API_URL_ENV) {
        if !url.trim().is_empty() {
            settings.api_base_url = url.trim().to_string();
        }
    }

    settings
        .validate()
        .map_err(|e| anyhow!("Invalid settings: {}", e))?;
    Ok(settings)
}

pub fn save(settings: &Settings, path: &Path) -> Result<()> {
    settings
        .validate()
        .map_err(|e| anyhow!("Invalid settings: {}", e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {}", parent.display()))?;
    }

    let data = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    fs::write(path, data).with_context(|| format!("Failed to write settings to {}", path.display()))?;
    Ok(())
}
