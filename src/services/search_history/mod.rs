//! Recent search terms, newest first.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct SearchHistory {
    terms: Vec<String>,
    limit: usize,
    path: Option<PathBuf>,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::in_memory(DEFAULT_LIMIT)
    }
}

impl SearchHistory {
    pub fn in_memory(limit: usize) -> Self {
        Self {
            terms: Vec::new(),
            limit: limit.max(1),
            path: None,
        }
    }

    /// Load the history stored at `path`. A missing or unreadable file
    /// starts an empty history.
    pub fn open(path: impl Into<PathBuf>, limit: usize) -> Self {
        let path = path.into();
        let mut history = Self::in_memory(limit);

        match read_terms(&path) {
            Ok(terms) => {
                history.terms = terms;
                history.terms.truncate(history.limit);
            }
            Err(err) => log::warn!("Ignoring search history: {:#}", err),
        }

        history.path = Some(path);
        history
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Record a search. Blank terms are ignored; a repeated term moves to
    /// the front.
    pub fn add(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }

        let lowered = term.to_lowercase();
        self.terms.retain(|existing| existing.to_lowercase() != lowered);
        self.terms.insert(0, term.to_string());
        self.terms.truncate(self.limit);
        self.persist();
    }

    pub fn remove(&mut self, term: &str) -> bool {
        let lowered = term.trim().to_lowercase();
        let before = self.terms.len();
        self.terms.retain(|existing| existing.to_lowercase() != lowered);
        let removed = self.terms.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.terms.clear();
        if let Some(path) = &self.path {
            if path.exists() {
                if let Err(err) = fs::remove_file(path) {
                    log::warn!("Could not remove search history {}: {}", path.display(), err);
                }
            }
        }
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(err) = write_terms(path, &self.terms) {
            log::warn!("Could not save search history: {:#}", err);
        }
    }
}

fn read_terms(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read search history from {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("failed to deserialize search history from {}", path.display()))
}

fn write_terms(path: &Path, terms: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create dir {}", parent.display()))?;
    }

    let data = serde_json::to_string(terms)?;
    fs::write(path, data)
        .with_context(|| format!("failed to write search history to {}", path.display()))?;
    Ok(())
}
