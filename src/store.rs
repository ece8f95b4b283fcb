use crate::model::CompletedEntry;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Persistence for the user's completed-competition log.
///
/// The storage path is injected by whoever owns the store; nothing here is
/// process-global. One entry per event id.
pub struct CompletedStore {
    path: PathBuf,
}

impl CompletedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Vec<CompletedEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read completed log {}", self.path.display()))?;
        let entries = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse completed log {}", self.path.display()))?;
        Ok(entries)
    }

    pub fn save(&self, entries: &[CompletedEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create log directory {}", parent.display())
            })?;
        }

        let serialized = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write completed log {}", self.path.display()))?;
        Ok(())
    }

    /// Insert or replace the entry for this event id.
    pub fn add(&self, entry: CompletedEntry) -> Result<()> {
        let mut entries = self.load()?;
        entries.retain(|existing| existing.event_id != entry.event_id);
        entries.push(entry);
        self.save(&entries)
    }
}
