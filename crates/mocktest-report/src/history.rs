//! Attempt history.
//!
//! A bounded, newest-first list of finished tests persisted as a JSON
//! array. Each entry keeps the configuration it was taken from so it can
//! be reviewed or re-attempted later.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mocktest_core::{TestConfiguration, TestResult};

use crate::scoring::ScoreCard;

/// Number of entries kept when no limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// One finished test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub name: String,
    pub configuration: TestConfiguration,
    pub result: TestResult,
    pub score: i32,
    pub total_marks: i32,
    pub accuracy: f64,
    pub total_time_seconds: f64,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        configuration: TestConfiguration,
        result: TestResult,
        card: &ScoreCard,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: configuration.name.clone(),
            configuration,
            score: card.score,
            total_marks: card.total_marks,
            accuracy: card.accuracy,
            total_time_seconds: result.total_time_seconds,
            result,
            recorded_at,
        }
    }
}

/// Bounded history of attempts, newest first.
#[derive(Debug, Clone)]
pub struct AttemptHistory {
    entries: Vec<HistoryEntry>,
    limit: usize,
}

impl AttemptHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Load history from `path`. A missing file is an empty history.
    pub fn load(path: &Path, limit: usize) -> Result<Self> {
        let mut history = Self::new(limit);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no history file yet");
            return Ok(history);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read history from {}", path.display()))?;
        history.entries = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse history JSON: {}", path.display()))?;
        history.entries.truncate(history.limit);
        Ok(history)
    }

    /// Save the history as a JSON array.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.entries).context("failed to serialize history")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write history to {}", path.display()))?;
        Ok(())
    }

    /// Put `entry` first, dropping the oldest entries beyond the limit.
    pub fn record(&mut self, entry: HistoryEntry) {
        tracing::info!(id = %entry.id, name = %entry.name, score = entry.score, "recorded attempt");
        self.entries.insert(0, entry);
        self.entries.truncate(self.limit);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Look an entry up by full id or by a unique id prefix.
    pub fn find(&self, id_or_prefix: &str) -> Option<&HistoryEntry> {
        if let Ok(id) = id_or_prefix.parse::<Uuid>() {
            return self.get(id);
        }
        let prefix = id_or_prefix.to_ascii_lowercase();
        if prefix.is_empty() {
            return None;
        }
        let mut matches = self
            .entries
            .iter()
            .filter(|e| e.id.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(entry), None) => Some(entry),
            _ => None,
        }
    }

    /// Configuration of a past entry with every attempt reset.
    pub fn reattempt(&self, id: Uuid) -> Option<TestConfiguration> {
        self.get(id).map(|e| e.configuration.fresh_attempt())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for AttemptHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
