//! Final output of a test session.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::AttemptState;
use crate::section::SectionSummary;

/// Every attempt across all sections, in original order, plus total time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Test name.
    #[serde(default)]
    pub name: String,
    /// One attempt per original question, flattened across sections.
    pub questions: Vec<AttemptState>,
    /// Sum of every `timeTaken`.
    pub total_time_seconds: f64,
    /// Per-section summaries, in submission order.
    #[serde(default)]
    pub sections: Vec<SectionSummary>,
}

impl TestResult {
    /// Flatten sections into a result; total time is derived from the attempts.
    pub fn from_attempts(
        name: &str,
        questions: Vec<AttemptState>,
        sections: Vec<SectionSummary>,
    ) -> Self {
        let total_time_seconds = questions.iter().map(AttemptState::time_taken).sum();
        Self {
            name: name.to_string(),
            questions,
            total_time_seconds,
            sections,
        }
    }

    /// Number of questions with an answer recorded.
    pub fn attempted(&self) -> usize {
        self.questions.iter().filter(|q| q.is_answered()).count()
    }

    /// Save the result as JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize result")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write result to {}", path.display()))?;
        Ok(())
    }

    /// Load a result from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read result from {}", path.display()))?;
        let result: TestResult =
            serde_json::from_str(&content).context("failed to parse result JSON")?;
        Ok(result)
    }
}
