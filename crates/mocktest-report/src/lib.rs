//! Scoring, attempt history and HTML result pages for finished tests.

pub mod history;
pub mod html;
pub mod scoring;

pub use history::{AttemptHistory, HistoryEntry, DEFAULT_HISTORY_LIMIT};
pub use scoring::{MarkingScheme, ScoreCard, Verdict};
