//! Question state store for the active section.
//!
//! The store is the single writer of every [`AttemptState`] in the section
//! currently being attempted. It is handed the section's questions on entry
//! and gives them back, in the same order, on submission.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::model::{AttemptState, AttemptStatus};

/// Palette counts for one section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProgress {
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
    pub marked_for_review: usize,
    /// `(answered + marked_for_review) / total`, in `[0, 1]`.
    pub visited_fraction: f64,
}

/// Exclusive owner of the active section's attempts.
#[derive(Debug, Clone, Default)]
pub struct QuestionStateStore {
    questions: Vec<AttemptState>,
}

impl QuestionStateStore {
    pub fn new(questions: Vec<AttemptState>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AttemptState> {
        self.questions.get(index)
    }

    pub fn questions(&self) -> &[AttemptState] {
        &self.questions
    }

    /// Give the attempts back, leaving the store empty.
    pub fn take(&mut self) -> Vec<AttemptState> {
        std::mem::take(&mut self.questions)
    }

    /// Record an answer for the question at `index`.
    pub fn set_answer(
        &mut self,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        let attempt = self.slot(index)?;
        attempt.record_answer(value.into());
        tracing::debug!(
            question = attempt.question.id,
            status = %attempt.status(),
            "answer recorded"
        );
        Ok(())
    }

    pub fn clear_answer(&mut self, index: usize) -> Result<(), SessionError> {
        let attempt = self.slot(index)?;
        attempt.clear_answer();
        tracing::debug!(question = attempt.question.id, "answer cleared");
        Ok(())
    }

    /// Flip the review flag and return the resulting status.
    pub fn toggle_review(&mut self, index: usize) -> Result<AttemptStatus, SessionError> {
        let attempt = self.slot(index)?;
        let status = attempt.toggle_review();
        tracing::debug!(question = attempt.question.id, %status, "review toggled");
        Ok(status)
    }

    /// Add `seconds` of focus time to the question at `index`.
    pub fn accumulate_time(&mut self, index: usize, seconds: f64) -> Result<(), SessionError> {
        self.slot(index)?.add_time(seconds);
        Ok(())
    }

    /// Sum of `time_taken` over the section.
    pub fn total_time(&self) -> f64 {
        self.questions.iter().map(AttemptState::time_taken).sum()
    }

    pub fn progress(&self) -> SectionProgress {
        let count = |status: AttemptStatus| {
            self.questions
                .iter()
                .filter(|q| q.status() == status)
                .count()
        };
        let answered = count(AttemptStatus::Answered);
        let unanswered = count(AttemptStatus::Unanswered);
        let marked_for_review = count(AttemptStatus::Review);
        let total = self.questions.len();
        let visited_fraction = if total == 0 {
            0.0
        } else {
            (answered + marked_for_review) as f64 / total as f64
        };

        SectionProgress {
            total,
            answered,
            unanswered,
            marked_for_review,
            visited_fraction,
        }
    }

    fn slot(&mut self, index: usize) -> Result<&mut AttemptState, SessionError> {
        let len = self.questions.len();
        self.questions
            .get_mut(index)
            .ok_or(SessionError::QuestionOutOfRange { index, len })
    }
}
