//! Section lifecycle.
//!
//! A [`SectionController`] owns the store and navigator of the one section
//! currently being attempted and walks the state machine
//! `Active -> Submitting -> {Advancing | Finalizing}`. What happens after
//! `Submitting` is decided by the test session, which knows whether another
//! section follows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::SectionTimer;
use crate::error::SessionError;
use crate::model::{AttemptState, AttemptStatus};
use crate::navigation::Navigator;
use crate::store::{QuestionStateStore, SectionProgress};

/// A section inside a running test.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub timer: SectionTimer,
    pub questions: Vec<AttemptState>,
}

/// Lifecycle phase of the active section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionPhase {
    Active,
    Submitting,
    Advancing,
    Finalizing,
}

/// Why a section was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitTrigger {
    Manual,
    Expired,
}

/// Aggregate of a submitted section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSummary {
    pub index: usize,
    pub name: String,
    pub answered: usize,
    pub unanswered: usize,
    pub marked_for_review: usize,
    pub time_spent_seconds: f64,
    pub trigger: SubmitTrigger,
}

/// Controller for the section being attempted.
#[derive(Debug, Clone)]
pub struct SectionController {
    index: usize,
    name: String,
    timer: SectionTimer,
    store: QuestionStateStore,
    navigator: Navigator,
    phase: SectionPhase,
}

impl SectionController {
    /// Take ownership of a section's questions and make it active.
    pub fn enter(index: usize, section: &mut Section, now: DateTime<Utc>) -> Self {
        Self {
            index,
            name: section.name.clone(),
            timer: section.timer,
            store: QuestionStateStore::new(std::mem::take(&mut section.questions)),
            navigator: Navigator::new(now),
            phase: SectionPhase::Active,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timer(&self) -> SectionTimer {
        self.timer
    }

    pub fn phase(&self) -> SectionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SectionPhase::Active
    }

    pub fn current_index(&self) -> usize {
        self.navigator.current()
    }

    pub fn current(&self) -> Option<&AttemptState> {
        self.store.get(self.navigator.current())
    }

    pub fn questions(&self) -> &[AttemptState] {
        self.store.questions()
    }

    pub fn progress(&self) -> SectionProgress {
        self.store.progress()
    }

    pub fn answer(&mut self, value: String) -> Result<(), SessionError> {
        self.store.set_answer(self.navigator.current(), value)
    }

    pub fn clear_answer(&mut self) -> Result<(), SessionError> {
        self.store.clear_answer(self.navigator.current())
    }

    pub fn toggle_review(&mut self) -> Result<AttemptStatus, SessionError> {
        self.store.toggle_review(self.navigator.current())
    }

    pub fn next(&mut self, now: DateTime<Utc>) -> Result<bool, SessionError> {
        self.navigator.next(&mut self.store, now)
    }

    pub fn previous(&mut self, now: DateTime<Utc>) -> Result<bool, SessionError> {
        self.navigator.previous(&mut self.store, now)
    }

    pub fn go_to(&mut self, index: usize, now: DateTime<Utc>) -> Result<bool, SessionError> {
        self.navigator.move_to(&mut self.store, index, now)
    }

    /// Submit trigger: flush the current question, then summarize.
    ///
    /// Moves the controller to `Submitting`. The caller takes the questions
    /// back with [`SectionController::release`].
    pub fn submit(
        &mut self,
        now: DateTime<Utc>,
        trigger: SubmitTrigger,
    ) -> Result<SectionSummary, SessionError> {
        self.navigator.flush(&mut self.store, now)?;
        self.phase = SectionPhase::Submitting;

        let progress = self.store.progress();
        Ok(SectionSummary {
            index: self.index,
            name: self.name.clone(),
            answered: progress.answered,
            unanswered: progress.unanswered,
            marked_for_review: progress.marked_for_review,
            time_spent_seconds: self.store.total_time(),
            trigger,
        })
    }

    /// Hand the section's attempts back and record where the lifecycle goes next.
    pub fn release(&mut self, next: SectionPhase) -> Vec<AttemptState> {
        self.phase = next;
        self.store.take()
    }
}
