//! Test session: the composition root of the engine.
//!
//! A [`TestSession`] owns every section of a test, the index of the one
//! being attempted, the section countdown, and the controller of the active
//! section. All mutation goes through methods on the session; there is no
//! ambient state. Sections are visited strictly in order and never re-entered.

use std::fmt;
use std::sync::Arc;

use crate::clock::{ClockTick, SectionTimer, SessionClock};
use crate::error::SessionError;
use crate::model::{AttemptState, AttemptStatus, SectionConfig, TestConfiguration, TestLayout};
use crate::results::TestResult;
use crate::section::{Section, SectionController, SectionPhase, SectionSummary, SubmitTrigger};
use crate::store::SectionProgress;
use crate::time::{Clock, SystemClock};

/// Lifecycle callbacks for a session.
pub trait SessionObserver: Send + Sync {
    fn on_section_started(&self, index: usize, name: &str, timer: SectionTimer);
    fn on_section_submitted(&self, summary: &SectionSummary);
    fn on_test_finished(&self, result: &TestResult);
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_section_started(&self, _: usize, _: &str, _: SectionTimer) {}
    fn on_section_submitted(&self, _: &SectionSummary) {}
    fn on_test_finished(&self, _: &TestResult) {}
}

/// Result of a submit request.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The section was committed and the next one is now active.
    Advanced {
        summary: SectionSummary,
        next_section: usize,
    },
    /// The last section was committed and the test is over.
    Finished {
        summary: SectionSummary,
        result: TestResult,
    },
    /// Nothing to submit: the section was already submitted or the test is over.
    Ignored,
}

/// Result of a clock tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Running { remaining: Option<u64> },
    /// The section clock expired and the section was submitted.
    Submitted(SubmitOutcome),
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayoutKind {
    Sectioned,
    FlatLegacy,
}

/// Builds a [`TestSession`] from a configuration.
pub struct SessionBuilder {
    config: TestConfiguration,
    resume_section: Option<usize>,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn SessionObserver>,
}

impl SessionBuilder {
    pub fn new(config: TestConfiguration) -> Self {
        Self {
            config,
            resume_section: None,
            clock: Arc::new(SystemClock),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Enter the test at `index` instead of the first section.
    pub fn resume_at(mut self, index: usize) -> Self {
        self.resume_section = Some(index);
        self
    }

    pub fn resume_section(mut self, index: Option<usize>) -> Self {
        self.resume_section = index;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Normalize the configuration and start the entry section's clock.
    ///
    /// # Errors
    ///
    /// Fails without creating a session when the configuration is malformed
    /// or the resume index is out of range.
    pub fn start(self) -> Result<TestSession, SessionError> {
        let config = self.config;
        let (kind, sections) = match config.layout()? {
            TestLayout::Sectioned { sections } => (
                LayoutKind::Sectioned,
                sections
                    .into_iter()
                    .map(|s| Section {
                        name: s.name,
                        timer: SectionTimer::Countdown {
                            seconds: s.duration,
                        },
                        questions: normalize(s.questions),
                    })
                    .collect::<Vec<_>>(),
            ),
            TestLayout::FlatLegacy {
                questions,
                duration_minutes,
            } => (
                LayoutKind::FlatLegacy,
                vec![Section {
                    name: config.name.clone(),
                    timer: duration_minutes
                        .map(|m| SectionTimer::Countdown {
                            seconds: m.saturating_mul(60),
                        })
                        .unwrap_or(SectionTimer::Untimed),
                    questions: normalize(questions),
                }],
            ),
        };

        let entry = self.resume_section.unwrap_or(0);
        if entry >= sections.len() {
            tracing::warn!(entry, sections = sections.len(), "rejected resume index");
            return Err(SessionError::ResumeOutOfRange {
                index: entry,
                sections: sections.len(),
            });
        }

        let mut session = TestSession {
            name: config.name,
            kind,
            flat_questions: match kind {
                LayoutKind::Sectioned => config.questions,
                LayoutKind::FlatLegacy => Vec::new(),
            },
            legacy_duration: config.duration,
            sections,
            current_section: entry,
            controller: None,
            clock: SessionClock::new(),
            summaries: Vec::new(),
            result: None,
            time: self.clock,
            observer: self.observer,
        };
        session.enter_section(entry)?;
        session.submit_expired_sections(SubmitOutcome::Ignored)?;
        Ok(session)
    }
}

fn normalize(questions: Vec<AttemptState>) -> Vec<AttemptState> {
    questions.into_iter().map(AttemptState::normalized).collect()
}

/// A running (or finished) mock test.
pub struct TestSession {
    name: String,
    kind: LayoutKind,
    flat_questions: Vec<AttemptState>,
    legacy_duration: Option<u64>,
    sections: Vec<Section>,
    current_section: usize,
    controller: Option<SectionController>,
    clock: SessionClock,
    summaries: Vec<SectionSummary>,
    result: Option<TestResult>,
    time: Arc<dyn Clock>,
    observer: Arc<dyn SessionObserver>,
}

impl TestSession {
    /// Start a session on the system clock, optionally resuming at a section.
    pub fn initialize(
        config: TestConfiguration,
        resume_section: Option<usize>,
    ) -> Result<Self, SessionError> {
        SessionBuilder::new(config)
            .resume_section(resume_section)
            .start()
    }

    pub fn builder(config: TestConfiguration) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Index of the active section, or of the last one submitted once finished.
    pub fn current_section_index(&self) -> usize {
        self.current_section
    }

    pub fn section_name(&self, index: usize) -> Option<&str> {
        self.sections.get(index).map(|s| s.name.as_str())
    }

    /// Phase of the active section; `None` once the test is finished.
    pub fn section_phase(&self) -> Option<SectionPhase> {
        self.controller.as_ref().map(SectionController::phase)
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    pub fn current_question_index(&self) -> Option<usize> {
        self.controller.as_ref().map(SectionController::current_index)
    }

    pub fn current_question(&self) -> Option<&AttemptState> {
        self.controller.as_ref().and_then(SectionController::current)
    }

    /// Attempts of the active section, in palette order.
    pub fn active_questions(&self) -> &[AttemptState] {
        self.controller
            .as_ref()
            .map(SectionController::questions)
            .unwrap_or(&[])
    }

    pub fn progress(&self) -> Option<SectionProgress> {
        self.controller.as_ref().map(SectionController::progress)
    }

    /// Seconds left on the active section; `None` when untimed.
    pub fn remaining_seconds(&self) -> Option<u64> {
        self.clock.remaining()
    }

    /// Generation of the running section clock. Ticks scheduled for any
    /// other generation are stale.
    pub fn clock_generation(&self) -> u64 {
        self.clock.generation()
    }

    pub fn is_clock_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn summaries(&self) -> &[SectionSummary] {
        &self.summaries
    }

    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<TestResult> {
        self.result
    }

    /// Serializable picture of every section's attempts, including the
    /// live state of the active section. Feeding it back through
    /// [`SessionBuilder::resume_at`] continues the test.
    pub fn snapshot(&self) -> TestConfiguration {
        let questions_of = |index: usize| -> Vec<AttemptState> {
            match &self.controller {
                Some(c) if c.index() == index => c.questions().to_vec(),
                _ => self.sections[index].questions.clone(),
            }
        };

        match self.kind {
            LayoutKind::FlatLegacy => TestConfiguration {
                name: self.name.clone(),
                questions: questions_of(0),
                sections: None,
                duration: self.legacy_duration,
            },
            LayoutKind::Sectioned => TestConfiguration {
                name: self.name.clone(),
                questions: self.flat_questions.clone(),
                sections: Some(
                    self.sections
                        .iter()
                        .enumerate()
                        .map(|(i, s)| SectionConfig {
                            name: s.name.clone(),
                            duration: s.timer.seconds().unwrap_or(0),
                            questions: questions_of(i),
                        })
                        .collect(),
                ),
                duration: self.legacy_duration,
            },
        }
    }

    // -----------------------------------------------------------------------
    // Question-level actions
    // -----------------------------------------------------------------------

    /// Record an answer for the current question.
    pub fn answer(&mut self, value: impl Into<String>) -> Result<(), SessionError> {
        self.active_mut()?.answer(value.into())
    }

    pub fn clear_answer(&mut self) -> Result<(), SessionError> {
        self.active_mut()?.clear_answer()
    }

    /// Mark or unmark the current question for review.
    pub fn toggle_review(&mut self) -> Result<AttemptStatus, SessionError> {
        self.active_mut()?.toggle_review()
    }

    /// Move to the next question. `Ok(false)` at the last question.
    pub fn next(&mut self) -> Result<bool, SessionError> {
        let now = self.time.now();
        self.active_mut()?.next(now)
    }

    /// Move to the previous question. `Ok(false)` at the first question.
    pub fn previous(&mut self) -> Result<bool, SessionError> {
        let now = self.time.now();
        self.active_mut()?.previous(now)
    }

    /// Palette jump. `Ok(false)` for the current index or an index outside the section.
    pub fn go_to(&mut self, index: usize) -> Result<bool, SessionError> {
        let now = self.time.now();
        self.active_mut()?.go_to(index, now)
    }

    // -----------------------------------------------------------------------
    // Clock and submission
    // -----------------------------------------------------------------------

    /// Advance the section clock by one second. Expiry submits the section
    /// exactly as a manual submit would.
    pub fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        if self.controller.is_none() {
            return Ok(TickOutcome::Idle);
        }
        match self.clock.tick() {
            ClockTick::Running { remaining } => Ok(TickOutcome::Running { remaining }),
            ClockTick::Idle => Ok(TickOutcome::Idle),
            ClockTick::Expired => {
                tracing::info!(section = self.current_section, "section time expired");
                let outcome = self.submit_with(SubmitTrigger::Expired, false)?;
                Ok(TickOutcome::Submitted(outcome))
            }
        }
    }

    /// Submit the active section.
    pub fn submit_section(&mut self) -> Result<SubmitOutcome, SessionError> {
        self.submit_with(SubmitTrigger::Manual, false)
    }

    /// Submit section `index` only if it is still the active one.
    ///
    /// A submit request issued for a section that has already been left is
    /// ignored instead of submitting its successor.
    pub fn submit_section_at(&mut self, index: usize) -> Result<SubmitOutcome, SessionError> {
        if index != self.current_section {
            tracing::debug!(
                requested = index,
                active = self.current_section,
                "stale submit ignored"
            );
            return Ok(SubmitOutcome::Ignored);
        }
        self.submit_section()
    }

    /// Submit the active section and finish the whole test immediately.
    /// Sections never entered keep their attempts as they were.
    pub fn submit_test(&mut self) -> Result<SubmitOutcome, SessionError> {
        self.submit_with(SubmitTrigger::Manual, true)
    }

    /// Commit the active section, then keep submitting while the section
    /// just entered has no time on its clock. The outcome describes the
    /// last submission; every one of them is in [`TestSession::summaries`].
    fn submit_with(
        &mut self,
        trigger: SubmitTrigger,
        finish_now: bool,
    ) -> Result<SubmitOutcome, SessionError> {
        let outcome = self.commit(trigger, finish_now)?;
        self.submit_expired_sections(outcome)
    }

    fn submit_expired_sections(
        &mut self,
        mut outcome: SubmitOutcome,
    ) -> Result<SubmitOutcome, SessionError> {
        while self.clock.is_expired()
            && self.controller.as_ref().is_some_and(SectionController::is_active)
        {
            tracing::info!(
                section = self.current_section,
                "section started with no time left"
            );
            outcome = self.commit(SubmitTrigger::Expired, false)?;
        }
        Ok(outcome)
    }

    fn commit(
        &mut self,
        trigger: SubmitTrigger,
        finish_now: bool,
    ) -> Result<SubmitOutcome, SessionError> {
        let now = self.time.now();
        let Some(controller) = self.controller.as_mut().filter(|c| c.is_active()) else {
            tracing::debug!("submit ignored: no active section");
            return Ok(SubmitOutcome::Ignored);
        };

        let summary = controller.submit(now, trigger)?;
        self.clock.stop();

        let index = controller.index();
        let is_last = finish_now || index + 1 >= self.sections.len();
        let next_phase = if is_last {
            SectionPhase::Finalizing
        } else {
            SectionPhase::Advancing
        };
        self.sections[index].questions = controller.release(next_phase);
        self.summaries.push(summary.clone());

        tracing::info!(
            section = index,
            name = %summary.name,
            trigger = ?trigger,
            answered = summary.answered,
            review = summary.marked_for_review,
            seconds = summary.time_spent_seconds,
            "section submitted"
        );
        self.observer.on_section_submitted(&summary);

        if is_last {
            let result = self.finalize();
            return Ok(SubmitOutcome::Finished { summary, result });
        }

        let next_section = index + 1;
        self.enter_section(next_section)?;
        Ok(SubmitOutcome::Advanced {
            summary,
            next_section,
        })
    }

    fn finalize(&mut self) -> TestResult {
        self.controller = None;
        let questions = self
            .sections
            .iter()
            .flat_map(|s| s.questions.iter().cloned())
            .collect();
        let result = TestResult::from_attempts(&self.name, questions, self.summaries.clone());

        tracing::info!(
            test = %self.name,
            questions = result.questions.len(),
            total_seconds = result.total_time_seconds,
            "test finished"
        );
        self.observer.on_test_finished(&result);
        self.result = Some(result.clone());
        result
    }

    /// Shared by fresh start, resume and natural advance.
    fn enter_section(&mut self, index: usize) -> Result<(), SessionError> {
        let section_count = self.sections.len();
        let now = self.time.now();
        let section = self
            .sections
            .get_mut(index)
            .ok_or(SessionError::ResumeOutOfRange {
                index,
                sections: section_count,
            })?;

        let controller = SectionController::enter(index, section, now);
        let generation = self.clock.start(controller.timer());
        self.current_section = index;

        tracing::info!(
            section = index,
            name = %controller.name(),
            seconds = ?controller.timer().seconds(),
            generation,
            "section started"
        );
        self.observer
            .on_section_started(index, controller.name(), controller.timer());
        self.controller = Some(controller);
        Ok(())
    }

    fn active_mut(&mut self) -> Result<&mut SectionController, SessionError> {
        self.controller
            .as_mut()
            .filter(|c| c.is_active())
            .ok_or(SessionError::Finished)
    }
}

impl fmt::Debug for TestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSession")
            .field("name", &self.name)
            .field("sections", &self.sections.len())
            .field("current_section", &self.current_section)
            .field("current_question", &self.current_question_index())
            .field("remaining", &self.clock.remaining())
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}
