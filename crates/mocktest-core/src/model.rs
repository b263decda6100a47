//! Core data model types for mocktest.
//!
//! The JSON shape mirrors what question-selection services hand over:
//! camelCase keys, per-question attempt fields flattened next to the
//! question itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SessionError;

/// A single exam question, immutable for the duration of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier, unique within a test.
    pub id: u32,
    /// Question text.
    pub text: String,
    /// Ordered answer options (MCQ only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Canonical answer.
    pub answer: String,
    pub difficulty: Difficulty,
    /// Concept tags.
    #[serde(default)]
    pub concepts: Vec<String>,
    /// Whether the question appeared in a past paper.
    #[serde(default)]
    pub is_past_paper: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub question_type: QuestionType,
    /// Page in the source book, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_reference: Option<u32>,
}

impl Question {
    /// Minimal MCQ constructor, mostly for tests and fixtures.
    pub fn mcq(id: u32, text: &str, options: &[&str], answer: &str) -> Self {
        Self {
            id,
            text: text.to_string(),
            options: Some(options.iter().map(|o| o.to_string()).collect()),
            answer: answer.to_string(),
            difficulty: Difficulty::Medium,
            concepts: Vec::new(),
            is_past_paper: false,
            explanation: None,
            question_type: QuestionType::Mcq,
            page_reference: None,
        }
    }

    /// Minimal numerical-answer constructor.
    pub fn numerical(id: u32, text: &str, answer: &str) -> Self {
        Self {
            options: None,
            question_type: QuestionType::Numerical,
            ..Self::mcq(id, text, &[], answer)
        }
    }
}

/// Question difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// How a question expects to be answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Mcq,
    Numerical,
}

/// Palette status of an attempted question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    #[default]
    Unanswered,
    Answered,
    Review,
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptStatus::Unanswered => write!(f, "unanswered"),
            AttemptStatus::Answered => write!(f, "answered"),
            AttemptStatus::Review => write!(f, "review"),
        }
    }
}

/// A question plus the user's mutable attempt record.
///
/// Invariants, enforced by every mutator and by [`AttemptState::normalized`]:
/// `Answered` implies an answer is set, `Unanswered` implies it is not, and
/// `Review` is independent of the answer. `time_taken` never decreases.
/// Deserialization goes through [`AttemptState::restored`], so a record read
/// from disk is repaired before anything can observe it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredAttempt")]
pub struct AttemptState {
    #[serde(flatten)]
    pub question: Question,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_answer: Option<String>,
    status: AttemptStatus,
    time_taken: f64,
}

/// Wire form of an [`AttemptState`] with every attempt field optional.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAttempt {
    #[serde(flatten)]
    question: Question,
    #[serde(default)]
    user_answer: Option<String>,
    #[serde(default)]
    status: AttemptStatus,
    #[serde(default)]
    time_taken: f64,
}

impl From<StoredAttempt> for AttemptState {
    fn from(raw: StoredAttempt) -> Self {
        AttemptState::restored(raw.question, raw.user_answer, raw.status, raw.time_taken)
    }
}

impl AttemptState {
    /// Fresh attempt: no answer, unanswered, zero time.
    pub fn new(question: Question) -> Self {
        Self {
            question,
            user_answer: None,
            status: AttemptStatus::Unanswered,
            time_taken: 0.0,
        }
    }

    /// Rebuild an attempt from previously captured fields, repairing any
    /// invariant violations.
    pub fn restored(
        question: Question,
        user_answer: Option<String>,
        status: AttemptStatus,
        time_taken: f64,
    ) -> Self {
        Self {
            question,
            user_answer,
            status,
            time_taken,
        }
        .normalized()
    }

    pub fn user_answer(&self) -> Option<&str> {
        self.user_answer.as_deref()
    }

    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    /// Accumulated seconds of focus time.
    pub fn time_taken(&self) -> f64 {
        self.time_taken
    }

    pub fn is_answered(&self) -> bool {
        self.user_answer.is_some()
    }

    pub fn is_marked_for_review(&self) -> bool {
        self.status == AttemptStatus::Review
    }

    /// Record an answer. A question marked for review stays in review.
    ///
    /// An empty (or whitespace-only) value clears the answer instead.
    pub fn record_answer(&mut self, value: String) {
        if value.trim().is_empty() {
            self.clear_answer();
            return;
        }
        self.user_answer = Some(value);
        if self.status != AttemptStatus::Review {
            self.status = AttemptStatus::Answered;
        }
    }

    /// Remove the answer. A question marked for review stays in review.
    pub fn clear_answer(&mut self) {
        self.user_answer = None;
        if self.status != AttemptStatus::Review {
            self.status = AttemptStatus::Unanswered;
        }
    }

    /// Two-state review toggle. Leaving review falls back to whatever the
    /// answer implies.
    pub fn toggle_review(&mut self) -> AttemptStatus {
        self.status = if self.status == AttemptStatus::Review {
            self.answer_implied_status()
        } else {
            AttemptStatus::Review
        };
        self.status
    }

    /// Add focus time. Negative and non-finite deltas are ignored.
    pub fn add_time(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.time_taken += seconds;
        }
    }

    /// Drop all attempt data, keeping the question.
    pub fn reset(&mut self) {
        self.user_answer = None;
        self.status = AttemptStatus::Unanswered;
        self.time_taken = 0.0;
    }

    /// Repair a record loaded from outside the engine.
    pub fn normalized(mut self) -> Self {
        if self.user_answer.as_deref().is_some_and(|a| a.trim().is_empty()) {
            self.user_answer = None;
        }
        if self.status != AttemptStatus::Review {
            self.status = self.answer_implied_status();
        }
        if !self.time_taken.is_finite() || self.time_taken < 0.0 {
            self.time_taken = 0.0;
        }
        self
    }

    fn answer_implied_status(&self) -> AttemptStatus {
        if self.user_answer.is_some() {
            AttemptStatus::Answered
        } else {
            AttemptStatus::Unanswered
        }
    }
}

/// A timed section as supplied in a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionConfig {
    pub name: String,
    /// Section duration in seconds.
    pub duration: u64,
    #[serde(default)]
    pub questions: Vec<AttemptState>,
}

/// Input configuration, produced by an external question-selection service.
///
/// Either `sections` is present (sectioned mode) or the flat `questions`
/// list is used as a single implicit section (legacy mode). In legacy mode
/// `duration` is in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfiguration {
    pub name: String,
    #[serde(default)]
    pub questions: Vec<AttemptState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<SectionConfig>>,
    /// Legacy top-level duration in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

/// A configuration resolved into exactly one of its two shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum TestLayout {
    Sectioned {
        sections: Vec<SectionConfig>,
    },
    FlatLegacy {
        questions: Vec<AttemptState>,
        duration_minutes: Option<u64>,
    },
}

impl TestLayout {
    pub fn section_count(&self) -> usize {
        match self {
            TestLayout::Sectioned { sections } => sections.len(),
            TestLayout::FlatLegacy { .. } => 1,
        }
    }
}

impl TestConfiguration {
    /// Build a sectioned configuration.
    pub fn sectioned(name: &str, sections: Vec<SectionConfig>) -> Self {
        Self {
            name: name.to_string(),
            questions: Vec::new(),
            sections: Some(sections),
            duration: None,
        }
    }

    /// Build a legacy flat configuration. `duration_minutes` of `None` means untimed.
    pub fn flat(name: &str, questions: Vec<AttemptState>, duration_minutes: Option<u64>) -> Self {
        Self {
            name: name.to_string(),
            questions,
            sections: None,
            duration: duration_minutes,
        }
    }

    /// Resolve the configuration into a [`TestLayout`].
    ///
    /// An empty `sections` list counts as absent. Fails when there is
    /// nothing to attempt or when a section is empty.
    pub fn layout(&self) -> Result<TestLayout, SessionError> {
        match &self.sections {
            Some(sections) if !sections.is_empty() => {
                if let Some(empty) = sections.iter().find(|s| s.questions.is_empty()) {
                    return Err(SessionError::EmptySection {
                        name: empty.name.clone(),
                    });
                }
                Ok(TestLayout::Sectioned {
                    sections: sections.clone(),
                })
            }
            _ if !self.questions.is_empty() => Ok(TestLayout::FlatLegacy {
                questions: self.questions.clone(),
                duration_minutes: self.duration,
            }),
            _ => Err(SessionError::NoQuestions),
        }
    }

    /// Total number of questions across the effective layout.
    pub fn question_count(&self) -> usize {
        match &self.sections {
            Some(sections) if !sections.is_empty() => {
                sections.iter().map(|s| s.questions.len()).sum()
            }
            _ => self.questions.len(),
        }
    }

    /// The same test with every attempt reset, ready for a re-attempt.
    pub fn fresh_attempt(&self) -> Self {
        let mut config = self.clone();
        config.questions.iter_mut().for_each(AttemptState::reset);
        if let Some(sections) = config.sections.as_mut() {
            for section in sections {
                section.questions.iter_mut().for_each(AttemptState::reset);
            }
        }
        config
    }
}
