//! Session error types.
//!
//! Only a malformed configuration is fatal; every other variant is a local,
//! recoverable rejection of a single operation.

use thiserror::Error;

/// Errors raised by the session engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The configuration has neither sections nor a flat question list.
    #[error("malformed configuration: no sections and no questions")]
    NoQuestions,

    /// A section has no questions, so it cannot host a current question.
    #[error("malformed configuration: section '{name}' has no questions")]
    EmptySection { name: String },

    /// The resume index points past the configured sections.
    #[error("cannot resume at section {index}: test has {sections} section(s)")]
    ResumeOutOfRange { index: usize, sections: usize },

    /// A question index outside the active section.
    #[error("question index {index} out of range (section has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },

    /// The session has been finalized; no further mutation is accepted.
    #[error("test session already finished")]
    Finished,
}

impl SessionError {
    /// Returns `true` if the session could not be created at all.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::NoQuestions
                | SessionError::EmptySection { .. }
                | SessionError::ResumeOutOfRange { .. }
        )
    }
}
