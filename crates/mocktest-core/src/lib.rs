//! Timed mock-test session engine.
//!
//! This crate owns the state machine behind a multi-section timed test:
//! per-question answer/review status, time-on-question accounting, the
//! section countdown that auto-submits on expiry, and final flattening of
//! every attempt into a [`results::TestResult`].

pub mod clock;
pub mod error;
pub mod live;
pub mod model;
pub mod navigation;
pub mod parser;
pub mod results;
pub mod section;
pub mod session;
pub mod store;
pub mod time;

pub use error::SessionError;
pub use model::{AttemptState, AttemptStatus, Question, TestConfiguration};
pub use results::TestResult;
pub use session::{SessionBuilder, SubmitOutcome, TestSession, TickOutcome};
