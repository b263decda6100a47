//! Scripted attempts.
//!
//! A script is a TOML list of `[[actions]]` replayed against a session on a
//! manual clock. `wait` advances the clock one second at a time and ticks
//! the section countdown after each second, so a long wait auto-submits the
//! section exactly like a real timer would.
//!
//! ```toml
//! [[actions]]
//! action = "answer"
//! value = "zero"
//!
//! [[actions]]
//! action = "wait"
//! seconds = 40
//!
//! [[actions]]
//! action = "goto"
//! index = 2
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use mocktest_core::session::{SubmitOutcome, TickOutcome};
use mocktest_core::time::ManualClock;
use mocktest_core::TestSession;

/// One scripted user action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Answer { value: String },
    Clear,
    Review,
    Next,
    Previous,
    /// Palette jump to a zero-based question index in the active section.
    Goto { index: usize },
    Wait { seconds: u64 },
    Submit,
    SubmitTest,
}

#[derive(Debug, Deserialize)]
struct ScriptFile {
    #[serde(default)]
    actions: Vec<Action>,
}

/// Load a script from a TOML file.
pub fn load_script(path: &Path) -> Result<Vec<Action>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script: {}", path.display()))?;
    parse_script_str(&content, path)
}

pub fn parse_script_str(content: &str, source_path: &Path) -> Result<Vec<Action>> {
    let parsed: ScriptFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;
    Ok(parsed.actions)
}

/// Counters for what a replay did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub applied: usize,
    pub skipped: usize,
    pub seconds_waited: u64,
    pub auto_submits: usize,
}

/// Apply `actions` in order. Actions left over once the test finishes are skipped.
pub fn replay(
    session: &mut TestSession,
    clock: &ManualClock,
    actions: &[Action],
) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();

    for (step, action) in actions.iter().enumerate() {
        if session.is_finished() {
            stats.skipped = actions.len() - step;
            tracing::warn!(skipped = stats.skipped, "test finished before the script ended");
            break;
        }
        tracing::debug!(step, ?action, "replaying");

        match action {
            Action::Answer { value } => session.answer(value.clone())?,
            Action::Clear => session.clear_answer()?,
            Action::Review => {
                session.toggle_review()?;
            }
            Action::Next => {
                session.next()?;
            }
            Action::Previous => {
                session.previous()?;
            }
            Action::Goto { index } => {
                if !session.go_to(*index)? {
                    tracing::debug!(index, "goto had no effect");
                }
            }
            Action::Wait { seconds } => {
                for _ in 0..*seconds {
                    if session.is_finished() {
                        break;
                    }
                    clock.advance_secs(1);
                    stats.seconds_waited += 1;
                    if let TickOutcome::Submitted(outcome) = session.tick()? {
                        if outcome != SubmitOutcome::Ignored {
                            stats.auto_submits += 1;
                        }
                    }
                }
            }
            Action::Submit => {
                session.submit_section()?;
            }
            Action::SubmitTest => {
                session.submit_test()?;
            }
        }
        stats.applied += 1;
    }

    Ok(stats)
}
