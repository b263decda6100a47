//! Marking and score cards.
//!
//! A [`ScoreCard`] is computed from a finished [`TestResult`] under a
//! [`MarkingScheme`]. The default scheme is the JEE one: +4 for a correct
//! answer, -1 for an incorrect one, nothing for a skipped question.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mocktest_core::model::{AttemptState, Difficulty, Question, QuestionType};
use mocktest_core::section::SectionSummary;
use mocktest_core::TestResult;

/// Tolerance for comparing numerical answers.
pub const NUMERICAL_TOLERANCE: f64 = 1e-6;

/// Marks awarded per verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkingScheme {
    #[serde(default = "default_correct")]
    pub correct: i32,
    #[serde(default = "default_incorrect")]
    pub incorrect: i32,
    #[serde(default)]
    pub unattempted: i32,
}

fn default_correct() -> i32 {
    4
}

fn default_incorrect() -> i32 {
    -1
}

impl Default for MarkingScheme {
    fn default() -> Self {
        Self {
            correct: default_correct(),
            incorrect: default_incorrect(),
            unattempted: 0,
        }
    }
}

impl MarkingScheme {
    pub fn marks_for(&self, verdict: Verdict) -> i32 {
        match verdict {
            Verdict::Correct => self.correct,
            Verdict::Incorrect => self.incorrect,
            Verdict::Unattempted => self.unattempted,
        }
    }
}

/// Outcome of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
    Unattempted,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Correct => write!(f, "correct"),
            Verdict::Incorrect => write!(f, "incorrect"),
            Verdict::Unattempted => write!(f, "unattempted"),
        }
    }
}

/// Whether `given` matches the question's canonical answer.
///
/// Numerical questions compare as numbers when both sides parse; everything
/// else compares as trimmed text.
pub fn answers_match(question: &Question, given: &str) -> bool {
    let expected = question.answer.trim();
    let given = given.trim();
    if question.question_type == QuestionType::Numerical {
        if let (Ok(a), Ok(b)) = (expected.parse::<f64>(), given.parse::<f64>()) {
            return (a - b).abs() < NUMERICAL_TOLERANCE;
        }
    }
    expected == given
}

/// Judge one attempt.
pub fn verdict(attempt: &AttemptState) -> Verdict {
    match attempt.user_answer() {
        None => Verdict::Unattempted,
        Some(answer) if answers_match(&attempt.question, answer) => Verdict::Correct,
        Some(_) => Verdict::Incorrect,
    }
}

/// Per-question line of the review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionReview {
    pub id: u32,
    pub text: String,
    pub options: Option<Vec<String>>,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub verdict: Verdict,
    pub marks: i32,
    pub time_taken: f64,
    pub marked_for_review: bool,
    pub difficulty: Difficulty,
    pub concepts: Vec<String>,
    pub is_past_paper: bool,
    pub explanation: Option<String>,
}

/// Counts for one difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyBreakdown {
    pub difficulty: Difficulty,
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unattempted: usize,
}

/// Scored view of a finished test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub name: String,
    pub scheme: MarkingScheme,
    pub total_questions: usize,
    pub attempted: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unattempted: usize,
    pub marked_for_review: usize,
    pub score: i32,
    /// Maximum obtainable score.
    pub total_marks: i32,
    /// `correct / attempted * 100`, 0 when nothing was attempted.
    pub accuracy: f64,
    pub total_time_seconds: f64,
    pub average_time_seconds: f64,
    pub by_difficulty: Vec<DifficultyBreakdown>,
    pub sections: Vec<SectionSummary>,
    pub questions: Vec<QuestionReview>,
}

impl ScoreCard {
    /// Score a result.
    pub fn compute(result: &TestResult, scheme: &MarkingScheme) -> Self {
        let mut breakdown: BTreeMap<Difficulty, DifficultyBreakdown> = BTreeMap::new();
        let mut questions = Vec::with_capacity(result.questions.len());
        let (mut correct, mut incorrect, mut unattempted) = (0, 0, 0);

        for attempt in &result.questions {
            let verdict = verdict(attempt);
            let q = &attempt.question;
            let entry = breakdown
                .entry(q.difficulty)
                .or_insert(DifficultyBreakdown {
                    difficulty: q.difficulty,
                    total: 0,
                    correct: 0,
                    incorrect: 0,
                    unattempted: 0,
                });
            entry.total += 1;
            match verdict {
                Verdict::Correct => {
                    correct += 1;
                    entry.correct += 1;
                }
                Verdict::Incorrect => {
                    incorrect += 1;
                    entry.incorrect += 1;
                }
                Verdict::Unattempted => {
                    unattempted += 1;
                    entry.unattempted += 1;
                }
            }

            questions.push(QuestionReview {
                id: q.id,
                text: q.text.clone(),
                options: q.options.clone(),
                user_answer: attempt.user_answer().map(str::to_string),
                correct_answer: q.answer.clone(),
                verdict,
                marks: scheme.marks_for(verdict),
                time_taken: attempt.time_taken(),
                marked_for_review: attempt.is_marked_for_review(),
                difficulty: q.difficulty,
                concepts: q.concepts.clone(),
                is_past_paper: q.is_past_paper,
                explanation: q.explanation.clone(),
            });
        }

        let total_questions = result.questions.len();
        let attempted = correct + incorrect;
        let score: i32 = questions.iter().map(|q| q.marks).sum();
        let accuracy = if attempted == 0 {
            0.0
        } else {
            correct as f64 / attempted as f64 * 100.0
        };
        let average_time_seconds = if total_questions == 0 {
            0.0
        } else {
            result.total_time_seconds / total_questions as f64
        };

        tracing::debug!(
            test = %result.name,
            score,
            correct,
            incorrect,
            unattempted,
            "scored result"
        );

        Self {
            name: result.name.clone(),
            scheme: *scheme,
            total_questions,
            attempted,
            correct,
            incorrect,
            unattempted,
            marked_for_review: questions.iter().filter(|q| q.marked_for_review).count(),
            score,
            total_marks: (total_questions as i32).saturating_mul(scheme.correct),
            accuracy,
            total_time_seconds: result.total_time_seconds,
            average_time_seconds,
            by_difficulty: breakdown.into_values().collect(),
            sections: result.sections.clone(),
            questions,
        }
    }

    /// Save the score card as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize score card")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write score card to {}", path.display()))?;
        Ok(())
    }

    /// Load a score card from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read score card from {}", path.display()))?;
        let card: ScoreCard =
            serde_json::from_str(&content).context("failed to parse score card JSON")?;
        Ok(card)
    }
}

/// Human-friendly duration: `42s`, `3m 5s`.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0s".to_string();
    }
    let total = seconds.round() as u64;
    if total < 60 {
        return format!("{total}s");
    }
    format!("{}m {}s", total / 60, total % 60)
}
