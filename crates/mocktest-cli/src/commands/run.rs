//! The `mocktest run` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use mocktest_core::clock::SectionTimer;
use mocktest_core::parser;
use mocktest_core::section::SectionSummary;
use mocktest_core::session::SessionObserver;
use mocktest_core::time::ManualClock;
use mocktest_core::{TestResult, TestSession};
use mocktest_report::html::write_html_report;
use mocktest_report::scoring::format_duration;
use mocktest_report::{AttemptHistory, HistoryEntry, ScoreCard};

use crate::config::load_config;
use crate::script::{load_script, replay};

/// Console lifecycle observer.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_section_started(&self, index: usize, name: &str, timer: SectionTimer) {
        match timer.seconds() {
            Some(seconds) => eprintln!(
                "  Section {}: {name} ({} on the clock)",
                index + 1,
                format_duration(seconds as f64)
            ),
            None => eprintln!("  Section {}: {name} (untimed)", index + 1),
        }
    }

    fn on_section_submitted(&self, summary: &SectionSummary) {
        eprintln!(
            "  Submitted {} [{:?}]: {} answered, {} for review, {} unanswered ({})",
            summary.name,
            summary.trigger,
            summary.answered,
            summary.marked_for_review,
            summary.unanswered,
            format_duration(summary.time_spent_seconds),
        );
    }

    fn on_test_finished(&self, result: &TestResult) {
        eprintln!(
            "\nFinished {}: {}/{} attempted in {}",
            result.name,
            result.attempted(),
            result.questions.len(),
            format_duration(result.total_time_seconds)
        );
    }
}

pub fn execute(
    config_path: PathBuf,
    script_path: PathBuf,
    resume_section: Option<usize>,
    output: Option<PathBuf>,
    format: String,
    no_history: bool,
) -> Result<()> {
    let settings = load_config()?;
    let config = parser::load_configuration(&config_path)?;
    let actions = load_script(&script_path)?;

    eprintln!(
        "mocktest v{}: {} ({} questions, {} actions)",
        env!("CARGO_PKG_VERSION"),
        config.name,
        config.question_count(),
        actions.len()
    );

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let mut session = TestSession::builder(config.clone())
        .resume_section(resume_section)
        .clock(clock.clone())
        .observer(Arc::new(ConsoleObserver))
        .start()
        .with_context(|| format!("cannot start test from {}", config_path.display()))?;

    let stats = replay(&mut session, &clock, &actions)?;
    tracing::info!(
        applied = stats.applied,
        skipped = stats.skipped,
        waited = stats.seconds_waited,
        auto_submits = stats.auto_submits,
        "script replayed"
    );

    if !session.is_finished() {
        eprintln!("  Script ended before the test finished; submitting.");
        session.submit_test()?;
    }
    let result = session
        .into_result()
        .context("session finished without a result")?;

    let card = ScoreCard::compute(&result, &settings.marking);
    println!("\n{}", super::score_table(&card));

    let output = output.unwrap_or_else(|| settings.output_dir.clone());
    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create output directory {}", output.display()))?;
    let timestamp = Utc::now().format("%Y-%m-%dT%H%M%S");

    for fmt in super::parse_formats(&format, &["json", "html"]) {
        match fmt {
            "json" => {
                let path = output.join(format!("result-{timestamp}.json"));
                result.save_json(&path)?;
                eprintln!("Result saved to: {}", path.display());
                let path = output.join(format!("score-{timestamp}.json"));
                card.save_json(&path)?;
                eprintln!("Score card saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&card, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            other => {
                eprintln!("Unknown format: {other}");
            }
        }
    }

    if !no_history {
        let mut history = AttemptHistory::load(&settings.history_file, settings.history_limit)?;
        let entry = HistoryEntry::new(config, result, &card, Utc::now());
        let id = entry.id;
        history.record(entry);
        history.save(&settings.history_file)?;
        eprintln!("Recorded in history as {id}");
    }

    Ok(())
}
