//! The `mocktest history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use mocktest_core::parser::save_configuration;
use mocktest_report::scoring::format_duration;
use mocktest_report::{AttemptHistory, ScoreCard};

use crate::config::load_config;

/// What to do with the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    List,
    Show { id: String },
    Reattempt { id: String, output: PathBuf },
    Clear,
}

pub fn execute(action: HistoryAction, file: Option<PathBuf>) -> Result<()> {
    let settings = load_config()?;
    let path = file.unwrap_or(settings.history_file);
    let mut history = AttemptHistory::load(&path, settings.history_limit)?;

    match action {
        HistoryAction::List => {
            if history.is_empty() {
                println!("No past attempts.");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_header(vec!["ID", "Test", "Score", "Accuracy", "Time", "Taken"]);
            for entry in history.entries() {
                let id = entry.id.to_string();
                table.add_row(vec![
                    Cell::new(&id[..8]),
                    Cell::new(&entry.name),
                    Cell::new(format!("{} / {}", entry.score, entry.total_marks)),
                    Cell::new(format!("{:.2}%", entry.accuracy)),
                    Cell::new(format_duration(entry.total_time_seconds)),
                    Cell::new(entry.recorded_at.format("%Y-%m-%d %H:%M")),
                ]);
            }
            println!("{table}");
        }
        HistoryAction::Show { id } => {
            let Some(entry) = history.find(&id) else {
                anyhow::bail!("no history entry matches '{id}'");
            };
            let card = ScoreCard::compute(&entry.result, &settings.marking);
            println!(
                "{} (taken {})",
                entry.name,
                entry.recorded_at.format("%Y-%m-%d %H:%M UTC")
            );
            println!("{}", super::score_table(&card));
            println!("{}", super::review_table(&card));
        }
        HistoryAction::Reattempt { id, output } => {
            let Some(entry) = history.find(&id) else {
                anyhow::bail!("no history entry matches '{id}'");
            };
            let Some(config) = history.reattempt(entry.id) else {
                anyhow::bail!("no history entry matches '{id}'");
            };
            save_configuration(&config, &output)?;
            tracing::info!(id = %entry.id, path = %output.display(), "wrote fresh attempt");
            println!("Fresh attempt of {} written to {}", entry.name, output.display());
            println!("  Run: mocktest run --config {} --script <script>", output.display());
        }
        HistoryAction::Clear => {
            let count = history.len();
            history.clear();
            history.save(&path)?;
            println!("Cleared {count} attempt(s).");
        }
    }

    Ok(())
}
