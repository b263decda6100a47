//! The `mocktest report` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use mocktest_core::TestResult;
use mocktest_report::html::{generate_html, write_html_report};
use mocktest_report::ScoreCard;

use crate::config::load_config;

pub fn execute(result_path: PathBuf, format: String, output: Option<PathBuf>) -> Result<()> {
    let settings = load_config()?;
    let result = TestResult::load_json(&result_path)?;
    let card = ScoreCard::compute(&result, &settings.marking);

    match format.as_str() {
        "text" => {
            let text = format!(
                "{}\n\n{}\n",
                super::score_table(&card),
                super::review_table(&card)
            );
            match output {
                Some(path) => write_text(&path, &text)?,
                None => print!("{text}"),
            }
        }
        "json" => match output {
            Some(path) => {
                card.save_json(&path)?;
                eprintln!("Score card saved to: {}", path.display());
            }
            None => println!(
                "{}",
                serde_json::to_string_pretty(&card).context("failed to serialize score card")?
            ),
        },
        "html" => match output {
            Some(path) => {
                write_html_report(&card, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            None => println!("{}", generate_html(&card)),
        },
        other => anyhow::bail!("unknown format '{other}': expected text, json or html"),
    }

    Ok(())
}

fn write_text(path: &std::path::Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    eprintln!("Report saved to: {}", path.display());
    Ok(())
}
