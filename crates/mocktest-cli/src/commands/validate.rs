//! The `mocktest validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use mocktest_core::model::TestLayout;
use mocktest_core::parser;

pub fn execute(config_path: PathBuf) -> Result<()> {
    let config = parser::load_configuration(&config_path)?;
    let layout = config
        .layout()
        .with_context(|| format!("invalid test configuration: {}", config_path.display()))?;

    match &layout {
        TestLayout::Sectioned { sections } => {
            println!(
                "Test: {} ({} questions in {} sections)",
                config.name,
                config.question_count(),
                sections.len()
            );
            for s in sections {
                println!(
                    "  {}: {} questions, {}s",
                    s.name,
                    s.questions.len(),
                    s.duration
                );
            }
        }
        TestLayout::FlatLegacy {
            questions,
            duration_minutes,
        } => {
            let timing = duration_minutes
                .map(|m| format!("{m} min"))
                .unwrap_or_else(|| "untimed".to_string());
            println!(
                "Test: {} ({} questions, single section, {timing})",
                config.name,
                questions.len()
            );
        }
    }

    let warnings = parser::validate_configuration(&config);
    for w in &warnings {
        let prefix = w
            .question_id
            .map(|id| format!("  [Q{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Configuration valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
