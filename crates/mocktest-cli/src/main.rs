//! The `mocktest` command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod script;

use commands::history::HistoryAction;

#[derive(Parser)]
#[command(name = "mocktest", version, about = "Timed JEE/NEET-style mock-test sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scripted attempt against a test configuration
    Run {
        /// Test configuration (.json or .toml)
        #[arg(long)]
        config: PathBuf,

        /// Action script (.toml)
        #[arg(long)]
        script: PathBuf,

        /// Enter the test at this zero-based section index
        #[arg(long)]
        resume_section: Option<usize>,

        /// Output directory (defaults to the configured output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Do not record the attempt in history
        #[arg(long)]
        no_history: bool,
    },

    /// Validate a test configuration
    Validate {
        /// Test configuration (.json or .toml)
        #[arg(long)]
        config: PathBuf,
    },

    /// Score a saved test result
    Report {
        /// Result JSON written by `mocktest run`
        #[arg(long)]
        result: PathBuf,

        /// Output format: text, json, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Browse or clear past attempts
    History {
        #[command(subcommand)]
        action: HistoryCommand,

        /// History file (defaults to the configured history_file)
        #[arg(long, global = true)]
        file: Option<PathBuf>,
    },

    /// Create starter config, sample test and sample script
    Init,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List past attempts, newest first
    List,
    /// Show one attempt by id or id prefix
    Show { id: String },
    /// Write a past attempt's test, reset, as a new configuration
    Reattempt {
        id: String,
        /// Where to write the configuration (.json)
        #[arg(long)]
        output: PathBuf,
    },
    /// Delete all past attempts
    Clear,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mocktest=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            script,
            resume_section,
            output,
            format,
            no_history,
        } => commands::run::execute(config, script, resume_section, output, format, no_history),
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::Report {
            result,
            format,
            output,
        } => commands::report::execute(result, format, output),
        Commands::History { action, file } => {
            let action = match action {
                HistoryCommand::List => HistoryAction::List,
                HistoryCommand::Show { id } => HistoryAction::Show { id },
                HistoryCommand::Reattempt { id, output } => {
                    HistoryAction::Reattempt { id, output }
                }
                HistoryCommand::Clear => HistoryAction::Clear,
            };
            commands::history::execute(action, file)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
