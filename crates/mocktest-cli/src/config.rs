//! Application settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mocktest_report::{MarkingScheme, DEFAULT_HISTORY_LIMIT};

/// Environment variable that overrides `history_file`.
pub const HISTORY_FILE_ENV: &str = "MOCKTEST_HISTORY_FILE";

/// Top-level mocktest settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MocktestConfig {
    /// Where finished attempts are recorded.
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
    /// Number of attempts kept in history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Output directory for results.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub marking: MarkingScheme,
}

fn default_history_file() -> PathBuf {
    match dirs_path() {
        Some(dir) => dir.join("history.json"),
        None => PathBuf::from(".mocktest-history.json"),
    }
}
fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./mocktest-results")
}

impl Default for MocktestConfig {
    fn default() -> Self {
        Self {
            history_file: default_history_file(),
            history_limit: default_history_limit(),
            output_dir: default_output_dir(),
            marking: MarkingScheme::default(),
        }
    }
}

/// Load settings from well-known paths.
///
/// Search order:
/// 1. `mocktest.toml` in the current directory
/// 2. `~/.config/mocktest/config.toml`
///
/// `MOCKTEST_HISTORY_FILE` overrides the history location.
pub fn load_config() -> Result<MocktestConfig> {
    load_config_from(None)
}

/// Load settings from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<MocktestConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("mocktest.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded settings");
            config
        }
        None => MocktestConfig::default(),
    };

    if let Ok(file) = std::env::var(HISTORY_FILE_ENV) {
        if !file.is_empty() {
            config.history_file = PathBuf::from(file);
        }
    }

    Ok(config)
}

fn parse_config_str(content: &str) -> Result<MocktestConfig> {
    let config: MocktestConfig = toml::from_str(content)?;
    anyhow::ensure!(config.history_limit >= 1, "history_limit must be at least 1");
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mocktest"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MocktestConfig::default();
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.marking, MarkingScheme::default());
        assert_eq!(config.output_dir, PathBuf::from("./mocktest-results"));
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config_str(
            r#"
history_limit = 5
output_dir = "out"

[marking]
incorrect = 0
"#,
        )
        .unwrap();
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.marking.correct, 4);
        assert_eq!(config.marking.incorrect, 0);
    }

    #[test]
    fn zero_history_limit_is_rejected() {
        assert!(parse_config_str("history_limit = 0").is_err());
    }

    #[test]
    fn explicit_missing_path_fails() {
        let err = load_config_from(Some(Path::new("/no/such/mocktest.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "history_limit = 3\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.history_limit, 3);
    }
}
