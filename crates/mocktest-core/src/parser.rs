//! Test configuration loader.
//!
//! Loads JSON or TOML test configurations from disk and validates them for
//! common authoring mistakes.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{AttemptState, QuestionType, TestConfiguration};

/// On-disk format of a test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick a format from the file extension. Anything that is not `.toml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        if path.extension().is_some_and(|ext| ext == "toml") {
            ConfigFormat::Toml
        } else {
            ConfigFormat::Json
        }
    }
}

/// Load a test configuration from a `.json` or `.toml` file.
pub fn load_configuration(path: &Path) -> Result<TestConfiguration> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read test configuration: {}", path.display()))?;

    parse_configuration_str(&content, ConfigFormat::from_path(path), path)
}

/// Parse a configuration from a string (useful for testing).
pub fn parse_configuration_str(
    content: &str,
    format: ConfigFormat,
    source_path: &Path,
) -> Result<TestConfiguration> {
    let config: TestConfiguration = match format {
        ConfigFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?,
        ConfigFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?,
    };
    tracing::debug!(
        name = %config.name,
        questions = config.question_count(),
        "loaded test configuration"
    );
    Ok(config)
}

/// Save a configuration (for example a session snapshot) as pretty JSON.
pub fn save_configuration(config: &TestConfiguration, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config).context("failed to serialize configuration")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write configuration to {}", path.display()))?;
    Ok(())
}

/// A warning from configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Validate a configuration for common issues.
///
/// Structural errors that make the test unrunnable are reported by
/// [`TestConfiguration::layout`]; this only flags suspicious content.
pub fn validate_configuration(config: &TestConfiguration) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let sectioned = config.sections.as_ref().filter(|s| !s.is_empty());
    let questions: Vec<&AttemptState> = match sectioned {
        Some(sections) => sections.iter().flat_map(|s| s.questions.iter()).collect(),
        None => config.questions.iter().collect(),
    };

    let mut seen_ids = HashSet::new();
    for q in &questions {
        if !seen_ids.insert(q.question.id) {
            warnings.push(ValidationWarning {
                question_id: Some(q.question.id),
                message: format!("duplicate question ID: {}", q.question.id),
            });
        }
    }

    for q in &questions {
        let question = &q.question;
        if question.question_type != QuestionType::Mcq {
            continue;
        }
        match question.options.as_deref() {
            None | Some([]) => warnings.push(ValidationWarning {
                question_id: Some(question.id),
                message: "multiple-choice question has no options".into(),
            }),
            Some(options) if !options.iter().any(|o| o.trim() == question.answer.trim()) => {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id),
                    message: format!("answer '{}' is not one of the options", question.answer),
                })
            }
            Some(_) => {}
        }
    }

    match sectioned {
        Some(sections) => {
            for section in sections.iter().filter(|s| s.duration == 0) {
                warnings.push(ValidationWarning {
                    question_id: None,
                    message: format!(
                        "section '{}' has zero duration and will expire immediately",
                        section.name
                    ),
                });
            }
            if !config.questions.is_empty() {
                warnings.push(ValidationWarning {
                    question_id: None,
                    message: "top-level questions are ignored when sections are present".into(),
                });
            }
        }
        None if config.duration.is_none() => warnings.push(ValidationWarning {
            question_id: None,
            message: "no duration set; the test will run untimed".into(),
        }),
        None => {}
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttemptStatus, Difficulty, TestLayout};
    use std::path::PathBuf;

    const SECTIONED_JSON: &str = r#"{
  "name": "JEE Main Mock 1",
  "sections": [
    {
      "name": "Physics",
      "duration": 3600,
      "questions": [
        {
          "id": 1,
          "text": "A body moves with uniform velocity. Its acceleration is",
          "options": ["zero", "constant", "increasing", "decreasing"],
          "answer": "zero",
          "difficulty": "Easy",
          "concepts": ["kinematics"],
          "isPastPaper": true,
          "pageReference": 42
        }
      ]
    },
    {
      "name": "Mathematics",
      "duration": 3600,
      "questions": [
        {
          "id": 2,
          "text": "Value of 2 + 3 * 4",
          "answer": "14",
          "difficulty": "Medium",
          "questionType": "numerical",
          "userAnswer": "14",
          "status": "answered",
          "timeTaken": 12.5
        }
      ]
    }
  ]
}"#;

    const FLAT_TOML: &str = r#"
name = "Legacy"
duration = 10

[[questions]]
id = 1
text = "First"
options = ["a", "b"]
answer = "a"
difficulty = "Hard"

[[questions]]
id = 2
text = "Second"
options = ["a", "b"]
answer = "b"
difficulty = "Easy"
"#;

    #[test]
    fn parse_sectioned_json() {
        let config =
            parse_configuration_str(SECTIONED_JSON, ConfigFormat::Json, &PathBuf::from("t.json"))
                .unwrap();
        assert_eq!(config.name, "JEE Main Mock 1");
        let TestLayout::Sectioned { sections } = config.layout().unwrap() else {
            panic!("expected sectioned layout");
        };
        assert_eq!(sections.len(), 2);
        let physics = &sections[0].questions[0].question;
        assert_eq!(physics.page_reference, Some(42));
        assert!(physics.is_past_paper);
        let maths = &sections[1].questions[0];
        assert_eq!(maths.question.question_type, QuestionType::Numerical);
        assert_eq!(maths.status(), AttemptStatus::Answered);
        assert_eq!(maths.time_taken(), 12.5);
    }

    #[test]
    fn parse_flat_toml() {
        let config =
            parse_configuration_str(FLAT_TOML, ConfigFormat::Toml, &PathBuf::from("t.toml"))
                .unwrap();
        assert_eq!(config.duration, Some(10));
        assert_eq!(config.questions.len(), 2);
        assert_eq!(config.questions[0].question.difficulty, Difficulty::Hard);
        assert!(validate_configuration(&config).is_empty());
    }

    #[test]
    fn parse_malformed_json() {
        let result =
            parse_configuration_str("{ not json", ConfigFormat::Json, &PathBuf::from("bad.json"));
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("bad.json"));
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a")), ConfigFormat::Json);
    }

    #[test]
    fn validate_flags_authoring_mistakes() {
        let json = r#"{
  "name": "Broken",
  "sections": [
    {"name": "A", "duration": 0, "questions": [
      {"id": 1, "text": "Q", "answer": "a", "difficulty": "Easy"},
      {"id": 1, "text": "Q", "options": ["x", "y"], "answer": "z", "difficulty": "Easy"}
    ]}
  ]
}"#;
        let config =
            parse_configuration_str(json, ConfigFormat::Json, &PathBuf::from("b.json")).unwrap();
        let warnings = validate_configuration(&config);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("duplicate question ID")));
        assert!(messages.iter().any(|m| m.contains("no options")));
        assert!(messages.iter().any(|m| m.contains("not one of the options")));
        assert!(messages.iter().any(|m| m.contains("zero duration")));
    }

    #[test]
    fn validate_untimed_legacy() {
        let config = TestConfiguration {
            duration: None,
            ..parse_configuration_str(FLAT_TOML, ConfigFormat::Toml, &PathBuf::from("t.toml"))
                .unwrap()
        };
        let warnings = validate_configuration(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("untimed"));
    }

    #[test]
    fn load_and_save_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("legacy.toml");
        std::fs::write(&toml_path, FLAT_TOML).unwrap();

        let config = load_configuration(&toml_path).unwrap();
        let json_path = dir.path().join("out/legacy.json");
        save_configuration(&config, &json_path).unwrap();
        assert_eq!(load_configuration(&json_path).unwrap(), config);
    }

    #[test]
    fn load_missing_file() {
        let err = load_configuration(Path::new("missing/config.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read test configuration"));
    }
}
