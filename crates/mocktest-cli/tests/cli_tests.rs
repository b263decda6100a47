//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mocktest(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("mocktest").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("MOCKTEST_HISTORY_FILE", dir.join("history.json"))
        .env_remove("RUST_LOG");
    cmd
}

fn init(dir: &Path) {
    mocktest(dir).arg("init").assert().success();
}

fn run_sample(dir: &Path) {
    mocktest(dir)
        .args([
            "run",
            "--config",
            "tests/sample.json",
            "--script",
            "tests/sample-script.toml",
            "--output",
            "out",
        ])
        .assert()
        .success();
}

fn find_output(dir: &Path, prefix: &str) -> PathBuf {
    std::fs::read_dir(dir.join("out"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix))
        })
        .unwrap()
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    mocktest(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("mock-test sessions"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    mocktest(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mocktest"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    mocktest(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created mocktest.toml"))
        .stdout(predicate::str::contains("Created tests/sample.json"));

    assert!(dir.path().join("mocktest.toml").exists());
    assert!(dir.path().join("tests/sample.json").exists());
    assert!(dir.path().join("tests/sample-script.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    init(dir.path());

    mocktest(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_sample() {
    let dir = TempDir::new().unwrap();
    init(dir.path());

    mocktest(dir.path())
        .args(["validate", "--config", "tests/sample.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 questions in 2 sections"))
        .stdout(predicate::str::contains("Configuration valid"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("legacy.toml"),
        r#"
name = "Legacy"

[[questions]]
id = 7
text = "Pick one"
options = ["a", "b"]
answer = "c"
difficulty = "Easy"
"#,
    )
    .unwrap();

    mocktest(dir.path())
        .args(["validate", "--config", "legacy.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("untimed"))
        .stdout(predicate::str::contains("[Q7] WARNING"))
        .stdout(predicate::str::contains("2 warning(s) found"));
}

#[test]
fn validate_rejects_empty_configuration() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("empty.json"), r#"{"name": "Empty"}"#).unwrap();

    mocktest(dir.path())
        .args(["validate", "--config", "empty.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("no sections and no questions"));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    mocktest(dir.path())
        .args(["validate", "--config", "nonexistent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn run_sample_scores_and_saves() {
    let dir = TempDir::new().unwrap();
    init(dir.path());

    mocktest(dir.path())
        .args([
            "run",
            "--config",
            "tests/sample.json",
            "--script",
            "tests/sample-script.toml",
            "--output",
            "out",
            "--format",
            "all",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("7 / 16"))
        .stdout(predicate::str::contains("66.67%"))
        .stderr(predicate::str::contains("Submitted Mathematics [Expired]"));

    let result = std::fs::read_to_string(find_output(dir.path(), "result-")).unwrap();
    assert!(result.contains("\"totalTimeSeconds\": 155.0"));
    assert!(find_output(dir.path(), "report-")
        .extension()
        .is_some_and(|e| e == "html"));
    assert!(dir.path().join("history.json").exists());
}

#[test]
fn run_with_resume_section() {
    let dir = TempDir::new().unwrap();
    init(dir.path());
    std::fs::write(
        dir.path().join("submit.toml"),
        "[[actions]]\naction = \"submit\"\n",
    )
    .unwrap();

    mocktest(dir.path())
        .args([
            "run",
            "--config",
            "tests/sample.json",
            "--script",
            "submit.toml",
            "--resume-section",
            "1",
            "--output",
            "out",
            "--no-history",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Section 2: Mathematics"))
        .stderr(predicate::str::contains("Physics").not());

    assert!(!dir.path().join("history.json").exists());
}

#[test]
fn run_rejects_bad_resume_index() {
    let dir = TempDir::new().unwrap();
    init(dir.path());

    mocktest(dir.path())
        .args([
            "run",
            "--config",
            "tests/sample.json",
            "--script",
            "tests/sample-script.toml",
            "--resume-section",
            "5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot resume at section 5"));
}

#[test]
fn report_formats() {
    let dir = TempDir::new().unwrap();
    init(dir.path());
    run_sample(dir.path());
    let result = find_output(dir.path(), "result-");

    mocktest(dir.path())
        .arg("report")
        .arg("--result")
        .arg(&result)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample JEE Mock"))
        .stdout(predicate::str::contains("incorrect"));

    mocktest(dir.path())
        .arg("report")
        .arg("--result")
        .arg(&result)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"score\": 7"));

    mocktest(dir.path())
        .arg("report")
        .arg("--result")
        .arg(&result)
        .args(["--format", "html", "--output", "page.html"])
        .assert()
        .success();
    let html = std::fs::read_to_string(dir.path().join("page.html")).unwrap();
    assert!(html.contains("<html"));

    mocktest(dir.path())
        .arg("report")
        .arg("--result")
        .arg(&result)
        .args(["--format", "sarif"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn history_list_show_clear() {
    let dir = TempDir::new().unwrap();

    mocktest(dir.path())
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No past attempts"));

    init(dir.path());
    run_sample(dir.path());

    let raw = std::fs::read_to_string(dir.path().join("history.json")).unwrap();
    let entries: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let id = entries[0]["id"].as_str().unwrap().to_string();

    mocktest(dir.path())
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample JEE Mock"))
        .stdout(predicate::str::contains(&id[..8]));

    mocktest(dir.path())
        .args(["history", "show", &id[..8]])
        .assert()
        .success()
        .stdout(predicate::str::contains("7 / 16"));

    mocktest(dir.path())
        .args(["history", "show", "ffffffff-dead"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no history entry"));

    mocktest(dir.path())
        .args(["history", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 1 attempt(s)"));

    mocktest(dir.path())
        .args(["history", "list", "--file", "history.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No past attempts"));
}

#[test]
fn history_reattempt_writes_fresh_configuration() {
    let dir = TempDir::new().unwrap();
    init(dir.path());
    run_sample(dir.path());

    let raw = std::fs::read_to_string(dir.path().join("history.json")).unwrap();
    let entries: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let id = entries[0]["id"].as_str().unwrap().to_string();

    mocktest(dir.path())
        .args(["history", "reattempt", &id[..8], "--output", "again.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fresh attempt of Sample JEE Mock"));

    let fresh: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("again.json")).unwrap())
            .unwrap();
    for section in fresh["sections"].as_array().unwrap() {
        for q in section["questions"].as_array().unwrap() {
            assert!(q.get("userAnswer").is_none());
            assert_eq!(q["status"], "unanswered");
            assert_eq!(q["timeTaken"], 0.0);
        }
    }

    mocktest(dir.path())
        .args([
            "run",
            "--config",
            "again.json",
            "--script",
            "tests/sample-script.toml",
            "--output",
            "out2",
            "--no-history",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("7 / 16"));

    mocktest(dir.path())
        .args(["history", "reattempt", "ffffffff-dead", "--output", "x.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no history entry"));
}
