//! The `mocktest init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_absent(Path::new("mocktest.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("tests")?;
    write_if_absent(Path::new("tests/sample.json"), SAMPLE_TEST)?;
    write_if_absent(Path::new("tests/sample-script.toml"), SAMPLE_SCRIPT)?;

    println!("\nNext steps:");
    println!("  1. Run: mocktest validate --config tests/sample.json");
    println!("  2. Run: mocktest run --config tests/sample.json --script tests/sample-script.toml");
    println!("  3. Run: mocktest history list");

    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mocktest configuration

# history_file = "~/.config/mocktest/history.json"
history_limit = 10
output_dir = "./mocktest-results"

# JEE marking: +4 correct, -1 incorrect, 0 unanswered
[marking]
correct = 4
incorrect = -1
unattempted = 0
"#;

const SAMPLE_TEST: &str = r#"{
  "name": "Sample JEE Mock",
  "sections": [
    {
      "name": "Physics",
      "duration": 120,
      "questions": [
        {
          "id": 1,
          "text": "A body moving with uniform velocity has an acceleration of",
          "options": ["zero", "9.8 m/s^2", "1 m/s^2", "infinite"],
          "answer": "zero",
          "difficulty": "Easy",
          "concepts": ["kinematics"],
          "isPastPaper": true,
          "explanation": "Uniform velocity means no change in velocity, so acceleration is zero."
        },
        {
          "id": 2,
          "text": "The SI unit of magnetic flux is",
          "options": ["tesla", "weber", "henry", "gauss"],
          "answer": "weber",
          "difficulty": "Medium",
          "concepts": ["electromagnetism"]
        }
      ]
    },
    {
      "name": "Mathematics",
      "duration": 120,
      "questions": [
        {
          "id": 3,
          "text": "Evaluate the integral of 2x from 0 to 3.",
          "answer": "9",
          "difficulty": "Medium",
          "questionType": "numerical",
          "concepts": ["definite integrals"]
        },
        {
          "id": 4,
          "text": "How many diagonals does a hexagon have?",
          "options": ["6", "9", "12", "15"],
          "answer": "9",
          "difficulty": "Hard",
          "concepts": ["combinatorics"]
        }
      ]
    }
  ]
}
"#;

const SAMPLE_SCRIPT: &str = r#"# Scripted attempt for tests/sample.json

[[actions]]
action = "answer"
value = "zero"

[[actions]]
action = "wait"
seconds = 20

[[actions]]
action = "next"

[[actions]]
action = "review"

[[actions]]
action = "wait"
seconds = 15

[[actions]]
action = "submit"

[[actions]]
action = "answer"
value = "9.0"

[[actions]]
action = "wait"
seconds = 30

[[actions]]
action = "goto"
index = 1

[[actions]]
action = "answer"
value = "12"

# Let the Mathematics clock run out.
[[actions]]
action = "wait"
seconds = 120
"#;
