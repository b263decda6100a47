pub mod history;
pub mod init;
pub mod report;
pub mod run;
pub mod validate;

use comfy_table::{Cell, Table};

use mocktest_report::scoring::format_duration;
use mocktest_report::ScoreCard;

/// Summary table shared by `run`, `report` and `history show`.
pub(crate) fn score_table(card: &ScoreCard) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Test",
        "Score",
        "Correct",
        "Incorrect",
        "Unanswered",
        "Accuracy",
        "Time",
        "Avg / Q",
    ]);
    table.add_row(vec![
        Cell::new(&card.name),
        Cell::new(format!("{} / {}", card.score, card.total_marks)),
        Cell::new(card.correct),
        Cell::new(card.incorrect),
        Cell::new(card.unattempted),
        Cell::new(format!("{:.2}%", card.accuracy)),
        Cell::new(format_duration(card.total_time_seconds)),
        Cell::new(format_duration(card.average_time_seconds)),
    ]);
    table
}

/// Per-question review table.
pub(crate) fn review_table(card: &ScoreCard) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "#", "ID", "Difficulty", "Answer", "Correct", "Verdict", "Marks", "Time", "Review",
    ]);
    for (i, q) in card.questions.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(q.id),
            Cell::new(q.difficulty),
            Cell::new(q.user_answer.as_deref().unwrap_or("-")),
            Cell::new(&q.correct_answer),
            Cell::new(q.verdict),
            Cell::new(q.marks),
            Cell::new(format_duration(q.time_taken)),
            Cell::new(if q.marked_for_review { "yes" } else { "" }),
        ]);
    }
    table
}

/// Split a `--format` value; `all` expands to every format in `all`.
pub(crate) fn parse_formats<'a>(format: &'a str, all: &[&'a str]) -> Vec<&'a str> {
    if format == "all" {
        all.to_vec()
    } else {
        format
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect()
    }
}
