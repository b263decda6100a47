//! HTML results page.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use crate::scoring::{format_duration, ScoreCard, Verdict};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate a results page from a score card.
pub fn generate_html(card: &ScoreCard) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>{} | results</title>\n",
        html_escape(&card.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&card.name)));
    html.push_str(&format!(
        "<p class=\"meta\">{} questions | marking +{} / {} / {}</p>\n",
        card.total_questions, card.scheme.correct, card.scheme.incorrect, card.scheme.unattempted
    ));
    html.push_str("</header>\n");

    // Summary cards
    html.push_str("<section class=\"cards\">\n");
    for (value, label) in [
        (format!("{} / {}", card.score, card.total_marks), "Score"),
        (format!("{:.2}%", card.accuracy), "Accuracy"),
        (format_duration(card.total_time_seconds), "Total Time Taken"),
        (
            format_duration(card.average_time_seconds),
            "Avg. Time / Question",
        ),
    ] {
        html.push_str(&format!(
            "<div class=\"card\"><div class=\"value\">{}</div><div class=\"label\">{}</div></div>\n",
            html_escape(&value),
            label
        ));
    }
    html.push_str(&format!(
        "<div class=\"card\"><div class=\"value\"><span class=\"correct\">{}</span> / <span class=\"incorrect\">{}</span> / {}</div><div class=\"label\">Correct / Incorrect / Unanswered</div></div>\n",
        card.correct, card.incorrect, card.unattempted
    ));
    html.push_str("</section>\n");

    if !card.sections.is_empty() {
        html.push_str("<section>\n<h2>Sections</h2>\n<table>\n");
        html.push_str("<thead><tr><th>Section</th><th>Answered</th><th>Review</th><th>Unanswered</th><th>Time</th><th>Submitted</th></tr></thead>\n<tbody>\n");
        for s in &card.sections {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:?}</td></tr>\n",
                html_escape(&s.name),
                s.answered,
                s.marked_for_review,
                s.unanswered,
                format_duration(s.time_spent_seconds),
                s.trigger
            ));
        }
        html.push_str("</tbody></table>\n</section>\n");
    }

    if !card.by_difficulty.is_empty() {
        html.push_str("<section>\n<h2>By difficulty</h2>\n<table>\n");
        html.push_str("<thead><tr><th>Difficulty</th><th>Questions</th><th>Correct</th><th>Incorrect</th><th>Unanswered</th></tr></thead>\n<tbody>\n");
        for d in &card.by_difficulty {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                d.difficulty, d.total, d.correct, d.incorrect, d.unattempted
            ));
        }
        html.push_str("</tbody></table>\n</section>\n");
    }

    // Question review
    html.push_str("<section class=\"review\">\n<h2>Question review</h2>\n");
    for (i, q) in card.questions.iter().enumerate() {
        let class = match q.verdict {
            Verdict::Correct => "correct",
            Verdict::Incorrect => "incorrect",
            Verdict::Unattempted => "unattempted",
        };
        html.push_str(&format!("<article class=\"question {class}\">\n"));
        html.push_str(&format!(
            "<h3>Q{}. {}</h3>\n<p class=\"meta\">{} | {} | {} marks{}{}</p>\n",
            i + 1,
            html_escape(&q.text),
            q.difficulty,
            format_duration(q.time_taken),
            q.marks,
            if q.marked_for_review {
                " | marked for review"
            } else {
                ""
            },
            if q.is_past_paper { " | past paper" } else { "" },
        ));

        if let Some(options) = &q.options {
            html.push_str("<ul class=\"options\">\n");
            for option in options {
                let option_class = if option == &q.correct_answer {
                    " class=\"correct\""
                } else if Some(option) == q.user_answer.as_ref() {
                    " class=\"incorrect\""
                } else {
                    ""
                };
                html.push_str(&format!(
                    "<li{}>{}</li>\n",
                    option_class,
                    html_escape(option)
                ));
            }
            html.push_str("</ul>\n");
        }

        html.push_str(&format!(
            "<p>Your answer: <strong>{}</strong> | Correct answer: <strong>{}</strong></p>\n",
            html_escape(q.user_answer.as_deref().unwrap_or("Not answered")),
            html_escape(&q.correct_answer)
        ));
        if !q.concepts.is_empty() {
            html.push_str(&format!(
                "<p class=\"concepts\">{}</p>\n",
                html_escape(&q.concepts.join(", "))
            ));
        }
        if let Some(explanation) = &q.explanation {
            html.push_str(&format!(
                "<details><summary>Explanation</summary><p>{}</p></details>\n",
                html_escape(explanation)
            ));
        }
        html.push_str("</article>\n");
    }
    html.push_str("</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write a results page to a file.
pub fn write_html_report(card: &ScoreCard, path: &Path) -> Result<()> {
    let html = generate_html(card);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --correct: #dcfce7; --incorrect: #fde2e2; --muted: #6b7280; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --correct: #064e3b; --incorrect: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: var(--muted); }
.cards { display: flex; flex-wrap: wrap; gap: 1rem; }
.card { border: 1px solid var(--border); border-radius: 8px; padding: 1rem 1.5rem; min-width: 10rem; }
.card .value { font-size: 1.8rem; font-weight: bold; }
.card .label { color: var(--muted); }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.question { border: 1px solid var(--border); border-radius: 8px; padding: 1rem; margin: 1rem 0; }
.question.correct { border-left: 6px solid #22c55e; }
.question.incorrect { border-left: 6px solid #ef4444; }
.question.unattempted { border-left: 6px solid #9ca3af; }
.options li.correct, span.correct { background: var(--correct); }
.options li.incorrect, span.incorrect { background: var(--incorrect); }
.concepts { font-size: 0.85rem; color: var(--muted); }
details { margin: 0.5rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::MarkingScheme;
    use mocktest_core::model::{AttemptState, AttemptStatus, Question};
    use mocktest_core::TestResult;

    fn make_card() -> ScoreCard {
        let mut q = Question::mcq(1, "Is 1 < 2 & 3 > 2?", &["yes", "no"], "yes");
        q.explanation = Some("<b>both</b> hold".into());
        q.concepts = vec!["inequalities".into()];
        let attempt = AttemptState::restored(q, Some("no".into()), AttemptStatus::Review, 65.0);
        let result = TestResult::from_attempts("Mock <1>", vec![attempt], vec![]);
        ScoreCard::compute(&result, &MarkingScheme::default())
    }

    #[test]
    fn html_report_contains_required_elements() {
        let html = generate_html(&make_card());
        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("-1 / 4"));
        assert!(html.contains("1m 5s"));
        assert!(html.contains("marked for review"));
        assert!(html.contains("inequalities"));
    }

    #[test]
    fn user_text_is_escaped() {
        let html = generate_html(&make_card());
        assert!(html.contains("Mock &lt;1&gt;"));
        assert!(html.contains("Is 1 &lt; 2 &amp; 3 &gt; 2?"));
        assert!(html.contains("&lt;b&gt;both&lt;/b&gt;"));
        assert!(!html.contains("<b>both</b>"));
    }

    #[test]
    fn html_report_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/report.html");

        write_html_report(&make_card(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
