//! Session to result to score, across crates.

use std::sync::Arc;

use mocktest_core::live::LiveSession;
use mocktest_core::model::{AttemptState, Question, QuestionType, SectionConfig};
use mocktest_core::parser::{parse_configuration_str, ConfigFormat};
use mocktest_core::session::SubmitOutcome;
use mocktest_core::time::{fixed_now, ManualClock, MonotonicClock};
use mocktest_core::{TestConfiguration, TestResult, TestSession};
use mocktest_report::{AttemptHistory, HistoryEntry, MarkingScheme, ScoreCard, Verdict};

fn jee_config() -> TestConfiguration {
    let section = |name: &str, duration: u64, ids: [u32; 3]| SectionConfig {
        name: name.into(),
        duration,
        questions: ids
            .iter()
            .map(|&id| AttemptState::new(Question::mcq(id, "Q", &["a", "b", "c", "d"], "a")))
            .collect(),
    };
    TestConfiguration::sectioned(
        "JEE Main Mock",
        vec![
            section("Physics", 60, [1, 2, 3]),
            section("Chemistry", 60, [4, 5, 6]),
            section("Mathematics", 60, [7, 8, 9]),
        ],
    )
}

#[test]
fn full_attempt_is_scored() {
    let clock = Arc::new(ManualClock::default());
    let mut session = TestSession::builder(jee_config())
        .clock(clock.clone())
        .start()
        .unwrap();

    // Physics: two right, one wrong.
    session.answer("a").unwrap();
    clock.advance_secs(10);
    session.next().unwrap();
    session.answer("a").unwrap();
    clock.advance_secs(10);
    session.next().unwrap();
    session.answer("c").unwrap();
    clock.advance_secs(10);
    session.submit_section().unwrap();

    // Chemistry: one answered and marked for review, then the clock runs out.
    session.answer("a").unwrap();
    session.toggle_review().unwrap();
    for _ in 0..60 {
        clock.advance_secs(1);
        session.tick().unwrap();
    }
    assert_eq!(session.current_section_index(), 2);

    // Mathematics: nothing answered.
    clock.advance_secs(5);
    let SubmitOutcome::Finished { result, .. } = session.submit_section().unwrap() else {
        panic!("last section must finish the test");
    };

    assert_eq!(result.questions.len(), 9);
    assert_eq!(result.total_time_seconds, 95.0);
    assert_eq!(result.sections.len(), 3);

    let card = ScoreCard::compute(&result, &MarkingScheme::default());
    assert_eq!(card.correct, 3);
    assert_eq!(card.incorrect, 1);
    assert_eq!(card.unattempted, 5);
    assert_eq!(card.score, 11);
    assert_eq!(card.total_marks, 36);
    assert_eq!(card.accuracy, 75.0);
    assert_eq!(card.marked_for_review, 1);
    assert_eq!(card.questions[3].verdict, Verdict::Correct);
}

#[test]
fn result_survives_disk_and_history() {
    let clock = Arc::new(ManualClock::default());
    let config = TestConfiguration::flat(
        "Legacy",
        vec![
            AttemptState::new(Question::numerical(1, "Half of 5", "2.5")),
            AttemptState::new(Question::mcq(2, "Pick a", &["a", "b"], "a")),
        ],
        Some(1),
    );
    let mut session = TestSession::builder(config.clone())
        .clock(clock.clone())
        .start()
        .unwrap();
    assert_eq!(
        session.current_question().unwrap().question.question_type,
        QuestionType::Numerical
    );
    session.answer("2.50").unwrap();
    clock.advance_secs(30);
    session.submit_test().unwrap();
    let result = session.into_result().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let result_path = dir.path().join("result.json");
    result.save_json(&result_path).unwrap();
    let loaded = TestResult::load_json(&result_path).unwrap();
    assert_eq!(loaded, result);

    let card = ScoreCard::compute(&loaded, &MarkingScheme::default());
    assert_eq!(card.score, 4);

    let history_path = dir.path().join("history.json");
    let mut history = AttemptHistory::load(&history_path, 10).unwrap();
    history.record(HistoryEntry::new(config, loaded, &card, fixed_now()));
    history.save(&history_path).unwrap();

    let reloaded = AttemptHistory::load(&history_path, 10).unwrap();
    let entry = &reloaded.entries()[0];
    assert_eq!(entry.score, 4);
    assert_eq!(entry.total_time_seconds, 30.0);

    // A re-attempt starts clean.
    let again = reloaded.reattempt(entry.id).unwrap();
    let session = TestSession::initialize(again, None).unwrap();
    assert!(session
        .active_questions()
        .iter()
        .all(|q| q.user_answer().is_none() && q.time_taken() == 0.0));
}

#[test]
fn snapshot_resume_via_json() {
    let clock = Arc::new(ManualClock::default());
    let mut session = TestSession::builder(jee_config())
        .clock(clock.clone())
        .start()
        .unwrap();
    session.answer("b").unwrap();
    clock.advance_secs(12);
    session.submit_section().unwrap();

    let json = serde_json::to_string(&session.snapshot()).unwrap();
    let restored =
        parse_configuration_str(&json, ConfigFormat::Json, std::path::Path::new("snap.json"))
            .unwrap();

    let mut resumed = TestSession::builder(restored)
        .clock(Arc::new(ManualClock::default()))
        .resume_at(1)
        .start()
        .unwrap();
    assert_eq!(resumed.section_name(1), Some("Chemistry"));
    let SubmitOutcome::Finished { result, .. } = resumed.submit_test().unwrap() else {
        panic!("submit_test must finish");
    };
    assert_eq!(result.questions[0].user_answer(), Some("b"));
    assert_eq!(result.questions[0].time_taken(), 12.0);
    assert_eq!(result.total_time_seconds, 12.0);
}

#[tokio::test(start_paused = true)]
async fn live_session_runs_out_the_clock() {
    let config = TestConfiguration::sectioned(
        "Live",
        vec![
            SectionConfig {
                name: "One".into(),
                duration: 2,
                questions: vec![AttemptState::new(Question::mcq(1, "Q", &["a"], "a"))],
            },
            SectionConfig {
                name: "Two".into(),
                duration: 3,
                questions: vec![AttemptState::new(Question::mcq(2, "Q", &["a"], "a"))],
            },
        ],
    );
    let session = TestSession::builder(config)
        .clock(Arc::new(MonotonicClock::anchored_at(fixed_now())))
        .start()
        .unwrap();

    let mut live = LiveSession::start(session);
    live.answer("a").unwrap();
    live.run_to_completion().await.unwrap();
    assert_eq!(live.active_tickers(), 0);

    let session = live.into_session();
    let result = session.result().unwrap();
    assert_eq!(result.total_time_seconds, 5.0);
    let card = ScoreCard::compute(result, &MarkingScheme::default());
    assert_eq!(card.score, 4);
}
