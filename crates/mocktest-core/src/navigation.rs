//! Active-question pointer with time flushing.
//!
//! Every real move flushes the elapsed time since the last move onto the
//! question being left, before the pointer changes. Moves that would leave
//! the section, or that target the question already shown, do nothing.

use chrono::{DateTime, Utc};

use crate::error::SessionError;
use crate::store::QuestionStateStore;
use crate::time::elapsed_seconds;

#[derive(Debug, Clone)]
pub struct Navigator {
    current: usize,
    question_started_at: DateTime<Utc>,
}

impl Navigator {
    /// Point at the first question, timing from `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            current: 0,
            question_started_at: now,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn question_started_at(&self) -> DateTime<Utc> {
        self.question_started_at
    }

    /// Commit the time spent on the current question and restart timing.
    pub fn flush(
        &mut self,
        store: &mut QuestionStateStore,
        now: DateTime<Utc>,
    ) -> Result<f64, SessionError> {
        let delta = elapsed_seconds(self.question_started_at, now);
        store.accumulate_time(self.current, delta)?;
        self.question_started_at = now;
        Ok(delta)
    }

    /// Jump to `index`. Returns whether a move happened.
    pub fn move_to(
        &mut self,
        store: &mut QuestionStateStore,
        index: usize,
        now: DateTime<Utc>,
    ) -> Result<bool, SessionError> {
        if index >= store.len() || index == self.current {
            return Ok(false);
        }
        let spent = self.flush(store, now)?;
        tracing::debug!(from = self.current, to = index, spent, "navigate");
        self.current = index;
        Ok(true)
    }

    pub fn next(
        &mut self,
        store: &mut QuestionStateStore,
        now: DateTime<Utc>,
    ) -> Result<bool, SessionError> {
        if self.current + 1 >= store.len() {
            return Ok(false);
        }
        self.move_to(store, self.current + 1, now)
    }

    pub fn previous(
        &mut self,
        store: &mut QuestionStateStore,
        now: DateTime<Utc>,
    ) -> Result<bool, SessionError> {
        if self.current == 0 {
            return Ok(false);
        }
        self.move_to(store, self.current - 1, now)
    }

    /// Back to the first question with fresh timing (section entry).
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.current = 0;
        self.question_started_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttemptState, Question};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn store(n: u32) -> QuestionStateStore {
        QuestionStateStore::new(
            (1..=n)
                .map(|id| AttemptState::new(Question::mcq(id, "Q", &["a"], "a")))
                .collect(),
        )
    }

    fn times(store: &QuestionStateStore) -> Vec<f64> {
        store.questions().iter().map(|q| q.time_taken()).collect()
    }

    #[test]
    fn move_flushes_onto_outgoing_question() {
        let mut s = store(3);
        let t0 = fixed_now();
        let mut nav = Navigator::new(t0);

        assert!(nav.next(&mut s, t0 + Duration::seconds(4)).unwrap());
        assert!(nav.move_to(&mut s, 2, t0 + Duration::seconds(10)).unwrap());
        assert!(nav.previous(&mut s, t0 + Duration::seconds(11)).unwrap());

        assert_eq!(nav.current(), 1);
        assert_eq!(times(&s), vec![4.0, 6.0, 1.0]);
    }

    #[test]
    fn boundary_moves_do_not_flush() {
        let mut s = store(2);
        let t0 = fixed_now();
        let mut nav = Navigator::new(t0);

        assert!(!nav.previous(&mut s, t0 + Duration::seconds(3)).unwrap());
        assert!(nav.next(&mut s, t0 + Duration::seconds(5)).unwrap());
        for extra in 6..10 {
            assert!(!nav.next(&mut s, t0 + Duration::seconds(extra)).unwrap());
        }

        assert_eq!(nav.current(), 1);
        assert_eq!(times(&s), vec![5.0, 0.0]);
        // The pending interval still belongs to question 2 and is flushed once.
        nav.flush(&mut s, t0 + Duration::seconds(12)).unwrap();
        assert_eq!(times(&s), vec![5.0, 7.0]);
    }

    #[test]
    fn same_index_and_out_of_range_are_noops() {
        let mut s = store(3);
        let t0 = fixed_now();
        let mut nav = Navigator::new(t0);

        assert!(!nav.move_to(&mut s, 0, t0 + Duration::seconds(2)).unwrap());
        assert!(!nav.move_to(&mut s, 7, t0 + Duration::seconds(2)).unwrap());
        assert_eq!(nav.question_started_at(), t0);
        assert_eq!(times(&s), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn reset_restarts_timing() {
        let mut s = store(2);
        let t0 = fixed_now();
        let mut nav = Navigator::new(t0);
        nav.next(&mut s, t0 + Duration::seconds(1)).unwrap();
        nav.reset(t0 + Duration::seconds(30));
        assert_eq!(nav.current(), 0);
        nav.flush(&mut s, t0 + Duration::seconds(32)).unwrap();
        assert_eq!(times(&s), vec![3.0, 0.0]);
    }
}
