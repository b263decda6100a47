//! Real-time driver for a [`TestSession`].
//!
//! A [`Ticker`] is a background task that emits one [`TickEvent`] per
//! period, stamped with the clock generation it was started for. The
//! [`LiveSession`] applies only events whose generation matches the
//! session's current clock, so a tick that was already in flight when a
//! section was submitted can never decrement the next section's countdown.
//! At most one ticker is alive per live session at any time.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::SessionError;
use crate::model::{AttemptStatus, TestConfiguration};
use crate::session::{SubmitOutcome, TestSession, TickOutcome};

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One second (or one period) has elapsed for clock `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub generation: u64,
}

/// Background interval task bound to one clock generation.
///
/// Dropping the ticker cancels the task.
pub struct Ticker {
    generation: u64,
    stop_signal: Arc<AtomicBool>,
    live: Arc<AtomicUsize>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn a ticker on the current tokio runtime.
    pub fn spawn(
        generation: u64,
        period: Duration,
        tx: mpsc::UnboundedSender<TickEvent>,
        live: Arc<AtomicUsize>,
    ) -> Self {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop = stop_signal.clone();
        let first = tokio::time::Instant::now() + period;

        live.fetch_add(1, Ordering::SeqCst);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(first, period);
            loop {
                interval.tick().await;
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                if tx.send(TickEvent { generation }).is_err() {
                    break;
                }
            }
        });
        tracing::debug!(generation, "ticker started");

        Self {
            generation,
            stop_signal,
            live,
            handle: Some(handle),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the task. Calling it more than once is harmless.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop_signal.store(true, Ordering::Relaxed);
            handle.abort();
            self.live.fetch_sub(1, Ordering::SeqCst);
            tracing::debug!(generation = self.generation, "ticker cancelled");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A [`TestSession`] driven by a real-time ticker.
pub struct LiveSession {
    session: TestSession,
    ticker: Option<Ticker>,
    tx: mpsc::UnboundedSender<TickEvent>,
    rx: mpsc::UnboundedReceiver<TickEvent>,
    period: Duration,
    live: Arc<AtomicUsize>,
}

impl LiveSession {
    /// Start ticking once per second. Must be called inside a tokio runtime.
    pub fn start(session: TestSession) -> Self {
        Self::with_period(session, TICK_PERIOD)
    }

    pub fn with_period(session: TestSession, period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut live = Self {
            session,
            ticker: None,
            tx,
            rx,
            period,
            live: Arc::new(AtomicUsize::new(0)),
        };
        live.rearm();
        live
    }

    pub fn session(&self) -> &TestSession {
        &self.session
    }

    /// Number of ticker tasks currently alive (0 or 1).
    pub fn active_tickers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Shared handle to the live-ticker count, for observing it after the
    /// session is gone.
    pub fn ticker_counter(&self) -> Arc<AtomicUsize> {
        self.live.clone()
    }

    /// Wait for the next tick that belongs to the running clock and apply it.
    ///
    /// Returns `Ok(None)` when nothing is ticking any more.
    pub async fn next_tick(&mut self) -> Result<Option<TickOutcome>, SessionError> {
        loop {
            if self.ticker.is_none() {
                return Ok(None);
            }
            let Some(event) = self.rx.recv().await else {
                return Ok(None);
            };
            let current = self.session.clock_generation();
            if event.generation != current {
                tracing::warn!(
                    stale = event.generation,
                    current,
                    "dropping tick from a previous section clock"
                );
                continue;
            }

            let outcome = self.session.tick()?;
            if matches!(outcome, TickOutcome::Submitted(_)) {
                self.rearm();
            }
            return Ok(Some(outcome));
        }
    }

    /// Run until the test finishes on its own, answering nothing.
    pub async fn run_to_completion(&mut self) -> Result<(), SessionError> {
        while self.next_tick().await?.is_some() {}
        Ok(())
    }

    pub fn answer(&mut self, value: impl Into<String>) -> Result<(), SessionError> {
        self.session.answer(value)
    }

    pub fn clear_answer(&mut self) -> Result<(), SessionError> {
        self.session.clear_answer()
    }

    pub fn toggle_review(&mut self) -> Result<AttemptStatus, SessionError> {
        self.session.toggle_review()
    }

    pub fn next(&mut self) -> Result<bool, SessionError> {
        self.session.next()
    }

    pub fn previous(&mut self) -> Result<bool, SessionError> {
        self.session.previous()
    }

    pub fn go_to(&mut self, index: usize) -> Result<bool, SessionError> {
        self.session.go_to(index)
    }

    pub fn submit_section(&mut self) -> Result<SubmitOutcome, SessionError> {
        let outcome = self.session.submit_section()?;
        if outcome != SubmitOutcome::Ignored {
            self.rearm();
        }
        Ok(outcome)
    }

    pub fn submit_test(&mut self) -> Result<SubmitOutcome, SessionError> {
        let outcome = self.session.submit_test()?;
        if outcome != SubmitOutcome::Ignored {
            self.rearm();
        }
        Ok(outcome)
    }

    /// Stop ticking and hand back a resumable snapshot.
    pub fn abandon(mut self) -> TestConfiguration {
        self.ticker = None;
        tracing::info!(
            section = self.session.current_section_index(),
            "session abandoned"
        );
        self.session.snapshot()
    }

    /// Stop ticking and hand back the session.
    pub fn into_session(self) -> TestSession {
        let Self {
            session, ticker, ..
        } = self;
        drop(ticker);
        session
    }

    /// Cancel the current ticker and start one for the running clock, if any.
    fn rearm(&mut self) {
        self.ticker = None;
        if self.session.is_finished() || !self.session.is_clock_running() {
            return;
        }
        self.ticker = Some(Ticker::spawn(
            self.session.clock_generation(),
            self.period,
            self.tx.clone(),
            self.live.clone(),
        ));
    }
}
