//! Section countdown.
//!
//! The clock is pure state: something else decides when a second has
//! passed and calls [`SessionClock::tick`]. Expiry is reported exactly once
//! per [`SessionClock::start`]; every further tick is a no-op.

use serde::{Deserialize, Serialize};

/// How long a section may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SectionTimer {
    Countdown { seconds: u64 },
    /// Legacy configurations without a duration never expire.
    Untimed,
}

impl SectionTimer {
    pub fn seconds(&self) -> Option<u64> {
        match self {
            SectionTimer::Countdown { seconds } => Some(*seconds),
            SectionTimer::Untimed => None,
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// Still counting; `remaining` is `None` for untimed sections.
    Running { remaining: Option<u64> },
    /// This tick reached zero. Reported once per start.
    Expired,
    /// The clock is stopped or already expired.
    Idle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ClockState {
    #[default]
    Stopped,
    Running,
    Expired,
}

/// One-second-cadence countdown for the active section.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    remaining: Option<u64>,
    state: ClockState,
    generation: u64,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the timer's full duration and start running.
    ///
    /// A countdown of zero seconds is expired from the start and never
    /// ticks. Returns the new generation; ticks scheduled for an older
    /// generation belong to a clock that no longer exists.
    pub fn start(&mut self, timer: SectionTimer) -> u64 {
        self.generation += 1;
        self.remaining = timer.seconds();
        self.state = if self.remaining == Some(0) {
            ClockState::Expired
        } else {
            ClockState::Running
        };
        self.generation
    }

    /// Decrement by one second, floored at zero.
    pub fn tick(&mut self) -> ClockTick {
        if self.state != ClockState::Running {
            return ClockTick::Idle;
        }
        let Some(remaining) = self.remaining else {
            return ClockTick::Running { remaining: None };
        };
        let remaining = remaining.saturating_sub(1);
        self.remaining = Some(remaining);
        if remaining == 0 {
            self.state = ClockState::Expired;
            ClockTick::Expired
        } else {
            ClockTick::Running {
                remaining: Some(remaining),
            }
        }
    }

    /// Stop ticking. An expired clock stays expired.
    pub fn stop(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Stopped;
        }
    }

    pub fn remaining(&self) -> Option<u64> {
        self.remaining
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn is_expired(&self) -> bool {
        self.state == ClockState::Expired
    }
}
