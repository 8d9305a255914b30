use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::timer::{IntervalMultiplier, TimerId, TimerStatus};

/// Every committed state transition produces an Event. Subscribers
/// receive each event synchronously, at most once, in commit order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum TimerEvent {
    Started {
        phase_index: usize,
        #[serde(skip)]
        timer_id: TimerId,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// One second of countdown elapsed (or the immediate tick on arm).
    Ticked {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    Paused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    Reset {
        at: DateTime<Utc>,
    },
    /// A phase's countdown reached zero.
    PhaseCompleted {
        phase_index: usize,
        at: DateTime<Utc>,
    },
    /// The machine advanced to the next phase of a running cycle.
    PhaseAdvanced {
        phase_index: usize,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// The user jumped directly to a phase.
    PhaseSelected {
        phase_index: usize,
        at: DateTime<Utc>,
    },
    MultiplierChanged {
        multiplier: IntervalMultiplier,
        at: DateTime<Utc>,
    },
    /// The last phase finished; the cycle stops at Idle.
    MeditationCompleted {
        at: DateTime<Utc>,
    },
}

/// Point-in-time view of the machine, delivered alongside each event
/// and available on demand via `TimerStateMachine::snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub current_phase_index: usize,
    pub time_remaining_ms: u64,
    pub meditation_completed: bool,
    pub multiplier: IntervalMultiplier,
    pub phases: Vec<crate::timer::Phase>,
}

impl TimerSnapshot {
    pub fn current_phase(&self) -> &crate::timer::Phase {
        &self.phases[self.current_phase_index]
    }
}
