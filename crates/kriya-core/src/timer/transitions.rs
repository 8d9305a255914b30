//! The legal transition table for the timer state machine.
//!
//! Every operation consults this table before mutating anything, so an
//! illegal request (pause while idle, start while running) is rejected
//! up front and leaves state untouched.

use serde::{Deserialize, Serialize};

/// Timer state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    /// Initial or reset state.
    Idle,
    /// Actively counting down.
    Running,
    /// Temporarily stopped, remaining time frozen.
    Paused,
}

/// Actions that drive status transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerAction {
    Start,
    Pause,
    Reset,
    CompletePhase,
    CompleteCycle,
}

/// (action, from, to) triples that the machine accepts.
///
/// RESET is additionally accepted from `Idle` when a finished cycle
/// needs clearing; see `TimerStateMachine::reset_timer`.
pub const VALID_TRANSITIONS: &[(TimerAction, TimerStatus, TimerStatus)] = &[
    (TimerAction::Start, TimerStatus::Idle, TimerStatus::Running),
    (TimerAction::Start, TimerStatus::Paused, TimerStatus::Running),
    (TimerAction::Pause, TimerStatus::Running, TimerStatus::Paused),
    (
        TimerAction::CompletePhase,
        TimerStatus::Running,
        TimerStatus::Running,
    ),
    (
        TimerAction::CompleteCycle,
        TimerStatus::Running,
        TimerStatus::Idle,
    ),
    (TimerAction::Reset, TimerStatus::Running, TimerStatus::Idle),
    (TimerAction::Reset, TimerStatus::Paused, TimerStatus::Idle),
];

/// Whether `action` may move the machine from `from` to `to`.
pub fn is_valid_transition(action: TimerAction, from: TimerStatus, to: TimerStatus) -> bool {
    VALID_TRANSITIONS
        .iter()
        .any(|&(a, f, t)| a == action && f == from && t == to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_documented_table() {
        assert!(is_valid_transition(
            TimerAction::Start,
            TimerStatus::Idle,
            TimerStatus::Running
        ));
        assert!(is_valid_transition(
            TimerAction::Start,
            TimerStatus::Paused,
            TimerStatus::Running
        ));
        assert!(is_valid_transition(
            TimerAction::Pause,
            TimerStatus::Running,
            TimerStatus::Paused
        ));
        assert!(is_valid_transition(
            TimerAction::CompletePhase,
            TimerStatus::Running,
            TimerStatus::Running
        ));
        assert!(is_valid_transition(
            TimerAction::CompleteCycle,
            TimerStatus::Running,
            TimerStatus::Idle
        ));
    }

    #[test]
    fn rejects_everything_else() {
        assert!(!is_valid_transition(
            TimerAction::Pause,
            TimerStatus::Idle,
            TimerStatus::Paused
        ));
        assert!(!is_valid_transition(
            TimerAction::Start,
            TimerStatus::Running,
            TimerStatus::Running
        ));
        assert!(!is_valid_transition(
            TimerAction::CompletePhase,
            TimerStatus::Paused,
            TimerStatus::Running
        ));
    }
}
