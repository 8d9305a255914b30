//! Timer state machine implementation.
//!
//! The machine is wall-clock-based and pull-driven: it does not own a
//! thread. The host loop calls `tick()` about once per second; the
//! countdown scheduler recomputes the remaining time against its
//! captured deadline, so tick cadence only affects display freshness,
//! never correctness.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running
//!              \-> Idle (reset, or last phase exhausted)
//! ```
//!
//! Illegal transition requests are no-ops that leave state unchanged.
//! The machine is driven by trusted internal callbacks and
//! user-triggered UI events only, so robustness beats strict error
//! signaling here.

use chrono::Utc;

use super::countdown::{CountdownEvent, CountdownScheduler, SystemClock, TimerId};
use super::phase::{generate_phases, IntervalMultiplier, Phase};
use super::transitions::{is_valid_transition, TimerAction, TimerStatus};
use crate::events::{TimerEvent, TimerSnapshot};
use crate::storage::SettingsStore;
use crate::timer::Clock;

/// Handle returned by [`TimerStateMachine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

type Subscriber = Box<dyn FnMut(&TimerEvent, &TimerSnapshot)>;

/// The meditation timer core.
///
/// Owns the phase sequence, the countdown scheduler and the observer
/// list. Mutated exclusively through its operations; collaborators
/// (settings store, audio policy) are injected or subscribed by the
/// composition root.
pub struct TimerStateMachine {
    phases: Vec<Phase>,
    current_phase_index: usize,
    status: TimerStatus,
    time_remaining_ms: u64,
    multiplier: IntervalMultiplier,
    meditation_completed: bool,
    countdown: CountdownScheduler,
    active_timer_id: Option<TimerId>,
    settings: Box<dyn SettingsStore>,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber: u64,
}

impl TimerStateMachine {
    /// Create a machine seeded from persisted settings, on the system
    /// clock. Starts `Idle` at the persisted phase (clamped to range),
    /// with phases before it already marked completed.
    pub fn new(settings: Box<dyn SettingsStore>) -> Self {
        Self::with_clock(settings, Box::new(SystemClock))
    }

    /// Like [`new`](Self::new) but on an injected clock.
    pub fn with_clock(settings: Box<dyn SettingsStore>, clock: Box<dyn Clock>) -> Self {
        let multiplier = settings.interval_multiplier();
        let mut phases = generate_phases(multiplier);
        let index = settings.current_phase_index().min(phases.len() - 1);
        for (i, phase) in phases.iter_mut().enumerate() {
            phase.completed = i < index;
        }
        let time_remaining_ms = phases[index].duration_ms();
        Self {
            phases,
            current_phase_index: index,
            status: TimerStatus::Idle,
            time_remaining_ms,
            multiplier,
            meditation_completed: false,
            countdown: CountdownScheduler::new(clock),
            active_timer_id: None,
            settings,
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn current_phase_index(&self) -> usize {
        self.current_phase_index
    }

    pub fn current_phase(&self) -> &Phase {
        &self.phases[self.current_phase_index]
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn time_remaining_ms(&self) -> u64 {
        self.time_remaining_ms
    }

    pub fn multiplier(&self) -> IntervalMultiplier {
        self.multiplier
    }

    pub fn meditation_completed(&self) -> bool {
        self.meditation_completed
    }

    pub fn active_timer_id(&self) -> Option<TimerId> {
        self.active_timer_id
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    /// Build a full state snapshot.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            status: self.status,
            current_phase_index: self.current_phase_index,
            time_remaining_ms: self.time_remaining_ms,
            meditation_completed: self.meditation_completed,
            multiplier: self.multiplier,
            phases: self.phases.clone(),
        }
    }

    // ── Observers ────────────────────────────────────────────────────

    /// Register a callback invoked synchronously after each committed
    /// transition, with the event and the post-transition snapshot.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&TimerEvent, &TimerSnapshot) + 'static,
    ) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm the countdown with the current remaining time and run.
    /// No-op if already running. Starting a finished cycle rewinds to
    /// phase 1 first.
    pub fn start_timer(&mut self) -> Option<TimerEvent> {
        if self.status == TimerStatus::Running {
            tracing::debug!("start ignored: already running");
            return None;
        }
        if self.meditation_completed {
            self.rewind();
        }
        if !is_valid_transition(TimerAction::Start, self.status, TimerStatus::Running) {
            return None;
        }
        let (timer_id, remaining_ms) = self.countdown.start(self.time_remaining_ms);
        self.active_timer_id = Some(timer_id);
        self.status = TimerStatus::Running;
        let event = self.commit(TimerEvent::Started {
            phase_index: self.current_phase_index,
            timer_id,
            remaining_ms,
            at: Utc::now(),
        });
        // The scheduler delivers its first tick immediately on arm.
        self.commit(TimerEvent::Ticked {
            remaining_ms,
            at: Utc::now(),
        });
        Some(event)
    }

    /// Freeze the countdown at the last ticked value. No-op unless
    /// running.
    pub fn pause_timer(&mut self) -> Option<TimerEvent> {
        if !is_valid_transition(TimerAction::Pause, self.status, TimerStatus::Paused) {
            tracing::debug!(status = ?self.status, "pause ignored");
            return None;
        }
        self.countdown.pause();
        self.active_timer_id = None;
        self.status = TimerStatus::Paused;
        Some(self.commit(TimerEvent::Paused {
            remaining_ms: self.time_remaining_ms,
            at: Utc::now(),
        }))
    }

    /// Return to phase 1 with all completion state cleared, and
    /// persist the rewound position. No-op when there is nothing to
    /// clear.
    pub fn reset_timer(&mut self) -> Option<TimerEvent> {
        let legal = is_valid_transition(TimerAction::Reset, self.status, TimerStatus::Idle);
        // RESET from Idle is accepted when a finished (or partially
        // selected-through) cycle needs clearing.
        if !legal && !self.is_dirty() {
            tracing::debug!("reset ignored: already pristine");
            return None;
        }
        self.countdown.pause();
        self.active_timer_id = None;
        self.rewind();
        self.status = TimerStatus::Idle;
        self.settings.set_current_phase_index(0);
        Some(self.commit(TimerEvent::Reset { at: Utc::now() }))
    }

    /// Jump directly to a phase: earlier phases become completed,
    /// later ones pending, and the phase starts from its full
    /// duration. Keeps running if running; otherwise lands on Idle.
    /// Out-of-range indices are ignored.
    pub fn select_phase(&mut self, index: usize) -> Option<TimerEvent> {
        if index >= self.phases.len() {
            tracing::debug!(index, "select ignored: out of range");
            return None;
        }
        self.current_phase_index = index;
        for (i, phase) in self.phases.iter_mut().enumerate() {
            phase.completed = i < index;
        }
        self.time_remaining_ms = self.phases[index].duration_ms();
        self.meditation_completed = false;
        if self.status == TimerStatus::Running {
            let (timer_id, _) = self.countdown.start(self.time_remaining_ms);
            self.active_timer_id = Some(timer_id);
        } else {
            // A frozen remainder is meaningless for a fresh phase, so
            // Paused collapses to Idle here.
            self.countdown.pause();
            self.active_timer_id = None;
            self.status = TimerStatus::Idle;
        }
        self.settings.set_current_phase_index(index);
        Some(self.commit(TimerEvent::PhaseSelected {
            phase_index: index,
            at: Utc::now(),
        }))
    }

    /// Rescale all phase durations, preserving completion flags.
    ///
    /// The remaining time is reset to the active phase's full new
    /// duration only while `Idle`; an in-flight countdown (running or
    /// paused) is never silently truncated.
    pub fn set_multiplier(&mut self, multiplier: IntervalMultiplier) -> Option<TimerEvent> {
        if multiplier == self.multiplier {
            return None;
        }
        self.multiplier = multiplier;
        let mut phases = generate_phases(multiplier);
        for (fresh, old) in phases.iter_mut().zip(self.phases.iter()) {
            fresh.completed = old.completed;
        }
        self.phases = phases;
        if self.status == TimerStatus::Idle && !self.meditation_completed {
            self.time_remaining_ms = self.phases[self.current_phase_index].duration_ms();
        }
        self.settings.set_interval_multiplier(multiplier);
        Some(self.commit(TimerEvent::MultiplierChanged {
            multiplier,
            at: Utc::now(),
        }))
    }

    /// Advance the countdown. Call about once per second while
    /// running. Returns the committed event, `None` when idle, paused
    /// or between deadline boundaries.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if self.status != TimerStatus::Running {
            // A cancelled schedule never fires; the extra guard keeps
            // stale polls harmless.
            return None;
        }
        match self.countdown.poll()? {
            CountdownEvent::Tick { remaining_ms } => {
                self.time_remaining_ms = remaining_ms;
                Some(self.commit(TimerEvent::Ticked {
                    remaining_ms,
                    at: Utc::now(),
                }))
            }
            CountdownEvent::Completed => {
                self.time_remaining_ms = 0;
                self.commit(TimerEvent::Ticked {
                    remaining_ms: 0,
                    at: Utc::now(),
                });
                self.complete_current_phase()
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Phase-completion side effects happen atomically within this one
    /// handler: marking completed, advancing, rearming.
    fn complete_current_phase(&mut self) -> Option<TimerEvent> {
        let index = self.current_phase_index;
        let last = index + 1 == self.phases.len();
        let (action, target) = if last {
            (TimerAction::CompleteCycle, TimerStatus::Idle)
        } else {
            (TimerAction::CompletePhase, TimerStatus::Running)
        };
        if !is_valid_transition(action, self.status, target) {
            tracing::debug!(status = ?self.status, "completion ignored");
            return None;
        }
        self.phases[index].completed = true;
        self.commit(TimerEvent::PhaseCompleted {
            phase_index: index,
            at: Utc::now(),
        });
        if last {
            // The cycle stops fully: no auto-loop back to phase 1.
            self.meditation_completed = true;
            self.status = TimerStatus::Idle;
            self.active_timer_id = None;
            self.time_remaining_ms = 0;
            Some(self.commit(TimerEvent::MeditationCompleted { at: Utc::now() }))
        } else {
            self.current_phase_index = index + 1;
            let duration_ms = self.phases[self.current_phase_index].duration_ms();
            self.time_remaining_ms = duration_ms;
            let (timer_id, _) = self.countdown.start(duration_ms);
            self.active_timer_id = Some(timer_id);
            self.settings.set_current_phase_index(self.current_phase_index);
            Some(self.commit(TimerEvent::PhaseAdvanced {
                phase_index: self.current_phase_index,
                duration_ms,
                at: Utc::now(),
            }))
        }
    }

    fn rewind(&mut self) {
        for phase in self.phases.iter_mut() {
            phase.completed = false;
        }
        self.current_phase_index = 0;
        self.time_remaining_ms = self.phases[0].duration_ms();
        self.meditation_completed = false;
    }

    fn is_dirty(&self) -> bool {
        self.meditation_completed
            || self.current_phase_index != 0
            || self.phases.iter().any(|p| p.completed)
            || self.time_remaining_ms != self.phases[0].duration_ms()
    }

    fn commit(&mut self, event: TimerEvent) -> TimerEvent {
        tracing::debug!(event = ?event, "transition committed");
        let snapshot = self.snapshot();
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&event, &snapshot);
        }
        event
    }
}

impl std::fmt::Debug for TimerStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerStateMachine")
            .field("status", &self.status)
            .field("current_phase_index", &self.current_phase_index)
            .field("time_remaining_ms", &self.time_remaining_ms)
            .field("multiplier", &self.multiplier)
            .field("meditation_completed", &self.meditation_completed)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
