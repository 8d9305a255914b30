//! Wall-clock countdown scheduling.
//!
//! The scheduler owns no phase semantics. It captures a deadline when
//! armed and, on each poll, recomputes the remaining time against that
//! deadline -- the deadline, not an accumulated tick count, is the
//! source of truth, so a throttled or backgrounded host loop cannot
//! make the countdown drift.
//!
//! At most one schedule is live at a time: re-arming supersedes any
//! prior schedule, and a disarmed schedule never yields events again.

use std::cell::Cell;
use std::rc::Rc;

use uuid::Uuid;

/// Millisecond wall clock. Injectable so tests can drive time by hand.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Deterministic clock for tests and simulations. Clones share the
/// same underlying instant, so a test can keep one handle to advance
/// time while the scheduler reads another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Opaque token identifying one armed countdown instance. Events from
/// a superseded instance are never delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(Uuid);

impl TimerId {
    fn fresh() -> Self {
        TimerId(Uuid::new_v4())
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What a poll observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// Time still remains on the armed schedule.
    Tick { remaining_ms: u64 },
    /// The deadline passed. Delivered exactly once per schedule; the
    /// scheduler disarms itself before returning this.
    Completed,
}

/// Deadline-based countdown with supersession.
pub struct CountdownScheduler {
    clock: Box<dyn Clock>,
    deadline_ms: u64,
    active: Option<TimerId>,
}

impl CountdownScheduler {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            deadline_ms: 0,
            active: None,
        }
    }

    /// Arm a countdown for `duration_ms`, superseding any prior
    /// schedule. Returns the new instance token and the immediate
    /// first remaining value (equal to `duration_ms`).
    pub fn start(&mut self, duration_ms: u64) -> (TimerId, u64) {
        let id = TimerId::fresh();
        self.deadline_ms = self.clock.now_ms() + duration_ms;
        self.active = Some(id);
        (id, duration_ms)
    }

    /// Disarm without touching the caller-visible remaining time.
    /// Idempotent: safe to call when nothing is scheduled.
    pub fn pause(&mut self) {
        self.active = None;
    }

    /// Token of the live schedule, if any.
    pub fn active_id(&self) -> Option<TimerId> {
        self.active
    }

    /// Observe the armed schedule. Returns `None` when disarmed.
    pub fn poll(&mut self) -> Option<CountdownEvent> {
        self.active?;
        let remaining = self.deadline_ms.saturating_sub(self.clock.now_ms());
        if remaining == 0 {
            self.active = None;
            Some(CountdownEvent::Completed)
        } else {
            Some(CountdownEvent::Tick {
                remaining_ms: remaining,
            })
        }
    }
}

impl std::fmt::Debug for CountdownScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownScheduler")
            .field("deadline_ms", &self.deadline_ms)
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(clock: &ManualClock) -> CountdownScheduler {
        CountdownScheduler::new(Box::new(clock.clone()))
    }

    #[test]
    fn counts_down_against_deadline() {
        let clock = ManualClock::new(1_000);
        let mut sched = scheduler(&clock);

        let (_, first) = sched.start(5_000);
        assert_eq!(first, 5_000);

        clock.advance(1_000);
        assert_eq!(
            sched.poll(),
            Some(CountdownEvent::Tick { remaining_ms: 4_000 })
        );

        // A long stall (tab throttling) does not accumulate error:
        // remaining is recomputed from the captured deadline.
        clock.advance(3_500);
        assert_eq!(
            sched.poll(),
            Some(CountdownEvent::Tick { remaining_ms: 500 })
        );

        clock.advance(500);
        assert_eq!(sched.poll(), Some(CountdownEvent::Completed));
    }

    #[test]
    fn complete_fires_exactly_once() {
        let clock = ManualClock::new(0);
        let mut sched = scheduler(&clock);
        sched.start(1_000);
        clock.advance(2_000);
        assert_eq!(sched.poll(), Some(CountdownEvent::Completed));
        assert_eq!(sched.poll(), None);
        assert_eq!(sched.active_id(), None);
    }

    #[test]
    fn pause_is_idempotent_and_silences_polls() {
        let clock = ManualClock::new(0);
        let mut sched = scheduler(&clock);
        sched.start(1_000);
        sched.pause();
        sched.pause();
        clock.advance(5_000);
        // A cancelled schedule must not fire a stale completion.
        assert_eq!(sched.poll(), None);
    }

    #[test]
    fn restart_supersedes_prior_schedule() {
        let clock = ManualClock::new(0);
        let mut sched = scheduler(&clock);
        let (first_id, _) = sched.start(1_000);
        clock.advance(999);
        let (second_id, _) = sched.start(10_000);
        assert_ne!(first_id, second_id);
        assert_eq!(sched.active_id(), Some(second_id));

        // The old deadline passing is invisible to the new schedule.
        clock.advance(2);
        assert_eq!(
            sched.poll(),
            Some(CountdownEvent::Tick { remaining_ms: 9_998 })
        );
    }

    #[test]
    fn remaining_never_goes_negative() {
        let clock = ManualClock::new(0);
        let mut sched = scheduler(&clock);
        sched.start(100);
        clock.advance(u32::MAX as u64);
        assert_eq!(sched.poll(), Some(CountdownEvent::Completed));
    }
}
