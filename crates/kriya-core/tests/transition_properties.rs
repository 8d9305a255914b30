//! Property tests over the transition table and the countdown.

use proptest::prelude::*;

use kriya_core::storage::MemorySettingsStore;
use kriya_core::timer::{CountdownEvent, CountdownScheduler, ManualClock};
use kriya_core::{IntervalMultiplier, TimerStateMachine, TimerStatus};

#[derive(Debug, Clone, Copy)]
enum Op {
    Start,
    Pause,
    Reset,
    Select(usize),
    Multiplier(IntervalMultiplier),
    Advance(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Start),
        Just(Op::Pause),
        Just(Op::Reset),
        (0usize..8).prop_map(Op::Select),
        prop_oneof![
            Just(IntervalMultiplier::Quarter),
            Just(IntervalMultiplier::Half),
            Just(IntervalMultiplier::ThreeQuarters),
            Just(IntervalMultiplier::Full),
        ]
        .prop_map(Op::Multiplier),
        (0u64..400_000).prop_map(Op::Advance),
    ]
}

proptest! {
    /// Any operation sequence keeps the machine inside its invariants:
    /// index in range, completed flags monotone below the index after
    /// selection, scheduler armed exactly while running.
    #[test]
    fn machine_invariants_hold_under_arbitrary_ops(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let clock = ManualClock::new(0);
        let mut machine = TimerStateMachine::with_clock(
            Box::new(MemorySettingsStore::default()),
            Box::new(clock.clone()),
        );

        for op in ops {
            match op {
                Op::Start => { machine.start_timer(); }
                Op::Pause => { machine.pause_timer(); }
                Op::Reset => { machine.reset_timer(); }
                Op::Select(i) => { machine.select_phase(i); }
                Op::Multiplier(m) => { machine.set_multiplier(m); }
                Op::Advance(ms) => {
                    clock.advance(ms);
                    machine.tick();
                }
            }

            let snapshot = machine.snapshot();
            prop_assert!(snapshot.current_phase_index < snapshot.phases.len());
            prop_assert_eq!(snapshot.phases.len(), 5);
            prop_assert_eq!(
                machine.active_timer_id().is_some(),
                snapshot.status == TimerStatus::Running
            );
            if snapshot.meditation_completed {
                prop_assert_eq!(snapshot.status, TimerStatus::Idle);
            }
        }
    }

    /// Illegal requests are exact no-ops: pausing anything that is not
    /// running, or selecting out of range, leaves the snapshot equal.
    #[test]
    fn illegal_requests_are_exact_noops(
        setup in prop::collection::vec(op_strategy(), 0..20),
        bad_index in 5usize..100,
    ) {
        let clock = ManualClock::new(0);
        let mut machine = TimerStateMachine::with_clock(
            Box::new(MemorySettingsStore::default()),
            Box::new(clock.clone()),
        );
        for op in setup {
            match op {
                Op::Start => { machine.start_timer(); }
                Op::Pause => { machine.pause_timer(); }
                Op::Reset => { machine.reset_timer(); }
                Op::Select(i) => { machine.select_phase(i); }
                Op::Multiplier(m) => { machine.set_multiplier(m); }
                Op::Advance(ms) => {
                    clock.advance(ms);
                    machine.tick();
                }
            }
        }

        let before = machine.snapshot();
        prop_assert!(machine.select_phase(bad_index).is_none());
        prop_assert_eq!(machine.snapshot(), before.clone());

        if before.status != TimerStatus::Running {
            prop_assert!(machine.pause_timer().is_none());
            prop_assert_eq!(machine.snapshot(), before.clone());
        }
        if before.status == TimerStatus::Running {
            prop_assert!(machine.start_timer().is_none());
            prop_assert_eq!(machine.snapshot(), before);
        }
    }

    /// Deadline monotonicity: successive polls report non-increasing
    /// remaining time and completion fires exactly once, at zero.
    #[test]
    fn countdown_remaining_is_monotone(
        duration in 1u64..600_000,
        steps in prop::collection::vec(1u64..5_000, 1..300),
    ) {
        let clock = ManualClock::new(0);
        let mut sched = CountdownScheduler::new(Box::new(clock.clone()));
        let (_, mut prev) = sched.start(duration);
        let mut completions = 0;

        for step in steps {
            clock.advance(step);
            match sched.poll() {
                Some(CountdownEvent::Tick { remaining_ms }) => {
                    prop_assert!(remaining_ms <= prev);
                    prop_assert!(remaining_ms > 0);
                    prev = remaining_ms;
                }
                Some(CountdownEvent::Completed) => {
                    completions += 1;
                }
                None => {
                    // Only after completion disarms the schedule.
                    prop_assert_eq!(completions, 1);
                }
            }
        }
        prop_assert!(completions <= 1);
    }
}
