mod countdown;
mod machine;
mod phase;
mod transitions;

pub use countdown::{Clock, CountdownEvent, CountdownScheduler, ManualClock, SystemClock, TimerId};
pub use machine::{SubscriberId, TimerStateMachine};
pub use phase::{generate_phases, IntervalMultiplier, Phase, PHASE_COUNT};
pub use transitions::{is_valid_transition, TimerAction, TimerStatus, VALID_TRANSITIONS};
