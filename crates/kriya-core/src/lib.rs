//! # Kriya Core Library
//!
//! Core logic for Kriya, a Kirtan Kriya meditation timer: a fixed
//! five-phase chanting cycle (out-loud, whisper, mental, whisper,
//! out-loud) synchronized with a looping four-syllable mantra.
//!
//! ## Architecture
//!
//! - **Timer state machine**: phase sequencing and status transitions,
//!   driven by a wall-clock countdown scheduler. Pull-based: the host
//!   loop calls `tick()` periodically; the deadline, not the tick
//!   cadence, is the source of truth.
//! - **Audio sync policy**: subscribes to timer transitions and drives
//!   an [`AudioEngine`] implementation (transport, mute, per-phase
//!   loudness). Audio is best-effort; the timer never depends on it.
//! - **Settings store**: TOML-backed preferences with read-merge-write
//!   partial updates and defaults for absent or malformed files.
//!
//! ## Key Components
//!
//! - [`TimerStateMachine`]: the central state machine
//! - [`CountdownScheduler`]: deadline-based countdown with supersession
//! - [`AudioSyncPolicy`]: timer-to-audio coupling
//! - [`TomlSettingsStore`]: persisted user preferences

pub mod audio;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use audio::{AudioEngine, AudioSyncPolicy, EngineLifecycle, NullAudioEngine, Pitch, SoundState};
pub use error::AudioError;
pub use events::{TimerEvent, TimerSnapshot};
pub use storage::{
    MemorySettingsStore, SettingsStore, SoundSettings, SoundSettingsUpdate, Theme,
    TomlSettingsStore,
};
pub use timer::{
    generate_phases, CountdownScheduler, IntervalMultiplier, Phase, TimerStateMachine, TimerStatus,
    PHASE_COUNT,
};
