//! The audio engine collaboration contract.
//!
//! The core never synthesizes sound itself; it drives an engine
//! implementation through this trait. The real engine lives in the
//! binary crate, gated behind a fallible startup handshake (browser
//! hosts gate it behind a user gesture, native hosts behind device
//! acquisition). [`NullAudioEngine`] stands in whenever no device is
//! available -- the timer never depends on audio working.

use serde::{Deserialize, Serialize};

use crate::error::AudioError;

/// The four syllables of the Kirtan Kriya mantra, cycled continuously
/// while the transport runs. The cycle is independent of, and much
/// faster than, a single phase's duration.
pub const MANTRA_SYLLABLES: [&str; 4] = ["Sa", "Ta", "Na", "Ma"];

/// Default per-syllable pitches.
pub const DEFAULT_PITCHES: [&str; 4] = ["A3", "G3", "F3", "G3"];

/// Lower bound of the engine's loudness range; 0 dB is the top.
pub const MIN_DB: f64 = -48.0;

/// Linear map from a 0-100 loudness percentage into `[MIN_DB, 0]` dB,
/// floored to a whole decibel. Takes the percentage fractionally so a
/// scaled value like 52.2% flattens only once, at the dB step.
pub fn volume_to_db(percent: f64) -> f32 {
    (percent.clamp(0.0, 100.0) * (-MIN_DB) / 100.0 + MIN_DB).floor() as f32
}

/// A pitch in scientific notation, e.g. `A3` or `F#4`.
///
/// Validated on construction, so every held `Pitch` has a frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch(String);

impl Pitch {
    pub fn parse(s: &str) -> Result<Self, AudioError> {
        note_to_midi(s)?;
        Ok(Pitch(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Frequency in Hz (equal temperament, A4 = 440 Hz).
    pub fn frequency_hz(&self) -> f32 {
        // Validated at construction, so this cannot fail.
        let midi = note_to_midi(&self.0).unwrap_or(69);
        440.0 * 2f32.powf((f32::from(midi) - 69.0) / 12.0)
    }
}

impl std::fmt::Display for Pitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Pitch {
    type Error = AudioError;

    fn try_from(s: String) -> Result<Self, AudioError> {
        Pitch::parse(&s)
    }
}

impl From<Pitch> for String {
    fn from(p: Pitch) -> String {
        p.0
    }
}

fn note_to_midi(s: &str) -> Result<u8, AudioError> {
    let invalid = || AudioError::InvalidPitch(s.to_string());
    let mut chars = s.chars();
    let letter = chars.next().ok_or_else(invalid)?;
    let base: i16 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(invalid()),
    };
    let rest: String = chars.collect();
    let (accidental, octave_str) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest.as_str()),
    };
    let octave: i16 = octave_str.parse().map_err(|_| invalid())?;
    if !(0..=8).contains(&octave) {
        return Err(invalid());
    }
    let midi = (octave + 1) * 12 + base + accidental;
    u8::try_from(midi).map_err(|_| invalid())
}

/// Default pitch set as typed values.
pub fn default_pitches() -> [Pitch; 4] {
    DEFAULT_PITCHES.map(|s| Pitch::parse(s).expect("default pitches are valid"))
}

/// Two-phase engine lifecycle. `Ready` is only reachable through
/// [`AudioEngine::initialize`], which may fail and may be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineLifecycle {
    Uninitialized,
    Initializing,
    Ready,
}

/// Contract the core drives. Implementations no-op on transport and
/// volume calls before `initialize` succeeds; engine absence is a
/// normal transient state, not an error.
pub trait AudioEngine {
    /// One-shot startup handshake. Failure propagates so the caller
    /// can retry; success is required before any sound is produced.
    fn initialize(&mut self) -> Result<(), AudioError>;

    fn lifecycle(&self) -> EngineLifecycle;

    fn is_ready(&self) -> bool {
        self.lifecycle() == EngineLifecycle::Ready
    }

    /// Run the transport (the master clock driving the mantra loop).
    fn start(&mut self);

    /// Pause the transport without losing the loop position.
    fn pause(&mut self);

    /// Set loudness in dB. `f32::NEG_INFINITY` silences the engine.
    fn set_volume_db(&mut self, db: f32);

    /// Update tempo live, without interrupting the mantra sequence.
    fn set_bpm(&mut self, bpm: u16);

    /// Replace the four per-syllable pitches. The loop position is
    /// preserved so a pitch edit does not restart the sequence.
    fn update_pitches(&mut self, pitches: [Pitch; 4]);

    /// Play the phase-boundary notification chime.
    fn play_notification(&mut self);

    /// Drain one pending note advance (syllable index 0-3), if the
    /// engine's internal loop moved since the last call.
    fn poll_note_advance(&mut self) -> Option<usize>;
}

/// Engine that produces no sound. Used when the audio device is
/// unavailable and as the policy test double's base case.
#[derive(Debug, Default)]
pub struct NullAudioEngine {
    lifecycle: EngineLifecycle,
}

impl Default for EngineLifecycle {
    fn default() -> Self {
        EngineLifecycle::Uninitialized
    }
}

impl AudioEngine for NullAudioEngine {
    fn initialize(&mut self) -> Result<(), AudioError> {
        self.lifecycle = EngineLifecycle::Ready;
        Ok(())
    }

    fn lifecycle(&self) -> EngineLifecycle {
        self.lifecycle
    }

    fn start(&mut self) {}
    fn pause(&mut self) {}
    fn set_volume_db(&mut self, _db: f32) {}
    fn set_bpm(&mut self, _bpm: u16) {}
    fn update_pitches(&mut self, _pitches: [Pitch; 4]) {}
    fn play_notification(&mut self) {}

    fn poll_note_advance(&mut self) -> Option<usize> {
        None
    }
}
