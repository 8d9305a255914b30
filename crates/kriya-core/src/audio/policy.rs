//! Keeps the audio engine consistent with timer state and user sound
//! preferences.
//!
//! The policy owns the engine exclusively; the timer state machine
//! never touches audio. It is wired up as a machine subscriber by the
//! composition root and recomputes the engine's transport and
//! loudness after every committed transition:
//!
//! - the transport runs if and only if the timer is running
//! - loudness is silent when muted or not running, otherwise the
//!   master volume scaled by the current phase's loudness level
//! - phase boundaries trigger the notification chime
//!
//! Engine absence (before the startup handshake succeeds) is a normal
//! transient state; every path no-ops defensively until then.

use crate::error::AudioError;
use crate::events::{TimerEvent, TimerSnapshot};
use crate::storage::{SettingsStore, SoundSettingsUpdate};
use crate::timer::TimerStatus;

use super::engine::{volume_to_db, AudioEngine, EngineLifecycle, Pitch, MANTRA_SYLLABLES};

/// The audio-facing projection of timer state plus the independently
/// user-settable sound preferences. Not authoritative over phase
/// sequencing.
#[derive(Debug, Clone)]
pub struct SoundState {
    /// Master volume, 0-100.
    pub master_volume: u8,
    pub is_muted: bool,
    /// Mantra tempo in BPM.
    pub mantra_pace: u16,
    pub mantra_pitches: [Pitch; 4],
    pub mantra_key: String,
    /// Index of the syllable currently being voiced (0-3).
    pub current_syllable: usize,
    /// Loudness level of the active phase, mirrored from timer state.
    pub phase_volume_level: u8,
    pub timer_running: bool,
}

type SyllableCallback = Box<dyn FnMut(usize, &'static str)>;

/// Drives an [`AudioEngine`] from timer transitions and user edits.
pub struct AudioSyncPolicy {
    engine: Box<dyn AudioEngine>,
    settings: Box<dyn SettingsStore>,
    sound: SoundState,
    syllable_callbacks: Vec<SyllableCallback>,
}

impl AudioSyncPolicy {
    /// Build the policy over an engine, seeding preferences from the
    /// settings store. The engine stays uninitialized until
    /// [`initialize_audio`](Self::initialize_audio).
    pub fn new(engine: Box<dyn AudioEngine>, settings: Box<dyn SettingsStore>) -> Self {
        let stored = settings.sound_settings();
        Self {
            engine,
            settings,
            sound: SoundState {
                master_volume: stored.volume,
                is_muted: stored.is_muted,
                mantra_pace: stored.mantra_pace,
                mantra_pitches: stored.mantra_pitches,
                mantra_key: stored.mantra_key,
                current_syllable: 0,
                phase_volume_level: 0,
                timer_running: false,
            },
            syllable_callbacks: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn sound_state(&self) -> &SoundState {
        &self.sound
    }

    pub fn engine_lifecycle(&self) -> EngineLifecycle {
        self.engine.lifecycle()
    }

    /// The syllable currently being voiced.
    pub fn current_syllable(&self) -> &'static str {
        MANTRA_SYLLABLES[self.sound.current_syllable % MANTRA_SYLLABLES.len()]
    }

    /// Loudness the engine should be at right now, in dB.
    /// `NEG_INFINITY` while muted or not running.
    pub fn effective_volume_db(&self) -> f32 {
        if self.sound.is_muted || !self.sound.timer_running {
            return f32::NEG_INFINITY;
        }
        let scaled = f64::from(self.sound.master_volume)
            * f64::from(self.sound.phase_volume_level)
            / 100.0;
        volume_to_db(scaled)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run the one-shot engine startup handshake and push the current
    /// preferences into it. Failure propagates so the caller can retry
    /// on the next user gesture; the timer keeps working either way.
    pub fn initialize_audio(&mut self) -> Result<(), AudioError> {
        self.engine.initialize()?;
        self.engine.set_bpm(self.sound.mantra_pace);
        self.engine.update_pitches(self.sound.mantra_pitches.clone());
        self.sync_engine();
        tracing::debug!("audio engine ready");
        Ok(())
    }

    // ── Timer observation ────────────────────────────────────────────

    /// Machine subscriber entry point: mirror the new timer state and
    /// recompute the engine's transport and loudness.
    pub fn observe(&mut self, event: &TimerEvent, snapshot: &TimerSnapshot) {
        self.sound.timer_running = snapshot.status == TimerStatus::Running;
        self.sound.phase_volume_level = snapshot.current_phase().volume_level;
        if matches!(
            event,
            TimerEvent::PhaseCompleted { .. } | TimerEvent::MeditationCompleted { .. }
        ) && !self.sound.is_muted
        {
            self.engine.play_notification();
        }
        self.sync_engine();
    }

    /// One-time adoption of the machine's state at wiring time.
    pub fn adopt(&mut self, snapshot: &TimerSnapshot) {
        self.sound.timer_running = snapshot.status == TimerStatus::Running;
        self.sound.phase_volume_level = snapshot.current_phase().volume_level;
        self.sync_engine();
    }

    // ── User sound preferences ───────────────────────────────────────

    /// Set the master volume (0-100). Out-of-range values are ignored.
    pub fn set_volume(&mut self, volume: u8) {
        if volume > 100 {
            tracing::debug!(volume, "volume ignored: out of range");
            return;
        }
        self.sound.master_volume = volume;
        self.settings.update_sound_settings(SoundSettingsUpdate {
            volume: Some(volume),
            ..Default::default()
        });
        self.sync_engine();
    }

    /// Session-only volume override: applied to the engine but never
    /// written to the settings store. Out-of-range values are ignored.
    pub fn override_volume(&mut self, volume: u8) {
        if volume > 100 {
            tracing::debug!(volume, "volume override ignored: out of range");
            return;
        }
        self.sound.master_volume = volume;
        self.sync_engine();
    }

    /// Session-only mute override, never written to the settings store.
    pub fn override_mute(&mut self, muted: bool) {
        self.sound.is_muted = muted;
        self.sync_engine();
    }

    /// Flip the mute flag. Returns the new value.
    pub fn toggle_mute(&mut self) -> bool {
        self.sound.is_muted = !self.sound.is_muted;
        self.settings.update_sound_settings(SoundSettingsUpdate {
            is_muted: Some(self.sound.is_muted),
            ..Default::default()
        });
        self.sync_engine();
        self.sound.is_muted
    }

    /// Update the mantra tempo live, without interrupting an
    /// in-progress sequence. Values outside 24-160 BPM are ignored.
    pub fn set_pace(&mut self, bpm: u16) {
        if !(24..=160).contains(&bpm) {
            tracing::debug!(bpm, "pace ignored: out of range");
            return;
        }
        self.sound.mantra_pace = bpm;
        self.engine.set_bpm(bpm);
        self.settings.update_sound_settings(SoundSettingsUpdate {
            mantra_pace: Some(bpm),
            ..Default::default()
        });
    }

    /// Replace the four per-syllable pitches. The engine preserves its
    /// loop position, so the sequence does not restart.
    pub fn set_pitches(&mut self, pitches: [Pitch; 4]) {
        self.sound.mantra_pitches = pitches.clone();
        self.engine.update_pitches(pitches.clone());
        self.settings.update_sound_settings(SoundSettingsUpdate {
            mantra_pitches: Some(pitches),
            ..Default::default()
        });
    }

    /// Record the musical key preference. Consumed by the UI when
    /// deriving pitch sets; the engine itself only sees pitches.
    pub fn set_key(&mut self, key: String) {
        self.sound.mantra_key = key.clone();
        self.settings.update_sound_settings(SoundSettingsUpdate {
            mantra_key: Some(key),
            ..Default::default()
        });
    }

    // ── Mantra loop ──────────────────────────────────────────────────

    /// Register a callback for syllable advances, fired from
    /// [`poll`](Self::poll) with the syllable index and text.
    pub fn on_syllable_change(&mut self, callback: impl FnMut(usize, &'static str) + 'static) {
        self.syllable_callbacks.push(Box::new(callback));
    }

    /// Drain the engine's pending note advances and republish the
    /// current syllable. Call from the host loop.
    pub fn poll(&mut self) {
        while let Some(index) = self.engine.poll_note_advance() {
            let index = index % MANTRA_SYLLABLES.len();
            self.sound.current_syllable = index;
            let syllable = MANTRA_SYLLABLES[index];
            for callback in self.syllable_callbacks.iter_mut() {
                callback(index, syllable);
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn sync_engine(&mut self) {
        if !self.engine.is_ready() {
            return;
        }
        if self.sound.timer_running {
            self.engine.start();
        } else {
            self.engine.pause();
        }
        self.engine.set_volume_db(self.effective_volume_db());
    }
}

impl std::fmt::Debug for AudioSyncPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSyncPolicy")
            .field("sound", &self.sound)
            .field("lifecycle", &self.engine.lifecycle())
            .finish()
    }
}
