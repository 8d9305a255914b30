//! TOML-backed user settings.
//!
//! Stores the persisted preferences of a session:
//! - selected phase index
//! - master volume, mute flag
//! - mantra pace (BPM), per-syllable pitches, musical key
//! - interval multiplier
//! - theme
//!
//! Settings are stored at `~/.config/kriya/settings.toml`. Writes are
//! read-merge-write: each setter merges its partial update with
//! whatever is on disk at write time. A missing or malformed file
//! resolves to the documented defaults -- callers never see a
//! "corrupt settings" error.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::audio::{default_pitches, Pitch};
use crate::timer::IntervalMultiplier;

/// Appearance preference, persisted for the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

/// The user-settable audio preferences, resolved against defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSettings {
    /// Master volume, 0-100.
    pub volume: u8,
    pub is_muted: bool,
    /// Mantra tempo in BPM, 24-160.
    pub mantra_pace: u16,
    pub mantra_pitches: [Pitch; 4],
    pub mantra_key: String,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            volume: 70,
            is_muted: true,
            mantra_pace: 68,
            mantra_pitches: default_pitches(),
            mantra_key: "G".to_string(),
        }
    }
}

/// Partial update merged into the stored sound settings.
#[derive(Debug, Clone, Default)]
pub struct SoundSettingsUpdate {
    pub volume: Option<u8>,
    pub is_muted: Option<bool>,
    pub mantra_pace: Option<u16>,
    pub mantra_pitches: Option<[Pitch; 4]>,
    pub mantra_key: Option<String>,
}

/// Synchronous key-value persistence consumed by the timer core.
///
/// Getters resolve to defaults when nothing is stored; setters merge
/// with the stored state at write time, so independent setter calls
/// never clobber each other's keys.
pub trait SettingsStore {
    fn current_phase_index(&self) -> usize;
    fn set_current_phase_index(&mut self, index: usize);

    fn sound_settings(&self) -> SoundSettings;
    fn update_sound_settings(&mut self, update: SoundSettingsUpdate);

    fn interval_multiplier(&self) -> IntervalMultiplier;
    fn set_interval_multiplier(&mut self, multiplier: IntervalMultiplier);

    fn theme(&self) -> Theme;
    fn set_theme(&mut self, theme: Theme);
}

/// On-disk representation. Every field defaults independently so a
/// hand-edited or older file still loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSettings {
    #[serde(default)]
    current_phase_index: usize,
    #[serde(default = "default_volume")]
    sound_volume: u8,
    #[serde(default = "default_true")]
    is_muted: bool,
    #[serde(default = "default_pace")]
    mantra_pace: u16,
    #[serde(default = "default_pitch_strings")]
    mantra_pitches: [Pitch; 4],
    #[serde(default = "default_key")]
    mantra_key: String,
    /// Stored as the raw scale factor; validated against the
    /// recognized set on read.
    #[serde(default = "default_multiplier")]
    interval_multiplier: f64,
    #[serde(default)]
    theme: Theme,
}

fn default_volume() -> u8 {
    70
}
fn default_true() -> bool {
    true
}
fn default_pace() -> u16 {
    68
}
fn default_pitch_strings() -> [Pitch; 4] {
    default_pitches()
}
fn default_key() -> String {
    "G".to_string()
}
fn default_multiplier() -> f64 {
    1.0
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            current_phase_index: 0,
            sound_volume: default_volume(),
            is_muted: true,
            mantra_pace: default_pace(),
            mantra_pitches: default_pitches(),
            mantra_key: default_key(),
            interval_multiplier: default_multiplier(),
            theme: Theme::Auto,
        }
    }
}

impl PersistedSettings {
    fn sound_settings(&self) -> SoundSettings {
        SoundSettings {
            volume: self.sound_volume.min(100),
            is_muted: self.is_muted,
            mantra_pace: self.mantra_pace.clamp(24, 160),
            mantra_pitches: self.mantra_pitches.clone(),
            mantra_key: self.mantra_key.clone(),
        }
    }

    fn apply(&mut self, update: SoundSettingsUpdate) {
        if let Some(volume) = update.volume {
            self.sound_volume = volume.min(100);
        }
        if let Some(is_muted) = update.is_muted {
            self.is_muted = is_muted;
        }
        if let Some(pace) = update.mantra_pace {
            self.mantra_pace = pace.clamp(24, 160);
        }
        if let Some(pitches) = update.mantra_pitches {
            self.mantra_pitches = pitches;
        }
        if let Some(key) = update.mantra_key {
            self.mantra_key = key;
        }
    }
}

/// File-backed settings at `~/.config/kriya/settings.toml`.
///
/// The file is re-read on every access, mirroring the original
/// key-value store semantics: state lives on disk, not in this handle,
/// so several handles over the same path stay coherent.
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    /// Store at the default config location.
    pub fn open() -> Self {
        let dir = super::config_dir();
        Self {
            path: dir.join("settings.toml"),
        }
    }

    /// Store at an explicit path (tests, alternate profiles).
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn load(&self) -> PersistedSettings {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return PersistedSettings::default(),
        };
        match toml::from_str(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "malformed settings file, using defaults"
                );
                PersistedSettings::default()
            }
        }
    }

    fn save(&self, settings: &PersistedSettings) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                tracing::warn!(error = %err, "could not create settings directory");
                return;
            }
        }
        let raw = match toml::to_string_pretty(settings) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "could not serialize settings");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, raw) {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "could not write settings file"
            );
        }
    }

    fn mutate(&self, f: impl FnOnce(&mut PersistedSettings)) {
        let mut settings = self.load();
        f(&mut settings);
        self.save(&settings);
    }
}

impl SettingsStore for TomlSettingsStore {
    fn current_phase_index(&self) -> usize {
        self.load().current_phase_index
    }

    fn set_current_phase_index(&mut self, index: usize) {
        self.mutate(|s| s.current_phase_index = index);
    }

    fn sound_settings(&self) -> SoundSettings {
        self.load().sound_settings()
    }

    fn update_sound_settings(&mut self, update: SoundSettingsUpdate) {
        self.mutate(|s| s.apply(update));
    }

    fn interval_multiplier(&self) -> IntervalMultiplier {
        IntervalMultiplier::from_f64(self.load().interval_multiplier).unwrap_or_default()
    }

    fn set_interval_multiplier(&mut self, multiplier: IntervalMultiplier) {
        self.mutate(|s| s.interval_multiplier = multiplier.as_f64());
    }

    fn theme(&self) -> Theme {
        self.load().theme
    }

    fn set_theme(&mut self, theme: Theme) {
        self.mutate(|s| s.theme = theme);
    }
}

/// In-memory store for tests and `--no-persist` runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    inner: PersistedSettings,
}

impl SettingsStore for MemorySettingsStore {
    fn current_phase_index(&self) -> usize {
        self.inner.current_phase_index
    }

    fn set_current_phase_index(&mut self, index: usize) {
        self.inner.current_phase_index = index;
    }

    fn sound_settings(&self) -> SoundSettings {
        self.inner.sound_settings()
    }

    fn update_sound_settings(&mut self, update: SoundSettingsUpdate) {
        self.inner.apply(update);
    }

    fn interval_multiplier(&self) -> IntervalMultiplier {
        IntervalMultiplier::from_f64(self.inner.interval_multiplier).unwrap_or_default()
    }

    fn set_interval_multiplier(&mut self, multiplier: IntervalMultiplier) {
        self.inner.interval_multiplier = multiplier.as_f64();
    }

    fn theme(&self) -> Theme {
        self.inner.theme
    }

    fn set_theme(&mut self, theme: Theme) {
        self.inner.theme = theme;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> TomlSettingsStore {
        TomlSettingsStore::at_path(dir.path().join("settings.toml"))
    }

    #[test]
    fn absent_file_resolves_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.current_phase_index(), 0);
        let sound = store.sound_settings();
        assert_eq!(sound.volume, 70);
        assert!(sound.is_muted);
        assert_eq!(sound.mantra_pace, 68);
        assert_eq!(sound.mantra_key, "G");
        assert_eq!(store.interval_multiplier(), IntervalMultiplier::Full);
        assert_eq!(store.theme(), Theme::Auto);
    }

    #[test]
    fn partial_updates_merge_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        store.update_sound_settings(SoundSettingsUpdate {
            volume: Some(55),
            ..Default::default()
        });
        store.set_current_phase_index(3);
        store.update_sound_settings(SoundSettingsUpdate {
            is_muted: Some(false),
            ..Default::default()
        });

        // A second handle over the same file sees all three writes.
        let other = store_in(&dir);
        assert_eq!(other.current_phase_index(), 3);
        let sound = other.sound_settings();
        assert_eq!(sound.volume, 55);
        assert!(!sound.is_muted);
        // Untouched keys keep their defaults.
        assert_eq!(sound.mantra_pace, 68);
    }

    #[test]
    fn malformed_file_resolves_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "not [valid { toml").unwrap();
        let store = TomlSettingsStore::at_path(path);
        assert_eq!(store.sound_settings(), SoundSettings::default());
    }

    #[test]
    fn unrecognized_multiplier_falls_back_to_full() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "interval_multiplier = 0.33\n").unwrap();
        let store = TomlSettingsStore::at_path(path);
        assert_eq!(store.interval_multiplier(), IntervalMultiplier::Full);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut store = MemorySettingsStore::default();
        store.update_sound_settings(SoundSettingsUpdate {
            volume: Some(250),
            mantra_pace: Some(900),
            ..Default::default()
        });
        let sound = store.sound_settings();
        assert_eq!(sound.volume, 100);
        assert_eq!(sound.mantra_pace, 160);
    }

    #[test]
    fn theme_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.set_theme(Theme::Dark);
        assert_eq!(store_in(&dir).theme(), Theme::Dark);
    }
}
