use serde::{Deserialize, Serialize};

/// Number of phases in the canonical Kirtan Kriya cycle.
pub const PHASE_COUNT: usize = 5;

/// Base phase durations in minutes, before the interval multiplier.
const BASE_DURATIONS_MIN: [f64; PHASE_COUNT] = [2.0, 2.0, 4.0, 2.0, 2.0];

/// Target loudness per phase (0-100). The middle "mental chant" phase
/// is silent regardless of master volume.
const VOLUME_PROFILE: [u8; PHASE_COUNT] = [90, 60, 0, 60, 90];

const ACTIONS: [&str; PHASE_COUNT] = [
    "Out-loud chant",
    "Whisper chant",
    "Mental chant",
    "Whisper chant",
    "Out-loud chant",
];

/// Scalar applied uniformly to all phase base durations.
///
/// Only these four values are recognized; anything else read from the
/// settings file falls back to [`IntervalMultiplier::Full`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalMultiplier {
    Quarter,
    Half,
    ThreeQuarters,
    Full,
}

impl IntervalMultiplier {
    pub const ALL: [IntervalMultiplier; 4] = [
        IntervalMultiplier::Quarter,
        IntervalMultiplier::Half,
        IntervalMultiplier::ThreeQuarters,
        IntervalMultiplier::Full,
    ];

    pub fn as_f64(self) -> f64 {
        match self {
            IntervalMultiplier::Quarter => 0.25,
            IntervalMultiplier::Half => 0.5,
            IntervalMultiplier::ThreeQuarters => 0.75,
            IntervalMultiplier::Full => 1.0,
        }
    }

    /// Parse a stored scale factor. Returns `None` for values outside
    /// the recognized set.
    pub fn from_f64(value: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| (m.as_f64() - value).abs() < f64::EPSILON)
    }

    /// Label describing the resulting length of a 2-minute base phase.
    pub fn label(self) -> &'static str {
        match self {
            IntervalMultiplier::Quarter => "30 sec",
            IntervalMultiplier::Half => "1 min",
            IntervalMultiplier::ThreeQuarters => "1 min 30 sec",
            IntervalMultiplier::Full => "2 min",
        }
    }
}

impl Default for IntervalMultiplier {
    fn default() -> Self {
        IntervalMultiplier::Full
    }
}

/// One timed segment of the chanting cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Stable identifier, unique within a cycle (`phase-1` .. `phase-5`).
    pub id: String,
    /// Descriptive label, e.g. "Out-loud chant".
    pub action: String,
    /// Duration in minutes, multiplier already applied.
    pub duration_minutes: f64,
    /// Target loudness for this segment (0-100), independent of the
    /// master volume.
    pub volume_level: u8,
    /// True once this phase's time has fully elapsed in the current cycle.
    #[serde(default)]
    pub completed: bool,
}

impl Phase {
    /// Phase duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        (self.duration_minutes * 60_000.0).round() as u64
    }
}

/// Produce the canonical 5-phase sequence scaled by `multiplier`.
///
/// Identity, order and volume profile are fixed; only durations scale.
pub fn generate_phases(multiplier: IntervalMultiplier) -> Vec<Phase> {
    (0..PHASE_COUNT)
        .map(|i| Phase {
            id: format!("phase-{}", i + 1),
            action: ACTIONS[i].to_string(),
            duration_minutes: BASE_DURATIONS_MIN[i] * multiplier.as_f64(),
            volume_level: VOLUME_PROFILE[i],
            completed: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_cycle_has_5_phases() {
        let phases = generate_phases(IntervalMultiplier::Full);
        assert_eq!(phases.len(), PHASE_COUNT);
        assert_eq!(phases[0].action, "Out-loud chant");
        assert_eq!(phases[2].action, "Mental chant");
        assert!(phases.iter().all(|p| !p.completed));
    }

    #[test]
    fn full_multiplier_durations() {
        let phases = generate_phases(IntervalMultiplier::Full);
        let minutes: Vec<f64> = phases.iter().map(|p| p.duration_minutes).collect();
        assert_eq!(minutes, vec![2.0, 2.0, 4.0, 2.0, 2.0]);
        assert_eq!(phases[0].duration_ms(), 120_000);
        assert_eq!(phases[2].duration_ms(), 240_000);
    }

    #[test]
    fn quarter_multiplier_scales_durations_only() {
        let phases = generate_phases(IntervalMultiplier::Quarter);
        assert_eq!(phases[0].duration_ms(), 30_000);
        assert_eq!(phases[2].duration_ms(), 60_000);
        // Identity and loudness are untouched by scaling.
        assert_eq!(phases[0].id, "phase-1");
        assert_eq!(phases[2].volume_level, 0);
        assert_eq!(phases[4].volume_level, 90);
    }

    #[test]
    fn multiplier_round_trips_through_f64() {
        for m in IntervalMultiplier::ALL {
            assert_eq!(IntervalMultiplier::from_f64(m.as_f64()), Some(m));
        }
        assert_eq!(IntervalMultiplier::from_f64(0.3), None);
        assert_eq!(IntervalMultiplier::from_f64(2.0), None);
    }
}
