use kriya_core::storage::{SettingsStore, TomlSettingsStore};
use kriya_core::{generate_phases, IntervalMultiplier};

use crate::commands::common::format_minutes;

/// List the five phases of the cycle at the stored (or overridden)
/// interval multiplier.
pub fn run(multiplier: Option<f64>) -> Result<(), Box<dyn std::error::Error>> {
    let multiplier = match multiplier {
        Some(value) => IntervalMultiplier::from_f64(value)
            .ok_or("multiplier must be one of 0.25, 0.5, 0.75, 1")?,
        None => TomlSettingsStore::open().interval_multiplier(),
    };

    println!("Kirtan Kriya cycle ({} per base phase):", multiplier.label());
    for (i, phase) in generate_phases(multiplier).iter().enumerate() {
        println!(
            "  {}. {:<15} {:>12}  volume {}%",
            i + 1,
            phase.action,
            format_minutes(phase.duration_minutes),
            phase.volume_level,
        );
    }
    Ok(())
}
