use clap::Subcommand;

use kriya_core::audio::Pitch;
use kriya_core::storage::{
    SettingsStore, SoundSettingsUpdate, Theme, TomlSettingsStore,
};
use kriya_core::IntervalMultiplier;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print all persisted settings as JSON
    Show,
    /// Update persisted settings
    Set {
        /// Master volume (0-100)
        #[arg(long)]
        volume: Option<u8>,
        /// Mute the mantra (true/false)
        #[arg(long)]
        mute: Option<bool>,
        /// Mantra pace in BPM (24-160)
        #[arg(long)]
        pace: Option<u16>,
        /// Four comma-separated pitches, e.g. "A3,G3,F3,G3"
        #[arg(long)]
        pitches: Option<String>,
        /// Musical key, e.g. "G"
        #[arg(long)]
        key: Option<String>,
        /// Interval multiplier (0.25, 0.5, 0.75, 1)
        #[arg(long)]
        multiplier: Option<f64>,
        /// Theme (light, dark, auto)
        #[arg(long)]
        theme: Option<String>,
    },
    /// Reset all settings to defaults
    Reset,
}

fn parse_pitches(raw: &str) -> Result<[Pitch; 4], Box<dyn std::error::Error>> {
    let parsed: Vec<Pitch> = raw
        .split(',')
        .map(|s| Pitch::parse(s.trim()))
        .collect::<Result<_, _>>()?;
    parsed
        .try_into()
        .map_err(|_| "expected exactly 4 pitches".into())
}

fn parse_theme(raw: &str) -> Result<Theme, Box<dyn std::error::Error>> {
    match raw.to_ascii_lowercase().as_str() {
        "light" => Ok(Theme::Light),
        "dark" => Ok(Theme::Dark),
        "auto" => Ok(Theme::Auto),
        _ => Err("theme must be light, dark or auto".into()),
    }
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TomlSettingsStore::open();
    match action {
        ConfigAction::Show => {
            let settings = serde_json::json!({
                "current_phase_index": store.current_phase_index(),
                "sound": store.sound_settings(),
                "interval_multiplier": store.interval_multiplier().as_f64(),
                "theme": store.theme(),
            });
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        ConfigAction::Set {
            volume,
            mute,
            pace,
            pitches,
            key,
            multiplier,
            theme,
        } => {
            if let Some(volume) = volume {
                if volume > 100 {
                    return Err("volume must be 0-100".into());
                }
            }
            if let Some(pace) = pace {
                if !(24..=160).contains(&pace) {
                    return Err("pace must be 24-160 BPM".into());
                }
            }
            let mantra_pitches = pitches.as_deref().map(parse_pitches).transpose()?;
            store.update_sound_settings(SoundSettingsUpdate {
                volume,
                is_muted: mute,
                mantra_pace: pace,
                mantra_pitches,
                mantra_key: key,
            });
            if let Some(value) = multiplier {
                let multiplier = IntervalMultiplier::from_f64(value)
                    .ok_or("multiplier must be one of 0.25, 0.5, 0.75, 1")?;
                store.set_interval_multiplier(multiplier);
            }
            if let Some(raw) = theme {
                store.set_theme(parse_theme(&raw)?);
            }
            println!("ok");
        }
        ConfigAction::Reset => {
            let path = store.path().to_path_buf();
            if path.exists() {
                std::fs::remove_file(&path)?;
            }
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
