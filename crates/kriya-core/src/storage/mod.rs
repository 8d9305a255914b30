mod settings;

pub use settings::{
    MemorySettingsStore, SettingsStore, SoundSettings, SoundSettingsUpdate, Theme,
    TomlSettingsStore,
};

use std::path::PathBuf;

/// Returns `~/.config/kriya[-dev]/` based on KRIYA_ENV.
///
/// Set KRIYA_ENV=dev to keep development settings separate.
pub fn config_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("KRIYA_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("kriya-dev")
    } else {
        base_dir.join("kriya")
    }
}
