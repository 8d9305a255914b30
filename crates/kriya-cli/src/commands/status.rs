use kriya_core::storage::{SettingsStore, TomlSettingsStore};
use kriya_core::TimerStateMachine;

/// Print the machine state a fresh session would start from, plus the
/// persisted sound settings, as JSON.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = TomlSettingsStore::open();
    let sound = store.sound_settings();
    let theme = store.theme();
    let machine = TimerStateMachine::new(Box::new(store));

    let status = serde_json::json!({
        "timer": machine.snapshot(),
        "sound": sound,
        "theme": theme,
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
