mod engine;
mod policy;

pub use engine::{
    default_pitches, volume_to_db, AudioEngine, EngineLifecycle, NullAudioEngine, Pitch,
    DEFAULT_PITCHES, MANTRA_SYLLABLES, MIN_DB,
};
pub use policy::{AudioSyncPolicy, SoundState};
