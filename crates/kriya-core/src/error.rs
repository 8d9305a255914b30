//! Core error types for kriya-core.
//!
//! Expected-invalid timer operations (pausing while idle, selecting an
//! out-of-range phase) are silent no-ops by design and never surface
//! here; settings-file problems resolve to defaults inside the store.
//! The one genuinely fallible seam is the audio engine startup
//! handshake.

use thiserror::Error;

/// Audio-engine specific errors.
///
/// The startup handshake is the one failure with externally visible
/// effect: it must propagate so the caller can retry on the next user
/// gesture. The timer keeps working regardless.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No audio output device could be opened
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Engine initialization failed
    #[error("Audio initialization failed: {0}")]
    InitFailed(String),

    /// A pitch string did not parse as scientific notation
    #[error("Invalid pitch '{0}': expected scientific notation such as 'A3' or 'F#4'")]
    InvalidPitch(String),
}
