//! Rodio-backed audio engine.
//!
//! Synthesizes the mantra loop as sine tones on a worker thread: one
//! syllable per half note at the configured tempo, each tone a short
//! enveloped sine at the per-syllable pitch. The core drives this
//! engine exclusively through the [`AudioEngine`] trait; command and
//! note-advance channels bridge the thread boundary so the core stays
//! single-threaded.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use rodio::source::SineWave;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

use kriya_core::audio::{default_pitches, AudioEngine, EngineLifecycle, Pitch};
use kriya_core::error::AudioError;

const SYLLABLE_COUNT: usize = 4;

/// Notification chime: G4, C5, E5.
const CHIME: [(f32, u64); 3] = [(392.00, 200), (523.25, 200), (659.25, 400)];

#[derive(Debug)]
enum EngineCommand {
    Start,
    Pause,
    /// Linear amplitude, 0.0 = silent.
    SetAmplitude(f32),
    SetBpm(u16),
    SetFrequencies([f32; SYLLABLE_COUNT]),
    Notify,
}

/// Sine-synthesis engine over the default audio output device.
pub struct RodioEngine {
    lifecycle: EngineLifecycle,
    commands: Option<Sender<EngineCommand>>,
    note_advances: Option<Receiver<usize>>,
    // Keeps the output device open for the engine's lifetime.
    _stream: Option<OutputStream>,
}

impl RodioEngine {
    pub fn new() -> Self {
        Self {
            lifecycle: EngineLifecycle::Uninitialized,
            commands: None,
            note_advances: None,
            _stream: None,
        }
    }

    fn send(&mut self, command: EngineCommand) {
        if let Some(tx) = &self.commands {
            if tx.send(command).is_err() {
                tracing::warn!("audio worker gone, disabling engine");
                self.commands = None;
                self.lifecycle = EngineLifecycle::Uninitialized;
            }
        }
    }
}

impl Default for RodioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine for RodioEngine {
    fn initialize(&mut self) -> Result<(), AudioError> {
        if self.lifecycle == EngineLifecycle::Ready {
            return Ok(());
        }
        self.lifecycle = EngineLifecycle::Initializing;
        let (stream, handle) = OutputStream::try_default().map_err(|e| {
            self.lifecycle = EngineLifecycle::Uninitialized;
            AudioError::DeviceUnavailable(e.to_string())
        })?;
        let (command_tx, command_rx) = mpsc::channel();
        let (note_tx, note_rx) = mpsc::channel();
        thread::Builder::new()
            .name("kriya-audio".into())
            .spawn(move || worker_loop(handle, command_rx, note_tx))
            .map_err(|e| {
                self.lifecycle = EngineLifecycle::Uninitialized;
                AudioError::InitFailed(e.to_string())
            })?;
        self._stream = Some(stream);
        self.commands = Some(command_tx);
        self.note_advances = Some(note_rx);
        self.lifecycle = EngineLifecycle::Ready;
        Ok(())
    }

    fn lifecycle(&self) -> EngineLifecycle {
        self.lifecycle
    }

    fn start(&mut self) {
        self.send(EngineCommand::Start);
    }

    fn pause(&mut self) {
        self.send(EngineCommand::Pause);
    }

    fn set_volume_db(&mut self, db: f32) {
        let amplitude = if db == f32::NEG_INFINITY {
            0.0
        } else {
            10f32.powf(db / 20.0)
        };
        self.send(EngineCommand::SetAmplitude(amplitude));
    }

    fn set_bpm(&mut self, bpm: u16) {
        self.send(EngineCommand::SetBpm(bpm));
    }

    fn update_pitches(&mut self, pitches: [Pitch; 4]) {
        let frequencies = pitches.map(|p| p.frequency_hz());
        self.send(EngineCommand::SetFrequencies(frequencies));
    }

    fn play_notification(&mut self) {
        self.send(EngineCommand::Notify);
    }

    fn poll_note_advance(&mut self) -> Option<usize> {
        self.note_advances.as_ref()?.try_recv().ok()
    }
}

/// One syllable per half note: two beats at the current tempo.
fn syllable_period(bpm: u16) -> Duration {
    Duration::from_secs_f64(120.0 / f64::from(bpm.max(1)))
}

fn worker_loop(
    handle: OutputStreamHandle,
    commands: Receiver<EngineCommand>,
    note_advances: Sender<usize>,
) {
    let mut playing = false;
    let mut amplitude: f32 = 0.0;
    let mut bpm: u16 = 68;
    let mut frequencies = default_pitches().map(|p| p.frequency_hz());
    let mut note_index = 0usize;
    let mut next_beat = Instant::now();

    loop {
        let timeout = if playing {
            next_beat.saturating_duration_since(Instant::now())
        } else {
            Duration::from_millis(200)
        };
        match commands.recv_timeout(timeout) {
            Ok(EngineCommand::Start) => {
                if !playing {
                    playing = true;
                    next_beat = Instant::now();
                }
            }
            Ok(EngineCommand::Pause) => {
                // Loop position (note_index) is kept for resume.
                playing = false;
            }
            Ok(EngineCommand::SetAmplitude(a)) => amplitude = a,
            Ok(EngineCommand::SetBpm(value)) => bpm = value,
            Ok(EngineCommand::SetFrequencies(f)) => frequencies = f,
            Ok(EngineCommand::Notify) => play_chime(&handle, amplitude),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if playing && Instant::now() >= next_beat {
            let period = syllable_period(bpm);
            play_syllable(&handle, frequencies[note_index], period, amplitude);
            if note_advances.send(note_index).is_err() {
                break;
            }
            note_index = (note_index + 1) % SYLLABLE_COUNT;
            next_beat += period;
        }
    }
}

fn play_syllable(handle: &OutputStreamHandle, frequency: f32, period: Duration, amplitude: f32) {
    if amplitude <= 0.0 {
        return;
    }
    let sink = match Sink::try_new(handle) {
        Ok(sink) => sink,
        Err(e) => {
            tracing::warn!(error = %e, "could not open sink");
            return;
        }
    };
    sink.set_volume(amplitude);
    let sustain = period.mul_f32(0.85);
    sink.append(
        SineWave::new(frequency)
            .take_duration(sustain)
            .fade_in(Duration::from_millis(120)),
    );
    sink.detach();
}

fn play_chime(handle: &OutputStreamHandle, amplitude: f32) {
    if amplitude <= 0.0 {
        return;
    }
    let sink = match Sink::try_new(handle) {
        Ok(sink) => sink,
        Err(_) => return,
    };
    sink.set_volume(amplitude);
    for (frequency, ms) in CHIME {
        sink.append(
            SineWave::new(frequency)
                .take_duration(Duration::from_millis(ms))
                .fade_in(Duration::from_millis(20)),
        );
    }
    sink.detach();
}
