//! The foreground session runner: the application's composition root.
//!
//! Builds the settings store, the timer state machine, the audio
//! engine and the sync policy, wires the policy up as a machine
//! subscriber, then drives everything from a current-thread interval
//! loop until the cycle completes.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use clap::Args;

use kriya_core::audio::{AudioSyncPolicy, NullAudioEngine};
use kriya_core::storage::{MemorySettingsStore, SettingsStore, TomlSettingsStore};
use kriya_core::{IntervalMultiplier, TimerEvent, TimerStateMachine};

use crate::audio::RodioEngine;
use crate::commands::common::format_mmss;

#[derive(Args)]
pub struct RunArgs {
    /// Interval multiplier for this session (0.25, 0.5, 0.75, 1)
    #[arg(long)]
    pub multiplier: Option<f64>,
    /// Start at this phase (1-5)
    #[arg(long)]
    pub phase: Option<usize>,
    /// Master volume for this session (0-100)
    #[arg(long)]
    pub volume: Option<u8>,
    /// Mute the mantra for this session
    #[arg(long, conflicts_with = "unmute")]
    pub mute: bool,
    /// Unmute the mantra for this session
    #[arg(long)]
    pub unmute: bool,
    /// Run without opening an audio device
    #[arg(long)]
    pub no_audio: bool,
    /// Do not write settings changes from this run to disk
    #[arg(long)]
    pub no_persist: bool,
}

fn open_settings(no_persist: bool) -> Box<dyn SettingsStore> {
    if no_persist {
        Box::new(MemorySettingsStore::default())
    } else {
        Box::new(TomlSettingsStore::open())
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut machine = TimerStateMachine::new(open_settings(args.no_persist));

    if let Some(value) = args.multiplier {
        let multiplier = IntervalMultiplier::from_f64(value)
            .ok_or("multiplier must be one of 0.25, 0.5, 0.75, 1")?;
        machine.set_multiplier(multiplier);
    }
    if let Some(phase) = args.phase {
        if !(1..=machine.phases().len()).contains(&phase) {
            return Err(format!("phase must be 1-{}", machine.phases().len()).into());
        }
        machine.select_phase(phase - 1);
    }

    let mut policy = if args.no_audio {
        AudioSyncPolicy::new(
            Box::new(NullAudioEngine::default()),
            open_settings(args.no_persist),
        )
    } else {
        AudioSyncPolicy::new(
            Box::new(RodioEngine::new()),
            open_settings(args.no_persist),
        )
    };

    // Audio is best-effort: a failed handshake downgrades to a silent
    // session, the countdown itself is unaffected.
    if let Err(e) = policy.initialize_audio() {
        eprintln!("audio unavailable ({e}), continuing without sound");
    }

    // Session flags override preferences without persisting them.
    if let Some(volume) = args.volume {
        policy.override_volume(volume);
    }
    if args.mute {
        policy.override_mute(true);
    }
    if args.unmute {
        policy.override_mute(false);
    }
    if policy.sound_state().is_muted {
        eprintln!("mantra is muted; pass --unmute or `kriya config set --mute false`");
    }

    policy.adopt(&machine.snapshot());
    let policy = Rc::new(RefCell::new(policy));

    let observer = policy.clone();
    machine.subscribe(move |event, snapshot| {
        observer.borrow_mut().observe(event, snapshot);
    });
    machine.subscribe(|event, snapshot| match event {
        TimerEvent::Started { phase_index, .. } | TimerEvent::PhaseAdvanced { phase_index, .. } => {
            let phase = &snapshot.phases[*phase_index];
            println!(
                "\nPhase {}/{}: {} ({})",
                phase_index + 1,
                snapshot.phases.len(),
                phase.action,
                format_mmss(phase.duration_ms()),
            );
        }
        TimerEvent::MeditationCompleted { .. } => {
            println!("\nMeditation complete. Sat Nam.");
        }
        _ => {}
    });

    machine.start_timer();
    drive_session(machine, policy)
}

fn drive_session(
    mut machine: TimerStateMachine,
    policy: Rc<RefCell<AudioSyncPolicy>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(async {
        let mut interval = tokio::time::interval(std::time::Duration::from_millis(250));
        loop {
            interval.tick().await;
            machine.tick();
            policy.borrow_mut().poll();
            if machine.meditation_completed() {
                break;
            }
            let syllable = if policy.borrow().sound_state().timer_running {
                policy.borrow().current_syllable()
            } else {
                ""
            };
            print!(
                "\r  {}  {:<4}",
                format_mmss(machine.time_remaining_ms()),
                syllable
            );
            let _ = std::io::stdout().flush();
        }
    });
    Ok(())
}
