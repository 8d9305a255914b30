//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Each
//! test points HOME at a scratch directory so the user's real settings
//! file is never touched.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "kriya-cli", "--quiet", "--"])
        .args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn scratch_home() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}

#[test]
fn status_prints_idle_snapshot() {
    let home = scratch_home();
    let (stdout, _, code) = run_cli(home.path(), &["status"]);
    assert_eq!(code, 0, "status failed");

    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("status is JSON");
    assert_eq!(parsed["timer"]["status"], "idle");
    assert_eq!(parsed["timer"]["current_phase_index"], 0);
    assert_eq!(parsed["timer"]["time_remaining_ms"], 120_000);
    assert_eq!(parsed["sound"]["volume"], 70);
}

#[test]
fn phases_lists_the_five_phase_cycle() {
    let home = scratch_home();
    let (stdout, _, code) = run_cli(home.path(), &["phases"]);
    assert_eq!(code, 0, "phases failed");
    assert!(stdout.contains("Out-loud chant"));
    assert!(stdout.contains("Mental chant"));
    assert_eq!(stdout.matches("chant").count(), 5);
}

#[test]
fn phases_accepts_multiplier_override() {
    let home = scratch_home();
    let (stdout, _, code) = run_cli(home.path(), &["phases", "--multiplier", "0.25"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("30 sec"));

    let (_, stderr, code) = run_cli(home.path(), &["phases", "--multiplier", "0.3"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("multiplier"));
}

#[test]
fn config_set_round_trips() {
    let home = scratch_home();
    let (_, _, code) = run_cli(
        home.path(),
        &[
            "config", "set", "--volume", "55", "--pace", "60", "--mute", "false",
            "--pitches", "E3,D3,C3,D3",
        ],
    );
    assert_eq!(code, 0, "config set failed");

    let (stdout, _, code) = run_cli(home.path(), &["config", "show"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("config is JSON");
    assert_eq!(parsed["sound"]["volume"], 55);
    assert_eq!(parsed["sound"]["mantra_pace"], 60);
    assert_eq!(parsed["sound"]["is_muted"], false);
    assert_eq!(parsed["sound"]["mantra_pitches"][0], "E3");
}

#[test]
fn config_rejects_bad_values() {
    let home = scratch_home();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "--volume", "150"]);
    assert_ne!(code, 0);

    let (_, _, code) = run_cli(home.path(), &["config", "set", "--pitches", "A3,G3"]);
    assert_ne!(code, 0);

    let (_, _, code) = run_cli(home.path(), &["config", "set", "--theme", "sepia"]);
    assert_ne!(code, 0);
}

#[test]
fn config_reset_restores_defaults() {
    let home = scratch_home();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "--volume", "10"]);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(home.path(), &["config", "show"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["sound"]["volume"], 70);
}
