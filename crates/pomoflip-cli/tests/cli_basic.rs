//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. They run
//! against the dev data directory (POMOFLIP_ENV=dev) so a developer's own
//! timer state is left alone.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "pomoflip-cli", "--"])
        .args(args)
        .env("POMOFLIP_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_timer_status() {
    let (stdout, _, code) = run_cli(&["timer", "status"]);
    assert_eq!(code, 0, "timer status failed");

    let snapshot: serde_json::Value =
        serde_json::from_str(&stdout).expect("status output is not JSON");
    assert!(snapshot.get("state").is_some());
    assert!(snapshot.get("remaining_ms").is_some());
    assert!(snapshot.get("completed_sessions").is_some());
}

#[test]
fn test_timer_reset_emits_event() {
    let (stdout, _, code) = run_cli(&["timer", "reset"]);
    assert_eq!(code, 0, "timer reset failed");

    let event: serde_json::Value = serde_json::from_str(&stdout).expect("reset output is not JSON");
    assert_eq!(event["type"], "TimerReset");
}

#[test]
fn test_timer_select_rejects_off_catalog_duration() {
    let (_, stderr, code) = run_cli(&["timer", "select", "7"]);
    assert_ne!(code, 0, "off-catalog duration was accepted");
    assert!(stderr.contains("invalid duration"));
}

#[test]
fn test_config_path() {
    let (stdout, _, code) = run_cli(&["config", "path"]);
    assert_eq!(code, 0, "config path failed");
    assert!(stdout.trim().ends_with("config.toml"));
}

#[test]
fn test_config_show_is_toml() {
    let (stdout, _, code) = run_cli(&["config", "show"]);
    assert_eq!(code, 0, "config show failed");
    assert!(stdout.contains("[timer]"));
    assert!(stdout.contains("[sounds]"));
}
