// Integration tests for replay binary
//
// Tests the replay binary CLI behavior:
// - Command-line argument parsing
// - File loading and error handling
// - Different replay modes (--all, --turns, --validate, --seed)
// - Output formatting

use std::path::PathBuf;
use std::process::Command;

/// Helper function to get the path to test fixtures
fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
}

/// Helper to run replay binary with arguments
fn run_replay(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_replay"))
        .args(args)
        .output()
        .expect("Failed to execute replay binary")
}

fn fixture() -> String {
    fixture_path("straight_to_food.jsonl")
        .to_str()
        .unwrap()
        .to_string()
}

#[test]
fn test_replay_help() {
    let output = run_replay(&["--help"]);
    assert!(output.status.success(), "Help command should succeed");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Battlesnake Replay Tool"), "Should show tool name");
    assert!(stderr.contains("USAGE:"), "Should show usage section");
    assert!(stderr.contains("--seed"), "Should document the seed option");
}

#[test]
fn test_replay_no_arguments() {
    let output = run_replay(&[]);
    assert!(!output.status.success(), "Should fail with no arguments");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("USAGE:"), "Should show usage when arguments missing");
}

#[test]
fn test_replay_all_matches_logged_moves() {
    let output = run_replay(&[&fixture(), "--all"]);
    assert!(output.status.success(), "Replay all should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Loaded 6 log entries"), "Should load move and end entries");
    assert!(stdout.contains("REPLAY REPORT"), "Should show replay report");
    assert!(stdout.contains("Total Turns:    5"), "End entry is not replayed");
    assert!(stdout.contains("Matches:        5 (100.0%)"), "Path moves replay exactly");
    assert!(!stdout.contains("DETAILED MISMATCHES"));
}

#[test]
fn test_replay_specific_turns() {
    let output = run_replay(&[&fixture(), "--turns", "0,2"]);
    assert!(output.status.success(), "Replay specific turns should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Replaying 2 specific turn(s)"));
    assert!(stdout.contains("Matches:        2 (100.0%)"));
}

#[test]
fn test_replay_with_seed() {
    let output = run_replay(&[&fixture(), "--all", "--seed", "42", "--verbose"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Replay seed: 42"));
    assert!(stdout.contains("Seed:           42"));
    assert!(
        stdout.contains("right -> right  path -> path  (9, 0) -> (9, 0)  8 -> 8"),
        "Verbose output compares source, target and path length"
    );
}

#[test]
fn test_invalid_seed() {
    let output = run_replay(&[&fixture(), "--all", "--seed", "minus-one"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid seed"));
}

#[test]
fn test_validate_expected_moves_success() {
    let output = run_replay(&[&fixture(), "--validate", "0:right,3:right"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Validating 2 expected move(s)"));
    assert!(stdout.contains("All expected moves validated successfully"));
}

#[test]
fn test_validate_expected_moves_failure() {
    let output = run_replay(&[&fixture(), "--validate", "1:up"]);
    assert!(!output.status.success(), "Turn 1 went right, not up");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Validation failed"));
}

#[test]
fn test_validate_with_alternatives() {
    let output = run_replay(&[&fixture(), "--validate", "0:up|right"]);
    assert!(output.status.success());
}

#[test]
fn test_invalid_direction() {
    let output = run_replay(&[&fixture(), "--validate", "0:sideways"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid direction") || stderr.contains("Error parsing"));
}

#[test]
fn test_nonexistent_log_file() {
    let output = run_replay(&["nonexistent.jsonl", "--all"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to open log file"));
}

#[test]
fn test_missing_mode_argument() {
    let output = run_replay(&[&fixture()]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Must specify"));
}

#[test]
fn test_turn_not_found() {
    let output = run_replay(&[&fixture(), "--turns", "999"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Turn") && stderr.contains("not found"));
}

#[test]
fn test_custom_config_path() {
    let config = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Snake.toml");
    let output = run_replay(&[&fixture(), "--all", "--config", config.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Loaded configuration from"));
}
