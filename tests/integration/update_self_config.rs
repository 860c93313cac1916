//! Update settings management through the real binary.
//!
//! Every test points `UNIPM_CONFIG_DIR` at its own scratch directory so
//! nothing touches the real `~/.unipm`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn unipm(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("unipm").expect("unipm binary should build");
    cmd.env("UNIPM_CONFIG_DIR", config_dir.path());
    cmd
}

#[test]
fn config_view_shows_defaults() {
    let config_dir = TempDir::new().unwrap();

    unipm(&config_dir)
        .args(["update-self", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Update configuration:"))
        .stdout(predicate::str::contains("Auto-check:         true"))
        .stdout(predicate::str::contains("Check interval:     24 hours"))
        .stdout(predicate::str::contains("Auto-download:      false"))
        .stdout(predicate::str::contains("Show notifications: true"));
}

#[test]
fn config_set_persists_a_value() {
    let config_dir = TempDir::new().unwrap();

    unipm(&config_dir)
        .args(["update-self", "config", "set", "check-interval", "72"])
        .assert()
        .success()
        .stdout(predicate::str::contains("check-interval = 72"));

    // The stored file uses the camelCase on-disk format.
    let raw = std::fs::read_to_string(config_dir.path().join("config.json")).unwrap();
    assert!(raw.contains("\"checkInterval\": 72"));

    unipm(&config_dir)
        .args(["update-self", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Check interval:     72 hours"));
}

#[test]
fn config_set_rejects_unknown_keys() {
    let config_dir = TempDir::new().unwrap();

    unipm(&config_dir)
        .args(["update-self", "config", "set", "frequency", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration key"));

    assert!(!config_dir.path().join("config.json").exists());
}

#[test]
fn config_set_rejects_invalid_values() {
    let config_dir = TempDir::new().unwrap();

    unipm(&config_dir)
        .args(["update-self", "config", "set", "check-interval", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1 hour"));

    unipm(&config_dir)
        .args(["update-self", "config", "set", "auto-check", "maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected true or false"));
}

#[test]
fn config_reset_restores_defaults() {
    let config_dir = TempDir::new().unwrap();

    unipm(&config_dir)
        .args(["update-self", "config", "set", "auto-check", "false"])
        .assert()
        .success();

    unipm(&config_dir)
        .args(["update-self", "config", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration reset to defaults"));

    unipm(&config_dir)
        .args(["update-self", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Auto-check:         true"));
}
