//! End-to-end tests for the `raven` binary.
//!
//! Only commands that need no gateway run here; networked commands are
//! covered in `commands.rs`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RAVEN_BIN: &str = env!("CARGO_BIN_EXE_raven");

fn raven(settings: &TempDir) -> Command {
    let mut cmd = Command::new(RAVEN_BIN);
    cmd.env_remove("RAVEN_GATEWAY")
        .env_remove("RAVEN_GATEWAY_TOKEN")
        .env("RUST_LOG", "off")
        .arg("--settings")
        .arg(settings.path().join("settings.json"));
    cmd
}

#[test]
fn help_lists_commands() {
    Command::new(RAVEN_BIN)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("sessions"))
        .stdout(predicate::str::contains("settings"));
}

#[test]
fn settings_round_trip_through_the_file() {
    let dir = TempDir::new().expect("tempdir");

    raven(&dir)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"));

    raven(&dir)
        .args(["settings", "set", "--gateway", "ws://gw.example:18789", "--token", "hunter2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ws://gw.example:18789"))
        .stdout(predicate::str::contains("hunter2").not());

    let saved = std::fs::read_to_string(dir.path().join("settings.json")).expect("settings file");
    assert!(saved.contains("raven_gateway_url"));
    assert!(saved.contains("hunter2"));

    raven(&dir)
        .args(["--format", "json", "settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""has_token": true"#));

    raven(&dir)
        .args(["settings", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Settings cleared"));
    assert!(!dir.path().join("settings.json").exists());
}

#[test]
fn invalid_gateway_scheme_fails() {
    let dir = TempDir::new().expect("tempdir");

    raven(&dir)
        .args(["--gateway", "http://127.0.0.1:1", "--timeout", "2", "sessions"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("connection error"));
}

#[test]
fn corrupt_settings_file_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("settings.json"), "{ not json").expect("write");

    raven(&dir)
        .args(["settings", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid settings file"));
}
