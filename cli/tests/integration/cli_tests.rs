//! Integration tests for the CLI surface: help, version, global flags and
//! error reporting.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn kernsync() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kernsync"));
    cmd.env("NO_COLOR", "1");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    kernsync().assert().code(2).stderr(predicate::str::contains(
        "Keep a WSL2 kernel image in sync with a GitHub release",
    ));
}

#[test]
fn test_cli_help_lists_commands() {
    kernsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_sync_help_lists_flags() {
    kernsync()
        .args(["sync", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--repo"))
        .stdout(predicate::str::contains("--tag-image"))
        .stdout(predicate::str::contains("--allow-prerelease"))
        .stdout(predicate::str::contains("--install"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    kernsync()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kernsync"));
}

#[test]
fn test_version_command_shows_version() {
    kernsync()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!("kernsync ", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = kernsync()
        .args(["version", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_command_fails() {
    kernsync()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_tag_image_rejects_non_bool() {
    kernsync()
        .args(["sync", "--tag-image=maybe"])
        .assert()
        .code(2);
}

// --- Color handling ---

#[test]
fn test_no_color_env_accepts_any_value() {
    for value in ["1", "yes", ""] {
        Command::new(assert_cmd::cargo::cargo_bin!("kernsync"))
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("kernsync"));
    }
}

#[test]
fn test_no_color_flag_is_accepted() {
    kernsync()
        .args(["--no-color", "version"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b[").not());
}
