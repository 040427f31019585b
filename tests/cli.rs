//! CLI integration tests for the spechub binary.
//!
//! Each test uses an isolated temp directory for the data directory, ensuring
//! tests can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("spechub").expect("failed to find binary");
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_lists_serve_command() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn serve_requires_a_signing_secret() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    cmd()
        .env_remove("SPECHUB_AUTH_SECRET")
        .args(["serve", "--data-dir"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("SPECHUB_AUTH_SECRET"));
}

#[test]
fn serve_treats_blank_secret_as_missing() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    cmd()
        .env("SPECHUB_AUTH_SECRET", " , ,")
        .args(["serve", "--data-dir"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("SPECHUB_AUTH_SECRET"));
}

#[test]
fn serve_rejects_malformed_port() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    cmd()
        .env("SPECHUB_AUTH_SECRET", "test-secret")
        .args(["serve", "--port", "not-a-port", "--data-dir"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--port"));
}

#[test]
fn serve_rejects_unparseable_host() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    cmd()
        .env("SPECHUB_AUTH_SECRET", "test-secret")
        .args(["serve", "--host", "not a host", "--data-dir"])
        .arg(temp_dir.path())
        .assert()
        .failure();
}

#[test]
fn serve_fails_when_data_dir_is_a_file() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let blocker = temp_dir.path().join("occupied");
    std::fs::write(&blocker, "not a directory").expect("write blocker");

    cmd()
        .env("SPECHUB_AUTH_SECRET", "test-secret")
        .args(["serve", "--data-dir"])
        .arg(&blocker)
        .assert()
        .failure();
}
