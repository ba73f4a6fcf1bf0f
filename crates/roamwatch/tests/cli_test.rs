//! Integration tests for the `roamwatch` CLI binary.
//!
//! These validate argument parsing, help output, shell completions, and
//! store-backed CRUD against a temp database -- no live controller needed.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `roamwatch` binary with env isolation.
///
/// Clears all `ROAMWATCH_*` env vars and points the config path at a
/// nonexistent file so tests never touch the user's real configuration.
fn roamwatch_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("roamwatch");
    cmd.env("HOME", "/tmp/roamwatch-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/roamwatch-cli-test-nonexistent")
        .env("ROAMWATCH_CONFIG", "/tmp/roamwatch-cli-test-nonexistent/config.toml")
        .env_remove("ROAMWATCH_CONTROLLER_URL")
        .env_remove("ROAMWATCH_SITE_ID")
        .env_remove("ROAMWATCH_API_KEY")
        .env_remove("ROAMWATCH_USERNAME")
        .env_remove("ROAMWATCH_PASSWORD")
        .env_remove("ROAMWATCH_DATABASE_PATH")
        .env_remove("ROAMWATCH_REFRESH_INTERVAL_SECONDS");
    cmd
}

/// Same, but with the database redirected into a temp dir.
fn cmd_with_db(dir: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = roamwatch_cmd();
    cmd.env(
        "ROAMWATCH_DATABASE_PATH",
        dir.path().join("roamwatch.db"),
    );
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = roamwatch_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    roamwatch_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("UniFi controller")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("webhooks"))
            .and(predicate::str::contains("serve")),
    );
}

#[test]
fn test_version_flag() {
    roamwatch_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("roamwatch"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    roamwatch_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    roamwatch_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = roamwatch_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = roamwatch_cmd()
        .args(["--output", "invalid", "devices", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_test_connection_without_controller() {
    let dir = tempfile::tempdir().unwrap();
    cmd_with_db(&dir)
        .arg("test-connection")
        .assert()
        .failure()
        .stderr(predicate::str::contains("controller_url"));
}

#[test]
fn test_add_rejects_bad_mac() {
    let dir = tempfile::tempdir().unwrap();
    cmd_with_db(&dir)
        .args(["devices", "add", "not-a-mac"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hardware address"));
}

// ── Store-backed CRUD round trip ────────────────────────────────────

#[test]
fn test_device_add_list_remove() {
    let dir = tempfile::tempdir().unwrap();

    cmd_with_db(&dir)
        .args(["devices", "add", "AA:BB:CC:DD:EE:FF", "--name", "Tablet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aa:bb:cc:dd:ee:ff"));

    // Duplicate add fails with the conflict exit code.
    let output = cmd_with_db(&dir)
        .args(["devices", "add", "aa-bb-cc-dd-ee-ff"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6), "conflict exit code");

    cmd_with_db(&dir)
        .args(["--output", "plain", "devices", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aa:bb:cc:dd:ee:ff"));

    cmd_with_db(&dir)
        .args(["devices", "remove", "aa:bb:cc:dd:ee:ff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));

    cmd_with_db(&dir)
        .args(["--output", "plain", "devices", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aa:bb:cc:dd:ee:ff").not());
}

#[test]
fn test_webhook_add_and_list() {
    let dir = tempfile::tempdir().unwrap();

    cmd_with_db(&dir)
        .args([
            "webhooks",
            "add",
            "alerts",
            "https://example.test/hook",
            "--provider",
            "discord",
            "--events",
            "connected,roamed",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("alerts"));

    cmd_with_db(&dir)
        .args(["webhooks", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("discord")
                .and(predicate::str::contains("connected,roamed"))
                .and(predicate::str::contains("disconnected").not()),
        );
}

#[test]
fn test_status_with_empty_store() {
    let dir = tempfile::tempdir().unwrap();

    cmd_with_db(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 tracked"));
}
