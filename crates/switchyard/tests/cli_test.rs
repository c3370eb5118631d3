//! Integration tests for the `switchyard` CLI binary.
//!
//! Commands run against in-memory `mock` switches defined in a temporary
//! inventory, so no test needs a real device.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

const MOCK_INVENTORY: &str = r#"
[defaults]
timeout = 5

[switches.sw0]
type = "mock"
hostname = "sw0.example.org"
username = "admin"
password_env = "SY_TEST_PASSWORD"

[switches.sw1]
type = "http://schema.massopencloud.org/haas/v0/switches/mock"
hostname = "sw1.example.org"
username = "admin"
password_env = "SY_TEST_PASSWORD"
"#;

/// Build a [`Command`] for the `switchyard` binary with env isolation.
fn switchyard_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("switchyard");
    cmd.env("HOME", "/tmp/switchyard-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/switchyard-cli-test-nonexistent")
        .env("SY_TEST_PASSWORD", "secret")
        .env("SWITCH_PASSWORD", "secret")
        .env_remove("SWITCHYARD_CONFIG")
        .env_remove("SWITCHYARD_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Temp dir holding `switchyard.toml` with the mock inventory.
fn setup() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("switchyard.toml");
    std::fs::write(&path, MOCK_INVENTORY).unwrap();
    (dir, path)
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn action(port: &str, channel: &str, network: Option<(&str, &str)>) -> String {
    let network = network.map_or_else(
        || "null".to_owned(),
        |(label, id)| format!(r#"{{"label":"{label}","network_id":"{id}"}}"#),
    );
    format!(
        r#"{{"nic":{{"label":"eth0","mac":"de:ad:be:ef:00:01","node":"node-1","port":{{"owner":"sw0","label":"{port}"}}}},"channel":"{channel}","new_network":{network}}}"#
    )
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = switchyard_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    switchyard_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("switches")
            .and(predicate::str::contains("apply"))
            .and(predicate::str::contains("audit")),
    );
}

#[test]
fn test_version_flag() {
    switchyard_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("switchyard"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("switchyard.toml");
    let config = path.to_str().unwrap();

    switchyard_cmd()
        .args(["--config", config, "config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    switchyard_cmd()
        .args(["--config", config, "config", "init"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("--force"));

    switchyard_cmd()
        .args(["--config", config, "config", "init", "--force"])
        .assert()
        .success();

    switchyard_cmd()
        .args(["--config", config, "-o", "plain", "switches", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("brocade-01")
                .and(predicate::str::contains("dell-01"))
                .and(predicate::str::contains("nexus-01")),
        );
}

// ── Switches ────────────────────────────────────────────────────────

#[test]
fn test_sample_inventory_validates() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("switchyard.toml");
    let config = config.to_str().unwrap();

    switchyard_cmd()
        .args(["--config", config, "config", "init"])
        .assert()
        .success();
    switchyard_cmd()
        .args(["--config", config, "switches", "validate"])
        .assert()
        .success();
}

#[test]
fn test_validate_rejects_unknown_parameter() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "switchyard.toml",
        r#"
[switches.sw0]
type = "mock"
hostname = "sw0"
username = "admin"
password = "x"
vlan = "12"
"#,
    );
    switchyard_cmd()
        .args(["--config", path.to_str().unwrap(), "switches", "validate", "sw0"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("not a mock parameter"));
}

#[test]
fn test_validate_unknown_switch_is_not_found() {
    let (_dir, path) = setup();
    switchyard_cmd()
        .args(["--config", path.to_str().unwrap(), "switches", "validate", "ghost"])
        .assert()
        .code(4);
}

// ── Apply ───────────────────────────────────────────────────────────

#[test]
fn test_apply_single_action() {
    let (dir, path) = setup();
    let file = write_file(
        dir.path(),
        "action.json",
        &action("1/0/1", "vlan/native", Some(("red", "23"))),
    );

    switchyard_cmd()
        .args(["--config", path.to_str().unwrap(), "-o", "json", "apply"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""ok": true"#));
}

#[test]
fn test_apply_batch_and_verify() {
    let (dir, path) = setup();
    let batch = format!(
        "[{},{}]",
        action("1/0/1", "vlan/native", Some(("red", "23"))),
        action("1/0/1", "vlan/100", Some(("blue", "100"))),
    );
    let file = write_file(dir.path(), "actions.json", &batch);

    switchyard_cmd()
        .args(["--config", path.to_str().unwrap(), "-o", "json", "apply", "--verify"])
        .arg(&file)
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""native": "23""#)
                .and(predicate::str::contains(r#""100""#)),
        );
}

#[test]
fn test_apply_mismatched_channel_is_invariant_violation() {
    let (dir, path) = setup();
    let file = write_file(
        dir.path(),
        "action.json",
        &action("1/0/1", "vlan/101", Some(("blue", "100"))),
    );

    switchyard_cmd()
        .args(["--config", path.to_str().unwrap(), "apply"])
        .arg(&file)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Invariant violation"));
}

#[test]
fn test_apply_batch_reports_partial_failure() {
    let (dir, path) = setup();
    let batch = format!(
        "[{},{}]",
        action("1/0/1", "vlan/100", Some(("blue", "100"))),
        action("1/0/2", "eth0", None),
    );
    let file = write_file(dir.path(), "actions.json", &batch);

    let output = switchyard_cmd()
        .args(["--config", path.to_str().unwrap(), "apply"])
        .arg(&file)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("1 of 2"), "unexpected output:\n{text}");
}

#[test]
fn test_apply_yaml_action() {
    let (dir, path) = setup();
    let file = write_file(
        dir.path(),
        "action.yaml",
        r"
nic:
  label: eth1
  mac: DE-AD-BE-EF-00-02
  node: node-2
  port:
    owner: sw0
    label: 1/0/7
channel: vlan/native
",
    );

    switchyard_cmd()
        .args(["--config", path.to_str().unwrap(), "apply"])
        .arg(&file)
        .assert()
        .success();
}

#[test]
fn test_apply_without_inventory() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("switchyard.toml");
    let file = write_file(dir.path(), "action.json", &action("1/0/1", "vlan/native", None));

    switchyard_cmd()
        .args(["--config", missing.to_str().unwrap(), "apply"])
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config init"));
}

// ── Audit & revert ──────────────────────────────────────────────────

#[test]
fn test_audit_fresh_ports_are_empty() {
    let (_dir, path) = setup();
    switchyard_cmd()
        .args(["--config", path.to_str().unwrap(), "-o", "json", "audit", "sw0:1/0/1", "sw1:Gi0/2"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""port": "sw0:1/0/1""#)
                .and(predicate::str::contains(r#""port": "sw1:Gi0/2""#))
                .and(predicate::str::contains(r#""native": null"#)),
        );
}

#[test]
fn test_audit_unknown_switch() {
    let (_dir, path) = setup();
    switchyard_cmd()
        .args(["--config", path.to_str().unwrap(), "audit", "ghost:1"])
        .assert()
        .code(4);
}

#[test]
fn test_audit_rejects_malformed_port() {
    let (_dir, path) = setup();
    switchyard_cmd()
        .args(["--config", path.to_str().unwrap(), "audit", "1/0/1"])
        .assert()
        .code(2);
}

#[test]
fn test_audit_reports_drift() {
    let (dir, path) = setup();
    let expected = write_file(
        dir.path(),
        "expected.json",
        r#"[{"port":"sw0:1/0/1","native":"23","tagged":["100"]}]"#,
    );

    switchyard_cmd()
        .args(["--config", path.to_str().unwrap(), "audit", "sw0:1/0/1", "--expected"])
        .arg(&expected)
        .assert()
        .code(6)
        .stdout(predicate::str::contains("native 23"));
}

#[test]
fn test_revert_mock_port() {
    let (_dir, path) = setup();
    switchyard_cmd()
        .args(["--config", path.to_str().unwrap(), "revert", "sw1:Gi0/2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reverted sw1:Gi0/2"));
}
