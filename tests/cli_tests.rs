#!/usr/bin/env rust
//! Integration tests for the draupnir CLI
//!
//! These tests drive the compiled binary end to end. Human-facing chrome
//! goes to stderr, so stdout can be parsed as the report payload.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

use draupnir_rs::DraupnirConfig;

/// Test helper to get the CLI binary
fn draupnir_cmd() -> Command {
    Command::cargo_bin("draupnir").unwrap()
}

/// Two files holding the same accumulation loop under different names.
fn write_clone_pair(dir: &std::path::Path) -> std::io::Result<()> {
    fs::write(
        dir.join("orders.py"),
        "def total_order(items):\n    total = 0\n    for item in items:\n        total += item\n    return total\n",
    )?;
    fs::write(
        dir.join("billing.py"),
        "def total_invoice(entries):\n    amount = 0\n    for entry in entries:\n        amount += entry\n    return amount\n",
    )?;
    Ok(())
}

fn write_config(dir: &std::path::Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("draupnir.yml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn cli_help_command() {
    draupnir_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("structural copy-paste"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("scan"));
}

#[test]
fn cli_version_command() {
    draupnir_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("draupnir"));
}

#[test]
fn scan_help_command() {
    draupnir_cmd()
        .args(["scan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[PATHS]"))
        .stdout(predicate::str::contains("--min-run"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn scan_nonexistent_path_fails() {
    draupnir_cmd()
        .args(["scan", "/definitely/not/here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path does not exist"));
}

#[test]
fn scan_empty_directory_emits_an_empty_report() {
    let dir = tempdir().unwrap();
    let output = draupnir_cmd()
        .args(["scan", "--quiet"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["records"].as_array().unwrap().len(), 0);
    assert_eq!(report["stats"]["files_analyzed"], 0);
}

#[test]
fn scan_reports_a_renamed_pair() {
    let dir = tempdir().unwrap();
    write_clone_pair(dir.path()).unwrap();

    let output = draupnir_cmd()
        .arg("scan")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    // All chrome goes to stderr even without --quiet.
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["stats"]["files_analyzed"], 2);
    assert_eq!(report["stats"]["functions_analyzed"], 2);
    let records = report["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["run_length"], 3);
}

#[test]
fn scan_writes_markdown_reports() {
    let dir = tempdir().unwrap();
    write_clone_pair(dir.path()).unwrap();
    let out = dir.path().join("report.md");

    draupnir_cmd()
        .args(["scan", "--quiet", "--format", "markdown", "--out"])
        .arg(&out)
        .arg(dir.path())
        .assert()
        .success();

    let rendered = fs::read_to_string(&out).unwrap();
    assert!(rendered.contains("# Clone report"));
    assert!(rendered.contains("orders.py"));
}

#[test]
fn raised_run_threshold_silences_the_pair() {
    let dir = tempdir().unwrap();
    write_clone_pair(dir.path()).unwrap();

    let output = draupnir_cmd()
        .args(["scan", "--quiet", "--min-run", "10"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["records"].as_array().unwrap().len(), 0);
}

#[test]
fn dump_prints_canonical_lines() {
    let dir = tempdir().unwrap();
    write_clone_pair(dir.path()).unwrap();

    draupnir_cmd()
        .arg("dump")
        .arg(dir.path().join("orders.py"))
        .assert()
        .success()
        .stdout(predicate::str::contains("== total_order"))
        .stdout(predicate::str::contains("For item in #p0:"))
        .stdout(predicate::str::contains("total+=item"));
}

#[test]
fn print_default_config_round_trips() {
    let output = draupnir_cmd()
        .arg("print-default-config")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let parsed: DraupnirConfig = serde_yaml::from_str(&stdout).unwrap();
    assert_eq!(parsed.detection.min_run_length, 2);
    assert_eq!(parsed.detection.min_clone_weight, 20);
}

#[test]
fn validate_config_accepts_a_good_file() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "detection:\n  min_run_length: 2\n  min_clone_weight: 25\n",
    );

    draupnir_cmd()
        .args(["validate-config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("min_clone_weight: 25"));
}

#[test]
fn validate_config_rejects_zero_run_length() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "detection:\n  min_run_length: 0\n");

    draupnir_cmd()
        .args(["validate-config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn scan_rejects_broken_config_files() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "detection: [unclosed\n");

    draupnir_cmd()
        .args(["scan", "--config"])
        .arg(&path)
        .arg(dir.path())
        .assert()
        .failure();
}
