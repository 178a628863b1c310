//! CLI tests for the tfsculpt binary.
//!
//! These tests exercise argument parsing, the init and validate commands,
//! and a full optimize run through the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn tfsculpt() -> Command {
    Command::cargo_bin("tfsculpt").unwrap()
}

fn export_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/export")
}

#[test]
fn test_help_lists_commands() {
    tfsculpt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("optimize"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_version() {
    tfsculpt()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tfsculpt"));
}

#[test]
fn test_optimize_requires_input_dir() {
    tfsculpt().arg("optimize").assert().failure();
}

#[test]
fn test_init_creates_config_once() {
    let dir = tempfile::TempDir::new().unwrap();

    tfsculpt()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("tfsculpt.yaml"));
    assert!(dir.path().join("tfsculpt.yaml").exists());

    // A second init must not overwrite the existing file
    tfsculpt()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_validate_accepts_generated_config() {
    let dir = tempfile::TempDir::new().unwrap();
    tfsculpt()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    tfsculpt()
        .current_dir(dir.path())
        .args(["validate", "tfsculpt.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn test_validate_rejects_bad_values() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("bad.yaml"),
        "extraction:\n  partition_marker: \"\"\n",
    )
    .unwrap();

    tfsculpt()
        .current_dir(dir.path())
        .args(["validate", "bad.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_validate_missing_file_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    tfsculpt()
        .current_dir(dir.path())
        .args(["validate", "nope.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_optimize_full_export() {
    let output = tempfile::TempDir::new().unwrap();

    tfsculpt()
        .arg("optimize")
        .args(["-i", export_fixture().to_str().unwrap()])
        .args(["-o", output.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("TfSculpt Optimization"))
        .stdout(predicate::str::contains("8 passes"));

    assert!(output.path().join("environments/prod/main.tf").exists());
    assert!(output.path().join("modules/property/property.tf").exists());
}

#[test]
fn test_optimize_json_report_to_file() {
    let output = tempfile::TempDir::new().unwrap();
    let report_path = output.path().join("run.json");

    tfsculpt()
        .arg("optimize")
        .args(["-i", export_fixture().to_str().unwrap()])
        .args(["-o", output.path().join("out").to_str().unwrap()])
        .args(["--format", "json"])
        .args(["--output", report_path.to_str().unwrap()])
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["summary"]["passes_run"], 8);
    assert_eq!(report["summary"]["passes_skipped"].as_array().unwrap().len(), 0);
    assert!(report["summary"]["variables_extracted"].as_u64().unwrap() >= 9);
}

#[test]
fn test_optimize_exit_code_on_partial_export() {
    let input = tempfile::TempDir::new().unwrap();
    std::fs::copy(
        export_fixture().join("property.tf"),
        input.path().join("property.tf"),
    )
    .unwrap();
    let output = tempfile::TempDir::new().unwrap();

    tfsculpt()
        .arg("optimize")
        .args(["-i", input.path().to_str().unwrap()])
        .args(["-o", output.path().to_str().unwrap()])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("(skipped)"));
}

#[test]
fn test_missing_input_dir_is_fatal() {
    tfsculpt()
        .arg("optimize")
        .args(["-i", "/nonexistent/export"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error"));
}
