//! CLI integration tests
//!
//! Run the `modcheck` binary against the sample build in tests/fixtures.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn sample() -> String {
    fixtures_path()
        .join("sample/graph.yml")
        .to_string_lossy()
        .to_string()
}

fn modcheck() -> Command {
    let mut cmd = Command::cargo_bin("modcheck").expect("binary is built");
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    modcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("depth"))
        .stdout(predicate::str::contains("explain"));
}

#[test]
fn test_version() {
    modcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_descriptor_fails() {
    modcheck()
        .args(["check", "/nonexistent/graph.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("graph.yml"));
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_terminal_output() {
    modcheck()
        .args(["check", &sample()])
        .assert()
        .success()
        .stdout(predicate::str::contains(":feature"))
        .stdout(predicate::str::contains("implementation(:legacy)"))
        .stdout(predicate::str::contains("MC002"))
        .stdout(predicate::str::contains("Summary:"));
}

#[test]
fn test_check_json_output() {
    let output = modcheck()
        .args(["check", &sample(), "--format", "json", "--quiet"])
        .output()
        .expect("Failed to run modcheck");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(json["modules_analyzed"], 5);
    assert_eq!(json["total_findings"], 6);
    assert_eq!(json["summary"]["by_rule"]["unused-dependency"], 1);
    assert_eq!(json["summary"]["by_rule"]["unused-kapt-plugin"], 1);
    assert_eq!(json["summary"]["errors"], 1);

    let findings = json["findings"].as_array().expect("findings array");
    assert!(findings
        .iter()
        .any(|f| f["code"] == "MC002" && f["dependency"] == ":ui" && f.get("source").is_none()));
    assert!(findings
        .iter()
        .any(|f| f["code"] == "MC003" && f["dependency"] == ":core" && f["source"] == ":ui"));
    assert!(findings
        .iter()
        .any(|f| f["code"] == "MC005" && f["module"] == ":feature"));
}

#[test]
fn test_check_json_to_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = temp_dir.path().join("report.json");

    modcheck()
        .args(["check", &sample(), "--format", "json", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("\"total_findings\": 6"));
}

#[test]
fn test_fail_on_findings() {
    modcheck()
        .args(["check", &sample(), "--fail-on-findings"])
        .assert()
        .code(1);
}

#[test]
fn test_config_file() {
    let config = fixtures_path().join("sample/strict.modcheck.yml");
    let output = modcheck()
        .args(["check", &sample(), "--format", "json", "--quiet", "--config"])
        .arg(&config)
        .output()
        .expect("Failed to run modcheck");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_findings"], 3);
    assert!(json.get("depths").is_none());
}

// ============================================================================
// depth and explain
// ============================================================================

#[test]
fn test_depth_of_module() {
    modcheck()
        .args(["depth", &sample(), "--module", ":app"])
        .assert()
        .success()
        .stdout(predicate::str::contains(":app (main) has depth 3"))
        .stdout(predicate::str::contains(":app → :feature → :ui → :core"));
}

#[test]
fn test_depth_of_every_module() {
    modcheck()
        .args(["depth", &sample()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deepest modules:"))
        .stdout(predicate::str::contains("No dependency issues"));
}

#[test]
fn test_explain_inherited_dependency() {
    modcheck()
        .args(["explain", &sample(), ":feature", "--dependency", ":core"])
        .assert()
        .success()
        .stdout(predicate::str::contains(":feature gets :core through"))
        .stdout(predicate::str::contains(":ui"));
}

#[test]
fn test_explain_direct_dependency() {
    modcheck()
        .args(["explain", &sample(), ":app", "--dependency", ":feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains(":app declares :feature directly as implementation"));
}

#[test]
fn test_explain_symbol() {
    modcheck()
        .args(["explain", &sample(), ":feature", "--symbol", "core.Widget"])
        .assert()
        .success()
        .stdout(predicate::str::contains("core.Widget is declared in :core"));

    modcheck()
        .args(["explain", &sample(), ":app", "--symbol", "core.Widget"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not declared anywhere"));
}

#[test]
fn test_explain_needs_a_target() {
    modcheck()
        .args(["explain", &sample(), ":app"])
        .assert()
        .failure();
}
