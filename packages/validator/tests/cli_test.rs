//! Command-line tests for the `sps-validator` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture(dir: &str, name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(dir)
        .join(name)
}

fn validator() -> Command {
    let mut cmd = Command::cargo_bin("sps-validator").unwrap();
    cmd.env_remove("SPS_VALIDATOR_MODE")
        .env_remove("SPS_SIMILARITY_THRESHOLD")
        .env_remove("RUST_LOG");
    cmd
}

/// A package directory holding copies of the named fixture files.
fn package_with(files: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in files {
        fs::copy(fixture("package", file), dir.path().join(file)).unwrap();
    }
    dir
}

#[test]
fn test_validate_clean_package_is_accepted() {
    let dir = package_with(&["a01.xml", "r02.xml", "a04.xml"]);

    validator()
        .args(["validate", "--mode", "registration"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Documents: 3"))
        .stdout(predicate::str::contains("Accepted"));
}

#[test]
fn test_validate_unparsable_package_is_rejected() {
    let dir = package_with(&["a01.xml", "broken.xml"]);

    validator()
        .arg("validate")
        .arg(dir.path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Invalid XML files"))
        .stdout(predicate::str::contains("Rejected"));
}

#[test]
fn test_validate_json_with_registered_issue() {
    let registered = fixture("registered", "");
    let dir = package_with(&["a01.xml", "r02.xml", "a04.xml"]);

    validator()
        .args(["validate", "--format", "json", "--registered"])
        .arg(&registered)
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name_changes\""))
        .stdout(predicate::str::contains("\"previous_name\": \"r01\""))
        .stdout(predicate::str::contains("\"accepted\": true"));
}

#[test]
fn test_validate_missing_directory_fails() {
    let dir = TempDir::new().unwrap();

    validator()
        .arg("validate")
        .arg(dir.path().join("missing"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid package path"));
}

#[test]
fn test_validate_rejects_invalid_mode() {
    let dir = package_with(&["a01.xml"]);

    validator()
        .args(["validate", "--mode", "final"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid validation mode"));
}

#[test]
fn test_inspect_prints_metadata() {
    validator()
        .args(["inspect", "--format", "text"])
        .arg(fixture("package", "a04.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Order: 00004"))
        .stdout(predicate::str::contains("Pages: 21-30"));
}

#[test]
fn test_inspect_yaml() {
    validator()
        .arg("inspect")
        .arg(fixture("package", "a01.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("doi: 10.1590/1519-6984.00001"));
}
