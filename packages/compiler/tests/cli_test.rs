//! Command-line behavior of the `bdd-k6` binary.

#![allow(deprecated)] // Command::cargo_bin

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

fn bdd_k6() -> Command {
    let mut cmd = Command::cargo_bin("bdd-k6").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_list_steps() {
    bdd_k6()
        .arg("--list-steps")
        .assert()
        .success()
        .stdout(predicate::str::contains("Step definitions:"))
        .stdout(predicate::str::contains("user searches for"))
        .stdout(predicate::str::contains("setup"));
}

#[test]
fn test_parse_only_prints_json_and_writes_nothing() {
    let temp_dir = tempdir().unwrap();
    let output_dir = temp_dir.path().join("generated");

    let assert = bdd_k6()
        .arg(fixtures_dir())
        .arg("--parse-only")
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let features = json.as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["scenarios"].as_array().unwrap().len(), 2);
    assert_eq!(
        features[0]["scenarios"][0]["parameters"]["searchTerm"],
        "laptop"
    );
    assert!(!output_dir.exists());
}

#[test]
fn test_generate_only_writes_scripts() {
    let temp_dir = tempdir().unwrap();
    let output_dir = temp_dir.path().join("generated");

    bdd_k6()
        .arg(fixture("search.feature"))
        .arg("--generate-only")
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated"));

    let mut names: Vec<String> = fs::read_dir(&output_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "búsqueda-bajo-carga-load-test-row-1.js",
            "búsqueda-bajo-carga-load-test-row-2.js",
        ]
    );
}

#[test]
fn test_generate_only_reports_unrecognized_steps() {
    let temp_dir = tempdir().unwrap();

    bdd_k6()
        .arg(fixture("smoke.feature"))
        .arg("--generate-only")
        .arg("-o")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Unrecognized steps:"))
        .stdout(predicate::str::contains("the moon turns blue"));
}

#[test]
fn test_tag_filter_with_no_match_fails() {
    let temp_dir = tempdir().unwrap();

    bdd_k6()
        .arg(fixture("smoke.feature"))
        .arg("--generate-only")
        .arg("--tags")
        .arg("nonexistent")
        .arg("-o")
        .arg(temp_dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No scenarios to generate"));
}

#[test]
fn test_missing_target_exits_one() {
    bdd_k6()
        .arg("does/not/exist.feature")
        .arg("--parse-only")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("does/not/exist.feature"));
}

#[test]
fn test_invalid_env_pair_exits_one() {
    bdd_k6()
        .arg(fixture("search.feature"))
        .arg("--parse-only")
        .arg("--env")
        .arg("not-a-pair")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid environment pair"));
}

#[test]
fn test_missing_engine_binary_exits_one() {
    let temp_dir = tempdir().unwrap();

    bdd_k6()
        .arg(fixture("search.feature"))
        .arg("-o")
        .arg(temp_dir.path())
        .arg("--k6-binary")
        .arg(temp_dir.path().join("no-such-k6"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to start"));
}

#[cfg(unix)]
#[test]
fn test_engine_lost_mid_run_prints_partial_summary() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = tempdir().unwrap();
    // Succeeds once, then removes itself so the next start fails.
    let engine = temp_dir.path().join("k6-once");
    fs::write(&engine, "#!/bin/sh\nrm -f \"$0\"\nexit 0\n").unwrap();
    fs::set_permissions(&engine, fs::Permissions::from_mode(0o755)).unwrap();

    bdd_k6()
        .arg(fixture("search.feature"))
        .arg("-o")
        .arg(temp_dir.path().join("generated"))
        .arg("--k6-binary")
        .arg(&engine)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Summary"))
        .stdout(predicate::str::contains("1 passed, 0 failed, 1 total"))
        .stderr(predicate::str::contains("Failed to start"));
}
