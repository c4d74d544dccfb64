//! Integration tests for the `cpmp` binary

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const TWO_PAIRS: &str = "\
# two tight pairs
4 2
0 1 4 4
1 0 3 5
4 3 0 1
4 5 1 0
1 1 1 1
2 2 2 2
";

fn write_instance(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("pairs.cpmp");
    std::fs::write(&path, TWO_PAIRS).unwrap();
    path
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("cpmp");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("solve"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("bound"));
}

#[test]
fn test_solve_plain_output() {
    let dir = TempDir::new().unwrap();
    let path = write_instance(&dir);

    let mut cmd = cargo_bin_cmd!("cpmp");
    cmd.args(["--log-level", "warn", "solve"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Optimal"))
        .stdout(predicate::str::contains("Objective"))
        .stdout(predicate::str::contains("MEDIAN"));
}

#[test]
fn test_solve_json_output_and_file() {
    let dir = TempDir::new().unwrap();
    let path = write_instance(&dir);
    let out = dir.path().join("out").join("solution.json");

    let assert = cargo_bin_cmd!("cpmp")
        .args(["--log-level", "error", "solve", "--format", "json", "--out"])
        .arg(&out)
        .arg(&path)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["status"], "Optimal");
    assert_eq!(json["objective"], 2.0);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["clusters"].as_array().unwrap().len(), 2);
}

#[test]
fn test_solve_lp_relaxation_flag() {
    let dir = TempDir::new().unwrap();
    let path = write_instance(&dir);

    cargo_bin_cmd!("cpmp")
        .args(["--log-level", "error", "solve", "--lp-relaxation", "--format", "json"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("root_lp_bound"));
}

#[test]
fn test_inspect_reports_sizes() {
    let dir = TempDir::new().unwrap();
    let path = write_instance(&dir);

    cargo_bin_cmd!("cpmp")
        .arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Locations"))
        .stdout(predicate::str::contains("Worst-case cost"));
}

#[test]
fn test_bound_prints_compact_bound() {
    let dir = TempDir::new().unwrap();
    let path = write_instance(&dir);

    cargo_bin_cmd!("cpmp")
        .args(["--log-level", "error", "bound"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Compact LP bound"));
}

#[test]
fn test_missing_instance_fails() {
    cargo_bin_cmd!("cpmp")
        .args(["solve", "does/not/exist.cpmp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_malformed_instance_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.cpmp");
    std::fs::write(&path, "3 1\n0 1\n").unwrap();

    cargo_bin_cmd!("cpmp")
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure();
}
