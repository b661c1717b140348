//! Integration tests for the `store` CLI binary.
//!
//! These run the actual binary against the shared fixture files and check
//! the progress lines, rendered reports, exports and exit codes.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Path to a fixture under the workspace `test/` directory.
fn fixture(path: &str) -> String {
    format!("{}/../test/{}", env!("CARGO_MANIFEST_DIR"), path)
}

fn store() -> Command {
    let mut cmd = Command::cargo_bin("store").unwrap();
    cmd.env_remove("STORE_REPORT_DEPTH")
        .env_remove("STORE_MAX_NESTING");
    cmd
}

#[test]
fn parses_single_file() {
    store()
        .arg(fixture("store/nested.store"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsing file 1 out of 1 from '"))
        .stdout(predicate::str::contains(
            "succeeded to parse store at line 8, column 1: parsed value store of type map",
        ))
        .stdout(predicate::str::contains("\tsucceeded to parse value at line"))
        .stdout(predicate::str::contains(
            "Successfully parsed 1 out of 1 file(s) (100.00%) overall.",
        ));
}

#[test]
fn failing_file_sets_exit_code() {
    store()
        .arg(fixture("nay/unclosed-map.store"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("failed to parse store at line 1, column 1"))
        .stdout(predicate::str::contains(
            "Successfully parsed 0 out of 1 file(s) (0.00%) overall.",
        ))
        .stderr(predicate::str::contains(
            "ending character must be '}', but got end of input",
        ));
}

#[test]
fn unreadable_file_counts_as_failure() {
    store()
        .args([fixture("store/scalar-int.store"), fixture("store/missing.store")])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read file 2 out of 2 from '"))
        .stdout(predicate::str::contains(
            "Successfully parsed 1 out of 2 file(s) (50.00%) overall.",
        ));
}

#[test]
fn quiet_prints_outcome_only() {
    store()
        .arg("-q")
        .arg(fixture("store/nested.store"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "': succeeded to parse store at line 8, column 1: parsed value store of type map\n",
        ))
        .stdout(predicate::str::contains("\tsucceeded").not());
}

#[test]
fn depth_zero_collapses_report() {
    store()
        .args(["--depth", "0"])
        .arg(fixture("store/scalar-int.store"))
        .assert()
        .success()
        .stdout(predicate::str::contains("nested reports omitted"))
        .stdout(predicate::str::contains("\tsucceeded").not());
}

#[test]
fn depth_from_environment() {
    store()
        .env("STORE_REPORT_DEPTH", "0")
        .arg(fixture("store/scalar-int.store"))
        .assert()
        .success()
        .stdout(predicate::str::contains("nested reports omitted"));
}

#[test]
fn exports_json() {
    store()
        .args(["-q", "--to", "json"])
        .arg(fixture("store/nested.store"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"enabled\": \"yes\""))
        .stdout(predicate::str::contains("\"host\": \"localhost\""));
}

#[test]
fn exports_entries_as_json() {
    store()
        .args(["-q", "-t", "json"])
        .arg(fixture("store/duplicate-keys.store"))
        .assert()
        .success()
        .stdout(predicate::str::contains("{\n  \"a\": 2,\n  \"b\": \"x\"\n}\n"));
}

#[test]
fn max_nesting_flag() {
    store()
        .args(["--max-nesting", "1"])
        .arg(fixture("store/nested.store"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nesting deeper than 1 levels"));
}

#[test]
fn max_nesting_flag_above_limit_is_rejected() {
    store()
        .args(["--max-nesting", "1000000"])
        .arg(fixture("store/nested.store"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("must be at most 512"));
}

#[test]
fn huge_env_nesting_is_clamped() {
    let path = format!("{}/deep.store", env!("CARGO_TARGET_TMPDIR"));
    std::fs::write(&path, format!("{}{}", "[".repeat(20_000), "]".repeat(20_000))).unwrap();
    store()
        .env("STORE_MAX_NESTING", "1000000")
        .args(["-q", "--depth", "0"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nesting deeper than 512 levels"));
}

#[test]
fn requires_files() {
    store().assert().code(2);
}

#[test]
fn rejects_unknown_format() {
    store()
        .args(["-t", "xml"])
        .arg(fixture("store/scalar-int.store"))
        .assert()
        .code(2);
}
