//! CLI binary smoke tests
//!
//! Exercises argument handling of the compiled binary without touching the
//! network: help output and the required `--client-id` flag.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_flags() {
    Command::cargo_bin("spottoken")
        .expect("binary must build")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--client-id"))
        .stdout(predicate::str::contains("--scope"))
        .stdout(predicate::str::contains("--client-secret"));
}

#[test]
fn test_missing_client_id_fails() {
    Command::cargo_bin("spottoken")
        .expect("binary must build")
        .env_remove("SPOTIFY_CLIENT_ID")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--client-id"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("spottoken")
        .expect("binary must build")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("spottoken"));
}
