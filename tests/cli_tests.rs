//! CLI integration tests using the REAL hostprep binary

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn hostprep_cmd() -> Command {
    Command::cargo_bin("hostprep").unwrap()
}

#[test]
fn test_help_output() {
    hostprep_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("model-serving"))
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_version_output() {
    hostprep_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hostprep"))
        .stdout(predicate::str::contains("Build info"));
}

#[test]
fn test_provision_help_shows_flags() {
    hostprep_cmd()
        .args(["provision", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--yes"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_unknown_subcommand_fails() {
    hostprep_cmd().arg("deprovision").assert().failure();
}

#[test]
fn test_completions_bash() {
    hostprep_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hostprep"));
}

#[test]
fn test_completions_unknown_shell_fails() {
    hostprep_cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown shell"));
}
