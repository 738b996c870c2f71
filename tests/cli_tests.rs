//! Binary-level CLI tests

use assert_cmd::Command;
use predicates::prelude::*;

fn voicematch() -> Command {
    Command::cargo_bin("voicematch").unwrap()
}

#[test]
fn help_lists_subcommands() {
    voicematch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("devices").and(predicate::str::contains("compare")));
}

#[test]
fn version_flag_works() {
    voicematch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("voicematch"));
}

#[test]
fn compare_requires_two_files() {
    voicematch()
        .args(["compare", "only-one.wav"])
        .assert()
        .failure();
}

#[test]
fn devices_lists_both_directions() {
    voicematch()
        .arg("devices")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Input devices:")
                .and(predicate::str::contains("Output devices:")),
        );
}
