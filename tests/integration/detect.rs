//! Detection behavior through the real binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn unipm() -> Command {
    Command::cargo_bin("unipm").expect("unipm binary should build")
}

#[test]
fn help_lists_all_subcommands() {
    unipm()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("remove"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("exec"))
        .stdout(predicate::str::contains("detect"))
        .stdout(predicate::str::contains("update-self"));
}

#[test]
fn version_flag_prints_version() {
    unipm()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn detect_reports_missing_package_json() {
    let project = TempDir::new().unwrap();

    unipm()
        .arg("detect")
        .current_dir(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No package manager detected"))
        .stdout(predicate::str::contains("No package.json file found"));
}

#[test]
fn detect_honors_package_manager_field() {
    let project = TempDir::new().unwrap();
    std::fs::write(
        project.path().join("package.json"),
        r#"{"packageManager": "pnpm@9.1.0"}"#,
    )
    .unwrap();

    unipm()
        .arg("detect")
        .current_dir(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("pnpm"))
        .stdout(predicate::str::contains("package.json"));
}

#[test]
fn detect_reads_lockfiles() {
    let project = TempDir::new().unwrap();
    std::fs::write(project.path().join("package.json"), "{}").unwrap();
    std::fs::write(project.path().join("yarn.lock"), "").unwrap();

    unipm()
        .arg("detect")
        .current_dir(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("yarn"))
        .stdout(predicate::str::contains("Found yarn.lock"));
}
