//! End-to-end CLI tests driving the `rumdl` binary directly, as opposed to
//! the library's own unit tests.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn rumdl() -> Command {
    Command::cargo_bin("rumdl").unwrap()
}

#[test]
fn check_clean_file_exits_zero() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("clean.md");
    fs::write(&file, "# Title\n\nSome text.\n").unwrap();

    rumdl()
        .arg("check")
        .arg(&file)
        .assert()
        .success();
}

#[test]
fn check_reports_issues_and_exits_one() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("dirty.md");
    fs::write(&file, "# Title   \n\nSome text.\n").unwrap();

    rumdl()
        .arg("check")
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("MD009"));
}

#[test]
fn check_fix_rewrites_file_and_leaves_backup() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("dirty.md");
    fs::write(&file, "# Title   \n\nSome text.\n").unwrap();

    rumdl().arg("check").arg(&file).arg("--fix").assert().success();

    let fixed = fs::read_to_string(&file).unwrap();
    assert_eq!(fixed, "# Title\n\nSome text.\n");

    let backup = dir.path().join("dirty.md.bak");
    assert!(backup.is_file(), "expected a sidecar backup to be written");
}

#[test]
fn check_fix_with_no_backups_skips_sidecar() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("dirty.md");
    fs::write(&file, "# Title   \n\nSome text.\n").unwrap();

    rumdl()
        .arg("check")
        .arg(&file)
        .arg("--fix")
        .arg("--no-backups")
        .assert()
        .success();

    let backup = dir.path().join("dirty.md.bak");
    assert!(!backup.exists());
}

#[test]
fn check_dry_run_does_not_write() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("dirty.md");
    let original = "# Title   \n\nSome text.\n";
    fs::write(&file, original).unwrap();

    rumdl()
        .arg("check")
        .arg(&file)
        .arg("--fix")
        .arg("--dry-run")
        .arg("--format")
        .arg("diff")
        .assert()
        .success()
        .stdout(predicate::str::contains("-# Title   "));

    assert_eq!(fs::read_to_string(&file).unwrap(), original);
}

#[test]
fn check_disable_rule_suppresses_its_diagnostics() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("dirty.md");
    fs::write(&file, "# Title   \n\nSome text.\n").unwrap();

    rumdl()
        .arg("check")
        .arg(&file)
        .arg("--disable")
        .arg("MD009")
        .assert()
        .success();
}

#[test]
fn check_missing_path_errors() {
    rumdl()
        .arg("check")
        .arg("/nonexistent/path/does-not-exist.md")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn rules_lists_known_rule_ids() {
    rumdl()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("MD001"))
        .stdout(predicate::str::contains("MD009"));
}

#[test]
fn import_migrates_markdownlint_json_config() {
    let dir = tempdir().unwrap();
    let source = dir.path().join(".markdownlint.json");
    fs::write(&source, r#"{ "MD013": false, "MD009": { "br_spaces": 3 } }"#).unwrap();

    let output = dir.path().join("rumdl.yml");
    rumdl()
        .arg("import")
        .arg(&source)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert!(output.is_file());
    let contents = fs::read_to_string(&output).unwrap();
    assert!(contents.contains("MD013") || contents.contains("md013"));
}
