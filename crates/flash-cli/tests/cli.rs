//! The `flash` binary's argument handling and prebundle command.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[allow(deprecated)]
fn flash() -> Command {
    let mut cmd = Command::cargo_bin("flash").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    flash()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dev"))
        .stdout(predicate::str::contains("prebundle"));
}

#[test]
fn prebundle_rejects_relative_specifier() {
    flash()
        .args(["prebundle", "./local"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a package specifier"));
}

#[test]
fn prebundle_missing_package_fails() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("node_modules")).unwrap();

    flash()
        .args(["prebundle", "missing-pkg", "--root"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing-pkg"));

    assert!(
        !temp
            .path()
            .join("node_modules/.flash/deps/missing-pkg.js")
            .exists()
    );
}

#[test]
fn dev_rejects_missing_root() {
    flash()
        .args(["dev", "--root", "/definitely/not/a/flash/project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn dev_rejects_missing_config_file() {
    let temp = TempDir::new().unwrap();
    flash()
        .args(["dev", "--root"])
        .arg(temp.path())
        .args(["--config", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
