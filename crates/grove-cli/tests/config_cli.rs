//! Integration tests for `grove config` and top-level flags.

mod common;

use predicates::prelude::*;
use tempfile::TempDir;

use common::{grove_cmd, write_config};

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().expect("create temp dir");
    grove_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("repos"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_version_includes_package_version() {
    let home = TempDir::new().expect("create temp dir");
    grove_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_config_show_defaults_as_json() {
    let home = TempDir::new().expect("create temp dir");
    let output = grove_cmd(home.path())
        .args(["config", "show", "--json"])
        .output()
        .expect("run grove");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["github"]["apiBaseUrl"], "https://api.github.com");
    assert_eq!(value["github"]["tokenEnv"], "GITHUB_TOKEN");
    assert_eq!(value["import"]["concurrency"], 8);
    assert_eq!(value["import"]["rootFolderName"], "Root");
    assert_eq!(value["user"]["id"], "local");
}

#[test]
fn test_config_check_valid_file() {
    let home = TempDir::new().expect("create temp dir");
    write_config(home.path(), "import:\n  concurrency: 4\n");
    grove_cmd(home.path())
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[ok] Configuration is valid"));
}

#[test]
fn test_config_check_reports_warnings() {
    let home = TempDir::new().expect("create temp dir");
    write_config(home.path(), "import:\n  concurrency: 32\n");
    grove_cmd(home.path())
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[warn]"))
        .stdout(predicate::str::contains("valid with warnings"));
}

#[test]
fn test_config_check_rejects_out_of_range_concurrency() {
    let home = TempDir::new().expect("create temp dir");
    write_config(home.path(), "import:\n  concurrency: 0\n");
    grove_cmd(home.path())
        .args(["config", "check", "--json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"valid\": false"))
        .stderr(predicate::str::contains("concurrency"));
}

#[test]
fn test_config_check_rejects_malformed_yaml() {
    let home = TempDir::new().expect("create temp dir");
    write_config(home.path(), "import: [not, a, map\n");
    grove_cmd(home.path())
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn test_explicit_config_path() {
    let home = TempDir::new().expect("create temp dir");
    let path = home.path().join("custom.yaml");
    std::fs::write(&path, "user:\n  id: alice\n").expect("write config");
    grove_cmd(home.path())
        .args(["config", "show", "--json", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"alice\""));
}
