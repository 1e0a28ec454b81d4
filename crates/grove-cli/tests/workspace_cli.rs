//! Integration tests for `grove import`, `grove list` and `grove show`
//! that need no network.

mod common;

use predicates::prelude::*;
use tempfile::TempDir;

use common::{grove_cmd, write_config, OFFLINE_CONFIG};

#[test]
fn test_import_without_token_fails_with_hint() {
    let home = TempDir::new().expect("create temp dir");
    write_config(home.path(), OFFLINE_CONFIG);
    grove_cmd(home.path())
        .args(["import", "octo/demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No GitHub access token"))
        .stderr(predicate::str::contains("Hint:"));
}

#[test]
fn test_import_rejects_unknown_template() {
    let home = TempDir::new().expect("create temp dir");
    grove_cmd(home.path())
        .args(["import", "octo/demo", "--template", "cobol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown template kind"));
}

#[test]
fn test_import_with_unreachable_api_fails_listing() {
    let home = TempDir::new().expect("create temp dir");
    write_config(home.path(), OFFLINE_CONFIG);
    grove_cmd(home.path())
        .args(["import", "octo/demo", "--token", "ghp_test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Repository listing failed"));

    // Nothing is stored after a failed listing.
    grove_cmd(home.path())
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_list_on_empty_store() {
    let home = TempDir::new().expect("create temp dir");
    write_config(home.path(), OFFLINE_CONFIG);
    grove_cmd(home.path())
        .args(["list", "--user", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No workspaces for user `alice`"));
}

#[test]
fn test_show_unknown_workspace() {
    let home = TempDir::new().expect("create temp dir");
    write_config(home.path(), OFFLINE_CONFIG);
    grove_cmd(home.path())
        .args(["show", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Workspace `does-not-exist` not found"));
}

#[test]
fn test_unknown_store_backend_fails_engine_setup() {
    let home = TempDir::new().expect("create temp dir");
    write_config(home.path(), "store:\n  backend: postgres\n");
    grove_cmd(home.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("[err]"));
}
