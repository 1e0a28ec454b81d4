//! Shared test utilities for grove-cli integration tests.

use std::fs;
use std::path::Path;

use assert_cmd::Command;

/// A `grove` command isolated in `home`: no inherited token, config or color.
#[allow(deprecated)]
pub fn grove_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("grove").expect("grove binary should exist");
    cmd.env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GROVE_CONFIG")
        .env_remove("GROVE_USER")
        .env_remove("GROVE_COLOR")
        .env_remove("GROVE_VERBOSE")
        .env_remove("GROVE_QUIET");
    cmd
}

/// Write `~/.grove/config.yaml` under `home`.
pub fn write_config(home: &Path, yaml: &str) {
    let dir = home.join(".grove");
    fs::create_dir_all(&dir).expect("create config dir");
    fs::write(dir.join("config.yaml"), yaml).expect("write config");
}

/// Config pointing GitHub at a closed local port.
pub const OFFLINE_CONFIG: &str = "github:\n  apiBaseUrl: http://127.0.0.1:9\n";
