//! # grove CLI
//!
//! Command-line front end for `grove-core`: import a GitHub repository into a
//! workspace and inspect the stored workspaces.
//!
//! Run `grove --help` for usage information.

mod cli;
pub mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
