//! # lancedock CLI
//!
//! Command-line interface for inspecting LanceDB tables written by
//! `lancedock-core` and the components a plugin configuration registers.
//! Run `lancedock --help` for usage information.

mod cli;
mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
