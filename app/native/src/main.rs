#![allow(clippy::multiple_crate_versions)]

//! Draftboard - layout persistence for the writing workspace.
//!
//! Runs CLI commands, including `draftboard serve`, which the GUI spawns to
//! load and save layouts over stdin/stdout.

fn main() {
    if let Err(err) = draftboard_lib::cli::run() {
        eprintln!("draftboard: {err}");
        std::process::exit(1);
    }
}
