//! CLI module for Draftboard.
//!
//! Provides the `layout` inspection commands, the `serve` transport used by
//! the GUI, and schema and completion generation.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::DraftboardError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), DraftboardError> {
    let cli = Cli::parse();
    cli.execute()
}
