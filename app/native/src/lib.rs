//! Draftboard - pane layout persistence for a desktop writing workspace.
//!
//! Stores the docked pane tree and the floating pane windows of each project,
//! restores them against the displays that exist now, and serves the GUI over
//! a JSON-lines transport.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod layout;
pub mod logging;
pub mod schema;
pub mod utils;
