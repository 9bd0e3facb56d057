//! Tracing subscriber setup.
//!
//! Logs always go to stderr; stdout carries command output and the JSON-lines
//! transport.

use tracing_subscriber::EnvFilter;

use crate::constants::LOG_ENV_VAR;

/// Builds the filter from `DRAFTBOARD_LOG`, then `RUST_LOG`, then `default`.
#[must_use]
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs the global subscriber.
///
/// `verbose` lowers the default level to `debug`. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let filter = env_filter(if verbose { "debug" } else { "info" });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
