//! Path utilities for shell-like path expansion.
//!
//! Paths in the configuration file may use `~` and environment variables
//! (`$HOME/layouts`, `${XDG_DATA_HOME}/draftboard`). Relative paths are
//! resolved against the directory of the configuration file.

use std::path::{Path, PathBuf};

use crate::constants::APP_NAME;

/// Expands `~` and environment variables.
///
/// Unset variables are left as written rather than failing. Relative paths are
/// returned relative; use [`expand_and_resolve`] to anchor them.
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return PathBuf::new();
    }

    let expanded = shellexpand::full(path).unwrap_or_else(|_| shellexpand::tilde(path));
    PathBuf::from(expanded.as_ref())
}

/// Expands a path and resolves it against `base_dir` if it is still relative.
#[must_use]
pub fn expand_and_resolve(path: &str, base_dir: &Path) -> PathBuf {
    let expanded = expand(path);

    if expanded.as_os_str().is_empty() || expanded.is_absolute() {
        return expanded;
    }

    base_dir.join(expanded)
}

/// Where layouts are stored when nothing is configured.
///
/// `<data dir>/draftboard/layouts`, or a directory under the system temp dir
/// when the platform has no data directory.
#[must_use]
pub fn default_storage_dir() -> PathBuf {
    dirs::data_dir().map_or_else(
        || std::env::temp_dir().join(APP_NAME).join("layouts"),
        |data| data.join(APP_NAME).join("layouts"),
    )
}
