//! Configuration types for Draftboard.
//!
//! This module provides the configuration types and loading functionality.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::APP_NAME;
use crate::constants::layout::{
    BUILTIN_PANES, DEFAULT_FLOATING_HEIGHT, DEFAULT_FLOATING_WIDTH, MIN_PANE_HEIGHT,
    MIN_PANE_WIDTH,
};
use crate::constants::timing::SAVE_DEBOUNCE_MS;
use crate::layout::{Display, PaneSize, Rect};

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SizeConfig {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl From<SizeConfig> for PaneSize {
    fn from(size: SizeConfig) -> Self { Self::new(size.width, size.height) }
}

const fn default_minimum_pane_size() -> SizeConfig {
    SizeConfig { width: MIN_PANE_WIDTH, height: MIN_PANE_HEIGHT }
}

const fn default_floating_size() -> SizeConfig {
    SizeConfig {
        width: DEFAULT_FLOATING_WIDTH,
        height: DEFAULT_FLOATING_HEIGHT,
    }
}

fn default_known_panes() -> Vec<String> { BUILTIN_PANES.iter().map(ToString::to_string).collect() }

fn default_displays() -> Vec<Display> {
    vec![Display::new(1, Rect::new(0.0, 0.0, 1920.0, 1080.0))]
}

/// Root configuration for Draftboard.
///
/// Every field is optional; a missing file behaves like an empty object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DraftboardConfig {
    /// JSON Schema reference for editor support.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Directory where per-project layouts are stored.
    ///
    /// Supports `~`. Relative paths are resolved against the directory of the
    /// configuration file. Defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<String>,

    /// Pane ids the workspace knows about.
    ///
    /// Stored layouts referencing any other id fall back to the default layout.
    pub known_panes: Vec<String>,

    /// Smallest size a floating pane may be clamped to.
    pub minimum_pane_size: SizeConfig,

    /// Size of a floating pane opened without explicit bounds.
    pub default_floating_size: SizeConfig,

    /// Quiet period, in milliseconds, before a debounced save is written.
    pub save_debounce_ms: u64,

    /// Display table used when no window system reports displays.
    ///
    /// The first entry is the primary display.
    pub displays: Vec<Display>,
}

impl Default for DraftboardConfig {
    fn default() -> Self {
        Self {
            schema: None,
            storage_dir: None,
            known_panes: default_known_panes(),
            minimum_pane_size: default_minimum_pane_size(),
            default_floating_size: default_floating_size(),
            save_debounce_ms: SAVE_DEBOUNCE_MS,
            displays: default_displays(),
        }
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    NotFound,
    /// The configuration file exists but could not be read.
    IoError(std::io::Error),
    /// The configuration file contains invalid JSON.
    ParseError(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(
                f,
                "No configuration file found. Expected at ~/.config/draftboard/config.json \
                or ~/.draftboard.json"
            ),
            Self::IoError(err) => write!(f, "Failed to read configuration file: {err}"),
            Self::ParseError(err) => write!(f, "Failed to parse configuration file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::ParseError(err) => Some(err),
            Self::NotFound => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err) }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self { Self::ParseError(err) }
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Single-file configuration names in the home directory.
const HOME_CONFIG_FILE_NAMES: &[&str] = &[".draftboard.jsonc", ".draftboard.json"];

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/draftboard/config.jsonc` if the variable is set
/// 2. `~/.config/draftboard/config.jsonc`
/// 3. The platform configuration directory (`~/Library/Application Support` on macOS)
/// 4. `~/.draftboard.jsonc`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let push_dir = |dir: PathBuf, paths: &mut Vec<PathBuf>| {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        push_dir(PathBuf::from(xdg_config).join(APP_NAME), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join(APP_NAME), &mut paths);
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join(APP_NAME), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        for filename in HOME_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of
/// the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(DraftboardConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .map_or(Err(ConfigError::NotFound), load_config_from_path)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, and the other
/// variants for read and parse failures.
pub fn load_config_from_path(
    path: impl AsRef<Path>,
) -> Result<(DraftboardConfig, PathBuf), ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    let config: DraftboardConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}
