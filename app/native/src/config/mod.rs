//! Configuration module for Draftboard.
//!
//! This module provides configuration types and loading functionality.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod types;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use types::{
    ConfigError, DraftboardConfig, SizeConfig, config_paths, load_config as load_config_default,
    load_config_from_path,
};

use crate::layout::{KnownPanes, LayoutSettings, PaneSizing, StaticDisplays};
use crate::utils::path::{default_storage_dir, expand_and_resolve};

/// Global configuration instance, loaded once at startup.
static CONFIG: OnceLock<DraftboardConfig> = OnceLock::new();

/// Path to the currently loaded configuration file.
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Custom config path override (set via CLI --config flag).
static CUSTOM_CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Sets a custom configuration file path to use instead of the default search paths.
///
/// This must be called before `init()` or `get_config()` to take effect.
///
/// Returns `false` if a path was already set.
pub fn set_custom_config_path(path: PathBuf) -> bool { CUSTOM_CONFIG_PATH.set(path).is_ok() }

/// Loads the configuration from disk.
///
/// Returns the loaded configuration, or the defaults if no file exists or the
/// file cannot be used.
fn load_or_default() -> DraftboardConfig {
    let result = CUSTOM_CONFIG_PATH.get().map_or_else(load_config_default, load_config_from_path);

    match result {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "config: loaded configuration");
            let _ = CONFIG_PATH.set(path);
            config
        }
        Err(ConfigError::NotFound) => {
            tracing::debug!("config: no configuration file, using defaults");
            DraftboardConfig::default()
        }
        Err(err) => {
            tracing::warn!(error = %err, "config: failed to load configuration, using defaults");
            DraftboardConfig::default()
        }
    }
}

/// Initializes and returns the global configuration instance.
///
/// This function is idempotent - calling it multiple times will return
/// the same configuration instance.
pub fn init() -> &'static DraftboardConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the global configuration instance, initializing it if necessary.
pub fn get_config() -> &'static DraftboardConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the path to the loaded configuration file, if any.
pub fn get_config_path() -> Option<&'static PathBuf> { CONFIG_PATH.get() }

impl DraftboardConfig {
    /// Directory holding per-project layout records.
    ///
    /// Relative `storageDir` values are resolved against the directory of
    /// `config_path`, or the working directory when there is none.
    #[must_use]
    pub fn storage_dir(&self, config_path: Option<&Path>) -> PathBuf {
        let Some(raw) = self.storage_dir.as_deref().filter(|dir| !dir.trim().is_empty()) else {
            return default_storage_dir();
        };

        let base = config_path.and_then(Path::parent).unwrap_or_else(|| Path::new("."));
        expand_and_resolve(raw, base)
    }

    /// The configured pane ids, or the built-in set when the list is empty.
    #[must_use]
    pub fn known_panes(&self) -> KnownPanes {
        if self.known_panes.is_empty() {
            tracing::warn!("config: knownPanes is empty, using built-in panes");
            return KnownPanes::builtin();
        }
        KnownPanes::new(self.known_panes.iter().map(String::as_str))
    }

    /// Size floor and default floating size.
    #[must_use]
    pub fn sizing(&self) -> PaneSizing {
        PaneSizing {
            minimum: self.minimum_pane_size.into(),
            default_floating: self.default_floating_size.into(),
        }
    }

    /// The configured display table.
    #[must_use]
    pub fn display_provider(&self) -> StaticDisplays { StaticDisplays::new(self.displays.clone()) }

    /// Settings handed to the layout service.
    #[must_use]
    pub fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings {
            known_panes: self.known_panes(),
            sizing: self.sizing(),
        }
    }
}
