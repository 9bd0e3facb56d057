//! Application-wide constants.

/// Application name used for config directories and log prefixes.
pub const APP_NAME: &str = "draftboard";

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "DRAFTBOARD_LOG";

/// Layout defaults.
pub mod layout {
    /// Schema version written by every save.
    pub const CURRENT_SCHEMA_VERSION: u32 = 2;

    /// Schema version assumed for records that carry no version tag.
    pub const LEGACY_SCHEMA_VERSION: u32 = 1;

    /// Minimum width of a floating pane window.
    pub const MIN_PANE_WIDTH: f64 = 240.0;

    /// Minimum height of a floating pane window.
    pub const MIN_PANE_HEIGHT: f64 = 180.0;

    /// Width given to a floating pane opened without bounds.
    pub const DEFAULT_FLOATING_WIDTH: f64 = 480.0;

    /// Height given to a floating pane opened without bounds.
    pub const DEFAULT_FLOATING_HEIGHT: f64 = 360.0;

    /// Deepest split nesting accepted from stored or submitted trees.
    pub const MAX_TREE_DEPTH: usize = 64;

    /// Panes shipped with the current version of the workspace.
    pub const BUILTIN_PANES: [&str; 5] =
        ["wizard", "draft-board", "critique", "history", "analytics"];
}

/// Timing constants.
pub mod timing {
    /// Quiet period before a debounced layout save is flushed.
    pub const SAVE_DEBOUNCE_MS: u64 = 300;
}
