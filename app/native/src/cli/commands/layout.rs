//! Layout CLI commands.
//!
//! Inspect, reset and clamp layouts without the GUI running. Commands read
//! the same storage directory and display table as `draftboard serve`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Subcommand;
use colored::Colorize;

use crate::cli::output;
use crate::config::{self, DraftboardConfig};
use crate::error::DraftboardError;
use crate::layout::floating::place_floating;
use crate::layout::{FileLayoutStore, KnownPanes, LayoutService, LayoutStore, Rect};

/// Layout subcommands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum LayoutCommands {
    /// Print the reconciled layout of a project.
    ///
    /// Unknown panes are dropped and floating windows are clamped onto the
    /// configured displays, exactly as the GUI would see them.
    #[command(after_long_help = r#"Examples:
  draftboard layout load ~/Writing/novel
  draftboard layout load ~/Writing/novel --known draft-board,history"#)]
    Load {
        /// Project path.
        project: String,

        /// Pane ids to treat as known. Defaults to `knownPanes` from the config.
        #[arg(long, value_delimiter = ',', value_name = "IDS")]
        known: Vec<String>,
    },

    /// Replace a project's layout with the default.
    Reset {
        /// Project path.
        project: String,
    },

    /// Show where a floating window would be placed.
    #[command(after_long_help = r#"Examples:
  draftboard layout clamp --x -200 --y 40 --width 480 --height 360
  draftboard layout clamp --x 3000 --y 0 --width 800 --height 600 --display 2"#)]
    Clamp {
        /// Left edge.
        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        /// Top edge.
        #[arg(long, allow_negative_numbers = true)]
        y: f64,

        /// Width.
        #[arg(long)]
        width: f64,

        /// Height.
        #[arg(long)]
        height: f64,

        /// Target display. Defaults to the display overlapping the frame most.
        #[arg(long)]
        display: Option<u32>,
    },
}

// ============================================================================
// Context
// ============================================================================

/// Configuration and storage location shared by every command.
#[derive(Debug, Clone)]
pub struct LayoutContext {
    /// Effective configuration.
    pub config: DraftboardConfig,
    /// Directory holding layout records.
    pub storage_dir: PathBuf,
}

impl LayoutContext {
    /// Builds the context from the loaded config, honouring `--storage-dir`.
    #[must_use]
    pub fn from_config(storage_override: Option<&Path>) -> Self {
        let config = config::get_config().clone();
        let storage_dir = storage_override.map_or_else(
            || config.storage_dir(config::get_config_path().map(PathBuf::as_path)),
            Path::to_path_buf,
        );
        Self { config, storage_dir }
    }

    /// Store rooted at the storage directory.
    #[must_use]
    pub fn file_store(&self) -> FileLayoutStore { FileLayoutStore::new(&self.storage_dir) }

    /// Service over `store` using the configured panes and displays.
    #[must_use]
    pub fn service<S: LayoutStore>(&self, store: S) -> LayoutService<S> {
        LayoutService::new(
            store,
            Arc::new(self.config.display_provider()),
            self.config.layout_settings(),
        )
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Executes a layout command.
///
/// # Errors
///
/// Returns an error if storage fails or the arguments are invalid.
pub async fn execute(cmd: &LayoutCommands, ctx: &LayoutContext) -> Result<(), DraftboardError> {
    match cmd {
        LayoutCommands::Load { project, known } => execute_load(ctx, project, known).await,
        LayoutCommands::Reset { project } => execute_reset(ctx, project).await,
        LayoutCommands::Clamp { x, y, width, height, display } => {
            execute_clamp(ctx, Rect::new(*x, *y, *width, *height), *display)
        }
    }
}

async fn execute_load(
    ctx: &LayoutContext,
    project: &str,
    known: &[String],
) -> Result<(), DraftboardError> {
    let known = (!known.is_empty()).then(|| KnownPanes::new(known.iter().map(String::as_str)));
    let snapshot = ctx.service(ctx.file_store()).load(project, known.as_ref()).await?;

    output::print_json(&serde_json::to_value(&snapshot)?);
    Ok(())
}

async fn execute_reset(ctx: &LayoutContext, project: &str) -> Result<(), DraftboardError> {
    ctx.service(ctx.file_store()).reset(project).await?;
    println!("{} {}", "Reset layout of".green(), project.bold());
    Ok(())
}

fn execute_clamp(
    ctx: &LayoutContext,
    requested: Rect,
    display: Option<u32>,
) -> Result<(), DraftboardError> {
    if !requested.is_finite() {
        return Err(DraftboardError::InvalidRequest(
            "frame coordinates must be finite numbers".to_string(),
        ));
    }

    let displays = ctx.config.display_provider();
    let Some(placement) =
        place_floating(Some(requested), display, &displays, &ctx.config.sizing())
    else {
        return Err(DraftboardError::ConfigError("no displays configured".to_string()));
    };

    println!("{}", output::describe_placement(&requested, &placement));
    Ok(())
}
