//! CLI command definitions using Clap.
//!
//! - `layout` - Inspect, reset and clamp stored layouts
//! - `serve` - JSON-lines transport used by the GUI

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::DraftboardError;
use crate::layout::MemoryLayoutStore;
use crate::schema::{self, SchemaTarget};
use crate::{config, logging};

pub mod layout;
pub mod serve;

pub use layout::{LayoutCommands, LayoutContext};

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Draftboard CLI - pane layout persistence for the writing workspace.
#[derive(Parser, Debug)]
#[command(name = "draftboard")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Directory holding layout records.
    ///
    /// Overrides `storageDir` from the configuration file.
    #[arg(long, global = true, value_name = "DIR", env = "DRAFTBOARD_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Layout inspection commands.
    #[command(subcommand)]
    Layout(LayoutCommands),

    /// Serve layout requests over stdin/stdout.
    ///
    /// Reads one JSON request per line and writes one JSON reply per line.
    /// Run `draftboard schema --target requests` for the request format.
    Serve {
        /// Keep layouts in memory only. Nothing is read from or written to disk.
        #[arg(long)]
        ephemeral: bool,

        /// Acknowledge saves immediately and write them once a project is quiet.
        #[arg(long)]
        debounce: bool,
    },

    /// Output a JSON Schema.
    ///
    /// Describes the layout record, the configuration file, or the requests
    /// accepted by `serve`.
    Schema {
        /// Document to describe.
        #[arg(long, short, value_enum, default_value_t = SchemaTarget::Record)]
        target: SchemaTarget,
    },

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    ///
    /// Usage:
    ///   eval "$(draftboard completions --shell zsh)"
    ///   draftboard completions --shell fish > ~/.config/fish/completions/draftboard.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_ref().map(PathBuf::from) }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), DraftboardError> {
        logging::init(self.verbose);

        if let Some(path_buf) = self.config_path() {
            if !path_buf.exists() {
                return Err(DraftboardError::ConfigError(format!(
                    "Configuration file not found: {}",
                    path_buf.display()
                )));
            }
            config::set_custom_config_path(path_buf);
        }

        let config = config::init();
        tracing::debug!(known_panes = config.known_panes.len(), "config: loaded");

        match &self.command {
            Commands::Layout(cmd) => {
                let ctx = LayoutContext::from_config(self.storage_dir.as_deref());
                runtime()?.block_on(layout::execute(cmd, &ctx))
            }

            Commands::Serve { ephemeral, debounce } => {
                let ctx = LayoutContext::from_config(self.storage_dir.as_deref());
                let settle =
                    debounce.then(|| Duration::from_millis(ctx.config.save_debounce_ms));

                if *ephemeral {
                    tracing::info!("serve: ephemeral session, layouts stay in memory");
                    let service = ctx.service(MemoryLayoutStore::new());
                    runtime()?.block_on(serve::execute(service, settle))
                } else {
                    tracing::info!(
                        storage = %ctx.storage_dir.display(),
                        "serve: using storage directory"
                    );
                    runtime()?.block_on(serve::execute(ctx.service(ctx.file_store()), settle))
                }
            }

            Commands::Schema { target } => {
                println!("{}", schema::print_schema(*target));
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "draftboard", &mut io::stdout());
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, DraftboardError> {
    Ok(tokio::runtime::Builder::new_current_thread().enable_all().build()?)
}
