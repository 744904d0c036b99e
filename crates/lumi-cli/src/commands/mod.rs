//! CLI command definitions and handlers.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use lumi_core::config::Config;
use lumi_core::content::DirectoryContentEngine;
use lumi_core::controller::{ControllerBuilder, LumiController};
use lumi_core::pickers::FilePickers;
use lumi_core::state::StateStore;

/// Load configuration with graceful fallback to defaults.
///
/// If the config file doesn't exist or can't be parsed, it falls back to defaults.
pub fn load_config() -> Config {
    Config::load().unwrap_or_default()
}

/// Start a controller over the configured content directory and state file.
pub fn controller_builder(config: &Config, pickers: Arc<dyn FilePickers>) -> ControllerBuilder {
    let state = StateStore::load_from(config.paths.state_file.clone()).unwrap_or_else(|e| {
        tracing::warn!("Starting with fresh UI state: {}", e);
        StateStore::new()
    });
    let engine = DirectoryContentEngine::new(&config.paths.content_dir);

    LumiController::builder(Arc::new(engine), pickers)
        .with_state(Arc::new(state))
        .with_export_config(config.export.clone())
}

pub mod config;
pub mod content;
pub mod export;
pub mod import;
#[cfg(feature = "web")]
pub mod serve;

/// Lumi - offline H5P content bridge
#[derive(Parser)]
#[command(name = "lumi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand)]
pub enum Command {
    /// List stored content
    List(ListArgs),

    /// Show content as the editor loads it
    Show(ShowArgs),

    /// Create or update content from JSON files
    Update(UpdateArgs),

    /// Delete stored content
    Delete(DeleteArgs),

    /// Export content as an H5P package
    Export(ExportArgs),

    /// Import H5P packages as new content
    Import(ImportArgs),

    /// Serve the local bridge for the editor UI
    #[cfg(feature = "web")]
    Serve(ServeArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the list command
#[derive(Parser)]
pub struct ListArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the show command
#[derive(Parser)]
pub struct ShowArgs {
    /// Content id
    pub id: String,
}

/// Arguments for the update command
#[derive(Parser)]
pub struct UpdateArgs {
    /// JSON file with the content parameters
    #[arg(long)]
    pub params: PathBuf,

    /// JSON file with the package metadata (h5p.json)
    #[arg(long)]
    pub metadata: PathBuf,

    /// Main library ubername, e.g. "H5P.MultiChoice 1.16"
    #[arg(long)]
    pub library: String,

    /// Content id to update; creates new content when omitted
    #[arg(long)]
    pub id: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the delete command
#[derive(Parser)]
pub struct DeleteArgs {
    /// Content id
    pub id: String,
}

/// Arguments for the export command
#[derive(Parser)]
pub struct ExportArgs {
    /// Content id
    pub id: String,

    /// Write to this path instead of asking
    #[arg(short, long)]
    pub to: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the import command
#[derive(Parser)]
pub struct ImportArgs {
    /// Packages to import; asks for files when omitted
    pub files: Vec<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the serve command
#[cfg(feature = "web")]
#[derive(Parser)]
pub struct ServeArgs {
    /// Port to listen on (defaults to the configured port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Listen on all interfaces instead of localhost only
    #[arg(long)]
    pub public: bool,
}

/// Arguments for the config command
#[derive(Parser)]
pub struct ConfigArgs {
    /// Config action
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config actions
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show all configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,
}
