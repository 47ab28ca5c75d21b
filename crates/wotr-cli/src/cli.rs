//! CLI argument definitions using clap derive macros.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use tracing::debug;
use wotr_common_config::{ConfigLoader, Environment, WotrConfig};

use crate::commands::{
    CardCommand, DoctorCommand, GridCommand, PresetsCommand, ProcessCommand, RegionsCommand,
    SummaryCommand, SymbolsCommand,
};
use crate::error::CliError;

/// wotr - card atlas region and symbol toolkit
///
/// Tile card atlases, apply named regions to every card, detect symbol
/// templates and write a card summary.
#[derive(Debug, Parser)]
#[command(
    name = "wotr",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase verbosity level"
    )]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Suppress non-error output"
    )]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "WOTR_CONFIG",
        value_hint = ValueHint::FilePath,
        help = "Path to configuration file"
    )]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        value_enum,
        help = "Output format (text, json)"
    )]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    // === Processing ===
    /// Process every card of an atlas and write cards_summary.json
    Process(ProcessCommand),

    /// Show the card grid of an atlas
    Grid(GridCommand),

    /// Extract a single card from an atlas
    Card(CardCommand),

    // === Assets ===
    /// Inspect and edit a regions file
    #[command(subcommand)]
    Regions(RegionsCommand),

    /// Check symbol templates against the symbol map
    #[command(subcommand)]
    Symbols(SymbolsCommand),

    /// Inspect a card summary
    #[command(subcommand)]
    Summary(SummaryCommand),

    /// List built-in card formats
    Presets(PresetsCommand),

    // === System ===
    /// Check configuration, OCR backend and symbol assets
    Doctor(DoctorCommand),

    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsCommand),
}

/// Shell completions generation
#[derive(Debug, Parser)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

impl Cli {
    /// Load configuration from the `--config` file or `.wotr/config.yaml`.
    pub fn load_config(&self) -> Result<WotrConfig, CliError> {
        let mut config = match &self.config {
            Some(path) if path.is_dir() => {
                return Err(CliError::config(format!(
                    "config path is a directory: {}",
                    path.display()
                )))
            }
            Some(path) => {
                let project_dir = path.parent().unwrap_or_else(|| Path::new("."));
                ConfigLoader::new(project_dir).load_file(path)?
            }
            None => ConfigLoader::new(".").load()?,
        };
        Environment::apply_overrides(&mut config);
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Execute the selected command
    pub async fn execute(self, config: WotrConfig) -> Result<(), CliError> {
        let ctx = CommandContext {
            config,
            config_path: self.config,
            format: self.format,
            verbose: self.verbose,
        };

        match self.command {
            Command::Process(cmd) => cmd.execute(&ctx).await,
            Command::Grid(cmd) => cmd.execute(&ctx),
            Command::Card(cmd) => cmd.execute(&ctx),
            Command::Regions(cmd) => cmd.execute(&ctx),
            Command::Symbols(cmd) => cmd.execute(&ctx),
            Command::Summary(cmd) => cmd.execute(&ctx),
            Command::Presets(cmd) => cmd.execute(&ctx),
            Command::Doctor(cmd) => cmd.execute(&ctx).await,
            Command::Completions(cmd) => cmd.execute(),
        }
    }
}

impl CompletionsCommand {
    /// Execute the completions command
    pub fn execute(&self) -> Result<(), CliError> {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(self.shell, &mut cmd, name, &mut std::io::stdout());
        Ok(())
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: WotrConfig,
    /// Explicit `--config` path, if any.
    pub config_path: Option<PathBuf>,
    pub format: OutputFormat,
    pub verbose: u8,
}
