//! wotr CLI - card atlas region and symbol toolkit
//!
//! Main entry point for the `wotr` binary.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use wotr_common_config::Environment;
use wotr_common_log::{LogConfig, LogLevel};

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, OutputFormat};
use error::{CliError, ErrorFormatter};

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    RuntimeError = 70,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let _env = Environment::init();
    let cli = Cli::parse();

    init_tracing(&cli);

    let format = cli.format;
    let verbose = cli.verbose;

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to create Tokio runtime: {e}");
            return Exit::RuntimeError.into();
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            let formatter = ErrorFormatter::new().verbose(verbose > 0);
            match format {
                OutputFormat::Json => eprintln!("{}", formatter.format_json(&e)),
                OutputFormat::Text => formatter.print(&e),
            }
            e.exit_code()
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.load_config()?;
    debug!(command = ?cli.command, "running command");
    cli.execute(config).await
}

/// Verbosity flags win over `WOTR_LOG_LEVEL`; the log format and file still
/// come from the environment.
fn init_tracing(cli: &Cli) {
    let mut config = LogConfig::from_env();
    if cli.verbose > 0 || cli.quiet || std::env::var_os("WOTR_LOG_LEVEL").is_none() {
        config.level = LogLevel::from_verbosity(cli.verbose, cli.quiet);
    }
    config.target = cli.verbose >= 2;

    if let Err(e) = wotr_common_log::init(config) {
        eprintln!("warning: failed to initialize logging: {e}");
    }
}
