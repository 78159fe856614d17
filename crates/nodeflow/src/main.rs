mod commands;
mod config;
mod error;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use crate::commands::Commands;
use crate::config::Config;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "nodeflow")]
#[command(about = "Run node workflows as compensating sagas", long_about = None)]
struct Cli {
    /// Config file (default: nodeflow.toml in the current directory, if present)
    #[arg(long = "config", short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            print_error(&e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.logging) {
        print_error(&e);
        return ExitCode::FAILURE;
    }
    debug!(config = ?cli.config, settings = ?config.workflow_settings(), "configuration loaded");

    if let Err(e) = cli.command.execute(&config) {
        print_error(&e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}
