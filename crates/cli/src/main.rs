//! MediBook CLI - book and manage medical appointments

mod commands;
mod config;
mod logging;
mod navigator;
mod render;
mod state_dir;
mod storage;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use config::{CliConfig, Overrides};
use state_dir::StateDir;
use std::path::PathBuf;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "medibook")]
#[command(about = "Book and manage medical appointments")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Directory for config, tokens and logs
    #[arg(short = 'd', long, global = true)]
    state_dir: Option<PathBuf>,

    /// Base URL of the booking API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let initial = cli
        .state_dir
        .clone()
        .map_or_else(StateDir::new, StateDir::with_override);
    let overrides = Overrides {
        api_url: cli.api_url,
        timeout_secs: cli.timeout,
        state_dir: cli.state_dir,
    };
    let config = CliConfig::load(&initial.config_file(), &overrides)?;
    let state = config
        .state_dir
        .clone()
        .map_or(initial, StateDir::with_override);

    let log_file = (!cli.no_file_log).then(|| state.log_file());
    logging::init_logging(cli.log_level.into(), log_file.as_deref())?;
    debug!(api = %config.api_url, "Starting MediBook CLI");

    if let Err(err) = cli.command.execute(&config, &state).await {
        error!("Command failed: {err:#}");
        eprintln!("Error: {}", commands::describe(&err));
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "medibook",
            "doctors",
            "top",
            "--api-url",
            "http://localhost:4000/api",
            "-l",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:4000/api"));
        assert!(matches!(cli.log_level, LogLevel::Debug));
    }
}
