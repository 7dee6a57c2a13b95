// ABOUTME: Dockyard command line tool (Layer 6): config loading, logging setup and subcommands
// ABOUTME: Restores saved dashboards for inspection and normalization and runs a scripted demo

pub mod cli;
pub mod commands;
pub mod config;
pub mod demo;
pub mod document;

use anyhow::{Context, Result};
use std::io::{self, Write};

use dockyard_logging::{Level, LoggingReloadHandle, debug, info, init_logging_with_reload};

use crate::cli::{Cli, Command};
use crate::config::Config;

/// Start logging from the `[logging]` section and environment overrides.
/// Any `-v` on the command line takes precedence over the configured level.
pub fn setup_logging(verbosity: u8, config: &Config) -> Result<LoggingReloadHandle> {
    let mut logging = config.logging.clone();
    logging
        .apply_env_overrides()
        .context("Failed to apply logging overrides from environment")?;

    if verbosity > 0 {
        let level = match verbosity {
            1 => Level::INFO,
            2 => Level::DEBUG,
            _3_or_more => Level::TRACE,
        };
        logging.level = level.into();
    }

    let handle = init_logging_with_reload(logging).context("Failed to initialize dockyard logging")?;
    info!("Dockyard logging system initialized");
    Ok(handle)
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let _logging = setup_logging(cli.verbose, &config)?;
    debug!(command = ?cli.command, "Running command");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Command::Inspect { path } => commands::inspect(&config, path, &mut out)?,
        Command::Normalize { input, output } => {
            commands::normalize(&config, input, output.as_deref(), &mut out)?
        }
        Command::Demo => demo::run(&config, &mut out).await?,
    }
    out.flush()?;
    Ok(())
}
