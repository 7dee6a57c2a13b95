// ABOUTME: Output layer construction for console, JSON and rolling file logging
// ABOUTME: Layers are generic over the subscriber so they stack on a reloadable filter

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fs;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{FileConfig, LoggingConfig, OutputConfig};

/// A type-erased output layer.
pub type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Writer guards for non-blocking file output; dropping one would lose
/// buffered lines, so they live for the rest of the process.
static FILE_GUARDS: Mutex<Vec<WorkerGuard>> = parking_lot::const_mutex(Vec::new());

/// Create a console output layer (pretty, compact, or JSON lines).
pub fn create_console_layer<S>(config: &OutputConfig) -> Option<BoxedLayer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if !config.console {
        return None;
    }

    let layer = if config.json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else if config.pretty_console {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .pretty()
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .boxed()
    };

    Some(layer)
}

/// Create a daily rolling file layer. The parent directory is created on demand.
pub fn create_file_layer<S>(config: &FileConfig) -> Result<BoxedLayer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let directory = config
        .path
        .parent()
        .context("Log file path has no parent directory")?;
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory: {}", directory.display()))?;

    let file_name = config
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Invalid log file path")?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_name)
        .max_log_files(config.max_files.max(1))
        .build(directory)
        .context("Failed to create rolling log file appender")?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    FILE_GUARDS.lock().push(guard);

    Ok(fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(writer)
        .boxed())
}

/// Every output layer the configuration asks for.
pub fn create_output_layers<S>(config: &LoggingConfig) -> Result<Vec<BoxedLayer<S>>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let mut layers = Vec::new();
    if let Some(console) = create_console_layer(&config.output) {
        layers.push(console);
    }
    if config.output.file {
        layers.push(create_file_layer(&config.file)?);
    }
    Ok(layers)
}

/// Create an environment filter from the logging configuration.
pub fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(config.filter_directives())
        .with_context(|| format!("Invalid filter directives '{}'", config.filter_directives()))
}
