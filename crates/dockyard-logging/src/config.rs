// ABOUTME: Configuration structures and environment variable parsing for logging
// ABOUTME: Handles log levels, output targets, and the rolling log file location

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use tracing::Level;

/// Global level override, takes precedence over `RUST_LOG`.
pub const ENV_LOG: &str = "DOCKYARD_LOG";
/// Presence switches console output to JSON.
pub const ENV_LOG_JSON: &str = "DOCKYARD_LOG_JSON";
/// Presence disables console output.
pub const ENV_LOG_NO_CONSOLE: &str = "DOCKYARD_LOG_NO_CONSOLE";
/// Presence disables the log file.
pub const ENV_LOG_NO_FILE: &str = "DOCKYARD_LOG_NO_FILE";

/// Wrapper for tracing::Level that implements Serialize/Deserialize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevel(pub Level);

impl Serialize for LogLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(level_name(self.0))
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<LogLevel, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_log_level(&s)
            .map(LogLevel)
            .map_err(serde::de::Error::custom)
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        LogLevel(level)
    }
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        log_level.0
    }
}

/// Main configuration structure for the logging system.
///
/// Every field has a default so a partial `[logging]` table in
/// `dockyard.toml` is enough.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level (trace, debug, info, warn, error)
    pub level: LogLevel,

    /// Per-module log level overrides, e.g. `dockyard_layout = "debug"`
    pub module_levels: BTreeMap<String, LogLevel>,

    /// Output configuration
    pub output: OutputConfig,

    /// File logging configuration
    pub file: FileConfig,
}

/// Configuration for different output targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Emit console output as JSON lines
    pub json: bool,

    /// Pretty-print console output (vs compact)
    pub pretty_console: bool,
}

/// Configuration for file logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Path to log file (defaults to `<config dir>/dockyard/dockyard.log`)
    pub path: PathBuf,

    /// Number of rotated daily files to keep
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel(Level::INFO),
            module_levels: BTreeMap::new(),
            output: OutputConfig::default(),
            file: FileConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            console: true,
            file: true,
            json: false,
            pretty_console: false,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: default_log_file_path(),
            max_files: 5,
        }
    }
}

impl LoggingConfig {
    /// Create a new configuration with environment variable overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides to this configuration.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides read through `lookup`, so callers (and tests) can
    /// supply variables without touching the process environment.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level_str) = lookup(ENV_LOG) {
            self.level = LogLevel(
                parse_log_level(&level_str).with_context(|| format!("Invalid {ENV_LOG} level"))?,
            );
        } else if let Some(rust_log) = lookup("RUST_LOG") {
            self.parse_rust_log(&rust_log)?;
        }

        if lookup(ENV_LOG_JSON).is_some() {
            self.output.json = true;
        }
        if lookup(ENV_LOG_NO_CONSOLE).is_some() {
            self.output.console = false;
        }
        if lookup(ENV_LOG_NO_FILE).is_some() {
            self.output.file = false;
        }

        Ok(())
    }

    /// Parse a `RUST_LOG` style directive list ("info,dockyard_layout=debug").
    fn parse_rust_log(&mut self, rust_log: &str) -> Result<()> {
        for directive in rust_log.split(',').map(str::trim) {
            if directive.is_empty() {
                continue;
            }

            match directive.split_once('=') {
                Some((module, level_str)) => {
                    let level = parse_log_level(level_str).with_context(|| {
                        format!("Invalid log level '{level_str}' for module '{module}'")
                    })?;
                    self.module_levels
                        .insert(module.to_string(), LogLevel(level));
                }
                None => {
                    self.level = LogLevel(
                        parse_log_level(directive)
                            .with_context(|| format!("Invalid global log level '{directive}'"))?,
                    );
                }
            }
        }
        Ok(())
    }

    /// Render the filter directive string understood by `EnvFilter`.
    pub fn filter_directives(&self) -> String {
        let mut directives = vec![level_name(self.level.0).to_string()];
        directives.extend(
            self.module_levels
                .iter()
                .map(|(module, level)| format!("{module}={}", level_name(level.0))),
        );
        directives.join(",")
    }
}

/// Get the default log file path: `<config dir>/dockyard/dockyard.log`
pub fn default_log_file_path() -> PathBuf {
    match dirs::config_dir() {
        Some(config_dir) => config_dir.join("dockyard").join("dockyard.log"),
        None => PathBuf::from("dockyard.log"),
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Parse a log level string (case-insensitive).
pub fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "Invalid log level: {level_str}. Must be one of: trace, debug, info, warn, error"
        ),
    }
}
