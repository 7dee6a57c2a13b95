// ABOUTME: Public API for dockyard logging infrastructure built on tokio-tracing
// ABOUTME: Provides centralized configuration, initialization and runtime reload

pub mod config;
pub mod layers;
pub mod reload;
pub mod subscriber;


// Re-export tracing macros so every crate logs through one place
pub use tracing::{Level, Span, debug, error, info, instrument, span, trace, warn};

use std::sync::OnceLock;

pub use config::{LogLevel, LoggingConfig};
pub use reload::LoggingReloadHandle;
pub use subscriber::{init_subscriber, init_subscriber_with_reload};

use anyhow::Result;

/// Global reload handle for runtime log level updates
static GLOBAL_RELOAD_HANDLE: OnceLock<LoggingReloadHandle> = OnceLock::new();

/// Initialize logging with the default configuration plus environment overrides.
pub fn init_logging() -> Result<()> {
    init_subscriber(LoggingConfig::from_env()?)
}

/// Initialize logging with custom configuration.
pub fn init_logging_with_config(config: LoggingConfig) -> Result<()> {
    init_subscriber(config)
}

/// Initialize logging with hot-reload support.
///
/// The handle is also stored globally for [`update_log_level`] and friends.
pub fn init_logging_with_reload(config: LoggingConfig) -> Result<LoggingReloadHandle> {
    let handle = init_subscriber_with_reload(config)?;
    let _ = GLOBAL_RELOAD_HANDLE.set(handle.clone());
    Ok(handle)
}

fn global_handle() -> Result<&'static LoggingReloadHandle> {
    match GLOBAL_RELOAD_HANDLE.get() {
        Some(handle) => Ok(handle),
        None => anyhow::bail!("Logging not initialized with reload support"),
    }
}

/// Update log level at runtime using the global reload handle.
pub fn update_log_level(level: Level) -> Result<()> {
    global_handle()?.update_log_level(level)
}

/// Update module-specific log level at runtime using the global reload handle.
pub fn update_module_level(module: &str, level: Level) -> Result<()> {
    global_handle()?.update_module_level(module, level)
}

/// Reload configuration from environment variables using the global reload handle.
pub fn reload_from_env() -> Result<()> {
    global_handle()?.reload_from_env()
}
