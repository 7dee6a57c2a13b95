// ABOUTME: Runtime log level reloading and configuration updates
// ABOUTME: Swaps the env filter of an installed subscriber without restarting

use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{EnvFilter, Registry, reload};

use crate::config::LoggingConfig;
use crate::layers::create_env_filter;

/// Handle for updating log configuration at runtime
#[derive(Clone)]
pub struct LoggingReloadHandle {
    filter_handle: reload::Handle<EnvFilter, Registry>,
    current_config: Arc<RwLock<LoggingConfig>>,
}

impl LoggingReloadHandle {
    pub fn new(filter_handle: reload::Handle<EnvFilter, Registry>, config: LoggingConfig) -> Self {
        Self {
            filter_handle,
            current_config: Arc::new(RwLock::new(config)),
        }
    }

    /// Update the global log level at runtime
    pub fn update_log_level(&self, level: Level) -> Result<()> {
        self.apply(|config| config.level = level.into())?;
        tracing::info!(new_level = %level, "Log level updated at runtime");
        Ok(())
    }

    /// Update a module-specific log level
    pub fn update_module_level(&self, module: &str, level: Level) -> Result<()> {
        self.apply(|config| {
            config
                .module_levels
                .insert(module.to_string(), level.into());
        })?;
        tracing::info!(module = %module, new_level = %level, "Module log level updated at runtime");
        Ok(())
    }

    /// Re-read level overrides from the environment, keeping output and file settings.
    pub fn reload_from_env(&self) -> Result<()> {
        let from_env =
            LoggingConfig::from_env().context("Failed to load configuration from environment")?;
        self.apply(|config| {
            config.level = from_env.level;
            config.module_levels = from_env.module_levels;
        })?;
        tracing::info!("Logging configuration reloaded from environment");
        Ok(())
    }

    /// Get current configuration (clone)
    pub fn current_config(&self) -> LoggingConfig {
        self.current_config.read().clone()
    }

    fn apply(&self, change: impl FnOnce(&mut LoggingConfig)) -> Result<()> {
        let mut config = self.current_config.write();
        let mut next = config.clone();
        change(&mut next);

        let filter = create_env_filter(&next).context("Failed to create new environment filter")?;
        self.filter_handle
            .reload(filter)
            .context("Failed to reload log filter")?;
        *config = next;
        Ok(())
    }
}
