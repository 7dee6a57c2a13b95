// ABOUTME: Error types for plugin registration
// ABOUTME: Resolution problems are logged and skipped, so only registry misuse is an error

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Plugin not found: {name}")]
    NotFound { name: String },
}

impl PluginError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, PluginError>;
