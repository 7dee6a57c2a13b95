// ABOUTME: Loads dockyard.toml: layout orientation, closed panel history, dashboard id and logging
// ABOUTME: A missing file in the default location means defaults; explicit paths must exist

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use dockyard_logging::LoggingConfig;
use dockyard_types::generate_id;
use dockyard_workspace::{DashboardOptions, MAX_CLOSED_PANEL_COUNT};

pub const CONFIG_FILE_NAME: &str = "dockyard.toml";

/// Layout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSection {
    /// Start new stacks in a column (true) or a row (false)
    #[serde(default = "default_true")]
    pub column_preferred: bool,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            column_preferred: true,
        }
    }
}

/// Closed panel history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySection {
    /// Closed panels remembered for reopening
    #[serde(default = "default_max_closed_panels")]
    pub max_closed_panels: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            max_closed_panels: default_max_closed_panels(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSection {
    /// Fixed dashboard id; a new one is generated per run when unset
    #[serde(default)]
    pub id: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_max_closed_panels() -> usize {
    MAX_CLOSED_PANEL_COUNT
}

/// Contents of `dockyard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutSection,

    #[serde(default)]
    pub history: HistorySection,

    #[serde(default)]
    pub dashboard: DashboardSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.history.max_closed_panels == 0 {
            anyhow::bail!("history.max_closed_panels must be at least 1");
        }
        Ok(())
    }

    /// Options for a dashboard built from this configuration.
    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            id: self.dashboard.id.clone().unwrap_or_else(generate_id),
            column_preferred: self.layout.column_preferred,
            max_closed_panels: self.history.max_closed_panels,
        }
    }
}

/// `<config dir>/dockyard/dockyard.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dockyard").join(CONFIG_FILE_NAME))
}
