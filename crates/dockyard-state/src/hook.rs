// ABOUTME: Typed handle a panel uses to read and publish one piece of persisted state
// ABOUTME: Restores and migrates on mount, publishes on set, releases its key when dropped

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use dockyard_logging::error;
use dockyard_types::generate_id;

use crate::error::{Result, StateError};
use crate::migration::{PersistentStateMigration, migrate_state};
use crate::provider::{PersistentState, PersistentStateProvider};

/// Identity and versioning of a persisted state.
#[derive(Debug, Clone)]
pub struct PersistentStateConfig {
    /// Unique per component; validates what is restored.
    pub state_type: String,
    /// Bumped whenever the shape of the state changes.
    pub version: u32,
    pub migrations: Vec<PersistentStateMigration>,
    /// Remove the state when the hook goes away. Turn off for components
    /// that come and go within a panel but should keep their state.
    pub delete_on_unmount: bool,
}

impl PersistentStateConfig {
    pub fn new(state_type: impl Into<String>, version: u32) -> Self {
        Self {
            state_type: state_type.into(),
            version,
            migrations: Vec::new(),
            delete_on_unmount: true,
        }
    }

    pub fn with_migration(mut self, migration: PersistentStateMigration) -> Self {
        self.migrations.push(migration);
        self
    }

    pub fn delete_on_unmount(mut self, delete_on_unmount: bool) -> Self {
        self.delete_on_unmount = delete_on_unmount;
        self
    }
}

/// One persisted state of one panel.
///
/// Without a panel id (a component outside any panel) the value lives only
/// in the hook.
pub struct PersistentStateHook<S> {
    provider: Arc<PersistentStateProvider>,
    hook_id: String,
    panel_id: Option<String>,
    config: PersistentStateConfig,
    state: S,
}

impl<S> PersistentStateHook<S>
where
    S: Serialize + DeserializeOwned,
{
    /// Restore the state for `panel_id`, or start from `initial`.
    ///
    /// A persisted value that cannot be migrated or read back is logged and
    /// replaced by `initial`. Fails only when another hook already owns the
    /// same panel and type.
    pub fn mount(
        provider: Arc<PersistentStateProvider>,
        panel_id: Option<&str>,
        config: PersistentStateConfig,
        initial: impl FnOnce() -> S,
    ) -> Result<Self> {
        let persisted = panel_id.and_then(|id| provider.get_state(id, &config.state_type));
        let state = match persisted.map(|persisted| restore(persisted, &config)) {
            Some(Ok(state)) => state,
            Some(Err(err)) => {
                error!(
                    panel_id = ?panel_id,
                    state_type = %config.state_type,
                    error = %err,
                    "Unable to restore persisted state, using initial state"
                );
                initial()
            }
            None => initial(),
        };

        let hook = Self {
            provider,
            hook_id: generate_id(),
            panel_id: panel_id.map(str::to_string),
            config,
            state,
        };
        hook.publish()?;
        Ok(hook)
    }

    pub fn get(&self) -> &S {
        &self.state
    }

    pub fn set(&mut self, state: S) -> Result<()> {
        self.state = state;
        self.publish()
    }

    pub fn update(&mut self, f: impl FnOnce(&mut S)) -> Result<()> {
        f(&mut self.state);
        self.publish()
    }

    pub fn hook_id(&self) -> &str {
        &self.hook_id
    }

    /// Release the state now instead of on drop.
    pub fn unmount(self) {}

    fn publish(&self) -> Result<()> {
        let Some(panel_id) = &self.panel_id else {
            return Ok(());
        };
        let value = serde_json::to_value(&self.state).map_err(|source| StateError::Serialize {
            state_type: self.config.state_type.clone(),
            source,
        })?;
        self.provider.add_state(
            &self.hook_id,
            panel_id,
            PersistentState::new(self.config.state_type.clone(), self.config.version, value),
        )
    }
}

impl<S> Drop for PersistentStateHook<S> {
    fn drop(&mut self) {
        let Some(panel_id) = &self.panel_id else {
            return;
        };
        if self.config.delete_on_unmount {
            self.provider
                .remove_state(&self.hook_id, panel_id, &self.config.state_type);
        }
        self.provider
            .deregister_hook(&self.hook_id, panel_id, &self.config.state_type);
    }
}

fn restore<S: DeserializeOwned>(persisted: PersistentState, config: &PersistentStateConfig) -> Result<S> {
    let value = if persisted.version == config.version {
        persisted.state
    } else {
        migrate_state(
            persisted.state,
            persisted.version,
            config.version,
            &config.migrations,
            &config.state_type,
        )?
    };
    serde_json::from_value(value).map_err(|source| StateError::Deserialize {
        state_type: config.state_type.clone(),
        source,
    })
}
