// ABOUTME: Step-wise migration of persisted state between versions
// ABOUTME: Each migration lifts a value from one version to the next

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, StateError};

pub type MigrateFn = Arc<dyn Fn(Value) -> std::result::Result<Value, String> + Send + Sync>;

/// Migrates a state from version `from` to `from + 1`.
#[derive(Clone)]
pub struct PersistentStateMigration {
    pub from: u32,
    pub migrate: MigrateFn,
}

impl PersistentStateMigration {
    pub fn new<F>(from: u32, migrate: F) -> Self
    where
        F: Fn(Value) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            from,
            migrate: Arc::new(migrate),
        }
    }
}

impl fmt::Debug for PersistentStateMigration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentStateMigration")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

/// Bring `state` from version `from` up to `to`.
///
/// `migrations` may include steps that were already applied. Exactly one
/// migration must exist for every version in `from..to`.
pub fn migrate_state(
    state: Value,
    from: u32,
    to: u32,
    migrations: &[PersistentStateMigration],
    state_type: &str,
) -> Result<Value> {
    if from > to {
        return Err(StateError::NewerVersion {
            state_type: state_type.to_string(),
            persisted: from,
            current: to,
        });
    }

    let mut state = state;
    for version in from..to {
        let mut candidates = migrations.iter().filter(|m| m.from == version);
        let migration = match (candidates.next(), candidates.next()) {
            (Some(migration), None) => migration,
            (None, _) => {
                return Err(StateError::MissingMigration {
                    state_type: state_type.to_string(),
                    version,
                });
            }
            (Some(_), Some(_)) => {
                return Err(StateError::AmbiguousMigration {
                    state_type: state_type.to_string(),
                    version,
                });
            }
        };

        state = (migration.migrate)(state).map_err(|message| StateError::MigrationFailed {
            state_type: state_type.to_string(),
            from: version,
            message,
        })?;
        dockyard_logging::debug!(state_type, from = version, "Migrated persisted state");
    }
    Ok(state)
}
