// ABOUTME: Error types for persisted panel sub-state
// ABOUTME: Version, migration, ownership and (de)serialization failures

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(
        "Persisted state {state_type} is a newer version than the current version. \
         Persisted version: {persisted}. Current version: {current}"
    )]
    NewerVersion {
        state_type: String,
        persisted: u32,
        current: u32,
    },

    #[error("No migration found for persisted state {state_type} from version {version}")]
    MissingMigration { state_type: String, version: u32 },

    #[error("Multiple migrations found for persisted state {state_type} from version {version}")]
    AmbiguousMigration { state_type: String, version: u32 },

    #[error("Error migrating persisted state {state_type} from version {from}: {message}")]
    MigrationFailed {
        state_type: String,
        from: u32,
        message: String,
    },

    #[error(
        "Detected multiple persistent states of type {state_type} for panel {panel_id}. \
         Only one state per (panel, type) pair is allowed."
    )]
    DuplicateOwner {
        state_type: String,
        panel_id: String,
    },

    #[error("Persisted state {state_type} has an unexpected shape: {source}")]
    Deserialize {
        state_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("State {state_type} cannot be serialized: {source}")]
    Serialize {
        state_type: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, StateError>;
