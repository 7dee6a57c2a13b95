// ABOUTME: Persistent sub-state for panels: scoped by panel id and state type, versioned, migratable
// ABOUTME: Layer 4: aggregated by the workspace into its serialized document

pub mod error;
pub mod hook;
pub mod migration;
pub mod provider;

pub use error::{Result, StateError};
pub use hook::{PersistentStateConfig, PersistentStateHook};
pub use migration::{MigrateFn, PersistentStateMigration, migrate_state};
pub use provider::{
    ChangeListener, InitialPersistentState, PersistentState, PersistentStateProvider,
    StateSnapshot, state_key,
};
