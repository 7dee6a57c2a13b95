// ABOUTME: Tracks every persisted sub-state of a workspace, keyed by panel and state type
// ABOUTME: One hook owns each key; changes are reported as a full ordered snapshot

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::error::{Result, StateError};

/// A typed, versioned piece of persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistentState {
    #[serde(rename = "type")]
    pub state_type: String,
    pub version: u32,
    pub state: Value,
}

impl PersistentState {
    pub fn new(state_type: impl Into<String>, version: u32, state: Value) -> Self {
        Self {
            state_type: state_type.into(),
            version,
            state,
        }
    }
}

/// Key of a state: `"{panel_id}::{type}"`.
pub fn state_key(panel_id: &str, state_type: &str) -> String {
    format!("{panel_id}::{state_type}")
}

/// Initial contents of a provider as persisted in a workspace document.
///
/// Older documents stored a plain list, handed out to lookups in the order
/// they happen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialPersistentState {
    Keyed(Vec<(String, PersistentState)>),
    Ordered(Vec<PersistentState>),
}

impl Default for InitialPersistentState {
    fn default() -> Self {
        InitialPersistentState::Keyed(Vec::new())
    }
}

pub type StateSnapshot = Vec<(String, PersistentState)>;
pub type ChangeListener = Arc<dyn Fn(&StateSnapshot) + Send + Sync>;

#[derive(Default)]
struct Inner {
    states: IndexMap<String, PersistentState>,
    owners: HashMap<String, String>,
    legacy: Option<VecDeque<PersistentState>>,
    closed: bool,
}

/// Holds the persisted sub-state of every panel in a workspace.
#[derive(Default)]
pub struct PersistentStateProvider {
    inner: Mutex<Inner>,
    on_change: RwLock<Option<ChangeListener>>,
}

impl PersistentStateProvider {
    pub fn new(initial: InitialPersistentState) -> Self {
        let inner = match initial {
            InitialPersistentState::Keyed(entries) => Inner {
                states: entries.into_iter().collect(),
                ..Default::default()
            },
            InitialPersistentState::Ordered(entries) => {
                dockyard_logging::debug!(
                    entries = entries.len(),
                    "Migrating ordered persistent state to keyed state"
                );
                Inner {
                    legacy: Some(entries.into()),
                    ..Default::default()
                }
            }
        };
        Self {
            inner: Mutex::new(inner),
            on_change: RwLock::new(None),
        }
    }

    /// Call `listener` with a snapshot after every change.
    pub fn set_on_change<F>(&self, listener: F)
    where
        F: Fn(&StateSnapshot) + Send + Sync + 'static,
    {
        *self.on_change.write() = Some(Arc::new(listener));
    }

    /// Record `state` for `panel_id`, owned by `hook_id`.
    pub fn add_state(&self, hook_id: &str, panel_id: &str, state: PersistentState) -> Result<()> {
        let key = state_key(panel_id, &state.state_type);
        let snapshot = {
            let mut inner = self.inner.lock();
            if let Some(owner) = inner.owners.get(&key) {
                if owner != hook_id {
                    return Err(StateError::DuplicateOwner {
                        state_type: state.state_type,
                        panel_id: panel_id.to_string(),
                    });
                }
            }
            inner.owners.insert(key.clone(), hook_id.to_string());

            if inner.closed || inner.states.get(&key) == Some(&state) {
                return Ok(());
            }
            inner.states.insert(key, state);
            Self::snapshot_of(&inner)
        };
        self.notify(&snapshot);
        Ok(())
    }

    /// Persisted state of `(panel_id, state_type)`.
    ///
    /// With a legacy ordered initial state, a key seen for the first time
    /// takes the next unclaimed entry.
    pub fn get_state(&self, panel_id: &str, state_type: &str) -> Option<PersistentState> {
        let key = state_key(panel_id, state_type);
        let mut inner = self.inner.lock();
        if let Some(state) = inner.states.get(&key) {
            return Some(state.clone());
        }
        let next = inner.legacy.as_mut()?.pop_front()?;
        inner.states.insert(key, next.clone());
        Some(next)
    }

    /// Remove a state, if `hook_id` owns it.
    pub fn remove_state(&self, hook_id: &str, panel_id: &str, state_type: &str) -> bool {
        let key = state_key(panel_id, state_type);
        let snapshot = {
            let mut inner = self.inner.lock();
            if inner.owners.get(&key).map(String::as_str) != Some(hook_id) {
                return false;
            }
            inner.states.shift_remove(&key);
            inner.owners.remove(&key);
            if inner.closed {
                return true;
            }
            Self::snapshot_of(&inner)
        };
        self.notify(&snapshot);
        true
    }

    /// Release ownership of a key without touching its state.
    pub fn deregister_hook(&self, hook_id: &str, panel_id: &str, state_type: &str) -> bool {
        let key = state_key(panel_id, state_type);
        let mut inner = self.inner.lock();
        if inner.owners.get(&key).map(String::as_str) == Some(hook_id) {
            inner.owners.remove(&key);
            true
        } else {
            false
        }
    }

    pub fn owner(&self, panel_id: &str, state_type: &str) -> Option<String> {
        self.inner
            .lock()
            .owners
            .get(&state_key(panel_id, state_type))
            .cloned()
    }

    /// Every state in insertion order.
    pub fn snapshot(&self) -> StateSnapshot {
        Self::snapshot_of(&self.inner.lock())
    }

    /// Stop reporting changes; the provider's owner has gone away.
    pub fn close(&self) {
        self.inner.lock().closed = true;
    }

    fn snapshot_of(inner: &Inner) -> StateSnapshot {
        inner
            .states
            .iter()
            .map(|(key, state)| (key.clone(), state.clone()))
            .collect()
    }

    fn notify(&self, snapshot: &StateSnapshot) {
        let listener = self.on_change.read().clone();
        if let Some(listener) = listener {
            listener(snapshot);
        }
    }
}
