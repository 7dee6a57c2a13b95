// ABOUTME: The externally supplied plugin set, in registration order
// ABOUTME: Subscribers are told after every change so widget registrations can be rebuilt

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{PluginError, Result};
use crate::plugin::{Plugin, WidgetPlugin};

pub type PluginListener = Arc<dyn Fn(&[Plugin]) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Plugins keyed by name. Registering a name again replaces the plugin but
/// keeps its original position.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<IndexMap<String, Plugin>>,
    listeners: RwLock<Vec<(SubscriptionId, PluginListener)>>,
    next_id: AtomicU64,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, plugin: impl Into<Plugin>) {
        let plugin = plugin.into();
        let name = plugin.name().to_string();
        dockyard_logging::info!(plugin = %name, "Registering plugin");

        let replaced = self.plugins.write().insert(name.clone(), plugin).is_some();
        if replaced {
            dockyard_logging::warn!(plugin = %name, "Plugin already registered, replacing existing");
        }
        self.notify();
    }

    pub fn register_widget(&self, plugin: WidgetPlugin) {
        self.register(plugin);
    }

    pub fn unregister(&self, name: &str) -> Result<()> {
        dockyard_logging::info!(plugin = %name, "Unregistering plugin");
        if self.plugins.write().shift_remove(name).is_none() {
            return Err(PluginError::not_found(name));
        }
        self.notify();
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Plugin> {
        self.plugins.read().get(name).cloned()
    }

    /// All plugins in registration order.
    pub fn plugins(&self) -> Vec<Plugin> {
        self.plugins.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }

    /// Call `listener` with the full plugin list after every change.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&[Plugin]) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    fn notify(&self) {
        let plugins = self.plugins();
        let listeners: Vec<PluginListener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&plugins);
        }
    }
}
