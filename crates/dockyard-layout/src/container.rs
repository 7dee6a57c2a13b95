// ABOUTME: Per-leaf container holding the mounted panel instance and its listeners
// ABOUTME: Tracks visibility so show and hide notifications fire only on change

use std::fmt;
use std::sync::Arc;

use dockyard_events::ContainerEvent;
use dockyard_types::{Panel, PanelId};

use crate::tree::ItemKey;

pub type ContainerListener = Arc<dyn Fn(ContainerEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerListenerId(u64);

/// A mounted panel instance.
#[derive(Debug)]
pub struct MountedPanel {
    panel_id: PanelId,
    component_type: String,
    wrapped_type: Option<String>,
}

impl MountedPanel {
    pub(crate) fn new(panel_id: PanelId, component_type: String, wrapped_type: Option<String>) -> Self {
        Self {
            panel_id,
            component_type,
            wrapped_type,
        }
    }
}

impl Panel for MountedPanel {
    fn panel_id(&self) -> &PanelId {
        &self.panel_id
    }

    fn component_type(&self) -> &str {
        &self.component_type
    }

    fn wrapped_component_type(&self) -> Option<&str> {
        self.wrapped_type.as_deref()
    }
}

/// The container of one mounted component leaf.
pub struct Container {
    node: ItemKey,
    panel: Arc<MountedPanel>,
    listeners: Vec<(ContainerListenerId, ContainerEvent, ContainerListener)>,
    next_listener: u64,
    visible: bool,
}

impl Container {
    pub(crate) fn new(node: ItemKey, panel: Arc<MountedPanel>) -> Self {
        Self {
            node,
            panel,
            listeners: Vec::new(),
            next_listener: 0,
            visible: false,
        }
    }

    pub fn node(&self) -> ItemKey {
        self.node
    }

    pub fn panel(&self) -> &Arc<MountedPanel> {
        &self.panel
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Listen for `event` on this container.
    ///
    /// Listeners run after the layout mutation that raised the event has
    /// released the layout.
    pub fn on<F>(&mut self, event: ContainerEvent, listener: F) -> ContainerListenerId
    where
        F: Fn(ContainerEvent) + Send + Sync + 'static,
    {
        let id = ContainerListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, event, Arc::new(listener)));
        id
    }

    pub fn off(&mut self, id: ContainerListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        before != self.listeners.len()
    }

    pub(crate) fn listeners_for(&self, event: ContainerEvent) -> Vec<ContainerListener> {
        self.listeners
            .iter()
            .filter(|(_, kind, _)| *kind == event)
            .map(|(_, _, listener)| listener.clone())
            .collect()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("node", &self.node)
            .field("panel", &self.panel)
            .field("listeners", &self.listeners.len())
            .field("visible", &self.visible)
            .finish()
    }
}
