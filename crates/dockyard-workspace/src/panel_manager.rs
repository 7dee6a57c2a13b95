// ABOUTME: Tracks opened panels in recency order and the history of closed panels
// ABOUTME: Reacts to panel lifecycle and navigation events published on the dashboard's hub

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use dockyard_events::{HubEvent, ListenerId, NavigationEvent, PanelEvent};
use dockyard_layout::{
    ItemKey, LayoutHandle, OpenOptions, close_component, get_content_item_in_stack,
    get_stack_for_config, open_component, open_component_in_stack,
};
use dockyard_logging::{debug, error, info, warn};
use dockyard_types::{
    ClosedPanel, ComponentConfig, ConfigPattern, PanelHandle, PanelId, PanelProps, is_same_panel,
};

/// Closed panels kept for reopening; the oldest are dropped first.
pub const MAX_CLOSED_PANEL_COUNT: usize = 100;

/// Turns persisted props back into live props for a component.
pub type HydrateFn = Arc<dyn Fn(&str, PanelProps) -> PanelProps + Send + Sync>;
/// Turns a live leaf into its persisted form. `None` drops the panel.
pub type DehydrateFn = Arc<dyn Fn(&ComponentConfig) -> Option<ComponentConfig> + Send + Sync>;
pub type PanelsUpdatedFn = Arc<dyn Fn(&PanelsUpdate) + Send + Sync>;

const HANDLED_EVENTS: [&str; 12] = [
    PanelEvent::FOCUS,
    PanelEvent::MOUNT,
    PanelEvent::UNMOUNT,
    PanelEvent::REOPEN,
    PanelEvent::REOPEN_LAST,
    PanelEvent::DELETE,
    PanelEvent::CLOSED,
    PanelEvent::CLOSE,
    NavigationEvent::CYCLE_TO_NEXT_STACK,
    NavigationEvent::CYCLE_TO_PREVIOUS_STACK,
    NavigationEvent::CYCLE_TO_NEXT_TAB,
    NavigationEvent::CYCLE_TO_PREVIOUS_TAB,
];

/// Copy of the tracked panels sent after every change.
#[derive(Debug, Clone)]
pub struct PanelsUpdate {
    pub closed: Vec<ClosedPanel>,
    /// Least recently used first.
    pub opened: Vec<PanelHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Next,
    Previous,
}

impl CycleDirection {
    fn step(self, current: Option<usize>, len: usize) -> usize {
        match (self, current) {
            (CycleDirection::Next, Some(index)) => (index + 1) % len,
            (CycleDirection::Previous, Some(index)) => (index + len - 1) % len,
            (_, None) => 0,
        }
    }
}

#[derive(Clone)]
pub struct PanelManagerOptions {
    pub hydrate: HydrateFn,
    pub dehydrate: DehydrateFn,
    /// Closed panels restored from a saved workspace, oldest first.
    pub closed: Vec<ClosedPanel>,
    pub max_closed: usize,
}

impl Default for PanelManagerOptions {
    fn default() -> Self {
        Self {
            hydrate: Arc::new(|_: &str, props: PanelProps| props),
            dehydrate: Arc::new(|config: &ComponentConfig| Some(config.clone())),
            closed: Vec::new(),
            max_closed: MAX_CLOSED_PANEL_COUNT,
        }
    }
}

#[derive(Default)]
struct Tracked {
    opened: IndexMap<PanelId, PanelHandle>,
    closed: Vec<ClosedPanel>,
}

struct Inner {
    layout: LayoutHandle,
    hydrate: HydrateFn,
    dehydrate: DehydrateFn,
    max_closed: usize,
    tracked: Mutex<Tracked>,
    on_update: RwLock<Option<PanelsUpdatedFn>>,
    listeners: Mutex<Vec<ListenerId>>,
}

/// Registry of the panels in one dashboard.
///
/// Opened panels are kept in least-recently-used order: mounting or focusing
/// a panel moves it to the end. Closed panels are remembered, dehydrated,
/// so they can be reopened.
#[derive(Clone)]
pub struct PanelManager {
    inner: Arc<Inner>,
}

impl PanelManager {
    pub fn new(layout: LayoutHandle, options: PanelManagerOptions) -> Self {
        let PanelManagerOptions {
            hydrate,
            dehydrate,
            mut closed,
            max_closed,
        } = options;
        let overflow = closed.len().saturating_sub(max_closed);
        closed.drain(..overflow);

        Self {
            inner: Arc::new(Inner {
                layout,
                hydrate,
                dehydrate,
                max_closed,
                tracked: Mutex::new(Tracked {
                    opened: IndexMap::new(),
                    closed,
                }),
                on_update: RwLock::new(None),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Subscribe to the hub. Calling it again while listening does nothing.
    pub fn start_listening(&self) {
        let mut listeners = self.inner.listeners.lock();
        if !listeners.is_empty() {
            return;
        }
        let hub = self.inner.layout.hub().clone();
        for name in HANDLED_EVENTS {
            let weak = Arc::downgrade(&self.inner);
            listeners.push(hub.on(name, move |event| {
                if let Some(inner) = weak.upgrade() {
                    PanelManager { inner }.handle_event(event);
                }
            }));
        }
        debug!(events = listeners.len(), "Panel manager listening");
    }

    pub fn stop_listening(&self) {
        let hub = self.inner.layout.hub().clone();
        for id in self.inner.listeners.lock().drain(..) {
            hub.off(id);
        }
    }

    pub fn is_listening(&self) -> bool {
        !self.inner.listeners.lock().is_empty()
    }

    /// Call `listener` with a copy of the tracked panels after every change.
    pub fn set_on_panels_updated<F>(&self, listener: F)
    where
        F: Fn(&PanelsUpdate) + Send + Sync + 'static,
    {
        *self.inner.on_update.write() = Some(Arc::new(listener));
    }

    fn handle_event(&self, event: &HubEvent) {
        match event {
            HubEvent::Focus(panel) => self.update_panel(panel),
            HubEvent::Mount(panel) => {
                self.update_panel(panel);
                self.send_update();
            }
            HubEvent::Unmount(panel) => {
                self.remove_panel(panel);
                self.send_update();
            }
            HubEvent::Reopen {
                panel,
                replace_config,
            } => self.reopen(panel, replace_config.clone()),
            HubEvent::ReopenLast { container_panel_id } => {
                self.reopen_last(container_panel_id.as_ref())
            }
            HubEvent::Delete(panel) => self.delete_closed_panel(panel),
            HubEvent::Closed {
                panel_id,
                config,
                parent_stack_id,
            } => {
                debug!(panel_id = %panel_id, "Panel closed");
                self.add_closed_panel(config, parent_stack_id.clone());
                self.send_update();
            }
            HubEvent::Close(panel_id) => self.close_panel(panel_id),
            HubEvent::CycleToNextStack => self.cycle_stack(CycleDirection::Next),
            HubEvent::CycleToPreviousStack => self.cycle_stack(CycleDirection::Previous),
            HubEvent::CycleToNextTab => self.cycle_tab(CycleDirection::Next),
            HubEvent::CycleToPreviousTab => self.cycle_tab(CycleDirection::Previous),
            _ => {}
        }
    }

    // Opened panels

    fn update_panel(&self, panel: &PanelHandle) {
        let mut tracked = self.inner.tracked.lock();
        let panel_id = panel.panel_id().clone();
        tracked.opened.shift_remove(&panel_id);
        tracked.opened.insert(panel_id, panel.clone());
    }

    fn remove_panel(&self, panel: &PanelHandle) {
        let mut tracked = self.inner.tracked.lock();
        let panel_id = panel.panel_id();
        let is_current = match tracked.opened.get(panel_id) {
            Some(current) => is_same_panel(current, panel),
            None => {
                error!(panel_id = %panel_id, "Missing panel ID, panel was never tracked");
                return;
            }
        };
        if is_current {
            tracked.opened.shift_remove(panel_id);
        } else {
            debug!(panel_id = %panel_id, "Unmount of a replaced panel instance, ignoring");
        }
    }

    /// Opened panels, least recently used first.
    pub fn opened_panels(&self) -> Vec<PanelHandle> {
        self.inner.tracked.lock().opened.values().cloned().collect()
    }

    pub fn get_opened_panel_by_id(&self, panel_id: &PanelId) -> Option<PanelHandle> {
        self.inner.tracked.lock().opened.get(panel_id).cloned()
    }

    /// Current leaf configs of the opened panels, in recency order.
    pub fn get_opened_panel_configs(&self) -> Vec<ComponentConfig> {
        let ids: Vec<PanelId> = self.inner.tracked.lock().opened.keys().cloned().collect();
        self.inner.layout.read(|layout| {
            let tree = layout.tree();
            ids.iter()
                .filter_map(|id| tree.find_panel(id).and_then(|leaf| tree.config(leaf)))
                .cloned()
                .collect()
        })
    }

    pub fn get_opened_panel_configs_of_type(&self, component: &str) -> Vec<ComponentConfig> {
        self.get_opened_panel_configs()
            .into_iter()
            .filter(|config| config.component == component)
            .collect()
    }

    /// Leaf holding the panel `panel_id`.
    pub fn get_container_by_panel_id(&self, panel_id: &PanelId) -> Option<ItemKey> {
        let pattern = ConfigPattern::id(panel_id.clone());
        self.inner.layout.read(|layout| {
            let tree = layout.tree();
            let stack = get_stack_for_config(tree, tree.root(), &pattern, false)?;
            get_content_item_in_stack(tree, stack, &pattern)
        })
    }

    /// Most recently used panel accepted by `matcher`.
    pub fn get_last_used_panel<F>(&self, matcher: F) -> Option<PanelHandle>
    where
        F: Fn(&PanelHandle) -> bool,
    {
        let opened: Vec<PanelHandle> =
            self.inner.tracked.lock().opened.values().cloned().collect();
        opened.into_iter().rev().find(|panel| matcher(panel))
    }

    /// Most recently used panel of any of `types`, matched against the
    /// panel's component or the component it wraps.
    pub fn get_last_used_panel_of_types(&self, types: &[&str]) -> Option<PanelHandle> {
        self.get_last_used_panel(|panel| types.iter().any(|ty| panel.is_of_type(ty)))
    }

    // Closed panels

    /// Closed panels, oldest first.
    pub fn closed_panels(&self) -> Vec<ClosedPanel> {
        self.inner.tracked.lock().closed.clone()
    }

    pub fn get_closed_panel_configs_of_type(&self, component: &str) -> Vec<ClosedPanel> {
        self.inner
            .tracked
            .lock()
            .closed
            .iter()
            .filter(|closed| closed.config.component == component)
            .cloned()
            .collect()
    }

    fn add_closed_panel(&self, config: &ComponentConfig, parent_stack_id: Option<String>) {
        let Some(dehydrated) = (self.inner.dehydrate)(config) else {
            debug!(component = %config.component, "Closed panel not kept for reopening");
            return;
        };
        let mut tracked = self.inner.tracked.lock();
        tracked.closed.push(ClosedPanel::new(dehydrated, parent_stack_id));
        let overflow = tracked.closed.len().saturating_sub(self.inner.max_closed);
        tracked.closed.drain(..overflow);
    }

    fn remove_closed_panel(&self, panel: &ClosedPanel) -> bool {
        let mut tracked = self.inner.tracked.lock();
        let position = tracked.closed.iter().position(|closed| {
            closed == panel || (closed.config.id.is_some() && closed.config.id == panel.config.id)
        });
        match position {
            Some(index) => {
                tracked.closed.remove(index);
                true
            }
            None => false,
        }
    }

    /// Forget a closed panel.
    pub fn delete_closed_panel(&self, panel: &ClosedPanel) {
        if self.remove_closed_panel(panel) {
            self.send_update();
        }
    }

    /// Reopen a closed panel. With `replace_config`, the leaf matching it is
    /// replaced by the reopened panel.
    pub fn reopen(&self, panel: &ClosedPanel, replace_config: Option<ConfigPattern>) {
        self.remove_closed_panel(panel);
        let config = self.hydrate_config(panel.config.clone());
        info!(component = %config.component, panel_id = ?config.id, "Reopening panel");

        let mut options = OpenOptions::new(config);
        if let Some(pattern) = replace_config {
            options = options.replace_config(pattern);
        }
        if let Err(err) = self.inner.layout.update(|layout| open_component(layout, options)) {
            error!(error = %err, "Failed to reopen panel");
        }
        self.send_update();
    }

    /// Reopen the most recently closed panel. Given a container, only panels
    /// closed from that container's stack are considered, and the panel is
    /// reopened into that stack.
    pub fn reopen_last(&self, container_panel_id: Option<&PanelId>) {
        let Some(container_panel_id) = container_panel_id else {
            let last = self.inner.tracked.lock().closed.last().cloned();
            match last {
                Some(panel) => self.reopen(&panel, None),
                None => debug!("No closed panel to reopen"),
            }
            return;
        };

        let stack = self.inner.layout.read(|layout| {
            let tree = layout.tree();
            let leaf = tree.find_panel(container_panel_id)?;
            let stack = tree.parent(leaf)?;
            let stack_id = tree.get(stack)?.id()?.to_string();
            Some((stack, stack_id))
        });
        let Some((stack, stack_id)) = stack else {
            warn!(panel_id = %container_panel_id, "Container for reopen not found");
            return;
        };

        let last = self
            .inner
            .tracked
            .lock()
            .closed
            .iter()
            .rev()
            .find(|closed| closed.parent_stack_id.as_deref() == Some(stack_id.as_str()))
            .cloned();
        let Some(panel) = last else {
            debug!(stack_id = %stack_id, "No closed panel from this stack to reopen");
            return;
        };

        self.remove_closed_panel(&panel);
        let config = self.hydrate_config(panel.config);
        let result = self
            .inner
            .layout
            .update(|layout| open_component_in_stack(layout, stack, config, true));
        if let Err(err) = result {
            error!(error = %err, stack_id = %stack_id, "Failed to reopen panel in its stack");
        }
        self.send_update();
    }

    fn hydrate_config(&self, mut config: ComponentConfig) -> ComponentConfig {
        let props = std::mem::take(&mut config.props);
        config.props = (self.inner.hydrate)(&config.component, props);
        config
    }

    /// Close the panel with `panel_id`.
    pub fn close_panel(&self, panel_id: &PanelId) {
        let pattern = ConfigPattern::id(panel_id.clone());
        if !self.inner.layout.update(|layout| close_component(layout, &pattern)) {
            debug!(panel_id = %panel_id, "No panel to close");
        }
    }

    // Navigation

    /// Focus the next or previous stack in document order, wrapping around.
    /// With no stack focused, either direction starts at the first stack.
    pub fn cycle_stack(&self, direction: CycleDirection) {
        let result = self.inner.layout.update(|layout| {
            let stacks = layout.tree().stacks();
            if stacks.is_empty() {
                return Ok(());
            }
            let current = layout
                .focused_stack()
                .and_then(|focused| stacks.iter().position(|&stack| stack == focused));
            layout.focus_stack(stacks[direction.step(current, stacks.len())])
        });
        if let Err(err) = result {
            error!(error = %err, "Failed to cycle stack focus");
        }
    }

    /// Activate the next or previous tab of the focused stack, wrapping around.
    pub fn cycle_tab(&self, direction: CycleDirection) {
        let result = self.inner.layout.update(|layout| {
            let Some(stack) = layout.focused_stack() else {
                return Ok(());
            };
            let children = layout.tree().children(stack).to_vec();
            if children.is_empty() {
                return Ok(());
            }
            let current = layout.tree().active_index(stack);
            let next = children[direction.step(current, children.len())];
            layout.set_active_content_item(stack, next)?;
            layout.focus_component(next)
        });
        if let Err(err) = result {
            error!(error = %err, "Failed to cycle tab");
        }
    }

    fn send_update(&self) {
        let update = {
            let tracked = self.inner.tracked.lock();
            PanelsUpdate {
                closed: tracked.closed.clone(),
                opened: tracked.opened.values().cloned().collect(),
            }
        };
        let listener = self.inner.on_update.read().clone();
        if let Some(listener) = listener {
            listener(&update);
        }
    }
}
