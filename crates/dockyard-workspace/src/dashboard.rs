// ABOUTME: A dashboard: one layout with its event hub, panel tracking and persisted panel state
// ABOUTME: Wraps registered components, hydrates saved layouts and reports layout changes

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use dockyard_events::{EventHub, HubEvent, LayoutEvent, ListenerId, PanelEvent};
use dockyard_layout::{
    Component, ComponentRef, Element, Layout, LayoutHandle, dehydrate_layout_config,
    hydrate_layout_config, is_equal,
};
use dockyard_logging::{debug, error, info};
use dockyard_state::{InitialPersistentState, PersistentStateProvider};
use dockyard_types::{ClosedPanel, ComponentConfig, ItemConfig, PanelProps, generate_id};

use crate::error::{Result, WorkspaceError};
use crate::panel_manager::{MAX_CLOSED_PANEL_COUNT, PanelManager, PanelManagerOptions};

/// Element rendered in place of a panel whose component panicked.
pub const PANEL_ERROR_ELEMENT: &str = "PanelErrorBoundary";

/// Per-component hydrate, called with the saved props and the dashboard id.
/// An error drops the saved panel state.
pub type PanelHydrateFn =
    Arc<dyn Fn(PanelProps, &str) -> std::result::Result<PanelProps, String> + Send + Sync>;
/// Per-component dehydrate, called with the live leaf and the dashboard id.
/// `None` keeps the panel out of the saved layout and the closed history.
pub type PanelDehydrateFn =
    Arc<dyn Fn(&ComponentConfig, &str) -> Option<ComponentConfig> + Send + Sync>;
pub type LayoutChangeFn = Arc<dyn Fn(&[ItemConfig]) + Send + Sync>;
/// Undoes a component registration.
pub type Deregister = Box<dyn FnOnce() + Send + Sync>;

/// Live props for a saved panel: adds the id of the dashboard it opens in.
pub fn hydrate_default(mut props: PanelProps, dashboard_id: &str) -> PanelProps {
    props.local_dashboard_id = Some(dashboard_id.to_string());
    props
}

/// Saved form of a panel: identity, title, widget metadata and panel state.
pub fn dehydrate_default(config: &ComponentConfig) -> ComponentConfig {
    ComponentConfig {
        component: config.component.clone(),
        id: config.id.clone(),
        title: config.title.clone(),
        props: PanelProps {
            metadata: config.props.metadata.clone(),
            panel_state: config.props.panel_state.clone(),
            ..Default::default()
        },
        is_closable: config.is_closable,
    }
}

/// Everything needed to restore a dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceDocument {
    #[serde(default)]
    pub layout: Vec<ItemConfig>,

    #[serde(default)]
    pub closed: Vec<ClosedPanel>,

    #[serde(rename = "persistentState", default)]
    pub persistent_state: InitialPersistentState,
}

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub id: String,
    /// Orientation new stacks start from.
    pub column_preferred: bool,
    pub max_closed_panels: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            id: generate_id(),
            column_preferred: true,
            max_closed_panels: MAX_CLOSED_PANEL_COUNT,
        }
    }
}

struct ComponentHooks {
    dashboard_id: String,
    hydrate: RwLock<HashMap<String, PanelHydrateFn>>,
    dehydrate: RwLock<HashMap<String, PanelDehydrateFn>>,
}

impl ComponentHooks {
    fn new(dashboard_id: String) -> Self {
        Self {
            dashboard_id,
            hydrate: RwLock::new(HashMap::new()),
            dehydrate: RwLock::new(HashMap::new()),
        }
    }

    /// Components that were never registered keep their props unchanged.
    fn hydrate(&self, component: &str, props: PanelProps) -> PanelProps {
        let Some(hydrate) = self.hydrate.read().get(component).cloned() else {
            return props;
        };
        let payload = serde_json::to_string(&props).unwrap_or_default();
        let fallback = PanelProps {
            panel_state: None,
            ..props.clone()
        };
        match hydrate(props, &self.dashboard_id) {
            Ok(props) => props,
            Err(err) => {
                error!(
                    component,
                    payload = %payload,
                    error = %err,
                    "Unable to hydrate panel, opening it without its saved state"
                );
                hydrate_default(fallback, &self.dashboard_id)
            }
        }
    }

    fn dehydrate(&self, config: &ComponentConfig) -> Option<ComponentConfig> {
        match self.dehydrate.read().get(&config.component).cloned() {
            Some(dehydrate) => dehydrate(config, &self.dashboard_id),
            None => Some(config.clone()),
        }
    }
}

/// Registered in place of every dashboard component. Keeps a panicking
/// panel from taking the rest of the dashboard down.
struct DashboardPanel {
    name: String,
    inner: ComponentRef,
}

impl DashboardPanel {
    fn new(inner: ComponentRef) -> Self {
        Self {
            name: format!("DashboardWrapper({})", inner.name()),
            inner,
        }
    }
}

impl Component for DashboardPanel {
    fn name(&self) -> &str {
        &self.name
    }

    fn wrapped_name(&self) -> Option<&str> {
        Some(self.inner.wrapped_name().unwrap_or(self.inner.name()))
    }

    fn render(&self, props: &PanelProps) -> Element {
        match catch_unwind(AssertUnwindSafe(|| self.inner.render(props))) {
            Ok(element) => element,
            Err(_) => {
                error!(component = %self.inner.name(), "Panel failed to render");
                Element::new(PANEL_ERROR_ELEMENT)
            }
        }
    }
}

struct DashboardInner {
    id: String,
    layout: LayoutHandle,
    panel_manager: PanelManager,
    persistent_state: Arc<PersistentStateProvider>,
    hooks: Arc<ComponentHooks>,
    registrations: Mutex<HashMap<String, u64>>,
    next_registration: AtomicU64,
    last_config: Mutex<Option<Vec<ItemConfig>>>,
    dragging: AtomicBool,
    on_layout_change: RwLock<Option<LayoutChangeFn>>,
    listeners: Mutex<Vec<ListenerId>>,
}

/// A dashboard and the services that live as long as it does.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

impl Dashboard {
    pub fn new(options: DashboardOptions) -> Result<Self> {
        Self::with_history(options, Vec::new(), InitialPersistentState::default())
    }

    /// A dashboard restored with its closed panels and persisted panel state.
    /// Register components, then call [`Dashboard::load_layout`] with the
    /// saved layout.
    pub fn with_history(
        options: DashboardOptions,
        closed: Vec<ClosedPanel>,
        persistent_state: InitialPersistentState,
    ) -> Result<Self> {
        if options.max_closed_panels == 0 {
            return Err(WorkspaceError::InvalidHistoryLimit);
        }

        let hooks = Arc::new(ComponentHooks::new(options.id.clone()));
        let mut layout = Layout::new();
        layout.set_column_preferred(options.column_preferred);
        let layout = LayoutHandle::new(layout, Arc::new(EventHub::new()));

        let hydrate_hooks = hooks.clone();
        let dehydrate_hooks = hooks.clone();
        let panel_manager = PanelManager::new(
            layout.clone(),
            PanelManagerOptions {
                hydrate: Arc::new(move |component: &str, props: PanelProps| {
                    hydrate_hooks.hydrate(component, props)
                }),
                dehydrate: Arc::new(move |config: &ComponentConfig| dehydrate_hooks.dehydrate(config)),
                closed,
                max_closed: options.max_closed_panels,
            },
        );
        panel_manager.start_listening();

        let dashboard = Self {
            inner: Arc::new(DashboardInner {
                id: options.id,
                layout,
                panel_manager,
                persistent_state: Arc::new(PersistentStateProvider::new(persistent_state)),
                hooks,
                registrations: Mutex::new(HashMap::new()),
                next_registration: AtomicU64::new(0),
                last_config: Mutex::new(None),
                dragging: AtomicBool::new(false),
                on_layout_change: RwLock::new(None),
                listeners: Mutex::new(Vec::new()),
            }),
        };
        dashboard.start_listening();
        info!(dashboard_id = %dashboard.inner.id, "Dashboard created");
        Ok(dashboard)
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn layout(&self) -> &LayoutHandle {
        &self.inner.layout
    }

    pub fn hub(&self) -> &Arc<EventHub> {
        self.inner.layout.hub()
    }

    pub fn panel_manager(&self) -> &PanelManager {
        &self.inner.panel_manager
    }

    pub fn persistent_state(&self) -> &Arc<PersistentStateProvider> {
        &self.inner.persistent_state
    }

    pub fn emit(&self, event: HubEvent) {
        self.inner.layout.emit(event);
    }

    /// Call `listener` with the saved form of the layout whenever it changes.
    pub fn set_on_layout_change<F>(&self, listener: F)
    where
        F: Fn(&[ItemConfig]) + Send + Sync + 'static,
    {
        *self.inner.on_layout_change.write() = Some(Arc::new(listener));
    }

    fn start_listening(&self) {
        let hub = self.hub().clone();
        let mut listeners = self.inner.listeners.lock();
        for name in [
            LayoutEvent::STATE_CHANGED,
            PanelEvent::TITLE_CHANGED,
            PanelEvent::DRAGGING,
            PanelEvent::DROPPED,
        ] {
            let weak = Arc::downgrade(&self.inner);
            listeners.push(hub.on(name, move |event| {
                if let Some(inner) = weak.upgrade() {
                    Dashboard { inner }.handle_event(event);
                }
            }));
        }
    }

    fn handle_event(&self, event: &HubEvent) {
        match event {
            HubEvent::Dragging(panel_id) => {
                debug!(panel_id = %panel_id, "Panel drag started");
                self.inner.dragging.store(true, Ordering::Release);
            }
            HubEvent::Dropped(panel_id) => {
                debug!(panel_id = %panel_id, "Panel dropped");
                self.inner.dragging.store(false, Ordering::Release);
                self.layout_state_changed();
            }
            HubEvent::LayoutStateChanged | HubEvent::TitleChanged { .. } => {
                self.layout_state_changed()
            }
            _ => {}
        }
    }

    /// Register `component` with the default hydrate and dehydrate.
    pub fn register_component(&self, name: impl Into<String>, component: ComponentRef) -> Deregister {
        self.register_component_with(name, component, None, None)
    }

    /// Register `component` under `name`, wrapped so a failing render stays
    /// contained in its panel. Registering a name again replaces it; the
    /// earlier registration's deregister then does nothing.
    pub fn register_component_with(
        &self,
        name: impl Into<String>,
        component: ComponentRef,
        hydrate: Option<PanelHydrateFn>,
        dehydrate: Option<PanelDehydrateFn>,
    ) -> Deregister {
        let name = name.into();
        let token = self.inner.next_registration.fetch_add(1, Ordering::Relaxed);
        self.inner.registrations.lock().insert(name.clone(), token);

        let hydrate = hydrate.unwrap_or_else(|| {
            Arc::new(|props: PanelProps, dashboard_id: &str| Ok(hydrate_default(props, dashboard_id)))
        });
        let dehydrate = dehydrate.unwrap_or_else(|| {
            Arc::new(|config: &ComponentConfig, _: &str| Some(dehydrate_default(config)))
        });
        self.inner.hooks.hydrate.write().insert(name.clone(), hydrate);
        self.inner.hooks.dehydrate.write().insert(name.clone(), dehydrate);

        let wrapped: ComponentRef = Arc::new(DashboardPanel::new(component));
        let registered = name.clone();
        self.inner
            .layout
            .update(|layout| layout.register_component(registered, wrapped));

        let weak = Arc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Dashboard { inner }.deregister_component(&name, token);
            }
        })
    }

    fn deregister_component(&self, name: &str, token: u64) {
        {
            let mut registrations = self.inner.registrations.lock();
            if registrations.get(name) != Some(&token) {
                debug!(component = name, "Registration was replaced, not deregistering");
                return;
            }
            registrations.remove(name);
        }
        self.inner.hooks.hydrate.write().remove(name);
        self.inner.hooks.dehydrate.write().remove(name);
        self.inner
            .layout
            .update(|layout| layout.deregister_component(name));
    }

    /// Replace the layout with a saved one, hydrating every panel.
    /// Loading the layout last reported or loaded does nothing.
    pub fn load_layout(&self, config: &[ItemConfig]) -> Result<()> {
        if self
            .inner
            .last_config
            .lock()
            .as_deref()
            .is_some_and(|last| is_equal(last, config, false))
        {
            debug!(dashboard_id = %self.inner.id, "Layout unchanged, not reloading");
            return Ok(());
        }

        let hooks = &self.inner.hooks;
        let hydrated = hydrate_layout_config(config, &mut |component: &str, props| {
            hooks.hydrate(component, props)
        });
        *self.inner.last_config.lock() = Some(config.to_vec());
        self.inner.layout.update(|layout| layout.load(hydrated))?;
        Ok(())
    }

    /// Saved form of the current layout.
    pub fn dehydrated_layout(&self) -> Vec<ItemConfig> {
        let config = self.inner.layout.read(|layout| layout.to_config());
        let hooks = &self.inner.hooks;
        dehydrate_layout_config(&config, &mut |component: &ComponentConfig| {
            hooks.dehydrate(component)
        })
    }

    pub fn to_document(&self) -> WorkspaceDocument {
        WorkspaceDocument {
            layout: self.dehydrated_layout(),
            closed: self.inner.panel_manager.closed_panels(),
            persistent_state: InitialPersistentState::Keyed(self.inner.persistent_state.snapshot()),
        }
    }

    fn layout_state_changed(&self) {
        if self.inner.dragging.load(Ordering::Acquire) {
            debug!(dashboard_id = %self.inner.id, "Layout changed during drag, waiting for drop");
            return;
        }

        let dehydrated = self.dehydrated_layout();
        {
            let mut last = self.inner.last_config.lock();
            if last
                .as_deref()
                .is_some_and(|last| is_equal(last, &dehydrated, false))
            {
                return;
            }
            *last = Some(dehydrated.clone());
        }

        let listener = self.inner.on_layout_change.read().clone();
        if let Some(listener) = listener {
            listener(&dehydrated);
        }
    }

    /// Detach from the hub and stop recording persisted state.
    pub fn close(&self) {
        self.inner.panel_manager.stop_listening();
        let hub = self.hub().clone();
        for id in self.inner.listeners.lock().drain(..) {
            hub.off(id);
        }
        self.inner.persistent_state.close();
        info!(dashboard_id = %self.inner.id, "Dashboard closed");
    }
}
