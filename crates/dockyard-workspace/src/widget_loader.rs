// ABOUTME: Registers widget plugins as dashboard components and opens widgets on request
// ABOUTME: Registrations are rebuilt whenever the plugin set changes

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use dockyard_events::{HubEvent, ListenerId, PanelEvent};
use dockyard_layout::{OpenOptions, open_component};
use dockyard_logging::{debug, error, info};
use dockyard_plugin::{
    Plugin, PluginRegistry, ResolvedWidget, SubscriptionId, plan_registrations,
    resolve_widget_plugins,
};
use dockyard_types::{ComponentConfig, PanelId, PanelMetadata, PanelOpenDetail, PanelProps};

use crate::dashboard::{Dashboard, Deregister};

struct LoaderInner {
    dashboard: Dashboard,
    registry: Arc<PluginRegistry>,
    widgets: RwLock<IndexMap<String, ResolvedWidget>>,
    registrations: Mutex<Vec<Deregister>>,
    open_listener: Mutex<Option<ListenerId>>,
    subscription: Mutex<Option<SubscriptionId>>,
}

/// Bridges the plugin registry and a dashboard.
#[derive(Clone)]
pub struct WidgetLoader {
    inner: Arc<LoaderInner>,
}

impl WidgetLoader {
    pub fn new(dashboard: Dashboard, registry: Arc<PluginRegistry>) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                dashboard,
                registry,
                widgets: RwLock::new(IndexMap::new()),
                registrations: Mutex::new(Vec::new()),
                open_listener: Mutex::new(None),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Register the current plugins and start handling open requests.
    pub fn start(&self) {
        let mut open_listener = self.inner.open_listener.lock();
        if open_listener.is_some() {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        *open_listener = Some(self.inner.dashboard.hub().on(PanelEvent::OPEN, move |event| {
            if let (Some(inner), HubEvent::Open(detail)) = (weak.upgrade(), event) {
                WidgetLoader { inner }.open_widget(detail);
            }
        }));
        drop(open_listener);

        let weak = Arc::downgrade(&self.inner);
        let subscription = self.inner.registry.subscribe(move |plugins| {
            if let Some(inner) = weak.upgrade() {
                WidgetLoader { inner }.reload(plugins);
            }
        });
        *self.inner.subscription.lock() = Some(subscription);

        self.reload(&self.inner.registry.plugins());
    }

    /// Stop handling open requests and remove every widget registration.
    pub fn stop(&self) {
        if let Some(id) = self.inner.subscription.lock().take() {
            self.inner.registry.unsubscribe(id);
        }
        if let Some(id) = self.inner.open_listener.lock().take() {
            self.inner.dashboard.hub().off(id);
        }
        let registrations = std::mem::take(&mut *self.inner.registrations.lock());
        for deregister in registrations {
            deregister();
        }
        self.inner.widgets.write().clear();
    }

    /// Widget types that can currently be opened.
    pub fn widget_types(&self) -> Vec<String> {
        self.inner.widgets.read().keys().cloned().collect()
    }

    fn reload(&self, plugins: &[Plugin]) {
        let widgets = resolve_widget_plugins(plugins);
        let planned = plan_registrations(&widgets);
        let widget_types = widgets.len();
        *self.inner.widgets.write() = widgets;

        // A plugin still present is replaced in place and its old deregister
        // does nothing.
        let registrations: Vec<Deregister> = planned
            .into_iter()
            .map(|registration| {
                debug!(
                    plugin = %registration.name,
                    types = ?registration.types,
                    "Registering widget plugin"
                );
                self.inner
                    .dashboard
                    .register_component(registration.name, registration.component)
            })
            .collect();
        let previous = std::mem::replace(&mut *self.inner.registrations.lock(), registrations);
        for deregister in previous {
            deregister();
        }
        info!(widget_types, "Widget plugins loaded");
    }

    /// Open the widget described by `detail` in a panel. Types no plugin
    /// handles are ignored.
    pub fn open_widget(&self, detail: &PanelOpenDetail) {
        let widget = &detail.widget;
        let Some(resolved) = self.inner.widgets.read().get(&widget.widget_type).cloned() else {
            debug!(widget_type = %widget.widget_type, "No widget plugin for type, ignoring open");
            return;
        };

        let title = widget.title.clone().or_else(|| widget.name.clone());
        let mut props = PanelProps {
            metadata: Some(PanelMetadata {
                id: widget.id.clone(),
                name: widget.name.clone(),
                widget_type: Some(widget.widget_type.clone()),
                ..Default::default()
            }),
            local_dashboard_id: Some(self.inner.dashboard.id().to_string()),
            ..Default::default()
        };
        if let Some(fetch) = &detail.fetch {
            props.runtime.insert("fetch", fetch.clone());
        }

        let mut config = ComponentConfig::new(resolved.component_name()).with_props(props);
        config.id = Some(detail.panel_id.clone().unwrap_or_else(PanelId::generate));
        config.title = title;

        let options = OpenOptions::new(config).drag_event(detail.drag_event);
        match self
            .inner
            .dashboard
            .layout()
            .update(|layout| open_component(layout, options))
        {
            Ok(outcome) => debug!(widget_type = %widget.widget_type, ?outcome, "Opened widget"),
            Err(err) => error!(widget_type = %widget.widget_type, error = %err, "Failed to open widget"),
        }
    }
}
