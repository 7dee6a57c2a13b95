// ABOUTME: Resolves widget types to a base plugin plus ordered middleware
// ABOUTME: Composes middleware chains and plans one layout registration per base plugin

use indexmap::IndexMap;
use std::sync::Arc;

use dockyard_layout::{Component, ComponentRef, Element};
use dockyard_logging::{debug, warn};
use dockyard_types::PanelProps;

use crate::plugin::{MiddlewareRef, Plugin, WidgetComponent, WidgetPlugin};

/// Base plugin and middleware claimed for one widget type.
#[derive(Debug, Clone, Default)]
pub struct WidgetTypeEntry {
    pub base: Option<Arc<WidgetPlugin>>,
    /// Registration order; the first is the outermost wrapper.
    pub middleware: Vec<Arc<WidgetPlugin>>,
}

/// A widget type that can be rendered.
#[derive(Debug, Clone)]
pub struct ResolvedWidget {
    pub plugin: Arc<WidgetPlugin>,
    pub middleware: Vec<Arc<WidgetPlugin>>,
}

impl ResolvedWidget {
    /// Name the widget's component is registered with the layout under.
    pub fn component_name(&self) -> &str {
        &self.plugin.name
    }

    /// The fully composed component for this type.
    pub fn component(&self) -> ComponentRef {
        compose(base_component(&self.plugin), &self.middleware)
    }
}

/// Group widget plugins by supported type, in plugin order.
///
/// A later base plugin for a type replaces the earlier one; middleware
/// accumulates whichever side of its base it was registered on.
pub fn collect_widget_types<'a, I>(plugins: I) -> IndexMap<String, WidgetTypeEntry>
where
    I: IntoIterator<Item = &'a Plugin>,
{
    let mut types: IndexMap<String, WidgetTypeEntry> = IndexMap::new();
    for plugin in plugins {
        let Some(widget) = plugin.as_widget() else {
            continue;
        };
        for supported_type in widget.supported_types.iter().filter(|t| !t.is_empty()) {
            let entry = types.entry(supported_type.clone()).or_default();
            if widget.is_middleware() {
                entry.middleware.push(widget.clone());
                continue;
            }
            if let Some(previous) = &entry.base {
                warn!(
                    widget_type = %supported_type,
                    replaced = %previous.name,
                    plugin = %widget.name,
                    "Multiple WidgetPlugins handling type, replacing base plugin"
                );
            }
            entry.base = Some(widget.clone());
        }
    }
    types
}

/// Widget types that have a base plugin. Types claimed only by middleware
/// are dropped with a warning.
pub fn resolve_widget_plugins<'a, I>(plugins: I) -> IndexMap<String, ResolvedWidget>
where
    I: IntoIterator<Item = &'a Plugin>,
{
    collect_widget_types(plugins)
        .into_iter()
        .filter_map(|(widget_type, entry)| match entry.base {
            Some(plugin) => Some((
                widget_type,
                ResolvedWidget {
                    plugin,
                    middleware: entry.middleware,
                },
            )),
            None => {
                let middleware: Vec<&str> =
                    entry.middleware.iter().map(|m| m.name.as_str()).collect();
                warn!(
                    widget_type = %widget_type,
                    middleware = ?middleware,
                    "Middleware registered for widget type without a base plugin, ignoring"
                );
                None
            }
        })
        .collect()
}

/// Wrap `base` in `middleware` so the first middleware is outermost.
pub fn compose(base: ComponentRef, middleware: &[Arc<WidgetPlugin>]) -> ComponentRef {
    middleware
        .iter()
        .rev()
        .filter_map(|plugin| match &plugin.component {
            WidgetComponent::Middleware(middleware) => Some(middleware.clone()),
            WidgetComponent::Base(_) => None,
        })
        .fold(base, |inner, middleware| {
            Arc::new(ChainedComponent { middleware, inner }) as ComponentRef
        })
}

/// One link of a middleware chain.
struct ChainedComponent {
    middleware: MiddlewareRef,
    inner: ComponentRef,
}

impl Component for ChainedComponent {
    fn name(&self) -> &str {
        self.middleware.name()
    }

    fn wrapped_name(&self) -> Option<&str> {
        Some(self.inner.wrapped_name().unwrap_or(self.inner.name()))
    }

    fn render(&self, props: &PanelProps) -> Element {
        self.middleware.render(props, self.inner.as_ref())
    }
}

/// Panel chrome around a widget plugin's component.
pub struct WidgetPanel {
    name: String,
    widget_title: String,
    inner: ComponentRef,
}

impl WidgetPanel {
    pub const ELEMENT: &'static str = "WidgetPanel";

    pub fn new(plugin: &WidgetPlugin, inner: ComponentRef) -> Self {
        Self {
            name: format!("WidgetPanel({})", inner.name()),
            widget_title: plugin.display_title().to_string(),
            inner,
        }
    }

    pub fn widget_title(&self) -> &str {
        &self.widget_title
    }
}

impl Component for WidgetPanel {
    fn name(&self) -> &str {
        &self.name
    }

    fn wrapped_name(&self) -> Option<&str> {
        Some(self.inner.name())
    }

    fn render(&self, props: &PanelProps) -> Element {
        Element::new(Self::ELEMENT).with_child(self.inner.render(props))
    }
}

/// Innermost component of a base plugin: its panel component when it has
/// one, otherwise its component inside a [`WidgetPanel`].
pub fn base_component(plugin: &Arc<WidgetPlugin>) -> ComponentRef {
    if let Some(panel) = &plugin.panel_component {
        return panel.clone();
    }
    match &plugin.component {
        WidgetComponent::Base(component) => Arc::new(WidgetPanel::new(plugin, component.clone())),
        // Unreachable through resolution, which only keeps base plugins.
        WidgetComponent::Middleware(middleware) => {
            Arc::new(EmptyComponent(middleware.name().to_string()))
        }
    }
}

struct EmptyComponent(String);

impl Component for EmptyComponent {
    fn name(&self) -> &str {
        &self.0
    }

    fn render(&self, _props: &PanelProps) -> Element {
        Element::new(self.0.clone())
    }
}

/// A base plugin registered once with the layout, covering all its types.
pub struct WidgetRegistration {
    pub name: String,
    pub types: Vec<String>,
    pub component: ComponentRef,
}

/// One registration per distinct base plugin.
///
/// The registered component renders the chain composed for the leaf's
/// widget type (from its metadata), falling back to the plugin's first type.
pub fn plan_registrations(resolved: &IndexMap<String, ResolvedWidget>) -> Vec<WidgetRegistration> {
    let mut by_plugin: IndexMap<String, IndexMap<String, ComponentRef>> = IndexMap::new();
    for (widget_type, widget) in resolved {
        by_plugin
            .entry(widget.plugin.name.clone())
            .or_default()
            .insert(widget_type.clone(), widget.component());
    }

    by_plugin
        .into_iter()
        .map(|(name, chains)| {
            debug!(plugin = %name, types = chains.len(), "Planned widget registration");
            let types = chains.keys().cloned().collect();
            let component: ComponentRef = Arc::new(TypeDispatch {
                name: name.clone(),
                chains,
            });
            WidgetRegistration {
                name,
                types,
                component,
            }
        })
        .collect()
}

struct TypeDispatch {
    name: String,
    chains: IndexMap<String, ComponentRef>,
}

impl TypeDispatch {
    fn chain_for(&self, props: &PanelProps) -> Option<&ComponentRef> {
        props
            .widget_type()
            .and_then(|widget_type| self.chains.get(widget_type))
            .or_else(|| self.chains.values().next())
    }
}

impl Component for TypeDispatch {
    fn name(&self) -> &str {
        &self.name
    }

    fn wrapped_name(&self) -> Option<&str> {
        self.chains
            .values()
            .next()
            .map(|chain| chain.wrapped_name().unwrap_or(chain.name()))
    }

    fn render(&self, props: &PanelProps) -> Element {
        match self.chain_for(props) {
            Some(chain) => chain.render(props),
            None => Element::new(self.name.clone()),
        }
    }
}
