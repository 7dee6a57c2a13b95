// ABOUTME: Plugin descriptors: widget plugins, their middleware, and other plugin kinds
// ABOUTME: A widget plugin either renders a widget type or decorates another plugin's rendering

use std::fmt;
use std::sync::Arc;

use dockyard_layout::{Component, ComponentRef, Element};
use dockyard_types::PanelProps;

/// A decorator around the component of a widget type.
///
/// `inner` is the next component in the chain; the middleware decides where
/// and whether to render it.
pub trait WidgetMiddleware: Send + Sync {
    fn name(&self) -> &str;

    fn render(&self, props: &PanelProps, inner: &dyn Component) -> Element;
}

pub type MiddlewareRef = Arc<dyn WidgetMiddleware>;

/// Middleware built from a name and a render function.
pub struct FnMiddleware<F> {
    name: String,
    render: F,
}

impl<F> FnMiddleware<F>
where
    F: Fn(&PanelProps, &dyn Component) -> Element + Send + Sync,
{
    pub fn new(name: impl Into<String>, render: F) -> Self {
        Self {
            name: name.into(),
            render,
        }
    }
}

impl<F> WidgetMiddleware for FnMiddleware<F>
where
    F: Fn(&PanelProps, &dyn Component) -> Element + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, props: &PanelProps, inner: &dyn Component) -> Element {
        (self.render)(props, inner)
    }
}

/// Middleware that renders an element named after itself around its inner component.
pub fn wrapping_middleware(name: impl Into<String>) -> MiddlewareRef {
    let name = name.into();
    let element = name.clone();
    Arc::new(FnMiddleware::new(
        name,
        move |props: &PanelProps, inner: &dyn Component| {
            Element::new(element.clone()).with_child(inner.render(props))
        },
    ))
}

/// What a widget plugin contributes for its types.
#[derive(Clone)]
pub enum WidgetComponent {
    /// Renders the widget.
    Base(ComponentRef),
    /// Wraps whatever renders the widget.
    Middleware(MiddlewareRef),
}

/// A plugin rendering (or decorating) one or more widget types.
#[derive(Clone)]
pub struct WidgetPlugin {
    pub name: String,
    /// Human readable widget kind, shown by the panel chrome.
    pub title: Option<String>,
    pub supported_types: Vec<String>,
    pub component: WidgetComponent,
    /// Registered as-is instead of wrapping `component` in a widget panel.
    pub panel_component: Option<ComponentRef>,
}

impl WidgetPlugin {
    pub fn base<I, T>(name: impl Into<String>, supported_types: I, component: ComponentRef) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            title: None,
            supported_types: supported_types.into_iter().map(Into::into).collect(),
            component: WidgetComponent::Base(component),
            panel_component: None,
        }
    }

    pub fn middleware<I, T>(
        name: impl Into<String>,
        supported_types: I,
        middleware: MiddlewareRef,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            title: None,
            supported_types: supported_types.into_iter().map(Into::into).collect(),
            component: WidgetComponent::Middleware(middleware),
            panel_component: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_panel_component(mut self, component: ComponentRef) -> Self {
        self.panel_component = Some(component);
        self
    }

    pub fn is_middleware(&self) -> bool {
        matches!(self.component, WidgetComponent::Middleware(_))
    }

    /// Title shown for the widget kind, defaulting to the plugin name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Debug for WidgetPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetPlugin")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("supported_types", &self.supported_types)
            .field("middleware", &self.is_middleware())
            .field("panel_component", &self.panel_component.is_some())
            .finish()
    }
}

/// Plugin kinds known to the workspace. Only widget plugins take part in
/// widget resolution; the others are carried for the hosts that use them.
#[derive(Debug, Clone)]
pub enum Plugin {
    Widget(Arc<WidgetPlugin>),
    Dashboard { name: String },
    Theme { name: String },
}

impl Plugin {
    pub fn name(&self) -> &str {
        match self {
            Plugin::Widget(plugin) => &plugin.name,
            Plugin::Dashboard { name } | Plugin::Theme { name } => name,
        }
    }

    pub fn as_widget(&self) -> Option<&Arc<WidgetPlugin>> {
        match self {
            Plugin::Widget(plugin) => Some(plugin),
            _ => None,
        }
    }
}

impl From<WidgetPlugin> for Plugin {
    fn from(plugin: WidgetPlugin) -> Self {
        Plugin::Widget(Arc::new(plugin))
    }
}
