// ABOUTME: Widget plugins and the resolver that turns widget types into renderable components
// ABOUTME: Layer 4: depends on the layout's component model, used by the workspace's widget loader

pub mod error;
pub mod plugin;
pub mod registry;
pub mod resolver;

pub use error::{PluginError, Result};
pub use plugin::{
    FnMiddleware, MiddlewareRef, Plugin, WidgetComponent, WidgetMiddleware, WidgetPlugin,
    wrapping_middleware,
};
pub use registry::{PluginListener, PluginRegistry, SubscriptionId};
pub use resolver::{
    ResolvedWidget, WidgetPanel, WidgetRegistration, WidgetTypeEntry, base_component,
    collect_widget_types, compose, plan_registrations, resolve_widget_plugins,
};
