// ABOUTME: Dashboards: panel lifecycle tracking, widget loading and cancelable initialization
// ABOUTME: Layer 5: ties the layout, plugin and state crates together for the application

pub mod dashboard;
pub mod error;
pub mod init;
pub mod panel_manager;
pub mod widget_loader;

#[cfg(test)]
mod dashboard_tests;
#[cfg(test)]
mod panel_manager_tests;

pub use dashboard::{
    Dashboard, DashboardOptions, Deregister, LayoutChangeFn, PANEL_ERROR_ELEMENT,
    PanelDehydrateFn, PanelHydrateFn, WorkspaceDocument, dehydrate_default, hydrate_default,
};
pub use error::{InitError, Result, WorkspaceError};
pub use init::{CancelHandle, Cancelable, make_cancelable, make_cancelable_with_cleanup};
pub use panel_manager::{
    CycleDirection, DehydrateFn, HydrateFn, MAX_CLOSED_PANEL_COUNT, PanelManager,
    PanelManagerOptions, PanelsUpdate, PanelsUpdatedFn,
};
pub use widget_loader::WidgetLoader;
