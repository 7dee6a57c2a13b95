// ABOUTME: Scripted walkthrough of a dashboard: widget plugins, opening, closing and reopening panels
// ABOUTME: Also runs cancelable widget initialization on the Tokio runtime

use anyhow::Result;
use serde_json::{Value, json};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use dockyard_events::HubEvent;
use dockyard_layout::named_component;
use dockyard_logging::{debug, info};
use dockyard_plugin::{PluginRegistry, WidgetPlugin, wrapping_middleware};
use dockyard_types::{ComponentConfig, PanelId, PanelOpenDetail, WidgetDescriptor, WidgetFetch};
use dockyard_workspace::{
    Dashboard, InitError, WidgetLoader, make_cancelable, make_cancelable_with_cleanup,
};

use crate::config::Config;
use crate::document::outline;

fn sample_plugins(registry: &PluginRegistry) {
    registry.register_widget(WidgetPlugin::base(
        "table",
        ["Table", "Grid"],
        named_component("TableView"),
    ));
    registry.register_widget(WidgetPlugin::middleware(
        "toolbar",
        ["Table"],
        wrapping_middleware("Toolbar"),
    ));
    registry.register_widget(WidgetPlugin::base("plot", ["Plot"], named_component("PlotView")));
    registry.register_widget(WidgetPlugin::middleware(
        "legend",
        ["Plot"],
        wrapping_middleware("Legend"),
    ));
    // Nothing renders charts, so this one is dropped.
    registry.register_widget(WidgetPlugin::middleware(
        "annotations",
        ["Chart"],
        wrapping_middleware("Annotations"),
    ));
}

fn widget(widget_type: &str, name: &str, title: &str) -> WidgetDescriptor {
    WidgetDescriptor {
        widget_type: widget_type.to_string(),
        name: Some(name.to_string()),
        title: Some(title.to_string()),
        id: None,
    }
}

fn leaf_config(dashboard: &Dashboard, panel_id: &str) -> Option<ComponentConfig> {
    dashboard.layout().read(|layout| {
        let tree = layout.tree();
        tree.config(tree.find_panel(&PanelId::from(panel_id))?).cloned()
    })
}

fn render(dashboard: &Dashboard, panel_id: &str) -> String {
    dashboard
        .layout()
        .read(|layout| {
            let leaf = layout.tree().find_panel(&PanelId::from(panel_id))?;
            layout.render(leaf)
        })
        .map_or_else(|| "(not open)".to_string(), |element| element.to_string())
}

/// Run the walkthrough, writing what happens to `out`.
pub async fn run(config: &Config, out: &mut dyn Write) -> Result<()> {
    let dashboard = Dashboard::new(config.dashboard_options())?;
    let registry = Arc::new(PluginRegistry::new());
    sample_plugins(&registry);

    let loader = WidgetLoader::new(dashboard.clone(), registry.clone());
    loader.start();
    writeln!(out, "widget types: {}", loader.widget_types().join(", "))?;

    let fetch: WidgetFetch = Arc::new(|| -> Result<Value, String> { Ok(json!({ "rows": 42 })) });
    let mut sales = PanelOpenDetail::new(widget("Table", "sales", "Sales")).with_panel_id("sales");
    sales.fetch = Some(fetch);
    dashboard.emit(HubEvent::Open(sales));
    dashboard.emit(HubEvent::Open(
        PanelOpenDetail::new(widget("Grid", "inventory", "Inventory")).with_panel_id("inventory"),
    ));
    dashboard.emit(HubEvent::Open(
        PanelOpenDetail::new(widget("Plot", "trend", "Trend")).with_panel_id("trend"),
    ));
    dashboard.emit(HubEvent::Open(
        PanelOpenDetail::new(widget("Chart", "notes", "Notes")).with_panel_id("notes"),
    ));

    for panel_id in ["sales", "inventory", "trend", "notes"] {
        writeln!(out, "{panel_id}: {}", render(&dashboard, panel_id))?;
    }

    let fetch = leaf_config(&dashboard, "sales")
        .and_then(|config| config.props.runtime.get::<WidgetFetch>("fetch").cloned());
    if let Some(fetch) = fetch {
        let (init, _handle) = make_cancelable(async move { fetch() })?;
        match init.wait().await? {
            Ok(data) => writeln!(out, "sales data: {data}")?,
            Err(err) => writeln!(out, "sales data failed: {err}")?,
        }
    }

    let (init, handle) = make_cancelable_with_cleanup(
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            json!({ "points": 3 })
        },
        |data: Value| debug!(data = %data, "Discarding data of canceled initialization"),
    )?;
    handle.cancel();
    match init.wait().await {
        Ok(data) => writeln!(out, "trend data: {data}")?,
        Err(InitError::Canceled) => writeln!(out, "trend data: canceled")?,
        Err(err) => return Err(err.into()),
    }

    dashboard.emit(HubEvent::Close(PanelId::from("inventory")));
    writeln!(out, "closed: inventory")?;
    dashboard.emit(HubEvent::ReopenLast {
        container_panel_id: None,
    });
    let reopened = dashboard
        .panel_manager()
        .get_opened_panel_by_id(&PanelId::from("inventory"))
        .is_some();
    writeln!(
        out,
        "{}: inventory",
        if reopened { "reopened" } else { "not reopened" }
    )?;
    writeln!(
        out,
        "closed panels: {}",
        dashboard.panel_manager().closed_panels().len()
    )?;

    writeln!(out, "layout:")?;
    for line in outline(&dashboard) {
        writeln!(out, "  {line}")?;
    }

    loader.stop();
    dashboard.close();
    info!("Demo finished");
    Ok(())
}
