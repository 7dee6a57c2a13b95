// ABOUTME: Reads saved layouts and workspace documents and restores them into dashboards
// ABOUTME: Also renders a dashboard's tree as an indented outline

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeSet;

use dockyard_layout::{ItemKey, ItemKind, Layout, named_component};
use dockyard_logging::debug;
use dockyard_types::ItemConfig;
use dockyard_workspace::{Dashboard, WorkspaceDocument};

use crate::config::Config;

/// Parse a saved layout. Accepts a full workspace document, a root content
/// list, or a single layout item.
pub fn parse_saved(text: &str) -> Result<WorkspaceDocument> {
    let value: Value = serde_json::from_str(text).context("Saved layout is not valid JSON")?;
    if value.is_array() {
        let layout: Vec<ItemConfig> = serde_json::from_value(value).context("Invalid layout")?;
        return Ok(WorkspaceDocument {
            layout,
            ..Default::default()
        });
    }
    if value.get("type").is_some() {
        let item: ItemConfig = serde_json::from_value(value).context("Invalid layout item")?;
        return Ok(WorkspaceDocument {
            layout: vec![item],
            ..Default::default()
        });
    }
    if value.is_object() {
        return serde_json::from_value(value).context("Invalid workspace document");
    }
    anyhow::bail!("Expected a layout list, a layout item or a workspace document")
}

/// Component names used by the leaves of `layout`, sorted.
pub fn component_names(layout: &[ItemConfig]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for item in layout {
        item.for_each_component(&mut |leaf| {
            names.insert(leaf.component.clone());
        });
    }
    names
}

/// A dashboard holding `document`. Every component the layout uses gets a
/// placeholder registration so its leaves mount and go through the default
/// hydrate and dehydrate.
pub fn restore(config: &Config, document: WorkspaceDocument) -> Result<Dashboard> {
    let WorkspaceDocument {
        layout,
        closed,
        persistent_state,
    } = document;

    let dashboard = Dashboard::with_history(config.dashboard_options(), closed, persistent_state)
        .context("Failed to create dashboard")?;
    for name in component_names(&layout) {
        debug!(component = %name, "Registering placeholder component");
        let _ = dashboard.register_component(name.clone(), named_component(name));
    }
    dashboard
        .load_layout(&layout)
        .context("Failed to load layout")?;
    Ok(dashboard)
}

/// One line per tree item, indented by depth.
pub fn outline(dashboard: &Dashboard) -> Vec<String> {
    dashboard.layout().read(|layout| {
        let mut lines = Vec::new();
        for &child in layout.tree().children(layout.root()) {
            outline_item(layout, child, 0, &mut lines);
        }
        lines
    })
}

fn outline_item(layout: &Layout, key: ItemKey, depth: usize, lines: &mut Vec<String>) {
    let tree = layout.tree();
    let Some(item) = tree.get(key) else {
        return;
    };

    let line = match item.kind() {
        ItemKind::Root => "root".to_string(),
        ItemKind::Row => "row".to_string(),
        ItemKind::Column => "column".to_string(),
        ItemKind::Stack => {
            let active = tree
                .active_index(key)
                .map_or_else(|| "-".to_string(), |index| index.to_string());
            format!(
                "stack {} (tabs: {}, active: {active})",
                item.id().unwrap_or("-"),
                item.children().len()
            )
        }
        ItemKind::Component => match item.config() {
            Some(config) => {
                let id = config
                    .id
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |id| id.to_string());
                let title = config.title.as_deref().unwrap_or("");
                let mounted = if layout.container(key).is_some() {
                    ""
                } else {
                    " (unmounted)"
                };
                format!("{} {id} \"{title}\"{mounted}", config.component)
            }
            None => "component".to_string(),
        },
    };
    lines.push(format!("{}{line}", "  ".repeat(depth)));

    for &child in item.children() {
        outline_item(layout, child, depth + 1, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockyard_state::InitialPersistentState;
    use dockyard_types::PanelId;

    const SAVED_LAYOUT: &str = r#"[
        {
            "type": "row",
            "content": [
                {
                    "type": "stack",
                    "id": "left",
                    "activeItemIndex": 1,
                    "content": [
                        { "type": "component", "component": "Table", "id": "sales", "title": "Sales" },
                        { "type": "react-component", "component": "Table", "id": "stock", "title": "Stock" }
                    ]
                },
                {
                    "type": "stack",
                    "id": "right",
                    "content": [
                        { "type": "component", "component": "Plot", "id": "trend", "props": { "panelState": { "zoom": 2 } } }
                    ]
                }
            ]
        }
    ]"#;

    fn config() -> Config {
        let mut config = Config::default();
        config.dashboard.id = Some("dash".to_string());
        config
    }

    #[test]
    fn test_parse_accepts_every_saved_shape() {
        let list = parse_saved(SAVED_LAYOUT).unwrap();
        assert_eq!(list.layout.len(), 1);
        assert!(list.closed.is_empty());

        let item = parse_saved(r#"{ "type": "stack", "content": [] }"#).unwrap();
        assert_eq!(item.layout.len(), 1);

        let document = parse_saved(
            r#"{ "layout": [], "closed": [{ "component": "Table", "id": "old", "parentStackId": "left" }], "persistentState": [] }"#,
        )
        .unwrap();
        assert_eq!(document.closed.len(), 1);
        assert_eq!(document.closed[0].parent_stack_id.as_deref(), Some("left"));
        assert_eq!(document.persistent_state, InitialPersistentState::Keyed(Vec::new()));
    }

    #[test]
    fn test_parse_rejects_other_json() {
        assert!(parse_saved("42").is_err());
        assert!(parse_saved("not json").is_err());
        assert!(parse_saved(r#"[{ "type": "triangle" }]"#).is_err());
    }

    #[test]
    fn test_component_names_are_collected_once() {
        let document = parse_saved(SAVED_LAYOUT).unwrap();
        let names: Vec<String> = component_names(&document.layout).into_iter().collect();
        assert_eq!(names, vec!["Plot", "Table"]);
    }

    #[test]
    fn test_restore_mounts_and_hydrates_leaves() {
        let document = parse_saved(SAVED_LAYOUT).unwrap();
        let dashboard = restore(&config(), document).unwrap();

        let opened = dashboard.panel_manager().opened_panels().len();
        assert_eq!(opened, 3);

        let trend = dashboard
            .panel_manager()
            .get_opened_panel_configs_of_type("Plot")
            .pop()
            .unwrap();
        assert_eq!(trend.id, Some(PanelId::from("trend")));
        assert_eq!(trend.props.local_dashboard_id.as_deref(), Some("dash"));
    }

    #[test]
    fn test_outline_shows_structure() {
        let document = parse_saved(SAVED_LAYOUT).unwrap();
        let dashboard = restore(&config(), document).unwrap();

        assert_eq!(
            outline(&dashboard),
            vec![
                "row",
                "  stack left (tabs: 2, active: 1)",
                "    Table sales \"Sales\"",
                "    Table stock \"Stock\"",
                "  stack right (tabs: 1, active: 0)",
                "    Plot trend \"\"",
            ]
        );
    }
}
