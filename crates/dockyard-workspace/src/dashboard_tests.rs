// ABOUTME: Tests for dashboards: component wrapping, hydrate and dehydrate hooks, layout reporting
// ABOUTME: Also covers restoring history and the saved workspace document

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::sync::{Arc, Mutex as StdMutex};

    use dockyard_events::HubEvent;
    use dockyard_layout::{
        Component, ComponentRef, Element, FnComponent, OpenOptions, named_component, open_component,
        rename_component,
    };
    use dockyard_state::{InitialPersistentState, PersistentState, state_key};
    use dockyard_types::{
        ClosedPanel, ComponentConfig, ConfigPattern, ItemConfig, Panel, PanelId, PanelMetadata,
        PanelProps,
    };

    use crate::dashboard::{
        Dashboard, DashboardOptions, PANEL_ERROR_ELEMENT, PanelDehydrateFn, PanelHydrateFn,
        WorkspaceDocument,
    };
    use crate::error::WorkspaceError;

    fn dashboard() -> Dashboard {
        Dashboard::new(DashboardOptions {
            id: "dash".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn open(dashboard: &Dashboard, config: ComponentConfig) {
        dashboard
            .layout()
            .update(|layout| open_component(layout, OpenOptions::new(config)))
            .unwrap();
    }

    fn leaves(config: &[ItemConfig]) -> Vec<ComponentConfig> {
        let mut out = Vec::new();
        for item in config {
            item.for_each_component(&mut |leaf| out.push(leaf.clone()));
        }
        out
    }

    fn leaf(config: &[ItemConfig], id: &str) -> Option<ComponentConfig> {
        leaves(config)
            .into_iter()
            .find(|leaf| leaf.id == Some(PanelId::from(id)))
    }

    fn live_leaf(dashboard: &Dashboard, id: &str) -> Option<ComponentConfig> {
        leaf(&dashboard.layout().read(|layout| layout.to_config()), id)
    }

    fn record_layout_changes(dashboard: &Dashboard) -> Arc<StdMutex<Vec<Vec<ItemConfig>>>> {
        let reports = Arc::new(StdMutex::new(Vec::new()));
        let sink = reports.clone();
        dashboard.set_on_layout_change(move |config| sink.lock().unwrap().push(config.to_vec()));
        reports
    }

    #[test]
    fn test_registered_components_are_wrapped() {
        let dashboard = dashboard();
        dashboard.register_component("Plot", named_component("PlotImpl"));
        open(&dashboard, ComponentConfig::new("Plot").with_id("p"));

        let name = dashboard
            .layout()
            .read(|layout| layout.component("Plot").map(|c| c.name().to_string()));
        assert_eq!(name.as_deref(), Some("DashboardWrapper(PlotImpl)"));

        let manager = dashboard.panel_manager();
        let panel = manager.get_opened_panel_by_id(&PanelId::from("p")).unwrap();
        assert_eq!(panel.component_type(), "Plot");
        assert_eq!(panel.wrapped_component_type(), Some("PlotImpl"));

        let last = manager.get_last_used_panel_of_types(&["PlotImpl"]).unwrap();
        assert_eq!(last.panel_id(), &PanelId::from("p"));
    }

    #[test]
    fn test_failing_render_is_contained() {
        let dashboard = dashboard();
        let broken: ComponentRef = Arc::new(FnComponent::new("Broken", |_props: &PanelProps| -> Element {
            panic!("render failed")
        }));
        dashboard.register_component("Broken", broken);
        dashboard.register_component("A", named_component("A"));
        open(&dashboard, ComponentConfig::new("Broken").with_id("x"));
        open(&dashboard, ComponentConfig::new("A").with_id("a"));

        let render = |id: &str| {
            dashboard.layout().read(|layout| {
                let leaf = layout.tree().find_panel(&PanelId::from(id))?;
                layout.render(leaf).map(|element| element.name)
            })
        };
        assert_eq!(render("x").as_deref(), Some(PANEL_ERROR_ELEMENT));
        assert_eq!(render("a").as_deref(), Some("A"));
    }

    #[test]
    fn test_deregister_unmounts_panels() {
        let dashboard = dashboard();
        let deregister = dashboard.register_component("A", named_component("A"));
        open(&dashboard, ComponentConfig::new("A").with_id("a"));
        assert_eq!(dashboard.panel_manager().opened_panels().len(), 1);

        deregister();
        assert!(!dashboard.layout().read(|layout| layout.is_registered("A")));
        assert!(dashboard.panel_manager().opened_panels().is_empty());
        assert!(live_leaf(&dashboard, "a").is_some());
    }

    #[test]
    fn test_replaced_registration_ignores_old_deregister() {
        let dashboard = dashboard();
        let first = dashboard.register_component("A", named_component("A"));
        open(&dashboard, ComponentConfig::new("A").with_id("a"));
        let _second = dashboard.register_component("A", named_component("A2"));

        first();
        assert!(dashboard.layout().read(|layout| layout.is_registered("A")));
        let panel = dashboard
            .panel_manager()
            .get_opened_panel_by_id(&PanelId::from("a"))
            .unwrap();
        assert_eq!(panel.wrapped_component_type(), Some("A2"));
    }

    #[test]
    fn test_load_layout_hydrates_registered_components() {
        let dashboard = dashboard();
        dashboard.register_component("A", named_component("A"));

        let saved = vec![ItemConfig::stack(vec![
            ItemConfig::Component(
                ComponentConfig::new("A")
                    .with_id("a")
                    .with_props(PanelProps::default().with_panel_state(json!({ "zoom": 2 }))),
            ),
            ItemConfig::Component(ComponentConfig::new("Z").with_id("z")),
        ])];
        dashboard.load_layout(&saved).unwrap();

        let a = live_leaf(&dashboard, "a").unwrap();
        assert_eq!(a.props.local_dashboard_id.as_deref(), Some("dash"));
        assert_eq!(a.props.panel_state, Some(json!({ "zoom": 2 })));

        let z = live_leaf(&dashboard, "z").unwrap();
        assert_eq!(z.props.local_dashboard_id, None);
    }

    #[test]
    fn test_failed_hydrate_drops_panel_state() {
        let dashboard = dashboard();
        let hydrate: PanelHydrateFn = Arc::new(
            |_props: PanelProps, _dashboard_id: &str| -> std::result::Result<PanelProps, String> {
                Err("corrupt state".to_string())
            },
        );
        dashboard.register_component_with("A", named_component("A"), Some(hydrate), None);

        let saved = vec![ItemConfig::Component(
            ComponentConfig::new("A")
                .with_id("a")
                .with_props(PanelProps::default().with_panel_state(json!({ "zoom": 2 }))),
        )];
        dashboard.load_layout(&saved).unwrap();

        let a = live_leaf(&dashboard, "a").unwrap();
        assert_eq!(a.props.panel_state, None);
        assert_eq!(a.props.local_dashboard_id.as_deref(), Some("dash"));
    }

    #[test]
    fn test_default_dehydrate_keeps_only_persisted_props() {
        let dashboard = dashboard();
        dashboard.register_component("A", named_component("A"));

        let mut props = PanelProps::default().with_panel_state(json!({ "zoom": 2 }));
        props.local_dashboard_id = Some("other".to_string());
        props.extra.insert("scratch".to_string(), json!(true));
        props.metadata = Some(PanelMetadata {
            widget_type: Some("plot".to_string()),
            ..Default::default()
        });
        open(
            &dashboard,
            ComponentConfig::new("A").with_id("a").with_title("Plot").with_props(props),
        );

        let saved = leaf(&dashboard.dehydrated_layout(), "a").unwrap();
        assert_eq!(saved.title.as_deref(), Some("Plot"));
        assert_eq!(saved.props.local_dashboard_id, None);
        assert!(saved.props.extra.is_empty());
        assert_eq!(saved.props.panel_state, Some(json!({ "zoom": 2 })));
        assert_eq!(saved.props.widget_type(), Some("plot"));
    }

    #[test]
    fn test_declined_dehydrate_leaves_panel_out() {
        let dashboard = dashboard();
        let dehydrate: PanelDehydrateFn = Arc::new(
            |_config: &ComponentConfig, _dashboard_id: &str| -> Option<ComponentConfig> { None },
        );
        dashboard.register_component("A", named_component("A"));
        dashboard.register_component_with("B", named_component("B"), None, Some(dehydrate));
        open(&dashboard, ComponentConfig::new("A").with_id("a"));
        open(&dashboard, ComponentConfig::new("B").with_id("b"));

        let saved = dashboard.dehydrated_layout();
        assert!(leaf(&saved, "a").is_some());
        assert!(leaf(&saved, "b").is_none());
    }

    #[test]
    fn test_layout_change_is_reported_once() {
        let dashboard = dashboard();
        dashboard.register_component("A", named_component("A"));
        let reports = record_layout_changes(&dashboard);

        open(&dashboard, ComponentConfig::new("A").with_id("a"));
        let after_open = reports.lock().unwrap().len();
        assert!(after_open >= 1);
        let last = reports.lock().unwrap().last().cloned().unwrap();
        assert!(leaf(&last, "a").is_some());

        dashboard.emit(HubEvent::LayoutStateChanged);
        assert_eq!(reports.lock().unwrap().len(), after_open);
    }

    #[test]
    fn test_layout_change_waits_for_drop() {
        let dashboard = dashboard();
        dashboard.register_component("A", named_component("A"));
        let reports = record_layout_changes(&dashboard);
        open(&dashboard, ComponentConfig::new("A").with_id("a"));
        let before_drag = reports.lock().unwrap().len();

        dashboard.emit(HubEvent::Dragging(PanelId::from("a")));
        open(&dashboard, ComponentConfig::new("A").with_id("b"));
        assert_eq!(reports.lock().unwrap().len(), before_drag);

        dashboard.emit(HubEvent::Dropped(PanelId::from("a")));
        let reports = reports.lock().unwrap();
        assert_eq!(reports.len(), before_drag + 1);
        assert!(leaf(reports.last().unwrap(), "b").is_some());
    }

    #[test]
    fn test_title_change_is_reported() {
        let dashboard = dashboard();
        dashboard.register_component("A", named_component("A"));
        let reports = record_layout_changes(&dashboard);
        open(&dashboard, ComponentConfig::new("A").with_id("a").with_title("Before"));

        let renamed = dashboard
            .layout()
            .update(|layout| rename_component(layout, &ConfigPattern::id("a"), "After"));
        assert!(renamed);

        let last = reports.lock().unwrap().last().cloned().unwrap();
        assert_eq!(leaf(&last, "a").unwrap().title.as_deref(), Some("After"));
    }

    #[test]
    fn test_document_carries_layout_history_and_state() {
        let dashboard = dashboard();
        dashboard.register_component("A", named_component("A"));
        open(&dashboard, ComponentConfig::new("A").with_id("a"));
        open(&dashboard, ComponentConfig::new("A").with_id("b"));
        dashboard.emit(HubEvent::Close(PanelId::from("a")));

        let zoom = PersistentState::new("zoom", 1, json!(3));
        dashboard
            .persistent_state()
            .add_state("hook-1", "b", zoom.clone())
            .unwrap();

        let document = dashboard.to_document();
        assert!(leaf(&document.layout, "b").is_some());
        assert!(leaf(&document.layout, "a").is_none());
        assert_eq!(document.closed.len(), 1);
        assert_eq!(
            document.persistent_state,
            InitialPersistentState::Keyed(vec![(state_key("b", "zoom"), zoom)])
        );

        let value = serde_json::to_value(&document).unwrap();
        for key in ["layout", "closed", "persistentState"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        let restored: WorkspaceDocument = serde_json::from_value(value).unwrap();
        assert_eq!(restored, document);
    }

    #[test]
    fn test_restored_history_respects_limit() {
        let closed: Vec<ClosedPanel> = (1..=3)
            .map(|i| ClosedPanel::new(ComponentConfig::new("A").with_id(format!("h{i}")), None))
            .collect();
        let dashboard = Dashboard::with_history(
            DashboardOptions {
                max_closed_panels: 2,
                ..Default::default()
            },
            closed,
            InitialPersistentState::default(),
        )
        .unwrap();

        let ids: Vec<Option<PanelId>> = dashboard
            .panel_manager()
            .closed_panels()
            .into_iter()
            .map(|closed| closed.config.id)
            .collect();
        assert_eq!(ids, vec![Some(PanelId::from("h2")), Some(PanelId::from("h3"))]);
    }

    #[test]
    fn test_empty_history_limit_is_rejected() {
        let result = Dashboard::new(DashboardOptions {
            max_closed_panels: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(WorkspaceError::InvalidHistoryLimit)));
    }

    #[test]
    fn test_closed_dashboard_stops_tracking() {
        let dashboard = dashboard();
        dashboard.register_component("A", named_component("A"));
        dashboard.close();

        open(&dashboard, ComponentConfig::new("A").with_id("a"));
        assert!(dashboard.panel_manager().opened_panels().is_empty());

        dashboard
            .persistent_state()
            .add_state("hook-1", "a", PersistentState::new("zoom", 1, json!(1)))
            .unwrap();
        assert!(dashboard.persistent_state().snapshot().is_empty());
    }
}
