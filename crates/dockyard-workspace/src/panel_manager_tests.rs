// ABOUTME: Tests for panel tracking driven through the event hub
// ABOUTME: Recency order, closed history, reopening, stale unmounts and keyboard cycling

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use dockyard_events::{EventHub, HubEvent};
    use dockyard_layout::{Layout, LayoutHandle, OpenOptions, named_component, open_component};
    use dockyard_types::{
        ClosedPanel, ComponentConfig, ConfigPattern, Panel, PanelId, PanelProps, is_same_panel,
    };

    use crate::panel_manager::{MAX_CLOSED_PANEL_COUNT, PanelManager, PanelManagerOptions};

    fn setup(options: PanelManagerOptions) -> (LayoutHandle, PanelManager) {
        let mut layout = Layout::new();
        for name in ["A", "B", "C"] {
            layout.register_component(name, named_component(name));
        }
        let handle = LayoutHandle::new(layout, Arc::new(EventHub::new()));
        let manager = PanelManager::new(handle.clone(), options);
        manager.start_listening();
        (handle, manager)
    }

    fn open(handle: &LayoutHandle, component: &str, id: &str) {
        let config = ComponentConfig::new(component).with_id(id).with_title(id);
        handle
            .update(|layout| open_component(layout, OpenOptions::new(config)))
            .unwrap();
    }

    fn close(handle: &LayoutHandle, id: &str) {
        handle.emit(HubEvent::Close(PanelId::from(id)));
    }

    fn focus(handle: &LayoutHandle, id: &str) {
        handle
            .update(|layout| {
                let leaf = layout.tree().find_panel(&PanelId::from(id)).unwrap();
                layout.focus_component(leaf)
            })
            .unwrap();
    }

    fn focused_id(handle: &LayoutHandle) -> Option<String> {
        handle.read(|layout| {
            let leaf = layout.focused_component()?;
            layout.tree().config(leaf)?.id.as_ref().map(|id| id.to_string())
        })
    }

    fn stack_id_of(handle: &LayoutHandle, id: &str) -> Option<String> {
        handle.read(|layout| {
            let tree = layout.tree();
            let stack = tree.parent(tree.find_panel(&PanelId::from(id))?)?;
            tree.get(stack)?.id().map(str::to_string)
        })
    }

    fn opened_ids(manager: &PanelManager) -> Vec<String> {
        manager
            .opened_panels()
            .iter()
            .map(|panel| panel.panel_id().to_string())
            .collect()
    }

    fn closed_ids(manager: &PanelManager) -> Vec<String> {
        manager
            .closed_panels()
            .iter()
            .filter_map(|closed| closed.config.id.as_ref().map(|id| id.to_string()))
            .collect()
    }

    #[test]
    fn test_focus_moves_panel_to_most_recent() {
        let (handle, manager) = setup(PanelManagerOptions::default());
        open(&handle, "A", "a");
        open(&handle, "B", "b");
        open(&handle, "C", "c");
        assert_eq!(opened_ids(&manager), vec!["a", "b", "c"]);

        focus(&handle, "a");
        assert_eq!(opened_ids(&manager), vec!["b", "c", "a"]);

        let last = manager.get_last_used_panel_of_types(&["B", "A"]).unwrap();
        assert_eq!(last.panel_id().to_string(), "a");
        let last_b = manager.get_last_used_panel_of_types(&["B"]).unwrap();
        assert_eq!(last_b.panel_id().to_string(), "b");
        assert!(manager.get_last_used_panel_of_types(&["Z"]).is_none());
    }

    #[test]
    fn test_last_used_matcher_may_query_the_manager() {
        let (handle, manager) = setup(PanelManagerOptions::default());
        open(&handle, "A", "a");
        open(&handle, "B", "b");

        let last = manager
            .get_last_used_panel(|panel| {
                manager.opened_panels().len() == 2 && panel.component_type() == "A"
            })
            .unwrap();
        assert_eq!(last.panel_id().to_string(), "a");
    }

    #[test]
    fn test_closed_history_keeps_newest_entries() {
        let (handle, manager) = setup(PanelManagerOptions::default());
        for i in 0..=MAX_CLOSED_PANEL_COUNT {
            let id = format!("p{i}");
            open(&handle, "A", &id);
            close(&handle, &id);
        }

        let closed = closed_ids(&manager);
        assert_eq!(closed.len(), MAX_CLOSED_PANEL_COUNT);
        assert_eq!(closed.first().map(String::as_str), Some("p1"));
        assert_eq!(closed.last().map(String::as_str), Some("p100"));
        assert!(manager.opened_panels().is_empty());
    }

    #[test]
    fn test_closed_panel_is_dehydrated_with_its_stack() {
        let options = PanelManagerOptions {
            dehydrate: Arc::new(|config: &ComponentConfig| {
                (config.component != "B").then(|| ComponentConfig {
                    title: None,
                    ..config.clone()
                })
            }),
            ..Default::default()
        };
        let (handle, manager) = setup(options);
        open(&handle, "A", "a");
        open(&handle, "B", "b");
        let stack_id = stack_id_of(&handle, "a");

        close(&handle, "a");
        close(&handle, "b");

        let closed = manager.closed_panels();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].config.id, Some(PanelId::from("a")));
        assert_eq!(closed[0].config.title, None);
        assert_eq!(closed[0].parent_stack_id, stack_id);
        assert_eq!(manager.get_closed_panel_configs_of_type("A").len(), 1);
        assert!(manager.get_closed_panel_configs_of_type("B").is_empty());
    }

    #[test]
    fn test_reopen_last_hydrates_and_reopens() {
        let options = PanelManagerOptions {
            hydrate: Arc::new(|_: &str, mut props: PanelProps| {
                props.local_dashboard_id = Some("dash".to_string());
                props
            }),
            ..Default::default()
        };
        let (handle, manager) = setup(options);
        open(&handle, "A", "a");
        close(&handle, "a");
        assert_eq!(closed_ids(&manager), vec!["a"]);
        assert!(manager.opened_panels().is_empty());

        handle.emit(HubEvent::ReopenLast {
            container_panel_id: None,
        });

        assert!(manager.closed_panels().is_empty());
        assert_eq!(opened_ids(&manager), vec!["a"]);
        let configs = manager.get_opened_panel_configs();
        assert_eq!(configs[0].props.local_dashboard_id.as_deref(), Some("dash"));
    }

    #[test]
    fn test_reopen_last_is_scoped_to_container_stack() {
        let (handle, manager) = setup(PanelManagerOptions::default());
        open(&handle, "A", "a1");
        open(&handle, "A", "a2");
        open(&handle, "B", "b1");
        open(&handle, "B", "b2");
        close(&handle, "a1");
        close(&handle, "b1");
        assert_eq!(closed_ids(&manager), vec!["a1", "b1"]);

        handle.emit(HubEvent::ReopenLast {
            container_panel_id: Some(PanelId::from("a2")),
        });

        assert_eq!(closed_ids(&manager), vec!["b1"]);
        assert!(stack_id_of(&handle, "a1").is_some());
        assert_eq!(stack_id_of(&handle, "a1"), stack_id_of(&handle, "a2"));
    }

    #[test]
    fn test_reopen_replaces_matching_panel() {
        let options = PanelManagerOptions {
            closed: vec![ClosedPanel::new(
                ComponentConfig::new("A").with_id("old"),
                None,
            )],
            ..Default::default()
        };
        let (handle, manager) = setup(options);
        open(&handle, "A", "a1");

        handle.emit(HubEvent::Reopen {
            panel: manager.closed_panels()[0].clone(),
            replace_config: Some(ConfigPattern::id("a1")),
        });

        assert!(manager.closed_panels().is_empty());
        assert_eq!(opened_ids(&manager), vec!["old"]);
        assert!(handle.read(|layout| layout.tree().find_panel(&PanelId::from("a1")).is_none()));
    }

    #[test]
    fn test_delete_matches_by_identity_or_id() {
        let first = ClosedPanel::new(ComponentConfig::new("A").with_id("x"), None);
        let second = ClosedPanel::new(ComponentConfig::new("A").with_id("y"), None);
        let options = PanelManagerOptions {
            closed: vec![first.clone(), second],
            ..Default::default()
        };
        let (handle, manager) = setup(options);

        handle.emit(HubEvent::Delete(first));
        assert_eq!(closed_ids(&manager), vec!["y"]);

        let renamed = ClosedPanel::new(
            ComponentConfig::new("A").with_id("y").with_title("renamed"),
            None,
        );
        handle.emit(HubEvent::Delete(renamed));
        assert!(manager.closed_panels().is_empty());
    }

    #[test]
    fn test_restored_history_is_capped() {
        let closed = (0..5)
            .map(|i| ClosedPanel::new(ComponentConfig::new("A").with_id(format!("h{i}")), None))
            .collect();
        let options = PanelManagerOptions {
            closed,
            max_closed: 2,
            ..Default::default()
        };
        let (_handle, manager) = setup(options);
        assert_eq!(closed_ids(&manager), vec!["h3", "h4"]);
    }

    #[test]
    fn test_stale_unmount_is_ignored() {
        let (handle, manager) = setup(PanelManagerOptions::default());
        open(&handle, "A", "a");
        let old = manager.get_opened_panel_by_id(&PanelId::from("a")).unwrap();

        handle.update(|layout| layout.register_component("A", named_component("A")));
        let current = manager.get_opened_panel_by_id(&PanelId::from("a")).unwrap();
        assert!(!is_same_panel(&old, &current));

        handle.emit(HubEvent::Unmount(old));
        assert_eq!(opened_ids(&manager), vec!["a"]);

        handle.emit(HubEvent::Unmount(current));
        assert!(manager.opened_panels().is_empty());
    }

    #[test]
    fn test_cycle_tab_wraps_around() {
        let (handle, _manager) = setup(PanelManagerOptions::default());
        open(&handle, "A", "a1");
        open(&handle, "A", "a2");
        open(&handle, "A", "a3");
        focus(&handle, "a3");

        handle.emit(HubEvent::CycleToNextTab);
        assert_eq!(focused_id(&handle).as_deref(), Some("a1"));

        handle.emit(HubEvent::CycleToPreviousTab);
        assert_eq!(focused_id(&handle).as_deref(), Some("a3"));
        handle.emit(HubEvent::CycleToPreviousTab);
        assert_eq!(focused_id(&handle).as_deref(), Some("a2"));
    }

    #[test]
    fn test_cycle_stack_wraps_around() {
        let (handle, manager) = setup(PanelManagerOptions::default());
        open(&handle, "A", "a");
        open(&handle, "B", "b");
        open(&handle, "C", "c");

        handle.emit(HubEvent::CycleToNextStack);
        assert_eq!(focused_id(&handle).as_deref(), Some("a"));
        handle.emit(HubEvent::CycleToNextStack);
        assert_eq!(focused_id(&handle).as_deref(), Some("b"));

        handle.emit(HubEvent::CycleToPreviousStack);
        handle.emit(HubEvent::CycleToPreviousStack);
        assert_eq!(focused_id(&handle).as_deref(), Some("c"));
        assert_eq!(opened_ids(&manager).last().map(String::as_str), Some("c"));
    }

    #[test]
    fn test_cycle_previous_stack_without_focus_starts_at_first() {
        let (handle, _manager) = setup(PanelManagerOptions::default());
        open(&handle, "A", "a");
        open(&handle, "B", "b");
        open(&handle, "C", "c");
        assert_eq!(focused_id(&handle), None);

        handle.emit(HubEvent::CycleToPreviousStack);
        assert_eq!(focused_id(&handle).as_deref(), Some("a"));
        handle.emit(HubEvent::CycleToPreviousStack);
        assert_eq!(focused_id(&handle).as_deref(), Some("c"));
    }

    #[test]
    fn test_cycle_tab_without_focus_does_nothing() {
        let (handle, _manager) = setup(PanelManagerOptions::default());
        open(&handle, "A", "a1");
        handle.emit(HubEvent::CycleToNextTab);
        assert_eq!(focused_id(&handle), None);
    }

    #[test]
    fn test_updates_are_sent_on_mount_and_close() {
        let (handle, manager) = setup(PanelManagerOptions::default());
        let updates = Arc::new(StdMutex::new(Vec::new()));
        let sink = updates.clone();
        manager.set_on_panels_updated(move |update| {
            sink.lock()
                .unwrap()
                .push((update.opened.len(), update.closed.len()));
        });

        open(&handle, "A", "a");
        close(&handle, "a");

        // mount, unmount, closed
        assert_eq!(*updates.lock().unwrap(), vec![(1, 0), (0, 0), (0, 1)]);
    }

    #[test]
    fn test_queries_follow_the_layout() {
        let (handle, manager) = setup(PanelManagerOptions::default());
        open(&handle, "A", "a");
        open(&handle, "B", "b");

        let configs = manager.get_opened_panel_configs_of_type("B");
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].title.as_deref(), Some("b"));

        let leaf = manager.get_container_by_panel_id(&PanelId::from("a")).unwrap();
        let found = handle.read(|layout| layout.tree().find_panel(&PanelId::from("a")));
        assert_eq!(Some(leaf), found);
        assert!(manager.get_container_by_panel_id(&PanelId::from("nope")).is_none());
    }

    #[test]
    fn test_close_of_unknown_panel_is_ignored() {
        let (handle, manager) = setup(PanelManagerOptions::default());
        open(&handle, "A", "a");
        close(&handle, "missing");
        assert_eq!(opened_ids(&manager), vec!["a"]);
        assert!(manager.closed_panels().is_empty());
    }

    #[test]
    fn test_stop_listening_detaches_from_hub() {
        let (handle, manager) = setup(PanelManagerOptions::default());
        manager.stop_listening();
        assert!(!manager.is_listening());

        open(&handle, "A", "a");
        assert!(manager.opened_panels().is_empty());

        manager.start_listening();
        open(&handle, "B", "b");
        assert_eq!(opened_ids(&manager), vec!["b"]);
    }
}
