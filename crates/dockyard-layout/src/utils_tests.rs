// ABOUTME: Tests for stack placement, open/close/replace and layout persistence helpers
// ABOUTME: Covers the tree shape add_stack produces and the dehydrate/hydrate round trip

#[cfg(test)]
mod tests {
    use crate::component::named_component;
    use crate::layout::Layout;
    use crate::tree::{ContentTree, ItemKey, ItemKind};
    use crate::utils::*;
    use dockyard_events::{HubEvent, LayoutEvent, PanelEvent};
    use dockyard_types::{
        ComponentConfig, ConfigPattern, DragEvent, ItemConfig, PanelMetadata, PanelProps,
    };
    use proptest::prelude::*;
    use serde_json::json;

    fn leaf(name: &str, id: &str) -> ItemConfig {
        ItemConfig::Component(ComponentConfig::new(name).with_id(id))
    }

    fn titles(layout: &Layout, stack: ItemKey) -> Vec<String> {
        layout
            .tree()
            .children(stack)
            .iter()
            .filter_map(|&child| layout.tree().config(child))
            .map(|config| config.title.clone().unwrap_or_default())
            .collect()
    }

    /// Rows and columns hold at most two children and never directly contain
    /// a container of their own orientation.
    fn assert_alternates(tree: &ContentTree, key: ItemKey) {
        let kind = tree.kind(key).unwrap();
        let children = tree.children(key);
        if kind.is_row_or_column() {
            assert!(children.len() <= 2, "{kind:?} has {} children", children.len());
        }
        for &child in children {
            let child_kind = tree.kind(child).unwrap();
            if kind.is_row_or_column() && child_kind.is_row_or_column() {
                assert_ne!(kind, child_kind, "nested containers must alternate");
            }
            assert_alternates(tree, child);
        }
    }

    fn grid_and_chart() -> Layout {
        let mut layout = Layout::new();
        layout
            .load(vec![ItemConfig::row(vec![
                ItemConfig::stack(vec![leaf("Grid", "g1")]),
                ItemConfig::stack(vec![leaf("Chart", "c1")]),
            ])])
            .unwrap();
        layout
    }

    #[test]
    fn test_add_stack_builds_alternating_tree() {
        let mut layout = Layout::new();
        let root = layout.root();

        let first = add_stack(&mut layout, root, true).unwrap();
        let column = layout.tree().children(root)[0];
        assert_eq!(layout.tree().kind(column).unwrap(), ItemKind::Column);
        assert_eq!(layout.tree().parent(first), Some(column));

        let second = add_stack(&mut layout, root, true).unwrap();
        assert_eq!(layout.tree().children(column), &[first, second]);

        // The third stack pushes the second one into a nested row.
        let third = add_stack(&mut layout, root, true).unwrap();
        let row = layout.tree().children(column)[1];
        assert_eq!(layout.tree().kind(row).unwrap(), ItemKind::Row);
        assert_eq!(layout.tree().children(row), &[second, third]);

        let fourth = add_stack(&mut layout, root, true).unwrap();
        let nested = layout.tree().children(row)[1];
        assert_eq!(layout.tree().kind(nested).unwrap(), ItemKind::Column);
        assert_eq!(layout.tree().children(nested), &[third, fourth]);

        assert_alternates(layout.tree(), root);
    }

    #[test]
    fn test_add_stack_wraps_root_child_of_wrong_orientation() {
        let mut layout = grid_and_chart();
        let root = layout.root();
        let old_row = layout.tree().children(root)[0];

        let stack = add_stack(&mut layout, root, true).unwrap();
        let column = layout.tree().children(root)[0];
        assert_eq!(layout.tree().kind(column).unwrap(), ItemKind::Column);
        assert_eq!(layout.tree().children(column), &[old_row, stack]);
        assert_eq!(layout.tree().stacks().len(), 3);
        assert_alternates(layout.tree(), root);
    }

    #[test]
    fn test_add_stack_keeps_focus_when_reparenting() {
        let mut layout = grid_and_chart();
        let root = layout.root();
        let grid = layout.tree().find_panel(&"g1".into()).unwrap();
        layout.focus_component(grid).unwrap();

        add_stack(&mut layout, root, true).unwrap();
        assert_eq!(layout.focused_component(), Some(grid));
    }

    #[test]
    fn test_stack_lookup_tiers() {
        let mut layout = grid_and_chart();
        let root = layout.root();
        let grid_stack = layout.tree().stacks()[0];
        let chart_stack = layout.tree().stacks()[1];

        let exact = ConfigPattern::id("c1").with_component("Chart");
        assert_eq!(
            get_stack_for_root(&mut layout, root, &exact, false, false, false).unwrap(),
            Some(chart_stack)
        );

        let other_grid = ConfigPattern::id("g2").with_component("Grid");
        assert_eq!(
            get_stack_for_root(&mut layout, root, &other_grid, false, false, false).unwrap(),
            None
        );
        assert_eq!(
            get_stack_for_root(&mut layout, root, &other_grid, false, true, false).unwrap(),
            Some(grid_stack)
        );

        let unknown = ConfigPattern::component("Console");
        let created = get_stack_for_root(&mut layout, root, &unknown, true, true, false)
            .unwrap()
            .unwrap();
        assert!(layout.tree().children(created).is_empty());
        assert_eq!(layout.tree().stacks().len(), 3);
    }

    #[test]
    fn test_lookup_falls_back_to_empty_stack() {
        let mut layout = Layout::new();
        layout
            .load(vec![ItemConfig::column(vec![
                ItemConfig::stack(vec![leaf("Grid", "g1")]),
                ItemConfig::stack(vec![]),
            ])])
            .unwrap();
        let root = layout.root();
        let empty = layout.tree().stacks()[1];

        let pattern = ConfigPattern::component("Console");
        assert_eq!(
            get_stack_for_root(&mut layout, root, &pattern, false, true, true).unwrap(),
            Some(empty)
        );
        assert_eq!(get_stack_for_config(layout.tree(), root, &pattern, false), None);
    }

    #[test]
    fn test_empty_stack_competes_in_document_order() {
        let mut layout = Layout::new();
        layout
            .load(vec![ItemConfig::column(vec![
                ItemConfig::stack(vec![]),
                ItemConfig::stack(vec![leaf("Grid", "g1")]),
            ])])
            .unwrap();
        let root = layout.root();
        let empty = layout.tree().stacks()[0];
        let grid_stack = layout.tree().stacks()[1];

        let other_grid = ConfigPattern::id("g2").with_component("Grid");
        assert_eq!(
            get_stack_for_root(&mut layout, root, &other_grid, false, true, true).unwrap(),
            Some(empty)
        );
        assert_eq!(
            get_stack_for_root(&mut layout, root, &other_grid, false, true, false).unwrap(),
            Some(grid_stack)
        );
        assert_eq!(
            get_stack_for_root(&mut layout, root, &other_grid, false, false, true).unwrap(),
            None
        );
    }

    #[test]
    fn test_stack_for_component_types_uses_first_present_type() {
        let mut layout = grid_and_chart();
        let chart_stack = layout.tree().stacks()[1];

        let found =
            get_stack_for_component_types(&mut layout, &["Console", "Chart", "Grid"], false, true, false)
                .unwrap();
        assert_eq!(found, Some(chart_stack));

        let missing =
            get_stack_for_component_types(&mut layout, &["Console"], false, true, false).unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_open_replaces_existing_leaf_in_place() {
        let mut layout = Layout::new();
        layout
            .load(vec![ItemConfig::stack(vec![
                ItemConfig::Component(ComponentConfig::new("T").with_id("a").with_title("a")),
                ItemConfig::Component(ComponentConfig::new("T").with_id("b").with_title("b")),
                ItemConfig::Component(ComponentConfig::new("T").with_id("c").with_title("c")),
            ])])
            .unwrap();
        let stack = layout.tree().stacks()[0];
        layout.set_active_content_item(stack, layout.tree().children(stack)[0]).unwrap();

        let outcome = open_component(
            &mut layout,
            OpenOptions::new(ComponentConfig::new("T").with_id("b").with_title("new b")),
        )
        .unwrap();

        let replaced = match outcome {
            OpenOutcome::Replaced(item) => item,
            other => panic!("expected a replacement, got {other:?}"),
        };
        assert_eq!(titles(&layout, stack), vec!["a", "new b", "c"]);
        assert_eq!(layout.tree().active_child(stack), Some(replaced));
        assert!(is_active_tab(layout.tree(), replaced));
    }

    #[test]
    fn test_open_without_replace_appends() {
        let mut layout = Layout::new();
        layout
            .load(vec![ItemConfig::stack(vec![leaf("T", "a")])])
            .unwrap();
        let stack = layout.tree().stacks()[0];

        let outcome = open_component(
            &mut layout,
            OpenOptions::new(ComponentConfig::new("T").with_id("a")).replace_existing(false),
        )
        .unwrap();
        assert!(matches!(outcome, OpenOutcome::Added(_)));
        assert_eq!(layout.tree().children(stack).len(), 2);
    }

    #[test]
    fn test_open_uses_replace_config_to_find_target() {
        let mut layout = Layout::new();
        layout
            .load(vec![ItemConfig::stack(vec![
                ItemConfig::Component(ComponentConfig::new("T").with_id("a").with_title("old")),
            ])])
            .unwrap();
        let stack = layout.tree().stacks()[0];

        open_component(
            &mut layout,
            OpenOptions::new(ComponentConfig::new("T").with_id("z").with_title("fresh"))
                .replace_config(ConfigPattern::id("a")),
        )
        .unwrap();
        assert_eq!(titles(&layout, stack), vec!["fresh"]);
    }

    #[test]
    fn test_open_assigns_missing_id() {
        let mut layout = Layout::new();
        let item = open_component(&mut layout, OpenOptions::new(ComponentConfig::new("T")))
            .unwrap()
            .item()
            .unwrap();
        let id = layout.tree().config(item).unwrap().id.clone().unwrap();
        assert_eq!(id.as_str().map(str::len), Some(10));
    }

    #[test]
    fn test_open_in_new_stack() {
        let mut layout = grid_and_chart();
        let item = open_component(
            &mut layout,
            OpenOptions::new(ComponentConfig::new("Grid").with_id("g2")).create_new_stack(true),
        )
        .unwrap()
        .item()
        .unwrap();

        let stacks = layout.tree().stacks();
        assert_eq!(stacks.len(), 3);
        assert_eq!(layout.tree().children(stacks[2]), &[item]);
    }

    #[test]
    fn test_open_with_drag_event_leaves_tree_alone() {
        let mut layout = grid_and_chart();
        let before = layout.to_config();

        let outcome = open_component(
            &mut layout,
            OpenOptions::new(ComponentConfig::new("Grid"))
                .drag_event(Some(DragEvent { x: 4.0, y: 2.0 })),
        )
        .unwrap();

        let OpenOutcome::Dragging(drag) = outcome else {
            panic!("expected a drag, got {outcome:?}");
        };
        assert_eq!(layout.to_config(), before);
        assert!(layout.pending_drag(drag).unwrap().id.is_some());
    }

    #[test]
    fn test_open_focus_element_applies_on_next_frame() {
        let mut layout = Layout::new();
        open_component(
            &mut layout,
            OpenOptions::new(ComponentConfig::new("T").with_id("a")).focus_element("search"),
        )
        .unwrap();
        assert_eq!(layout.focused_element(), None);

        layout.run_animation_frame();
        let (panel_id, element) = layout.focused_element().unwrap();
        assert_eq!(panel_id, "a");
        assert_eq!(element, "search");
    }

    #[test]
    fn test_open_then_close_restores_tree() {
        let mut layout = Layout::new();
        layout
            .load(vec![ItemConfig::stack(vec![leaf("T", "x")])])
            .unwrap();
        let before = layout.to_config();

        open_component(&mut layout, OpenOptions::new(ComponentConfig::new("T").with_id("y")))
            .unwrap();
        assert_ne!(layout.to_config(), before);

        assert!(close_component(&mut layout, &ConfigPattern::id("y")));
        assert_eq!(layout.to_config(), before);
    }

    #[test]
    fn test_close_mounted_leaf_goes_through_container() {
        let mut layout = Layout::new();
        layout.register_component("T", named_component("T"));
        layout
            .load(vec![ItemConfig::stack(vec![leaf("T", "x"), leaf("T", "y")])])
            .unwrap();
        layout.take_events();

        assert!(close_component(&mut layout, &ConfigPattern::id("y")));
        let events = layout.take_events();
        let names: Vec<_> = events.iter().map(HubEvent::name).collect();
        assert_eq!(
            names,
            vec![PanelEvent::UNMOUNT, PanelEvent::CLOSED, LayoutEvent::STATE_CHANGED]
        );
    }

    #[test]
    fn test_close_without_match_is_a_no_op() {
        let mut layout = grid_and_chart();
        let before = layout.to_config();
        layout.take_events();

        assert!(!close_component(&mut layout, &ConfigPattern::id("missing")));
        assert_eq!(layout.to_config(), before);
        assert!(layout.take_events().is_empty());
    }

    #[test]
    fn test_rename_and_activate() {
        let mut layout = Layout::new();
        layout
            .load(vec![ItemConfig::stack(vec![leaf("T", "a"), leaf("T", "b")])])
            .unwrap();
        let stack = layout.tree().stacks()[0];
        layout.take_events();

        assert!(rename_component(&mut layout, &ConfigPattern::id("a"), "Renamed"));
        assert_eq!(titles(&layout, stack), vec!["Renamed", ""]);
        let events = layout.take_events();
        assert!(matches!(
            &events[0],
            HubEvent::TitleChanged { title, .. } if title == "Renamed"
        ));

        assert!(activate_tab(&mut layout, &ConfigPattern::id("a").with_component("T")));
        assert_eq!(layout.tree().active_index(stack), Some(0));

        assert!(!rename_component(&mut layout, &ConfigPattern::id("nope"), "x"));
        assert!(!activate_tab(&mut layout, &ConfigPattern::id("nope")));
    }

    #[test]
    fn test_clone_component_adds_copy_to_same_stack() {
        let mut layout = Layout::new();
        layout
            .load(vec![ItemConfig::stack(vec![
                ItemConfig::Component(ComponentConfig::new("T").with_id("a").with_title("Trades")),
            ])])
            .unwrap();
        let stack = layout.tree().stacks()[0];
        layout.take_events();

        let copy = clone_component(&mut layout, &ConfigPattern::id("a"))
            .unwrap()
            .unwrap();
        assert_eq!(copy.title.as_deref(), Some("Trades Copy"));
        assert_ne!(copy.id.as_ref().unwrap(), "a");
        assert_eq!(titles(&layout, stack), vec!["Trades", "Trades Copy"]);

        let events = layout.take_events();
        assert!(matches!(&events[0], HubEvent::Cloned { source, .. } if source == "a"));
    }

    fn durable(config: &ComponentConfig) -> Option<ComponentConfig> {
        if config.component == "Gone" {
            return None;
        }
        let mut kept = ComponentConfig::new(config.component.clone());
        kept.id = config.id.clone();
        kept.title = config.title.clone();
        kept.props = PanelProps {
            metadata: config.props.metadata.clone(),
            panel_state: config.props.panel_state.clone(),
            ..Default::default()
        };
        Some(kept)
    }

    fn with_runtime(_component: &str, mut props: PanelProps) -> PanelProps {
        props.local_dashboard_id = Some("dashboard".to_string());
        props.runtime.insert("fetch", 7u32);
        props
    }

    fn panel(id: &str, state: serde_json::Value) -> ItemConfig {
        let mut props = PanelProps::default()
            .with_metadata(PanelMetadata::for_widget("Grid"))
            .with_panel_state(state);
        props.extra.insert("scroll".to_string(), json!(120));
        ItemConfig::Component(ComponentConfig::new("Grid").with_id(id).with_props(props))
    }

    #[test]
    fn test_dehydrate_keeps_durable_props_and_drops_declined_leaves() {
        let config = vec![ItemConfig::row(vec![
            ItemConfig::stack(vec![panel("a", json!({"sort": "asc"})), leaf("Gone", "x")]),
            ItemConfig::stack(vec![panel("b", json!(null))]),
        ])];

        let dehydrated = dehydrate_layout_config(&config, &mut durable);
        let ItemConfig::Row(row) = &dehydrated[0] else {
            panic!("row expected");
        };
        assert_eq!(row.content[0].content().len(), 1);
        let a = row.content[0].content()[0].as_component().unwrap();
        assert!(a.props.extra.is_empty());
        assert_eq!(a.props.panel_state, Some(json!({"sort": "asc"})));
    }

    #[test]
    fn test_hydrate_adds_runtime_props_and_resets_bad_active_index() {
        let mut stack = ItemConfig::stack(vec![panel("a", json!(1)), panel("b", json!(2))]);
        if let ItemConfig::Stack(stack) = &mut stack {
            stack.active_item_index = Some(5);
        }

        let hydrated = hydrate_layout_config(&[stack], &mut with_runtime);
        let ItemConfig::Stack(stack) = &hydrated[0] else {
            panic!("stack expected");
        };
        assert_eq!(stack.active_item_index, Some(0));
        let a = stack.content[0].as_component().unwrap();
        assert_eq!(a.props.local_dashboard_id.as_deref(), Some("dashboard"));
        assert_eq!(a.props.runtime.get::<u32>("fetch"), Some(&7));
    }

    #[test]
    fn test_hydrate_gives_leaves_ids() {
        let config = vec![ItemConfig::stack(vec![ItemConfig::Component(ComponentConfig::new("Grid"))])];
        let hydrated = hydrate_layout_config(&config, &mut with_runtime);
        assert!(hydrated[0].content()[0].as_component().unwrap().id.is_some());
    }

    #[test]
    fn test_major_equality_ignores_active_tab() {
        let mut a = ItemConfig::stack(vec![leaf("T", "a"), leaf("T", "b")]);
        let mut b = a.clone();
        if let (ItemConfig::Stack(a), ItemConfig::Stack(b)) = (&mut a, &mut b) {
            a.active_item_index = Some(0);
            b.active_item_index = Some(1);
        }
        assert!(is_equal(&[a.clone()], &[b.clone()], true));
        assert!(!is_equal(&[a], &[b], false));
    }

    proptest! {
        #[test]
        fn prop_add_stack_alternates(count in 1usize..24, column_preferred in any::<bool>()) {
            let mut layout = Layout::new();
            let root = layout.root();
            for _ in 0..count {
                add_stack(&mut layout, root, column_preferred).unwrap();
            }
            assert_alternates(layout.tree(), root);
            prop_assert_eq!(layout.tree().stacks().len(), count);
        }

        #[test]
        fn prop_hydrate_dehydrate_round_trip(
            states in proptest::collection::vec(proptest::collection::vec(0i64..1000, 0..4), 1..5)
        ) {
            let stacks: Vec<ItemConfig> = states
                .iter()
                .enumerate()
                .map(|(s, stack)| {
                    ItemConfig::stack(
                        stack
                            .iter()
                            .enumerate()
                            .map(|(i, value)| panel(&format!("p{s}-{i}"), json!({ "value": value })))
                            .collect(),
                    )
                })
                .collect();
            let layout = vec![ItemConfig::column(stacks)];

            let persisted = dehydrate_layout_config(&layout, &mut durable);
            let restored = hydrate_layout_config(&persisted, &mut with_runtime);
            prop_assert_eq!(dehydrate_layout_config(&restored, &mut durable), persisted);
        }
    }
}
