// ABOUTME: Placement, lookup and persistence helpers over the layout tree
// ABOUTME: Finds or creates stacks for panels, opens and closes leaves, hydrates documents

use dockyard_logging::{debug, error, warn};
use dockyard_types::{
    ComponentConfig, ConfigPattern, DragEvent, ItemConfig, PanelId, PanelProps,
};

use crate::error::Result;
use crate::layout::{DragSourceId, Layout};
use crate::tree::{ContentTree, ItemKey, ItemKind};

fn orientation(column: bool) -> ItemConfig {
    if column {
        ItemConfig::column(Vec::new())
    } else {
        ItemConfig::row(Vec::new())
    }
}

fn orientation_kind(column: bool) -> ItemKind {
    if column { ItemKind::Column } else { ItemKind::Row }
}

/// Add a new stack under `parent`, growing the tree so rows and columns
/// alternate with depth.
///
/// Under the root the preferred orientation container is created or wrapped
/// around the existing child. A container with fewer than two children gets
/// the stack directly; otherwise its last child is wrapped in a container of
/// the opposite orientation if needed and the search continues there with
/// the preference flipped.
pub fn add_stack(layout: &mut Layout, parent: ItemKey, column_preferred: bool) -> Result<ItemKey> {
    let kind = layout.tree().kind(parent)?;
    if kind == ItemKind::Root {
        if layout.tree().children(parent).is_empty() {
            layout.add_child(parent, orientation(column_preferred), None)?;
        }

        let child = layout.tree().children(parent)[0];
        if layout.tree().kind(child)? != orientation_kind(column_preferred) {
            let focus = layout.focus_snapshot();
            layout.detach_child(parent, child)?;
            let wrapper = layout.add_child(parent, orientation(column_preferred), None)?;
            layout.attach_child(wrapper, child, None)?;
            layout.restore_focus(focus);
        }

        let child = layout.tree().children(parent)[0];
        return add_stack(layout, child, column_preferred);
    }

    let children = layout.tree().children(parent);
    if children.len() < 2 {
        return layout.add_child(parent, ItemConfig::stack(Vec::new()), None);
    }

    let last = children[children.len() - 1];
    let mut next_parent = last;
    if layout.tree().kind(last)? != orientation_kind(!column_preferred) {
        let wrapper = layout.add_child(parent, orientation(!column_preferred), None)?;
        layout.detach_child(parent, last)?;
        layout.attach_child(wrapper, last, None)?;
        next_parent = wrapper;
    }

    add_stack(layout, next_parent, !column_preferred)
}

/// First stack, in pre-order from `item`, holding a component that matches
/// `pattern`. With `allow_empty`, an empty stack reached first also qualifies.
pub fn get_stack_for_config(
    tree: &ContentTree,
    item: ItemKey,
    pattern: &ConfigPattern,
    allow_empty: bool,
) -> Option<ItemKey> {
    let node = tree.get(item)?;
    if allow_empty && node.is_stack() && node.children().is_empty() {
        return Some(item);
    }

    for &child in node.children() {
        let child_item = tree.get(child)?;
        if child_item.is_component() && child_item.config().is_some_and(|c| pattern.matches(c)) {
            return Some(item);
        }
        if let Some(stack) = get_stack_for_config(tree, child, pattern, allow_empty) {
            return Some(stack);
        }
    }
    None
}

/// Stack for a config under `root`, trying in order: a stack holding a
/// matching leaf; if `match_component_type`, the first stack in document
/// order that holds a leaf of the same component type or, with `allow_empty`,
/// is empty; and finally, if `create_if_not_found`, a new stack.
pub fn get_stack_for_root(
    layout: &mut Layout,
    root: ItemKey,
    pattern: &ConfigPattern,
    create_if_not_found: bool,
    match_component_type: bool,
    allow_empty: bool,
) -> Result<Option<ItemKey>> {
    let tree = layout.tree();
    let mut stack = get_stack_for_config(tree, root, pattern, false);
    if stack.is_none() && match_component_type {
        stack = get_stack_for_config(tree, root, &pattern.component_only(), allow_empty);
    }
    if stack.is_none() && create_if_not_found {
        let column_preferred = layout.column_preferred();
        stack = Some(add_stack(layout, root, column_preferred)?);
    }
    Ok(stack)
}

/// Stack holding a leaf of the first component type, in order, that has one.
pub fn get_stack_for_component_types(
    layout: &mut Layout,
    types: &[&str],
    create_if_not_found: bool,
    match_component_type: bool,
    allow_empty: bool,
) -> Result<Option<ItemKey>> {
    let root = layout.root();
    for ty in types {
        let pattern = ConfigPattern::component(*ty);
        if let Some(stack) =
            get_stack_for_root(layout, root, &pattern, false, match_component_type, allow_empty)?
        {
            return Ok(Some(stack));
        }
    }
    if create_if_not_found {
        let column_preferred = layout.column_preferred();
        return add_stack(layout, root, column_preferred).map(Some);
    }
    Ok(None)
}

/// First leaf of `stack` matching `pattern`.
pub fn get_content_item_in_stack(
    tree: &ContentTree,
    stack: ItemKey,
    pattern: &ConfigPattern,
) -> Option<ItemKey> {
    tree.children(stack)
        .iter()
        .copied()
        .find(|&child| tree.config(child).is_some_and(|c| pattern.matches(c)))
}

/// Whether `item` is the active tab of its stack.
pub fn is_active_tab(tree: &ContentTree, item: ItemKey) -> bool {
    tree.parent(item)
        .and_then(|stack| tree.active_child(stack))
        == Some(item)
}

/// Make the leaf matching `pattern` the active tab of its stack.
pub fn activate_tab(layout: &mut Layout, pattern: &ConfigPattern) -> bool {
    let root = layout.root();
    let stack = match get_stack_for_root(layout, root, pattern, false, true, false) {
        Ok(Some(stack)) => stack,
        _ => {
            error!(pattern = ?pattern, "Could not find stack for tab to activate");
            return false;
        }
    };
    match get_content_item_in_stack(layout.tree(), stack, pattern) {
        Some(item) => layout.set_active_content_item(stack, item).is_ok(),
        None => false,
    }
}

/// Options for [`open_component`].
#[derive(Debug, Clone)]
pub struct OpenOptions {
    pub config: ComponentConfig,
    /// Replace a leaf matching `replace_config` in place instead of adding a tab.
    pub replace_existing: bool,
    /// Which leaf to replace; defaults to `{ id, component }` of `config`.
    pub replace_config: Option<ConfigPattern>,
    /// Always open in a freshly created stack.
    pub create_new_stack: bool,
    /// Element inside the new panel to focus once it exists.
    pub focus_element: Option<String>,
    /// Start a drag instead of inserting into the tree.
    pub drag_event: Option<DragEvent>,
}

impl OpenOptions {
    pub fn new(config: ComponentConfig) -> Self {
        Self {
            config,
            replace_existing: true,
            replace_config: None,
            create_new_stack: false,
            focus_element: None,
            drag_event: None,
        }
    }

    pub fn replace_existing(mut self, replace_existing: bool) -> Self {
        self.replace_existing = replace_existing;
        self
    }

    pub fn replace_config(mut self, pattern: ConfigPattern) -> Self {
        self.replace_config = Some(pattern);
        self
    }

    pub fn create_new_stack(mut self, create_new_stack: bool) -> Self {
        self.create_new_stack = create_new_stack;
        self
    }

    pub fn focus_element(mut self, element: impl Into<String>) -> Self {
        self.focus_element = Some(element.into());
        self
    }

    pub fn drag_event(mut self, drag_event: Option<DragEvent>) -> Self {
        self.drag_event = drag_event;
        self
    }
}

/// What [`open_component`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Added as a new tab.
    Added(ItemKey),
    /// Replaced an existing leaf at the same index.
    Replaced(ItemKey),
    /// A drag was started; the leaf enters the tree when dropped.
    Dragging(DragSourceId),
}

impl OpenOutcome {
    pub fn item(self) -> Option<ItemKey> {
        match self {
            OpenOutcome::Added(item) | OpenOutcome::Replaced(item) => Some(item),
            OpenOutcome::Dragging(_) => None,
        }
    }
}

/// Open a component leaf, reusing the stack of a matching panel when possible.
///
/// A leaf without an id gets one. A matching existing leaf is replaced in
/// place (same index, becomes active) when `replace_existing` is set;
/// otherwise the leaf is appended to the chosen stack. Focus held before the
/// call is kept unless a `focus_element` is requested, which is applied on
/// the next animation frame.
pub fn open_component(layout: &mut Layout, options: OpenOptions) -> Result<OpenOutcome> {
    let OpenOptions {
        mut config,
        replace_existing,
        replace_config,
        create_new_stack,
        focus_element,
        drag_event,
    } = options;

    let focus = layout.focus_snapshot();
    let column_preferred = layout.column_preferred();
    let panel_id = config.id.get_or_insert_with(PanelId::generate).clone();

    if let Some(origin) = drag_event {
        return Ok(OpenOutcome::Dragging(layout.create_drag_source(config, origin)));
    }

    let search = replace_config.unwrap_or_else(|| ConfigPattern::from_config(&config));
    let root = layout.root();
    let stack = if create_new_stack {
        add_stack(layout, root, column_preferred)?
    } else {
        match get_stack_for_root(layout, root, &search, true, true, true)? {
            Some(stack) => stack,
            None => add_stack(layout, root, column_preferred)?,
        }
    };

    let existing = get_content_item_in_stack(layout.tree(), stack, &search);
    let outcome = place_in_stack(layout, stack, config, existing, replace_existing)?;

    match focus_element {
        Some(element) => layout.request_focus(stack, panel_id, element),
        None => layout.restore_focus(focus),
    }
    Ok(outcome)
}

/// Open `config` directly in `stack`, replacing a leaf with the same id and
/// component when `replace_existing` is set.
pub fn open_component_in_stack(
    layout: &mut Layout,
    stack: ItemKey,
    mut config: ComponentConfig,
    replace_existing: bool,
) -> Result<OpenOutcome> {
    if config.id.is_none() {
        config.id = Some(PanelId::generate());
    }
    let search = ConfigPattern::from_config(&config);
    let existing = get_content_item_in_stack(layout.tree(), stack, &search);
    place_in_stack(layout, stack, config, existing, replace_existing)
}

fn place_in_stack(
    layout: &mut Layout,
    stack: ItemKey,
    config: ComponentConfig,
    existing: Option<ItemKey>,
    replace_existing: bool,
) -> Result<OpenOutcome> {
    match existing.filter(|_| replace_existing) {
        Some(old) => {
            let index = layout.tree().index_of(stack, old).unwrap_or_default();
            debug!(panel_id = ?config.id, index, "Replacing existing panel in place");
            layout.add_child(stack, ItemConfig::Component(config), Some(index + 1))?;
            layout.remove_child(stack, old)?;
            let replacement = layout.tree().children(stack)[index];
            layout.set_active_content_item(stack, replacement)?;
            Ok(OpenOutcome::Replaced(replacement))
        }
        None => {
            let item = layout.add_child(stack, ItemConfig::Component(config), None)?;
            Ok(OpenOutcome::Added(item))
        }
    }
}

/// Close the leaf matching `pattern`, through its container when mounted so
/// the close is recorded. Returns false when nothing matched.
pub fn close_component(layout: &mut Layout, pattern: &ConfigPattern) -> bool {
    let focus = layout.focus_snapshot();
    let root = layout.root();
    let stack = match get_stack_for_root(layout, root, pattern, false, false, false) {
        Ok(Some(stack)) => stack,
        _ => {
            warn!(pattern = ?pattern, "Cannot find stack for component, ignoring close");
            return false;
        }
    };

    let Some(item) = get_content_item_in_stack(layout.tree(), stack, pattern) else {
        return false;
    };

    let result = if layout.container(item).is_some() {
        layout.close_container(item)
    } else {
        layout.remove_child(stack, item)
    };
    layout.restore_focus(focus);

    match result {
        Ok(()) => true,
        Err(err) => {
            error!(error = %err, "Failed to close component");
            false
        }
    }
}

/// Set the title of the leaf matching `pattern`.
pub fn rename_component(layout: &mut Layout, pattern: &ConfigPattern, title: &str) -> bool {
    let root = layout.root();
    let stack = match get_stack_for_root(layout, root, pattern, false, false, false) {
        Ok(Some(stack)) => stack,
        _ => {
            error!(pattern = ?pattern, "Could not find stack for component to rename");
            return false;
        }
    };
    match get_content_item_in_stack(layout.tree(), stack, pattern) {
        Some(item) => layout.set_title(item, title).is_ok(),
        None => false,
    }
}

/// Copy the leaf matching `pattern` into a new tab of the same stack, with a
/// new id and " Copy" appended to the title. Returns the copy's config.
pub fn clone_component(
    layout: &mut Layout,
    pattern: &ConfigPattern,
) -> Result<Option<ComponentConfig>> {
    let root = layout.root();
    let Some(stack) = get_stack_for_root(layout, root, pattern, false, false, false)? else {
        error!(pattern = ?pattern, "Could not find stack for component to clone");
        return Ok(None);
    };
    let Some(source) = get_content_item_in_stack(layout.tree(), stack, pattern) else {
        return Ok(None);
    };
    let Some(source_config) = layout.tree().config(source).cloned() else {
        return Ok(None);
    };

    let mut copy = source_config.clone();
    copy.id = Some(PanelId::generate());
    copy.title = Some(format!(
        "{} Copy",
        source_config.title.as_deref().unwrap_or(&source_config.component)
    ));
    layout.add_child(stack, ItemConfig::Component(copy.clone()), None)?;

    if let Some(source) = source_config.id {
        layout.push_hub(dockyard_events::HubEvent::Cloned {
            source,
            config: copy.clone(),
        });
    }
    Ok(Some(copy))
}

/// Persistable form of a layout: structure kept, every leaf passed through
/// `dehydrate`, and leaves it declines dropped.
pub fn dehydrate_layout_config<F>(config: &[ItemConfig], dehydrate: &mut F) -> Vec<ItemConfig>
where
    F: FnMut(&ComponentConfig) -> Option<ComponentConfig>,
{
    config
        .iter()
        .filter_map(|item| match item {
            ItemConfig::Component(component) => dehydrate(component).map(ItemConfig::Component),
            other => {
                let mut other = other.clone();
                if let Some(content) = other.content_mut() {
                    *content = dehydrate_layout_config(content, &mut *dehydrate);
                }
                Some(other)
            }
        })
        .collect()
}

/// Live form of a persisted layout: leaves get an id when missing and their
/// props passed through `hydrate` with the component name; a stack's active
/// index outside its content falls back to the first tab.
pub fn hydrate_layout_config<F>(config: &[ItemConfig], hydrate: &mut F) -> Vec<ItemConfig>
where
    F: FnMut(&str, PanelProps) -> PanelProps,
{
    config
        .iter()
        .map(|item| match item {
            ItemConfig::Component(component) => {
                let mut component = component.clone();
                if component.id.is_none() {
                    component.id = Some(PanelId::generate());
                }
                let props = std::mem::take(&mut component.props);
                component.props = hydrate(&component.component, props);
                ItemConfig::Component(component)
            }
            ItemConfig::Stack(stack) => {
                let mut stack = stack.clone();
                stack.content = hydrate_layout_config(&stack.content, &mut *hydrate);
                if let Some(index) = stack.active_item_index {
                    if index >= stack.content.len() && index != 0 {
                        warn!(
                            active_item_index = index,
                            content_len = stack.content.len(),
                            "Invalid activeItemIndex, resetting to 0"
                        );
                        stack.active_item_index = Some(0);
                    }
                }
                ItemConfig::Stack(stack)
            }
            other => {
                let mut other = other.clone();
                if let Some(content) = other.content_mut() {
                    *content = hydrate_layout_config(content, &mut *hydrate);
                }
                other
            }
        })
        .collect()
}

/// Strip changes that do not alter a layout's shape: which tab is active
/// and the ids of leaves that carry panel state.
pub fn drop_layout_minor_change(config: &[ItemConfig]) -> Vec<ItemConfig> {
    config
        .iter()
        .map(|item| {
            let mut item = item.clone();
            match &mut item {
                ItemConfig::Stack(stack) => {
                    stack.active_item_index = None;
                    stack.content = drop_layout_minor_change(&stack.content);
                }
                ItemConfig::Component(component) => {
                    if component.props.panel_state.is_some() {
                        component.id = None;
                    }
                }
                ItemConfig::Row(container) | ItemConfig::Column(container) => {
                    container.content = drop_layout_minor_change(&container.content);
                }
            }
            item
        })
        .collect()
}

/// Compare two layouts. With `major`, minor changes are ignored.
pub fn is_equal(a: &[ItemConfig], b: &[ItemConfig], major: bool) -> bool {
    if major {
        drop_layout_minor_change(a) == drop_layout_minor_change(b)
    } else {
        a == b
    }
}
