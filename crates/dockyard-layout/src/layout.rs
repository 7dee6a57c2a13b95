// ABOUTME: The layout model: content tree plus registered components and mounted containers
// ABOUTME: Mutations queue hub and container events that are delivered after the mutation

use slotmap::SecondaryMap;
use std::collections::HashMap;
use std::sync::Arc;

use dockyard_events::{ContainerEvent, HubEvent};
use dockyard_logging::{debug, warn};
use dockyard_types::{ComponentConfig, DragEvent, ItemConfig, Panel, PanelHandle, PanelId};

use crate::component::{ComponentRef, Element};
use crate::container::{Container, ContainerListener, MountedPanel};
use crate::error::{LayoutError, Result};
use crate::tree::{ContentTree, ItemKey, ItemKind};

/// Id of a pending drag-to-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DragSourceId(pub u64);

#[derive(Debug, Clone)]
struct PendingDrag {
    config: ComponentConfig,
    origin: DragEvent,
}

#[derive(Debug, Clone)]
struct FocusRequest {
    stack: ItemKey,
    panel_id: PanelId,
    element: String,
}

/// Focus state captured before a mutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusSnapshot {
    component: Option<ItemKey>,
    stack: Option<ItemKey>,
}

/// A notification waiting for delivery.
pub enum Outgoing {
    Hub(HubEvent),
    Container(Vec<ContainerListener>, ContainerEvent),
}

impl Outgoing {
    /// Run container listeners; hand hub events back to the caller.
    pub fn deliver_container(self) -> Option<HubEvent> {
        match self {
            Outgoing::Hub(event) => Some(event),
            Outgoing::Container(listeners, event) => {
                for listener in listeners {
                    listener(event);
                }
                None
            }
        }
    }
}

/// Layout state of one dashboard.
pub struct Layout {
    tree: ContentTree,
    components: HashMap<String, ComponentRef>,
    containers: SecondaryMap<ItemKey, Container>,
    focused_component: Option<ItemKey>,
    focused_stack: Option<ItemKey>,
    focused_element: Option<(PanelId, String)>,
    drag_sources: HashMap<DragSourceId, PendingDrag>,
    next_drag: u64,
    focus_requests: Vec<FocusRequest>,
    column_preferred: bool,
    outbox: Vec<Outgoing>,
    dirty: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    pub fn new() -> Self {
        Self {
            tree: ContentTree::new(),
            components: HashMap::new(),
            containers: SecondaryMap::new(),
            focused_component: None,
            focused_stack: None,
            focused_element: None,
            drag_sources: HashMap::new(),
            next_drag: 0,
            focus_requests: Vec::new(),
            column_preferred: true,
            outbox: Vec::new(),
            dirty: false,
        }
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    pub fn root(&self) -> ItemKey {
        self.tree.root()
    }

    /// Orientation `add_stack` starts from when a stack has to be created.
    pub fn column_preferred(&self) -> bool {
        self.column_preferred
    }

    pub fn set_column_preferred(&mut self, column_preferred: bool) {
        self.column_preferred = column_preferred;
    }

    // Component registration

    /// Register `component` under `name` and mount any leaves waiting for it.
    /// Re-registering a name remounts its leaves with the new component.
    pub fn register_component(&mut self, name: impl Into<String>, component: ComponentRef) {
        let name = name.into();
        if self.components.contains_key(&name) {
            self.deregister_component(&name);
        }
        debug!(component = %name, "Registering layout component");
        self.components.insert(name.clone(), component);

        for leaf in self.tree.components(self.tree.root()) {
            let waiting = self.tree.config(leaf).is_some_and(|c| c.component == name);
            if waiting && !self.containers.contains_key(leaf) {
                self.mount(leaf);
            }
        }
        self.refresh_visibility();
    }

    /// Remove a registration, unmounting its leaves. The leaves stay in the tree.
    pub fn deregister_component(&mut self, name: &str) -> bool {
        if self.components.remove(name).is_none() {
            return false;
        }
        debug!(component = %name, "Deregistering layout component");
        for leaf in self.tree.components(self.tree.root()) {
            if self.tree.config(leaf).is_some_and(|c| c.component == name) {
                self.unmount(leaf);
            }
        }
        true
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentRef> {
        self.components.get(name)
    }

    // Structure

    /// Build `config` and add it under `parent`. Components added to a row,
    /// column or the root are wrapped in a new stack. Returns the added item.
    pub fn add_child(
        &mut self,
        parent: ItemKey,
        config: ItemConfig,
        index: Option<usize>,
    ) -> Result<ItemKey> {
        let parent_kind = self.tree.kind(parent)?;
        let config = match config {
            ItemConfig::Component(component) if parent_kind != ItemKind::Stack => {
                ItemConfig::stack(vec![ItemConfig::Component(component)])
            }
            other => other,
        };

        let key = self.tree.build(config)?;
        if let Err(err) = self.tree.attach(parent, key, index) {
            self.tree.delete(key);
            return Err(err);
        }

        for leaf in self.tree.components(key) {
            self.mount(leaf);
        }
        self.dirty = true;
        self.refresh_visibility();
        Ok(key)
    }

    /// Remove `child` from `parent`, unmounting every component below it.
    pub fn remove_child(&mut self, parent: ItemKey, child: ItemKey) -> Result<()> {
        if self.tree.parent(child) != Some(parent) {
            return Err(LayoutError::NotAChild { parent, child });
        }
        for leaf in self.tree.components(child) {
            self.unmount(leaf);
        }
        self.tree.detach(child)?;
        self.tree.delete(child);
        self.forget_removed();
        self.dirty = true;
        self.refresh_visibility();
        Ok(())
    }

    /// Detach `child` from `parent` without unmounting it, for re-parenting.
    pub fn detach_child(&mut self, parent: ItemKey, child: ItemKey) -> Result<()> {
        if self.tree.parent(child) != Some(parent) {
            return Err(LayoutError::NotAChild { parent, child });
        }
        self.tree.detach(child)?;
        self.dirty = true;
        Ok(())
    }

    /// Attach an item previously detached with [`Layout::detach_child`].
    pub fn attach_child(&mut self, parent: ItemKey, child: ItemKey, index: Option<usize>) -> Result<()> {
        self.tree.attach(parent, child, index)?;
        self.dirty = true;
        self.refresh_visibility();
        Ok(())
    }

    pub fn set_active_content_item(&mut self, stack: ItemKey, child: ItemKey) -> Result<()> {
        let index = self
            .tree
            .index_of(stack, child)
            .ok_or(LayoutError::NotAChild {
                parent: stack,
                child,
            })?;
        if self.tree.active_index(stack) != Some(index) {
            self.tree.set_active_index(stack, index)?;
            self.dirty = true;
            self.refresh_visibility();
        }
        Ok(())
    }

    /// Replace the whole tree with `content`.
    pub fn load(&mut self, content: Vec<ItemConfig>) -> Result<()> {
        self.clear()?;
        let root = self.tree.root();
        let mut content = content.into_iter();
        let first = match content.next() {
            Some(first) => first,
            None => return Ok(()),
        };
        let rest: Vec<ItemConfig> = content.collect();
        if rest.is_empty() {
            self.add_child(root, first, None)?;
        } else {
            warn!(
                extra_items = rest.len(),
                "Layout root holds one item; wrapping root content in a column"
            );
            let mut all = vec![first];
            all.extend(rest);
            self.add_child(root, ItemConfig::column(all), None)?;
        }
        Ok(())
    }

    /// Remove everything below the root.
    pub fn clear(&mut self) -> Result<()> {
        let root = self.tree.root();
        for child in self.tree.children(root).to_vec() {
            self.remove_child(root, child)?;
        }
        Ok(())
    }

    pub fn to_config(&self) -> Vec<ItemConfig> {
        self.tree.root_config()
    }

    /// Update the title of a leaf.
    pub fn set_title(&mut self, leaf: ItemKey, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        let config = self
            .tree
            .config_mut(leaf)
            .ok_or(LayoutError::UnknownItem(leaf))?;
        config.title = Some(title.clone());
        if let Some(panel_id) = config.id.clone() {
            self.push_hub(HubEvent::TitleChanged { panel_id, title });
        }
        self.dirty = true;
        Ok(())
    }

    // Containers

    pub fn container(&self, leaf: ItemKey) -> Option<&Container> {
        self.containers.get(leaf)
    }

    pub fn container_mut(&mut self, leaf: ItemKey) -> Option<&mut Container> {
        self.containers.get_mut(leaf)
    }

    /// Leaf of the mounted panel with `panel_id`.
    pub fn container_by_panel_id(&self, panel_id: &PanelId) -> Option<ItemKey> {
        self.containers
            .iter()
            .find(|(_, container)| container.panel().panel_id() == panel_id)
            .map(|(key, _)| key)
    }

    /// Mounted panel instance of a leaf.
    pub fn panel(&self, leaf: ItemKey) -> Option<PanelHandle> {
        let panel: PanelHandle = self.containers.get(leaf)?.panel().clone();
        Some(panel)
    }

    pub fn mounted_panels(&self) -> Vec<PanelHandle> {
        self.tree
            .components(self.tree.root())
            .into_iter()
            .filter_map(|leaf| self.panel(leaf))
            .collect()
    }

    /// Close a mounted leaf through its container: the panel unmounts and a
    /// `CLOSED` event carrying its config and parent stack follows.
    pub fn close_container(&mut self, leaf: ItemKey) -> Result<()> {
        if !self.containers.contains_key(leaf) {
            return Err(LayoutError::UnknownItem(leaf));
        }
        let config = self
            .tree
            .config(leaf)
            .cloned()
            .ok_or(LayoutError::UnknownItem(leaf))?;
        let parent = self.tree.parent(leaf).ok_or(LayoutError::UnknownItem(leaf))?;
        let parent_stack_id = self
            .tree
            .get(parent)
            .and_then(|item| item.id())
            .map(str::to_string);

        self.remove_child(parent, leaf)?;
        if let Some(panel_id) = config.id.clone() {
            self.push_hub(HubEvent::Closed {
                panel_id,
                config,
                parent_stack_id,
            });
        }
        Ok(())
    }

    /// Render a mounted leaf with its registered component.
    pub fn render(&self, leaf: ItemKey) -> Option<Element> {
        self.containers.get(leaf)?;
        let config = self.tree.config(leaf)?;
        let component = self.components.get(&config.component)?;
        Some(component.render(&config.props))
    }

    /// Notify every visible container of a resize.
    pub fn resize(&mut self) {
        let visible: Vec<ItemKey> = self
            .containers
            .iter()
            .filter(|(_, container)| container.is_visible())
            .map(|(key, _)| key)
            .collect();
        for leaf in visible {
            self.push_container(leaf, ContainerEvent::Resize);
        }
    }

    /// A click on a leaf's tab: activates and focuses it.
    pub fn click_tab(&mut self, leaf: ItemKey) -> Result<()> {
        let stack = self.tree.parent(leaf).ok_or(LayoutError::UnknownItem(leaf))?;
        self.push_container(leaf, ContainerEvent::TabClicked);
        self.set_active_content_item(stack, leaf)?;
        self.focus_component(leaf)
    }

    // Focus

    pub fn focused_component(&self) -> Option<ItemKey> {
        self.focused_component
    }

    pub fn focused_stack(&self) -> Option<ItemKey> {
        self.focused_stack
    }

    /// Element focused inside a panel by a deferred focus request.
    pub fn focused_element(&self) -> Option<(&PanelId, &str)> {
        self.focused_element
            .as_ref()
            .map(|(panel_id, element)| (panel_id, element.as_str()))
    }

    /// Focus a leaf; mounted panels announce it with `FOCUS`.
    pub fn focus_component(&mut self, leaf: ItemKey) -> Result<()> {
        if self.tree.kind(leaf)? != ItemKind::Component {
            return Err(LayoutError::NotAComponent(leaf));
        }
        self.focused_component = Some(leaf);
        self.focused_stack = self.tree.parent(leaf);
        if let Some(panel) = self.panel(leaf) {
            self.push_hub(HubEvent::Focus(panel));
        }
        Ok(())
    }

    /// Focus a stack through its active child. Empty stacks take focus alone.
    pub fn focus_stack(&mut self, stack: ItemKey) -> Result<()> {
        if self.tree.kind(stack)? != ItemKind::Stack {
            return Err(LayoutError::NotAStack(stack));
        }
        match self.tree.active_child(stack) {
            Some(active) => self.focus_component(active),
            None => {
                self.focused_component = None;
                self.focused_stack = Some(stack);
                Ok(())
            }
        }
    }

    pub fn focus_snapshot(&self) -> FocusSnapshot {
        FocusSnapshot {
            component: self.focused_component,
            stack: self.focused_stack,
        }
    }

    /// Restore focus captured earlier, for whatever still exists.
    pub fn restore_focus(&mut self, snapshot: FocusSnapshot) {
        self.focused_component = snapshot.component.filter(|&k| self.tree.contains(k));
        self.focused_stack = snapshot.stack.filter(|&k| self.tree.contains(k));
    }

    /// Focus `element` inside the panel `panel_id` of `stack` on the next frame.
    pub fn request_focus(&mut self, stack: ItemKey, panel_id: PanelId, element: impl Into<String>) {
        self.focus_requests.push(FocusRequest {
            stack,
            panel_id,
            element: element.into(),
        });
    }

    /// Apply work deferred to the next animation frame. Requests whose panel
    /// is gone are dropped.
    pub fn run_animation_frame(&mut self) {
        for request in std::mem::take(&mut self.focus_requests) {
            let leaf = self
                .tree
                .children(request.stack)
                .iter()
                .copied()
                .find(|&leaf| self.tree.config(leaf).and_then(|c| c.id.as_ref()) == Some(&request.panel_id));
            match leaf {
                Some(leaf) => {
                    self.focused_element = Some((request.panel_id, request.element));
                    if let Err(err) = self.focus_component(leaf) {
                        warn!(error = %err, "Deferred focus failed");
                    }
                }
                None => debug!(panel_id = %request.panel_id, "Dropping focus request for missing panel"),
            }
        }
    }

    // Drag to open

    /// Start dragging a new leaf; nothing enters the tree until it is dropped.
    pub fn create_drag_source(&mut self, config: ComponentConfig, origin: DragEvent) -> DragSourceId {
        let id = DragSourceId(self.next_drag);
        self.next_drag += 1;
        debug!(drag_source = id.0, x = origin.x, y = origin.y, "Drag source created");
        self.drag_sources.insert(id, PendingDrag { config, origin });
        id
    }

    /// Drop a dragged leaf into `target` (a stack, or a container that gets a new stack).
    pub fn drop_drag_source(&mut self, id: DragSourceId, target: ItemKey) -> Result<ItemKey> {
        let pending = self
            .drag_sources
            .remove(&id)
            .ok_or(LayoutError::UnknownDragSource(id.0))?;
        debug!(drag_source = id.0, x = pending.origin.x, y = pending.origin.y, "Drag source dropped");
        self.add_child(target, ItemConfig::Component(pending.config), None)
    }

    pub fn cancel_drag_source(&mut self, id: DragSourceId) -> bool {
        self.drag_sources.remove(&id).is_some()
    }

    pub fn pending_drag(&self, id: DragSourceId) -> Option<&ComponentConfig> {
        self.drag_sources.get(&id).map(|pending| &pending.config)
    }

    // Notifications

    /// Queue a hub event for delivery after the current mutation.
    pub fn push_hub(&mut self, event: HubEvent) {
        self.outbox.push(Outgoing::Hub(event));
    }

    fn push_container(&mut self, leaf: ItemKey, event: ContainerEvent) {
        if let Some(container) = self.containers.get(leaf) {
            let listeners = container.listeners_for(event);
            if !listeners.is_empty() {
                self.outbox.push(Outgoing::Container(listeners, event));
            }
        }
    }

    /// Take everything queued, ending with one state-change event if the
    /// tree changed.
    pub fn take_outgoing(&mut self) -> Vec<Outgoing> {
        if std::mem::take(&mut self.dirty) {
            self.outbox.push(Outgoing::Hub(HubEvent::LayoutStateChanged));
        }
        std::mem::take(&mut self.outbox)
    }

    /// Run queued container listeners and return the queued hub events.
    pub fn take_events(&mut self) -> Vec<HubEvent> {
        self.take_outgoing()
            .into_iter()
            .filter_map(Outgoing::deliver_container)
            .collect()
    }

    // Mounting

    fn mount(&mut self, leaf: ItemKey) {
        if self.containers.contains_key(leaf) {
            return;
        }
        let Some(config) = self.tree.config(leaf) else {
            return;
        };
        let Some(component) = self.components.get(&config.component) else {
            debug!(component = %config.component, "Component not registered; leaf stays unmounted");
            return;
        };
        let Some(panel_id) = config.id.clone() else {
            return;
        };

        let panel = Arc::new(MountedPanel::new(
            panel_id,
            config.component.clone(),
            component.wrapped_name().map(str::to_string),
        ));
        self.containers.insert(leaf, Container::new(leaf, panel.clone()));
        self.push_container(leaf, ContainerEvent::Tab);
        self.push_hub(HubEvent::Mount(panel));
    }

    fn unmount(&mut self, leaf: ItemKey) {
        if let Some(container) = self.containers.remove(leaf) {
            if self.focused_component == Some(leaf) {
                self.focused_component = None;
            }
            let panel: PanelHandle = container.panel().clone();
            self.push_hub(HubEvent::Unmount(panel));
        }
    }

    fn forget_removed(&mut self) {
        if self.focused_component.is_some_and(|k| !self.tree.contains(k)) {
            self.focused_component = None;
        }
        if self.focused_stack.is_some_and(|k| !self.tree.contains(k)) {
            self.focused_stack = None;
        }
        let tree = &self.tree;
        self.focus_requests.retain(|request| tree.contains(request.stack));
    }

    fn refresh_visibility(&mut self) {
        let mut changes = Vec::new();
        for (leaf, container) in self.containers.iter() {
            let visible = self
                .tree
                .parent(leaf)
                .and_then(|stack| self.tree.active_child(stack))
                == Some(leaf);
            if visible != container.is_visible() {
                changes.push((leaf, visible));
            }
        }
        for (leaf, visible) in changes {
            if let Some(container) = self.containers.get_mut(leaf) {
                container.set_visible(visible);
            }
            if visible {
                self.push_container(leaf, ContainerEvent::Show);
                self.push_container(leaf, ContainerEvent::Shown);
            } else {
                self.push_container(leaf, ContainerEvent::Hide);
            }
        }
    }
}
