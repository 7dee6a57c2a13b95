// ABOUTME: Arena-backed content tree of rows, columns, stacks and component leaves
// ABOUTME: Enforces the nesting rules and tracks each stack's active child

use slotmap::{SlotMap, new_key_type};

use dockyard_types::{
    ComponentConfig, ContainerConfig, ItemConfig, PanelId, StackConfig, generate_id,
};

use crate::error::{LayoutError, Result};

new_key_type! {
    /// Key of an item in a [`ContentTree`].
    pub struct ItemKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Root,
    Row,
    Column,
    Stack,
    Component,
}

impl ItemKind {
    pub fn of(config: &ItemConfig) -> Self {
        match config {
            ItemConfig::Row(_) => ItemKind::Row,
            ItemConfig::Column(_) => ItemKind::Column,
            ItemConfig::Stack(_) => ItemKind::Stack,
            ItemConfig::Component(_) => ItemKind::Component,
        }
    }

    pub fn is_row_or_column(self) -> bool {
        matches!(self, ItemKind::Row | ItemKind::Column)
    }
}

/// One node of the tree.
#[derive(Debug, Clone)]
pub struct ContentItem {
    kind: ItemKind,
    parent: Option<ItemKey>,
    children: Vec<ItemKey>,
    id: Option<String>,
    active_index: usize,
    width: Option<f64>,
    height: Option<f64>,
    component: Option<ComponentConfig>,
}

impl ContentItem {
    fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            id: None,
            active_index: 0,
            width: None,
            height: None,
            component: None,
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn parent(&self) -> Option<ItemKey> {
        self.parent
    }

    pub fn children(&self) -> &[ItemKey] {
        &self.children
    }

    /// Structural id. Stacks always have one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Leaf config, for component items.
    pub fn config(&self) -> Option<&ComponentConfig> {
        self.component.as_ref()
    }

    pub fn panel_id(&self) -> Option<&PanelId> {
        self.component.as_ref()?.id.as_ref()
    }

    pub fn is_stack(&self) -> bool {
        self.kind == ItemKind::Stack
    }

    pub fn is_component(&self) -> bool {
        self.kind == ItemKind::Component
    }
}

/// The layout tree. Exactly one root, which holds at most one child.
#[derive(Debug, Clone)]
pub struct ContentTree {
    items: SlotMap<ItemKey, ContentItem>,
    root: ItemKey,
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentTree {
    pub fn new() -> Self {
        let mut items = SlotMap::with_key();
        let root = items.insert(ContentItem::new(ItemKind::Root));
        Self { items, root }
    }

    pub fn root(&self) -> ItemKey {
        self.root
    }

    pub fn get(&self, key: ItemKey) -> Option<&ContentItem> {
        self.items.get(key)
    }

    pub fn contains(&self, key: ItemKey) -> bool {
        self.items.contains_key(key)
    }

    fn item(&self, key: ItemKey) -> Result<&ContentItem> {
        self.items.get(key).ok_or(LayoutError::UnknownItem(key))
    }

    fn item_mut(&mut self, key: ItemKey) -> Result<&mut ContentItem> {
        self.items.get_mut(key).ok_or(LayoutError::UnknownItem(key))
    }

    pub fn kind(&self, key: ItemKey) -> Result<ItemKind> {
        Ok(self.item(key)?.kind)
    }

    pub fn children(&self, key: ItemKey) -> &[ItemKey] {
        self.items
            .get(key)
            .map(|item| item.children.as_slice())
            .unwrap_or_default()
    }

    pub fn parent(&self, key: ItemKey) -> Option<ItemKey> {
        self.items.get(key)?.parent
    }

    pub fn index_of(&self, parent: ItemKey, child: ItemKey) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    pub fn config(&self, key: ItemKey) -> Option<&ComponentConfig> {
        self.items.get(key)?.component.as_ref()
    }

    pub fn config_mut(&mut self, key: ItemKey) -> Option<&mut ComponentConfig> {
        self.items.get_mut(key)?.component.as_mut()
    }

    /// Active child of a stack.
    pub fn active_child(&self, stack: ItemKey) -> Option<ItemKey> {
        let item = self.items.get(stack)?;
        if item.kind != ItemKind::Stack {
            return None;
        }
        item.children.get(item.active_index).copied()
    }

    pub fn active_index(&self, stack: ItemKey) -> Option<usize> {
        self.active_child(stack)?;
        self.items.get(stack).map(|item| item.active_index)
    }

    pub fn set_active_index(&mut self, stack: ItemKey, index: usize) -> Result<()> {
        let item = self.item_mut(stack)?;
        if item.kind != ItemKind::Stack {
            return Err(LayoutError::NotAStack(stack));
        }
        if index < item.children.len() {
            item.active_index = index;
        }
        Ok(())
    }

    /// Items below `key` in pre-order, `key` included.
    pub fn descendants(&self, key: ItemKey) -> Vec<ItemKey> {
        let mut out = Vec::new();
        let mut pending = vec![key];
        while let Some(next) = pending.pop() {
            if !self.items.contains_key(next) {
                continue;
            }
            out.push(next);
            pending.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Every stack in document order.
    pub fn stacks(&self) -> Vec<ItemKey> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&key| self.items[key].kind == ItemKind::Stack)
            .collect()
    }

    /// Component leaves under `key` in document order.
    pub fn components(&self, key: ItemKey) -> Vec<ItemKey> {
        self.descendants(key)
            .into_iter()
            .filter(|&k| self.items[k].kind == ItemKind::Component)
            .collect()
    }

    /// Leaf carrying `panel_id`, anywhere in the tree.
    pub fn find_panel(&self, panel_id: &PanelId) -> Option<ItemKey> {
        self.components(self.root)
            .into_iter()
            .find(|&key| self.items[key].panel_id() == Some(panel_id))
    }

    /// Nearest stack ancestor of `key`, `key` included.
    pub fn stack_of(&self, key: ItemKey) -> Option<ItemKey> {
        let mut current = Some(key);
        while let Some(k) = current {
            let item = self.items.get(k)?;
            if item.kind == ItemKind::Stack {
                return Some(k);
            }
            current = item.parent;
        }
        None
    }

    /// Build a detached subtree from `config`.
    ///
    /// Component children of rows and columns are wrapped in a new stack;
    /// stacks only accept components. Leaves without an id get one.
    pub fn build(&mut self, config: ItemConfig) -> Result<ItemKey> {
        match config {
            ItemConfig::Component(component) => Ok(self.build_component(component)),
            ItemConfig::Stack(stack) => self.build_stack(stack),
            ItemConfig::Row(container) => self.build_container(ItemKind::Row, container),
            ItemConfig::Column(container) => self.build_container(ItemKind::Column, container),
        }
    }

    fn build_component(&mut self, mut config: ComponentConfig) -> ItemKey {
        if config.id.is_none() {
            config.id = Some(PanelId::generate());
        }
        let mut item = ContentItem::new(ItemKind::Component);
        item.component = Some(config);
        self.items.insert(item)
    }

    fn build_stack(&mut self, config: StackConfig) -> Result<ItemKey> {
        let mut children = Vec::with_capacity(config.content.len());
        for child in config.content {
            match child {
                ItemConfig::Component(component) => children.push(self.build_component(component)),
                other => {
                    for built in children {
                        self.delete(built);
                    }
                    return Err(LayoutError::invalid_child(ItemKind::Stack, ItemKind::of(&other)));
                }
            }
        }

        let mut item = ContentItem::new(ItemKind::Stack);
        item.id = Some(config.id.unwrap_or_else(generate_id));
        item.active_index = match config.active_item_index {
            Some(index) if index < children.len() => index,
            _ => 0,
        };
        item.width = config.width;
        item.height = config.height;
        item.children = children;
        Ok(self.adopt(item))
    }

    fn build_container(&mut self, kind: ItemKind, config: ContainerConfig) -> Result<ItemKey> {
        let mut children = Vec::with_capacity(config.content.len());
        for child in config.content {
            let child = match child {
                ItemConfig::Component(component) => ItemConfig::stack(vec![ItemConfig::Component(component)]),
                other => other,
            };
            match self.build(child) {
                Ok(key) => children.push(key),
                Err(err) => {
                    for built in children {
                        self.delete(built);
                    }
                    return Err(err);
                }
            }
        }

        let mut item = ContentItem::new(kind);
        item.id = config.id;
        item.width = config.width;
        item.height = config.height;
        item.children = children;
        Ok(self.adopt(item))
    }

    fn adopt(&mut self, item: ContentItem) -> ItemKey {
        let children = item.children.clone();
        let key = self.items.insert(item);
        for child in children {
            self.items[child].parent = Some(key);
        }
        key
    }

    /// Attach a detached item under `parent` at `index` (appended when `None`).
    /// A child attached to a stack becomes its active child.
    pub fn attach(&mut self, parent: ItemKey, child: ItemKey, index: Option<usize>) -> Result<()> {
        let child_kind = self.kind(child)?;
        let parent_item = self.item(parent)?;
        let valid = match parent_item.kind {
            ItemKind::Root => {
                if !parent_item.children.is_empty() {
                    return Err(LayoutError::RootOccupied);
                }
                child_kind != ItemKind::Component && child_kind != ItemKind::Root
            }
            ItemKind::Row | ItemKind::Column => {
                child_kind != ItemKind::Component && child_kind != ItemKind::Root
            }
            ItemKind::Stack => child_kind == ItemKind::Component,
            ItemKind::Component => false,
        };
        if !valid {
            return Err(LayoutError::invalid_child(parent_item.kind, child_kind));
        }

        let parent_item = self.item_mut(parent)?;
        let index = index
            .unwrap_or(parent_item.children.len())
            .min(parent_item.children.len());
        parent_item.children.insert(index, child);
        if parent_item.kind == ItemKind::Stack {
            parent_item.active_index = index;
        }
        self.item_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detach `child` from its parent, keeping the subtree alive.
    ///
    /// Detaching a stack's active child activates the tab before it, or the
    /// following one when it was first.
    pub fn detach(&mut self, child: ItemKey) -> Result<ItemKey> {
        let parent = self
            .item(child)?
            .parent
            .ok_or(LayoutError::UnknownItem(child))?;
        let parent_item = self.item_mut(parent)?;
        let index = parent_item
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(LayoutError::NotAChild { parent, child })?;
        parent_item.children.remove(index);
        if parent_item.kind == ItemKind::Stack && index <= parent_item.active_index {
            parent_item.active_index = parent_item.active_index.saturating_sub(1);
        }
        self.item_mut(child)?.parent = None;
        Ok(parent)
    }

    /// Remove a detached subtree from the arena.
    pub fn delete(&mut self, key: ItemKey) {
        for k in self.descendants(key) {
            self.items.remove(k);
        }
    }

    /// Persisted form of `key` and everything below it.
    pub fn to_config(&self, key: ItemKey) -> Option<ItemConfig> {
        let item = self.items.get(key)?;
        let content = || -> Vec<ItemConfig> {
            item.children
                .iter()
                .filter_map(|&child| self.to_config(child))
                .collect()
        };
        let config = match item.kind {
            ItemKind::Root => return None,
            ItemKind::Row => ItemConfig::Row(ContainerConfig {
                id: item.id.clone(),
                content: content(),
                width: item.width,
                height: item.height,
            }),
            ItemKind::Column => ItemConfig::Column(ContainerConfig {
                id: item.id.clone(),
                content: content(),
                width: item.width,
                height: item.height,
            }),
            ItemKind::Stack => ItemConfig::Stack(StackConfig {
                id: item.id.clone(),
                content: content(),
                active_item_index: (!item.children.is_empty()).then_some(item.active_index),
                width: item.width,
                height: item.height,
            }),
            ItemKind::Component => ItemConfig::Component(item.component.clone()?),
        };
        Some(config)
    }

    /// Persisted form of the root's content.
    pub fn root_config(&self) -> Vec<ItemConfig> {
        self.children(self.root)
            .iter()
            .filter_map(|&child| self.to_config(child))
            .collect()
    }
}
