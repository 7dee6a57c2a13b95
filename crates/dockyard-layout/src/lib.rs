// ABOUTME: Layout tree of rows, columns, stacks and component leaves
// ABOUTME: Mounting, containers, focus and the placement utilities panels are opened with

pub mod component;
pub mod container;
pub mod error;
pub mod handle;
pub mod layout;
pub mod tree;
pub mod utils;

#[cfg(test)]
mod utils_tests;

pub use component::{Component, ComponentRef, Element, FnComponent, named_component};
pub use container::{Container, ContainerListener, ContainerListenerId, MountedPanel};
pub use error::{LayoutError, Result};
pub use handle::LayoutHandle;
pub use layout::{DragSourceId, FocusSnapshot, Layout, Outgoing};
pub use tree::{ContentItem, ContentTree, ItemKey, ItemKind};
pub use utils::{
    OpenOptions, OpenOutcome, activate_tab, add_stack, clone_component, close_component,
    dehydrate_layout_config, drop_layout_minor_change, get_content_item_in_stack,
    get_stack_for_component_types, get_stack_for_config, get_stack_for_root,
    hydrate_layout_config, is_active_tab, is_equal, open_component, open_component_in_stack,
    rename_component,
};
