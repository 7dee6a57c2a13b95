// ABOUTME: Error types for layout tree operations
// ABOUTME: Structural violations are errors; lookups that miss are reported as Option

use thiserror::Error;

use crate::tree::{ItemKey, ItemKind};

/// Errors raised by layout tree mutations.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Unknown layout item {0:?}")]
    UnknownItem(ItemKey),

    #[error("The layout root already has a child")]
    RootOccupied,

    #[error("A {parent:?} cannot contain a {child:?}")]
    InvalidChild { parent: ItemKind, child: ItemKind },

    #[error("Item {child:?} is not a child of {parent:?}")]
    NotAChild { parent: ItemKey, child: ItemKey },

    #[error("Layout item {0:?} is not a stack")]
    NotAStack(ItemKey),

    #[error("Layout item {0:?} is not a component")]
    NotAComponent(ItemKey),

    #[error("Unknown drag source {0}")]
    UnknownDragSource(u64),
}

impl LayoutError {
    pub fn invalid_child(parent: ItemKind, child: ItemKind) -> Self {
        Self::InvalidChild { parent, child }
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
