// ABOUTME: Names and payloads of events published on a dashboard's event hub
// ABOUTME: Events are immutable facts; handlers react, they never mutate the payload

use dockyard_types::{
    ClosedPanel, ComponentConfig, ConfigPattern, PanelHandle, PanelId, PanelOpenDetail,
};

/// Panel lifecycle event names.
pub struct PanelEvent;

impl PanelEvent {
    pub const FOCUS: &'static str = "PanelEvent.FOCUS";
    pub const MOUNT: &'static str = "PanelEvent.MOUNT";
    pub const UNMOUNT: &'static str = "PanelEvent.UNMOUNT";
    pub const REOPEN: &'static str = "PanelEvent.REOPEN";
    pub const REOPEN_LAST: &'static str = "PanelEvent.REOPEN_LAST";
    pub const DELETE: &'static str = "PanelEvent.DELETE";
    pub const CLOSED: &'static str = "PanelEvent.CLOSED";
    pub const CLOSE: &'static str = "PanelEvent.CLOSE";
    pub const OPEN: &'static str = "PanelEvent.OPEN";
    pub const CLONED: &'static str = "PanelEvent.CLONED";
    pub const TITLE_CHANGED: &'static str = "PanelEvent.TITLE_CHANGED";
    pub const DRAGGING: &'static str = "PanelEvent.DRAGGING";
    pub const DROPPED: &'static str = "PanelEvent.DROPPED";
}

/// Keyboard navigation event names.
pub struct NavigationEvent;

impl NavigationEvent {
    pub const CYCLE_TO_NEXT_STACK: &'static str = "NavigationEvent.CYCLE_TO_NEXT_STACK";
    pub const CYCLE_TO_PREVIOUS_STACK: &'static str = "NavigationEvent.CYCLE_TO_PREVIOUS_STACK";
    pub const CYCLE_TO_NEXT_TAB: &'static str = "NavigationEvent.CYCLE_TO_NEXT_TAB";
    pub const CYCLE_TO_PREVIOUS_TAB: &'static str = "NavigationEvent.CYCLE_TO_PREVIOUS_TAB";
}

/// Layout-level event names.
pub struct LayoutEvent;

impl LayoutEvent {
    pub const STATE_CHANGED: &'static str = "LayoutEvent.STATE_CHANGED";
}

/// An event published on the hub.
#[derive(Debug, Clone)]
pub enum HubEvent {
    /// A panel received focus.
    Focus(PanelHandle),
    /// A panel instance finished mounting.
    Mount(PanelHandle),
    /// A panel instance is unmounting.
    Unmount(PanelHandle),
    /// Reopen a closed panel, optionally replacing leaves matching `replace_config`.
    Reopen {
        panel: ClosedPanel,
        replace_config: Option<ConfigPattern>,
    },
    /// Reopen the most recently closed panel, scoped to the stack of
    /// `container_panel_id` when given.
    ReopenLast { container_panel_id: Option<PanelId> },
    /// Forget a closed panel.
    Delete(ClosedPanel),
    /// A panel's container closed.
    Closed {
        panel_id: PanelId,
        config: ComponentConfig,
        parent_stack_id: Option<String>,
    },
    /// Request to close the panel with this id.
    Close(PanelId),
    /// Request to open a widget.
    Open(PanelOpenDetail),
    /// A panel was cloned into `config`.
    Cloned { source: PanelId, config: ComponentConfig },
    TitleChanged { panel_id: PanelId, title: String },
    Dragging(PanelId),
    Dropped(PanelId),
    /// The layout tree changed structurally.
    LayoutStateChanged,
    CycleToNextStack,
    CycleToPreviousStack,
    CycleToNextTab,
    CycleToPreviousTab,
}

impl HubEvent {
    /// Name listeners subscribe to.
    pub fn name(&self) -> &'static str {
        match self {
            HubEvent::Focus(_) => PanelEvent::FOCUS,
            HubEvent::Mount(_) => PanelEvent::MOUNT,
            HubEvent::Unmount(_) => PanelEvent::UNMOUNT,
            HubEvent::Reopen { .. } => PanelEvent::REOPEN,
            HubEvent::ReopenLast { .. } => PanelEvent::REOPEN_LAST,
            HubEvent::Delete(_) => PanelEvent::DELETE,
            HubEvent::Closed { .. } => PanelEvent::CLOSED,
            HubEvent::Close(_) => PanelEvent::CLOSE,
            HubEvent::Open(_) => PanelEvent::OPEN,
            HubEvent::Cloned { .. } => PanelEvent::CLONED,
            HubEvent::TitleChanged { .. } => PanelEvent::TITLE_CHANGED,
            HubEvent::Dragging(_) => PanelEvent::DRAGGING,
            HubEvent::Dropped(_) => PanelEvent::DROPPED,
            HubEvent::LayoutStateChanged => LayoutEvent::STATE_CHANGED,
            HubEvent::CycleToNextStack => NavigationEvent::CYCLE_TO_NEXT_STACK,
            HubEvent::CycleToPreviousStack => NavigationEvent::CYCLE_TO_PREVIOUS_STACK,
            HubEvent::CycleToNextTab => NavigationEvent::CYCLE_TO_NEXT_TAB,
            HubEvent::CycleToPreviousTab => NavigationEvent::CYCLE_TO_PREVIOUS_TAB,
        }
    }
}
