// ABOUTME: Cross-crate event definitions for decoupled panel communication
// ABOUTME: Event names, hub payloads, container events and the dispatching hub

pub mod container;
pub mod event_hub;
pub mod panel_event;

pub use container::ContainerEvent;
pub use event_hub::{EventHub, Listener, ListenerId};
pub use panel_event::{HubEvent, LayoutEvent, NavigationEvent, PanelEvent};
