// ABOUTME: Descriptors for requests to open a widget in a panel
// ABOUTME: Carries the widget identity, an optional target panel id and drag origin

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::ids::PanelId;

/// Lazily fetches a widget's backing object.
pub type WidgetFetch = Arc<dyn Fn() -> Result<Value, String> + Send + Sync>;

/// Identity of a widget that can be opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetDescriptor {
    #[serde(rename = "type")]
    pub widget_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl WidgetDescriptor {
    pub fn new(widget_type: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            name: None,
            title: None,
            id: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Pointer position a drag to open started from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragEvent {
    pub x: f64,
    pub y: f64,
}

/// Payload of an open request.
#[derive(Clone)]
pub struct PanelOpenDetail {
    pub widget: WidgetDescriptor,
    /// Reuse this panel id, replacing any panel already showing it.
    pub panel_id: Option<PanelId>,
    pub drag_event: Option<DragEvent>,
    pub fetch: Option<WidgetFetch>,
}

impl PanelOpenDetail {
    pub fn new(widget: WidgetDescriptor) -> Self {
        Self {
            widget,
            panel_id: None,
            drag_event: None,
            fetch: None,
        }
    }

    pub fn with_panel_id(mut self, panel_id: impl Into<PanelId>) -> Self {
        self.panel_id = Some(panel_id.into());
        self
    }

    pub fn with_drag_event(mut self, drag_event: DragEvent) -> Self {
        self.drag_event = Some(drag_event);
        self
    }
}

impl fmt::Debug for PanelOpenDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelOpenDetail")
            .field("widget", &self.widget)
            .field("panel_id", &self.panel_id)
            .field("drag_event", &self.drag_event)
            .field("fetch", &self.fetch.is_some())
            .finish()
    }
}
