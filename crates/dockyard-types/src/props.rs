// ABOUTME: Props carried by component leaves, split into persisted and runtime parts
// ABOUTME: Runtime values (fetch closures, live handles) never reach a persisted document

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Describes the widget a panel shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub widget_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PanelMetadata {
    pub fn for_widget(widget_type: impl Into<String>) -> Self {
        Self {
            widget_type: Some(widget_type.into()),
            ..Default::default()
        }
    }
}

/// Props of a component leaf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PanelMetadata>,

    /// Serialized panel sub-state, owned by the panel's component.
    #[serde(
        rename = "panelState",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub panel_state: Option<Value>,

    /// Set on hydrate; never persisted by the default dehydrate.
    #[serde(
        rename = "localDashboardId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub local_dashboard_id: Option<String>,

    /// Any other serializable props.
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    #[serde(skip)]
    pub runtime: RuntimeProps,
}

impl PanelProps {
    pub fn widget_type(&self) -> Option<&str> {
        self.metadata.as_ref()?.widget_type.as_deref()
    }

    pub fn with_metadata(mut self, metadata: PanelMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_panel_state(mut self, state: Value) -> Self {
        self.panel_state = Some(state);
        self
    }
}

/// Non-serializable props keyed by name.
#[derive(Clone, Default)]
pub struct RuntimeProps {
    values: BTreeMap<String, Arc<dyn Any + Send + Sync>>,
}

impl RuntimeProps {
    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), Arc::new(value));
    }

    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.values.get(name)?.downcast_ref::<T>()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for RuntimeProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

impl PartialEq for RuntimeProps {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && Arc::ptr_eq(va, vb))
    }
}
