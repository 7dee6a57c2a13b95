// ABOUTME: Persisted layout document nodes (rows, columns, stacks, component leaves)
// ABOUTME: The serde shape matches saved dashboard documents, including legacy leaf tags

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::PanelId;
use crate::props::PanelProps;

/// The content list of the layout root.
pub type LayoutConfig = Vec<ItemConfig>;

/// A node of a persisted layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemConfig {
    Row(ContainerConfig),
    Column(ContainerConfig),
    Stack(StackConfig),
    #[serde(rename = "component", alias = "react-component")]
    Component(ComponentConfig),
}

/// Row or column contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub content: Vec<ItemConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// A tab group. Its children are component leaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub content: Vec<ItemConfig>,

    #[serde(
        rename = "activeItemIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub active_item_index: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// A component leaf: one panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Registered component name the leaf is rendered with.
    pub component: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PanelId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub props: PanelProps,

    #[serde(rename = "isClosable", default = "default_true")]
    pub is_closable: bool,
}

fn default_true() -> bool {
    true
}

impl ComponentConfig {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            id: None,
            title: None,
            props: PanelProps::default(),
            is_closable: true,
        }
    }

    pub fn with_id(mut self, id: impl Into<PanelId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_props(mut self, props: PanelProps) -> Self {
        self.props = props;
        self
    }

    /// JSON view used for partial pattern matching.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl ItemConfig {
    pub fn row(content: Vec<ItemConfig>) -> Self {
        ItemConfig::Row(ContainerConfig {
            content,
            ..Default::default()
        })
    }

    pub fn column(content: Vec<ItemConfig>) -> Self {
        ItemConfig::Column(ContainerConfig {
            content,
            ..Default::default()
        })
    }

    pub fn stack(content: Vec<ItemConfig>) -> Self {
        ItemConfig::Stack(StackConfig {
            content,
            ..Default::default()
        })
    }

    pub fn component(config: ComponentConfig) -> Self {
        ItemConfig::Component(config)
    }

    /// The `type` tag as persisted.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ItemConfig::Row(_) => "row",
            ItemConfig::Column(_) => "column",
            ItemConfig::Stack(_) => "stack",
            ItemConfig::Component(_) => "component",
        }
    }

    pub fn content(&self) -> &[ItemConfig] {
        match self {
            ItemConfig::Row(c) | ItemConfig::Column(c) => &c.content,
            ItemConfig::Stack(s) => &s.content,
            ItemConfig::Component(_) => &[],
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut Vec<ItemConfig>> {
        match self {
            ItemConfig::Row(c) | ItemConfig::Column(c) => Some(&mut c.content),
            ItemConfig::Stack(s) => Some(&mut s.content),
            ItemConfig::Component(_) => None,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentConfig> {
        match self {
            ItemConfig::Component(c) => Some(c),
            _ => None,
        }
    }

    /// Visit every component leaf in document order.
    pub fn for_each_component<'a>(&'a self, f: &mut impl FnMut(&'a ComponentConfig)) {
        match self {
            ItemConfig::Component(c) => f(c),
            other => {
                for child in other.content() {
                    child.for_each_component(f);
                }
            }
        }
    }
}
