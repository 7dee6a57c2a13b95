// ABOUTME: Descriptor of a panel that was closed and can be reopened
// ABOUTME: Holds the dehydrated leaf config plus the id of the stack it lived in

use serde::{Deserialize, Serialize};

use crate::config::ComponentConfig;

/// A closed panel in the reopen history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedPanel {
    #[serde(flatten)]
    pub config: ComponentConfig,

    /// Stack the panel was closed from, when known.
    #[serde(
        rename = "parentStackId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_stack_id: Option<String>,
}

impl ClosedPanel {
    pub fn new(config: ComponentConfig, parent_stack_id: Option<String>) -> Self {
        Self {
            config,
            parent_stack_id,
        }
    }
}
