// ABOUTME: Panel identifiers and random id generation
// ABOUTME: Ids are plain strings, with a legacy list form still accepted from old documents

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::fmt;

const GENERATED_ID_LEN: usize = 10;

/// Generate a short random alphanumeric id for panels, stacks and hooks.
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_ID_LEN)
        .map(char::from)
        .collect()
}

/// Identifier of a panel.
///
/// Older persisted documents stored some ids as a list of strings, so both
/// shapes deserialize; new ids are always [`PanelId::Single`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PanelId {
    Single(String),
    Legacy(Vec<String>),
}

impl PanelId {
    pub fn generate() -> Self {
        PanelId::Single(generate_id())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PanelId::Single(id) => Some(id),
            PanelId::Legacy(_) => None,
        }
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelId::Single(id) => f.write_str(id),
            PanelId::Legacy(parts) => write!(f, "[{}]", parts.join(",")),
        }
    }
}

impl From<&str> for PanelId {
    fn from(id: &str) -> Self {
        PanelId::Single(id.to_string())
    }
}

impl From<String> for PanelId {
    fn from(id: String) -> Self {
        PanelId::Single(id)
    }
}

impl PartialEq<str> for PanelId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for PanelId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}
