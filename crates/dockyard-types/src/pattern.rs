// ABOUTME: Partial-match patterns used to locate component leaves in a layout
// ABOUTME: A pattern matches when every key it names equals the candidate's value

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ComponentConfig;
use crate::ids::PanelId;

/// A partial description of a component config.
///
/// Keys absent from the pattern are ignored. Nested objects match
/// recursively; arrays match when every pattern element matches some
/// candidate element. A `null` value only matches a missing or null field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigPattern(Map<String, Value>);

impl ConfigPattern {
    /// The empty pattern, matching every component.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn id(id: impl Into<PanelId>) -> Self {
        Self::any().with_id(id)
    }

    pub fn component(name: impl Into<String>) -> Self {
        Self::any().with_component(name)
    }

    /// `{ id, component }` of a config, the default search for an existing leaf.
    pub fn from_config(config: &ComponentConfig) -> Self {
        let pattern = Self::component(config.component.clone());
        match &config.id {
            Some(id) => pattern.with_id(id.clone()),
            None => pattern,
        }
    }

    pub fn with_id(self, id: impl Into<PanelId>) -> Self {
        let id = serde_json::to_value(id.into()).unwrap_or_default();
        self.with("id", id)
    }

    pub fn with_component(self, name: impl Into<String>) -> Self {
        self.with("component", Value::String(name.into()))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Pattern for the component type alone. A pattern without a component
    /// name yields one that matches no leaf.
    pub fn component_only(&self) -> Self {
        Self::any().with(
            "component",
            self.0.get("component").cloned().unwrap_or(Value::Null),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, config: &ComponentConfig) -> bool {
        self.matches_value(&config.to_value())
    }

    pub fn matches_value(&self, candidate: &Value) -> bool {
        match candidate {
            Value::Object(object) => object_matches(object, &self.0),
            _ => self.0.is_empty(),
        }
    }
}

fn object_matches(candidate: &Map<String, Value>, pattern: &Map<String, Value>) -> bool {
    pattern.iter().all(|(key, expected)| match candidate.get(key) {
        Some(actual) => value_matches(actual, expected),
        None => expected.is_null(),
    })
}

fn value_matches(candidate: &Value, pattern: &Value) -> bool {
    match (candidate, pattern) {
        (Value::Object(c), Value::Object(p)) => object_matches(c, p),
        (Value::Array(c), Value::Array(p)) => p
            .iter()
            .all(|expected| c.iter().any(|actual| value_matches(actual, expected))),
        (c, p) => c == p,
    }
}
