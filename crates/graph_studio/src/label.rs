//! Node display payload and label normalization.
//!
//! Graphs saved by older clients carry pre-rendered UI trees in `data.label`
//! instead of plain strings. [`Label`] keeps both shapes and
//! [`resolve_display_text`] turns either into the text the canvas shows.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Shown for nodes whose label holds no discoverable text.
pub const FALLBACK_LABEL: &str = "Node";

/// Keys that may lead to the text of a structured label, in lookup order.
const TEXT_KEYS: [&str; 6] = ["children", "props", "label", "text", "value", "title"];

/// Structured labels deeper than this resolve to the fallback.
const MAX_LABEL_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Label {
    PlainText(String),
    Structured(Value),
}

impl Default for Label {
    fn default() -> Self {
        Label::Structured(Value::Null)
    }
}

impl Label {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => Label::PlainText(s),
            other => Label::Structured(other),
        }
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Value::deserialize(d).map(Label::from_json)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::PlainText(s.to_string())
    }
}

/// Returns the text to display for `label`. Never fails.
pub fn resolve_display_text(label: &Label) -> String {
    match label {
        Label::PlainText(text) => text.clone(),
        Label::Structured(value) => {
            first_text(value, 0).map_or_else(|| FALLBACK_LABEL.to_string(), str::to_string)
        }
    }
}

fn first_text(value: &Value, depth: usize) -> Option<&str> {
    if depth > MAX_LABEL_DEPTH {
        return None;
    }
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Array(items) => items.iter().find_map(|v| first_text(v, depth + 1)),
        Value::Object(map) => TEXT_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|v| first_text(v, depth + 1)),
        _ => None,
    }
}

/// Display payload of a node: a label, an optional secondary line and any
/// extra keys written by other clients (kept so saving does not drop them).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NodeData {
    pub label: Label,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeData {
    pub fn new(label: impl Into<String>, subtitle: Option<String>) -> Self {
        Self {
            label: Label::PlainText(label.into()),
            subtitle,
            extra: Map::new(),
        }
    }

    /// Accepts any JSON shape; anything unusable becomes an empty payload.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(mut map) => {
                let label = map.remove("label").map(Label::from_json).unwrap_or_default();
                let subtitle = match map.remove("subtitle") {
                    Some(Value::String(s)) => Some(s),
                    _ => None,
                };
                Self {
                    label,
                    subtitle,
                    extra: map,
                }
            }
            Value::String(s) => Self {
                label: Label::PlainText(s),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    pub fn display_text(&self) -> String {
        resolve_display_text(&self.label)
    }
}

impl<'de> Deserialize<'de> for NodeData {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Value::deserialize(d).map(NodeData::from_json)
    }
}
