//! # Spec Nodes
//!
//! A spec tree is the declarative description of a form: every node names a
//! widget type, carries the widget's configuration, and (for containers)
//! holds an ordered list of child nodes under `items`.
//!
//! ```rust
//! use macgyver::SpecNode;
//!
//! let spec = SpecNode::from_json_str(r#"{
//!     "id": "form",
//!     "type": "mgForm",
//!     "items": [
//!         {"id": "name", "type": "mgText", "required": true},
//!         {"id": "age", "type": "mgNumber", "min": 0}
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(spec.items.len(), 2);
//! assert_eq!(spec.items[0].config["required"], true);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{LoadError, load_by_extension};

/// An explicit storage path override for a node.
///
/// A node may either give a dotted string (`"address.street"`) or a list of
/// segments (`["address", "street"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MgPath {
    /// A dotted path that is split on `.`.
    Dotted(String),
    /// Path segments used verbatim.
    Segments(Vec<String>),
}

impl MgPath {
    /// Returns the path as an ordered list of segments.
    pub fn segments(&self) -> Vec<String> {
        match self {
            MgPath::Dotted(path) => path.split('.').map(|s| s.to_string()).collect(),
            MgPath::Segments(segments) => segments.clone(),
        }
    }
}

/// One widget instance in a form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecNode {
    /// Node id.  Empty for anonymous wrappers that contribute no path segment.
    #[serde(default)]
    pub id: String,
    /// The registered widget type of this node.
    #[serde(rename = "type")]
    pub widget: String,
    /// Ordered child nodes; only containers have any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<SpecNode>,
    /// When set, this node contributes no path segment to its descendants.
    #[serde(rename = "ignoreScope", default, skip_serializing_if = "is_false")]
    pub ignore_scope: bool,
    /// Explicit storage path override.
    #[serde(rename = "mgPath", default, skip_serializing_if = "Option::is_none")]
    pub mg_path: Option<MgPath>,
    /// Seed value adopted when the bound data is undefined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Widget-specific configuration, opaque to the tree engine.
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl SpecNode {
    /// Creates a childless node of the given widget type.
    pub fn new(id: impl Into<String>, widget: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            widget: widget.into(),
            items: Vec::new(),
            ignore_scope: false,
            mg_path: None,
            default: None,
            config: Map::new(),
        }
    }

    /// Appends a child and returns the node, for building trees inline.
    pub fn with_item(mut self, item: SpecNode) -> Self {
        self.items.push(item);
        self
    }

    /// Sets a config key and returns the node.
    pub fn with_config(mut self, key: &str, value: Value) -> Self {
        self.config.insert(key.to_string(), value);
        self
    }

    /// Sets the default value and returns the node.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Marks the node scope-ignoring and returns it.
    pub fn ignoring_scope(mut self) -> Self {
        self.ignore_scope = true;
        self
    }

    /// Sets the storage path override and returns the node.
    pub fn with_mg_path(mut self, path: MgPath) -> Self {
        self.mg_path = Some(path);
        self
    }

    /// Returns a named field of the node as JSON, the way it serializes.
    ///
    /// Used by query matching; `items` is not addressable this way.
    pub fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(Value::String(self.id.clone())),
            "type" => Some(Value::String(self.widget.clone())),
            "ignoreScope" => Some(Value::Bool(self.ignore_scope)),
            "mgPath" => self
                .mg_path
                .as_ref()
                .and_then(|p| serde_json::to_value(p).ok()),
            "default" => self.default.clone(),
            _ => self.config.get(key).cloned(),
        }
    }

    /// Parses a spec tree from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parses a spec tree from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, LoadError> {
        Ok(serde_yml::from_str(content)?)
    }

    /// Loads a spec tree from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        load_by_extension(path)
    }
}
