//! # Widget Registry
//!
//! The registry maps widget type names to their declared capabilities.  Every
//! part of the engine that needs to know whether a node is a container, what
//! its config schema is, or how to validate its value asks the registry.
//!
//! Registries are explicit values rather than process globals; share one with
//! `Arc` and build a fresh one per test.
//!
//! ```rust
//! use macgyver::{WidgetProperties, WidgetRegistry};
//!
//! let registry = WidgetRegistry::new();
//! registry.register("mgTextBox", WidgetProperties::default());
//!
//! let widget = registry.lookup("mgTextBox").unwrap();
//! assert_eq!(widget.title, "Mg Text Box");
//! assert_eq!(widget.template, "<mg-text-box></mg-text-box>");
//! assert_eq!(widget.category, "Misc");
//! assert!(widget.user_placeable);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::component::ValidationOutcome;
use crate::spec_node::SpecNode;
use crate::value_kind::ValueKind;

/// Synchronous validator attached to a widget type.
///
/// Receives the node's spec (for its config) and the currently bound value,
/// which is `None` when the data is undefined.
pub type WidgetValidator = fn(&SpecNode, Option<&Value>) -> ValidationOutcome;

/// One entry of a widget's config schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    /// The widget type used to edit this config key.
    #[serde(rename = "type")]
    pub widget: String,
    /// Human readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Value a new node receives for this key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Help text for the editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl ConfigField {
    /// Creates a config field edited with `widget`.
    pub fn new(widget: &str) -> Self {
        Self {
            widget: widget.to_string(),
            ..Self::default()
        }
    }

    /// Sets the title and returns the field.
    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Sets the default and returns the field.
    pub fn defaulting_to(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Properties supplied when registering a widget.  Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct WidgetProperties {
    /// Display title; derived from the id when omitted.
    pub title: Option<String>,
    /// Icon name.
    pub icon: Option<String>,
    /// Palette category; `"Misc"` when omitted.
    pub category: Option<String>,
    /// Whether the widget holds child widgets.
    pub is_container: bool,
    /// Whether the widget's data is an array of row objects.
    pub is_container_array: bool,
    /// Config schema.
    pub config: BTreeMap<String, ConfigField>,
    /// Config keys injected into every child of this container.
    pub config_children: BTreeMap<String, ConfigField>,
    /// Whether an editor may offer the widget; `true` when omitted.
    pub user_placeable: Option<bool>,
    /// Rendering template; synthesized from the id when omitted.
    pub template: Option<String>,
    /// Kind of value a leaf of this type binds.
    pub data_kind: ValueKind,
    /// Validator for the bound value.
    pub validate: Option<WidgetValidator>,
}

/// The registered, immutable description of a widget type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDescriptor {
    /// Widget type name.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Icon name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Palette category.
    pub category: String,
    /// Whether the widget holds child widgets.
    pub is_container: bool,
    /// Whether the widget's data is an array of row objects.
    pub is_container_array: bool,
    /// Config schema.
    pub config: BTreeMap<String, ConfigField>,
    /// Config keys injected into every child of this container.
    pub config_children: BTreeMap<String, ConfigField>,
    /// Whether an editor may offer the widget.
    pub user_placeable: bool,
    /// Rendering template.
    pub template: String,
    /// Kind of value a leaf of this type binds.
    pub data_kind: ValueKind,
    /// Validator for the bound value.
    #[serde(skip)]
    pub validate: Option<WidgetValidator>,
}

impl WidgetDescriptor {
    fn from_properties(id: &str, props: WidgetProperties) -> Self {
        let template = props.template.unwrap_or_else(|| {
            let tag = kebab_case(id);
            format!("<{0}></{0}>", tag)
        });
        Self {
            id: id.to_string(),
            title: props.title.unwrap_or_else(|| start_case(id)),
            icon: props.icon,
            category: props.category.unwrap_or_else(|| "Misc".to_string()),
            is_container: props.is_container,
            is_container_array: props.is_container_array,
            config: props.config,
            config_children: props.config_children,
            user_placeable: props.user_placeable.unwrap_or(true),
            template,
            data_kind: props.data_kind,
            validate: props.validate,
        }
    }
}

/// Registry of widget types, shareable across threads.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    widgets: Mutex<HashMap<String, Arc<WidgetDescriptor>>>,
}

impl WidgetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a widget, replacing any prior registration of the same id.
    pub fn register(&self, id: &str, properties: WidgetProperties) -> Arc<WidgetDescriptor> {
        let descriptor = Arc::new(WidgetDescriptor::from_properties(id, properties));
        let mut widgets = self.widgets.lock().unwrap_or_else(|e| e.into_inner());
        if widgets
            .insert(id.to_string(), Arc::clone(&descriptor))
            .is_some()
        {
            tracing::debug!(widget = id, "replacing registered widget");
        }
        descriptor
    }

    /// Looks up a widget by type name.
    pub fn lookup(&self, id: &str) -> Option<Arc<WidgetDescriptor>> {
        let widgets = self.widgets.lock().unwrap_or_else(|e| e.into_inner());
        widgets.get(id).cloned()
    }

    /// Returns true if the widget type is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_some()
    }

    /// Registered widget ids in sorted order.
    pub fn ids(&self) -> Vec<String> {
        let widgets = self.widgets.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = widgets.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Widgets an editor may offer, sorted by category then title.
    pub fn placeable(&self) -> Vec<Arc<WidgetDescriptor>> {
        let widgets = self.widgets.lock().unwrap_or_else(|e| e.into_inner());
        let mut placeable: Vec<Arc<WidgetDescriptor>> = widgets
            .values()
            .filter(|w| w.user_placeable)
            .cloned()
            .collect();
        placeable.sort_by(|a, b| (&a.category, &a.title).cmp(&(&b.category, &b.title)));
        placeable
    }

    /// Number of registered widgets.
    pub fn len(&self) -> usize {
        self.widgets.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns true if no widgets are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn split_words(id: &str) -> Vec<String> {
    let chars: Vec<char> = id.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_alphabetic() && c.is_numeric())
                || (prev.is_numeric() && c.is_alphabetic())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.is_some_and(|n| n.is_lowercase()));
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Title-cases the words of an identifier: `mgTextBox` becomes `Mg Text Box`.
pub fn start_case(id: &str) -> String {
    split_words(id)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Kebab-cases an identifier: `mgTextBox` becomes `mg-text-box`.
pub fn kebab_case(id: &str) -> String {
    split_words(id)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
