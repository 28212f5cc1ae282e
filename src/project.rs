//! # Data Tree Projection
//!
//! Derives the shape of the data object a form binds to from its spec tree.
//! Containers become objects keyed by child id, array containers (tables)
//! become a one-row array of such objects, and leaves become either their
//! default or `null`.
//!
//! Only the top-level call honours `use_defaults`; every recursive call into
//! a container's children passes `false`, so nested leaves always project to
//! `null`.
//!
//! ```rust
//! use macgyver::{SpecNode, project, widgets};
//! use serde_json::json;
//!
//! let registry = widgets::builtin_registry();
//! let spec = SpecNode::new("form", "mgForm")
//!     .with_item(SpecNode::new("name", "mgText").with_default(json!("Ada")))
//!     .with_item(SpecNode::new("rows", "mgTable").with_item(SpecNode::new("qty", "mgNumber")));
//!
//! assert_eq!(
//!     project(Some(&spec), &registry, true),
//!     Some(json!({"name": null, "rows": [{"qty": null}]}))
//! );
//! ```

use serde_json::{Map, Value};

use crate::registry::WidgetRegistry;
use crate::spec_node::SpecNode;

/// Projects the data shape of `node`.
///
/// Returns `None` (undefined) when the node is absent, or when a leaf
/// projected with `use_defaults` has no default.
pub fn project(node: Option<&SpecNode>, registry: &WidgetRegistry, use_defaults: bool) -> Option<Value> {
    let Some(node) = node else {
        tracing::warn!("cannot project an absent spec node");
        return None;
    };
    let Some(widget) = registry.lookup(&node.widget) else {
        tracing::warn!(widget = %node.widget, id = %node.id, "unknown widget type");
        return leaf_value(node, use_defaults);
    };
    if !widget.is_container {
        return leaf_value(node, use_defaults);
    }
    let row = Value::Object(container_map(node, registry));
    if widget.is_container_array {
        Some(Value::Array(vec![row]))
    } else {
        Some(row)
    }
}

fn leaf_value(node: &SpecNode, use_defaults: bool) -> Option<Value> {
    if use_defaults {
        node.default.clone()
    } else {
        Some(Value::Null)
    }
}

fn container_map(node: &SpecNode, registry: &WidgetRegistry) -> Map<String, Value> {
    let mut map = Map::new();
    for child in &node.items {
        let projected = project(Some(child), registry, false).unwrap_or(Value::Null);
        match projected {
            // transparent containers store their children in this scope
            Value::Object(inner) if child.ignore_scope || child.id.is_empty() => map.extend(inner),
            projected => {
                map.insert(child.id.clone(), projected);
            }
        }
    }
    map
}

/// Merges a projected shape into live data without overwriting anything.
///
/// Absent or null values in `target` are filled from `shape`; objects are
/// merged key by key; every other existing value, arrays included, is kept.
pub fn merge_defaults(target: &mut Value, shape: Value) {
    if target.is_null() {
        *target = shape;
        return;
    }
    if let (Value::Object(existing), Value::Object(shape)) = (target, shape) {
        for (key, value) in shape {
            match existing.get_mut(&key) {
                Some(slot) => merge_defaults(slot, value),
                None => {
                    existing.insert(key, value);
                }
            }
        }
    }
}
