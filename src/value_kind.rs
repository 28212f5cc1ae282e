//! # Value Kinds
//!
//! Widgets declare the kind of JSON value they bind (`mgText` binds a string,
//! `mgNumber` a number, `mgToggle` a boolean).  This module classifies JSON
//! values and checks them against a declared kind.  It backs both the widget
//! validators and the config checks run against spec nodes.
//!
//! ```rust
//! use macgyver::{ValueKind, check_kind};
//! use serde_json::json;
//!
//! assert!(check_kind(&json!("hello"), ValueKind::String).is_ok());
//! assert!(check_kind(&json!(42), ValueKind::Number).is_ok());
//! assert!(check_kind(&json!("42"), ValueKind::Number).is_err());
//! assert!(check_kind(&json!(null), ValueKind::Any).is_ok());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::registry::WidgetRegistry;
use crate::spec_node::SpecNode;

const TYPE_NULL: &str = "null";
const TYPE_BOOLEAN: &str = "boolean";
const TYPE_INTEGER: &str = "integer";
const TYPE_NUMBER: &str = "number";
const TYPE_STRING: &str = "string";
const TYPE_ARRAY: &str = "array";
const TYPE_OBJECT: &str = "object";
const TYPE_ANY: &str = "any";

/// The kind of JSON value a widget binds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Accepts any value.
    #[default]
    Any,
    /// `null` only.
    Null,
    /// `true` or `false`.
    Boolean,
    /// A number without a fractional part.
    Integer,
    /// Any number.
    Number,
    /// A string.
    String,
    /// An array.
    Array,
    /// An object.
    Object,
}

impl ValueKind {
    /// The lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Any => TYPE_ANY,
            ValueKind::Null => TYPE_NULL,
            ValueKind::Boolean => TYPE_BOOLEAN,
            ValueKind::Integer => TYPE_INTEGER,
            ValueKind::Number => TYPE_NUMBER,
            ValueKind::String => TYPE_STRING,
            ValueKind::Array => TYPE_ARRAY,
            ValueKind::Object => TYPE_OBJECT,
        }
    }

    /// Returns true if `value` is of this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueKind::Any, _) => true,
            (ValueKind::Null, Value::Null) => true,
            (ValueKind::Boolean, Value::Bool(_)) => true,
            (ValueKind::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (ValueKind::Number, Value::Number(_)) => true,
            (ValueKind::String, Value::String(_)) => true,
            (ValueKind::Array, Value::Array(_)) => true,
            (ValueKind::Object, Value::Object(_)) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns the kind name of a concrete JSON value.
pub fn get_value_type(value: &Value) -> String {
    match value {
        Value::Null => TYPE_NULL,
        Value::Bool(_) => TYPE_BOOLEAN,
        Value::Number(n) if n.is_i64() || n.is_u64() => TYPE_INTEGER,
        Value::Number(_) => TYPE_NUMBER,
        Value::String(_) => TYPE_STRING,
        Value::Array(_) => TYPE_ARRAY,
        Value::Object(_) => TYPE_OBJECT,
    }
    .to_string()
}

/// Errors produced when a value does not have the expected kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKindError {
    /// The value kind doesn't match the declared kind.
    TypeMismatch {
        /// The kind that was expected
        expected: String,
        /// The actual kind of the value
        actual: String,
    },
    /// A config key of a spec node failed its check.
    ConfigKeyError {
        /// The id of the offending node
        node: String,
        /// The config key that failed
        key: String,
        /// The underlying error
        source: Box<ValueKindError>,
    },
}

impl std::fmt::Display for ValueKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKindError::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, actual)
            }
            ValueKindError::ConfigKeyError { node, key, source } => {
                write!(f, "Config error at '{}.{}': {}", node, key, source)
            }
        }
    }
}

impl std::error::Error for ValueKindError {}

/// Checks that `value` has the declared kind.
pub fn check_kind(value: &Value, kind: ValueKind) -> Result<(), ValueKindError> {
    if kind.accepts(value) {
        Ok(())
    } else {
        Err(ValueKindError::TypeMismatch {
            expected: kind.to_string(),
            actual: get_value_type(value),
        })
    }
}

/// Checks the config keys of a single spec node against its widget's config
/// schema.
///
/// Each config field names the widget used to edit it; the kind that widget
/// binds is the kind the config value must have.  Keys missing from the node,
/// keys the schema doesn't declare, null values and unknown widget types are
/// all accepted.
pub fn check_node_config(
    node: &SpecNode,
    registry: &WidgetRegistry,
) -> Result<(), ValueKindError> {
    let Some(descriptor) = registry.lookup(&node.widget) else {
        return Ok(());
    };
    check_config_map(&node.id, &node.config, &descriptor.config, registry)
}

fn check_config_map(
    node_id: &str,
    config: &Map<String, Value>,
    schema: &std::collections::BTreeMap<String, crate::registry::ConfigField>,
    registry: &WidgetRegistry,
) -> Result<(), ValueKindError> {
    for (key, field) in schema {
        let Some(value) = config.get(key) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let kind = registry
            .lookup(&field.widget)
            .map(|d| d.data_kind)
            .unwrap_or_default();
        check_kind(value, kind).map_err(|e| ValueKindError::ConfigKeyError {
            node: node_id.to_string(),
            key: key.clone(),
            source: Box::new(e),
        })?;
    }
    Ok(())
}

/// Checks every node of a spec tree, collecting all config errors in
/// pre-order.
pub fn check_tree_config(root: &SpecNode, registry: &WidgetRegistry) -> Vec<ValueKindError> {
    let mut errors = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Err(e) = check_node_config(node, registry) {
            errors.push(e);
        }
        stack.extend(node.items.iter().rev());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::builtin_registry;
    use serde_json::json;

    #[test]
    fn integer_accepts_only_whole_numbers() {
        assert!(check_kind(&json!(42), ValueKind::Integer).is_ok());
        assert!(check_kind(&json!(-10), ValueKind::Integer).is_ok());
        assert!(check_kind(&json!(2.5), ValueKind::Integer).is_err());
    }

    #[test]
    fn number_accepts_integers() {
        assert!(check_kind(&json!(2.5), ValueKind::Number).is_ok());
        assert!(check_kind(&json!(42), ValueKind::Number).is_ok());
    }

    #[test]
    fn mismatch_reports_actual_kind() {
        let err = check_kind(&json!("true"), ValueKind::Boolean).unwrap_err();
        assert_eq!(
            err,
            ValueKindError::TypeMismatch {
                expected: "boolean".to_string(),
                actual: "string".to_string(),
            }
        );
        assert_eq!(err.to_string(), "Type mismatch: expected boolean, got string");
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ValueKind::Integer).unwrap(), json!("integer"));
        let kind: ValueKind = serde_json::from_value(json!("object")).unwrap();
        assert_eq!(kind, ValueKind::Object);
    }

    #[test]
    fn node_config_checked_against_schema() {
        let registry = builtin_registry();
        let good = SpecNode::new("age", "mgNumber")
            .with_config("min", json!(0))
            .with_config("required", json!(true));
        assert!(check_node_config(&good, &registry).is_ok());

        let bad = SpecNode::new("age", "mgNumber").with_config("min", json!("zero"));
        match check_node_config(&bad, &registry).unwrap_err() {
            ValueKindError::ConfigKeyError { node, key, source } => {
                assert_eq!(node, "age");
                assert_eq!(key, "min");
                assert!(matches!(*source, ValueKindError::TypeMismatch { .. }));
            }
            other => panic!("Expected ConfigKeyError, got {:?}", other),
        }
    }

    #[test]
    fn tree_config_collects_all_errors() {
        let registry = builtin_registry();
        let root = SpecNode::new("form", "mgForm")
            .with_item(SpecNode::new("a", "mgText").with_config("maxLength", json!("ten")))
            .with_item(SpecNode::new("b", "mgNumber").with_config("max", json!(true)))
            .with_item(SpecNode::new("c", "mgUnknown").with_config("max", json!(true)));
        let errors = check_tree_config(&root, &registry);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().starts_with("Config error at 'a.maxLength'"));
    }
}
