//! # Built-in Widgets
//!
//! The stock widget set.  Layout widgets (`mgForm`, `mgContainer`, `mgTable`)
//! hold children; input widgets bind a single value and validate it with the
//! rules named in their spec config:
//!
//! | key         | widgets                         | rule                              |
//! |-------------|---------------------------------|-----------------------------------|
//! | `required`  | all inputs, `mgTable`           | value must not be empty           |
//! | `minLength` | `mgText`, `mgTextArea`          | at least this many characters     |
//! | `maxLength` | `mgText`, `mgTextArea`          | at most this many characters      |
//! | `pattern`   | `mgText`, `mgTextArea`          | value must match the regex        |
//! | `min`/`max` | `mgNumber`                      | numeric bounds, inclusive         |
//! | `enum`      | `mgChoiceDropdown`              | value must be one of the options  |
//! | `minRows`/`maxRows` | `mgTable`               | row count bounds, inclusive       |

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::{Value, json};

use crate::component::ValidationOutcome;
use crate::registry::{ConfigField, WidgetProperties, WidgetRegistry};
use crate::spec_node::SpecNode;
use crate::value_kind::{ValueKind, check_kind};

/// Creates a registry holding the built-in widgets.
pub fn builtin_registry() -> WidgetRegistry {
    let registry = WidgetRegistry::new();
    register_builtin(&registry);
    registry
}

/// Registers the built-in widgets, replacing same-named registrations.
pub fn register_builtin(registry: &WidgetRegistry) {
    registry.register(
        "mgForm",
        WidgetProperties {
            category: Some("Layout".to_string()),
            icon: Some("far fa-list-alt".to_string()),
            is_container: true,
            user_placeable: Some(false),
            data_kind: ValueKind::Object,
            ..WidgetProperties::default()
        },
    );
    registry.register(
        "mgContainer",
        WidgetProperties {
            category: Some("Layout".to_string()),
            icon: Some("far fa-square".to_string()),
            is_container: true,
            config: common_config(),
            config_children: fields([(
                "showTitle",
                ConfigField::new("mgToggle")
                    .titled("Show title")
                    .defaulting_to(json!(true)),
            )]),
            data_kind: ValueKind::Object,
            ..WidgetProperties::default()
        },
    );
    registry.register(
        "mgTable",
        WidgetProperties {
            category: Some("Layout".to_string()),
            icon: Some("far fa-table".to_string()),
            is_container: true,
            is_container_array: true,
            config: with_common([
                ("minRows", ConfigField::new("mgNumber").titled("Minimum rows")),
                ("maxRows", ConfigField::new("mgNumber").titled("Maximum rows")),
            ]),
            data_kind: ValueKind::Array,
            validate: Some(validate_table),
            ..WidgetProperties::default()
        },
    );
    registry.register(
        "mgText",
        WidgetProperties {
            category: Some("Simple Inputs".to_string()),
            icon: Some("far fa-font".to_string()),
            config: text_config(),
            data_kind: ValueKind::String,
            validate: Some(validate_text),
            ..WidgetProperties::default()
        },
    );
    let mut text_area_config = text_config();
    text_area_config.insert(
        "rows".to_string(),
        ConfigField::new("mgNumber")
            .titled("Visible rows")
            .defaulting_to(json!(3)),
    );
    registry.register(
        "mgTextArea",
        WidgetProperties {
            category: Some("Simple Inputs".to_string()),
            icon: Some("far fa-align-justify".to_string()),
            config: text_area_config,
            data_kind: ValueKind::String,
            validate: Some(validate_text),
            ..WidgetProperties::default()
        },
    );
    registry.register(
        "mgNumber",
        WidgetProperties {
            category: Some("Simple Inputs".to_string()),
            icon: Some("far fa-sort-numeric-down".to_string()),
            config: with_common([
                ("min", ConfigField::new("mgNumber").titled("Minimum value")),
                ("max", ConfigField::new("mgNumber").titled("Maximum value")),
                (
                    "step",
                    ConfigField::new("mgNumber")
                        .titled("Step")
                        .defaulting_to(json!(1)),
                ),
            ]),
            data_kind: ValueKind::Number,
            validate: Some(validate_number),
            ..WidgetProperties::default()
        },
    );
    registry.register(
        "mgToggle",
        WidgetProperties {
            category: Some("Simple Inputs".to_string()),
            icon: Some("far fa-toggle-on".to_string()),
            config: common_config(),
            data_kind: ValueKind::Boolean,
            validate: Some(validate_toggle),
            ..WidgetProperties::default()
        },
    );
    registry.register(
        "mgList",
        WidgetProperties {
            category: Some("Simple Inputs".to_string()),
            icon: Some("far fa-list".to_string()),
            config: common_config(),
            data_kind: ValueKind::Array,
            validate: Some(validate_list),
            ..WidgetProperties::default()
        },
    );
    registry.register(
        "mgChoiceDropdown",
        WidgetProperties {
            title: Some("Dropdown multiple-choice".to_string()),
            category: Some("Choice Selectors".to_string()),
            icon: Some("far fa-chevron-circle-down".to_string()),
            config: with_common([(
                "enum",
                ConfigField::new("mgList").titled("List items"),
            )]),
            validate: Some(validate_choice),
            ..WidgetProperties::default()
        },
    );
    registry.register(
        "mgHeading",
        WidgetProperties {
            category: Some("General Decoration".to_string()),
            icon: Some("far fa-heading".to_string()),
            config: fields([("text", ConfigField::new("mgText").titled("Heading text"))]),
            ..WidgetProperties::default()
        },
    );
}

fn fields<const N: usize>(entries: [(&str, ConfigField); N]) -> BTreeMap<String, ConfigField> {
    entries
        .into_iter()
        .map(|(key, field)| (key.to_string(), field))
        .collect()
}

fn common_config() -> BTreeMap<String, ConfigField> {
    fields([
        ("title", ConfigField::new("mgText").titled("Title")),
        (
            "required",
            ConfigField::new("mgToggle")
                .titled("Required")
                .defaulting_to(json!(false)),
        ),
    ])
}

fn with_common<const N: usize>(
    entries: [(&str, ConfigField); N],
) -> BTreeMap<String, ConfigField> {
    let mut config = common_config();
    config.extend(fields(entries));
    config
}

fn text_config() -> BTreeMap<String, ConfigField> {
    with_common([
        ("placeholder", ConfigField::new("mgText").titled("Placeholder")),
        ("minLength", ConfigField::new("mgNumber").titled("Minimum length")),
        ("maxLength", ConfigField::new("mgNumber").titled("Maximum length")),
        ("pattern", ConfigField::new("mgText").titled("Pattern")),
    ])
}

fn label(node: &SpecNode) -> &str {
    node.config
        .get("title")
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or(&node.id)
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        _ => false,
    }
}

fn config_flag(node: &SpecNode, key: &str) -> bool {
    node.config.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

fn config_number(node: &SpecNode, key: &str) -> Option<f64> {
    node.config.get(key).and_then(|v| v.as_f64())
}

fn check_required(node: &SpecNode, value: Option<&Value>) -> Option<String> {
    (config_flag(node, "required") && is_empty(value))
        .then(|| format!("{} is required", label(node)))
}

fn check_value_kind(node: &SpecNode, value: Option<&Value>, kind: ValueKind) -> Option<String> {
    let value = value.filter(|v| !v.is_null())?;
    check_kind(value, kind)
        .err()
        .map(|e| format!("{}: {}", label(node), e))
}

fn validate_text(node: &SpecNode, value: Option<&Value>) -> ValidationOutcome {
    if let Some(message) = check_required(node, value) {
        return message.into();
    }
    if let Some(message) = check_value_kind(node, value, ValueKind::String) {
        return message.into();
    }
    let Some(text) = value.and_then(|v| v.as_str()).filter(|t| !t.is_empty()) else {
        return ValidationOutcome::Valid;
    };
    let length = text.chars().count() as f64;
    let mut checks = vec![
        config_number(node, "minLength")
            .filter(|min| length < *min)
            .map(|min| format!("{} must be at least {} characters", label(node), min)),
        config_number(node, "maxLength")
            .filter(|max| length > *max)
            .map(|max| format!("{} must be at most {} characters", label(node), max)),
    ];
    if let Some(pattern) = node.config.get("pattern").and_then(|p| p.as_str()) {
        checks.push(match Regex::new(pattern) {
            Ok(re) if re.is_match(text) => None,
            Ok(_) => Some(format!("{} is not in the expected format", label(node))),
            Err(e) => {
                tracing::warn!(id = %node.id, pattern, error = %e, "invalid validation pattern");
                Some(format!("{} has an invalid pattern", label(node)))
            }
        });
    }
    ValidationOutcome::from_checks(checks)
}

fn validate_number(node: &SpecNode, value: Option<&Value>) -> ValidationOutcome {
    if let Some(message) = check_required(node, value) {
        return message.into();
    }
    if let Some(message) = check_value_kind(node, value, ValueKind::Number) {
        return message.into();
    }
    let Some(number) = value.and_then(|v| v.as_f64()) else {
        return ValidationOutcome::Valid;
    };
    ValidationOutcome::from_checks(vec![
        config_number(node, "min")
            .filter(|min| number < *min)
            .map(|min| format!("{} must be at least {}", label(node), min)),
        config_number(node, "max")
            .filter(|max| number > *max)
            .map(|max| format!("{} must be at most {}", label(node), max)),
    ])
}

fn validate_toggle(node: &SpecNode, value: Option<&Value>) -> ValidationOutcome {
    if let Some(message) = check_value_kind(node, value, ValueKind::Boolean) {
        return message.into();
    }
    // a required toggle must be switched on
    if config_flag(node, "required") && value.and_then(|v| v.as_bool()) != Some(true) {
        return format!("{} is required", label(node)).into();
    }
    ValidationOutcome::Valid
}

fn validate_list(node: &SpecNode, value: Option<&Value>) -> ValidationOutcome {
    if let Some(message) = check_required(node, value) {
        return message.into();
    }
    check_value_kind(node, value, ValueKind::Array)
        .map(ValidationOutcome::Message)
        .unwrap_or_default()
}

fn validate_choice(node: &SpecNode, value: Option<&Value>) -> ValidationOutcome {
    if let Some(message) = check_required(node, value) {
        return message.into();
    }
    let Some(value) = value.filter(|v| !is_empty(Some(v))) else {
        return ValidationOutcome::Valid;
    };
    let Some(options) = node.config.get("enum").and_then(|e| e.as_array()) else {
        return ValidationOutcome::Valid;
    };
    if options.contains(value) {
        ValidationOutcome::Valid
    } else {
        format!("{} must be one of the listed options", label(node)).into()
    }
}

fn validate_table(node: &SpecNode, value: Option<&Value>) -> ValidationOutcome {
    if let Some(message) = check_required(node, value) {
        return message.into();
    }
    if let Some(message) = check_value_kind(node, value, ValueKind::Array) {
        return message.into();
    }
    let rows = value.and_then(|v| v.as_array()).map_or(0, |r| r.len()) as f64;
    ValidationOutcome::from_checks(vec![
        config_number(node, "minRows")
            .filter(|min| rows < *min)
            .map(|min| format!("{} needs at least {} rows", label(node), min)),
        config_number(node, "maxRows")
            .filter(|max| rows > *max)
            .map(|max| format!("{} allows at most {} rows", label(node), max)),
    ])
}
