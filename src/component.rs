//! # Live Components
//!
//! A live component is a mounted widget instance: it knows its node id, can
//! validate the value it is bound to, and accepts a validation status written
//! back by the aggregator.  Rendering layers implement [`LiveComponent`] for
//! their own widget instances or use the stock [`WidgetComponent`].

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::get_value;
use crate::registry::WidgetDescriptor;
use crate::spec_node::SpecNode;

/// Root data shared between the host application and a form.
pub type SharedData = Arc<Mutex<Value>>;

/// What a single `validate()` call reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// No error.
    #[default]
    Valid,
    /// A single error message.
    Message(String),
    /// A mixed list; `None` and empty entries are discarded.
    Messages(Vec<Option<String>>),
}

impl ValidationOutcome {
    /// The error messages carried by this outcome, empty ones dropped.
    pub fn into_messages(self) -> Vec<String> {
        match self {
            ValidationOutcome::Valid => Vec::new(),
            ValidationOutcome::Message(message) if message.is_empty() => Vec::new(),
            ValidationOutcome::Message(message) => vec![message],
            ValidationOutcome::Messages(messages) => messages
                .into_iter()
                .flatten()
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// Collects individual rule results into an outcome.
    pub fn from_checks(checks: Vec<Option<String>>) -> Self {
        if checks.iter().all(|c| c.is_none()) {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::Messages(checks)
        }
    }
}

impl From<String> for ValidationOutcome {
    fn from(message: String) -> Self {
        ValidationOutcome::Message(message)
    }
}

impl From<&str> for ValidationOutcome {
    fn from(message: &str) -> Self {
        ValidationOutcome::Message(message.to_string())
    }
}

/// Validation state a component is styled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    /// The component reported at least one error.
    Error,
    /// The component reported no errors.
    Success,
}

/// A validator that failed to run, as opposed to one reporting invalid data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorError {
    /// Id of the component whose validator failed.
    pub id: String,
    /// Why it failed.
    pub reason: String,
}

impl std::fmt::Display for ValidatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validator for '{}' failed: {}", self.id, self.reason)
    }
}

impl std::error::Error for ValidatorError {}

/// A mounted widget instance participating in form validation.
#[async_trait]
pub trait LiveComponent: Send + Sync {
    /// The id of the spec node this component renders.
    fn id(&self) -> &str;

    /// Validates the bound value.  Components without validation rules keep
    /// the default, which always passes.
    async fn validate(&self) -> Result<ValidationOutcome, ValidatorError> {
        Ok(ValidationOutcome::Valid)
    }

    /// Records the validation status for the rendering layer.
    fn set_status(&self, status: ValidationStatus);

    /// The last recorded validation status.
    fn status(&self) -> Option<ValidationStatus>;
}

/// The stock live component: a spec node bound to a path in shared data,
/// validated by its widget's registered validator.
#[derive(Debug)]
pub struct WidgetComponent {
    node: SpecNode,
    path: Vec<String>,
    descriptor: Arc<WidgetDescriptor>,
    data: SharedData,
    status: Mutex<Option<ValidationStatus>>,
}

impl WidgetComponent {
    /// Binds `node` at `path` within `data`.
    ///
    /// The node's children are dropped; a component validates only its own
    /// value.
    pub fn new(
        mut node: SpecNode,
        path: Vec<String>,
        descriptor: Arc<WidgetDescriptor>,
        data: SharedData,
    ) -> Self {
        node.items.clear();
        Self {
            node,
            path,
            descriptor,
            data,
            status: Mutex::new(None),
        }
    }

    /// The node this component was mounted for.
    pub fn node(&self) -> &SpecNode {
        &self.node
    }

    /// The storage path of the bound value.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// A copy of the currently bound value, `None` when undefined.
    pub fn value(&self) -> Option<Value> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        get_value(&data, &self.path).cloned()
    }
}

#[async_trait]
impl LiveComponent for WidgetComponent {
    fn id(&self) -> &str {
        &self.node.id
    }

    async fn validate(&self) -> Result<ValidationOutcome, ValidatorError> {
        let Some(validator) = self.descriptor.validate else {
            return Ok(ValidationOutcome::Valid);
        };
        let value = self.value();
        Ok(validator(&self.node, value.as_ref()))
    }

    fn set_status(&self, status: ValidationStatus) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = Some(status);
    }

    fn status(&self) -> Option<ValidationStatus> {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::builtin_registry;
    use serde_json::json;

    #[test]
    fn outcome_messages_drop_falsy_entries() {
        assert!(ValidationOutcome::Valid.into_messages().is_empty());
        assert!(ValidationOutcome::from("").into_messages().is_empty());
        assert_eq!(ValidationOutcome::from("bad").into_messages(), vec!["bad"]);
        let mixed = ValidationOutcome::Messages(vec![
            None,
            Some("e1".to_string()),
            Some(String::new()),
            Some("e2".to_string()),
        ]);
        assert_eq!(mixed.into_messages(), vec!["e1", "e2"]);
    }

    #[test]
    fn from_checks_all_passing_is_valid() {
        assert_eq!(
            ValidationOutcome::from_checks(vec![None, None]),
            ValidationOutcome::Valid
        );
        assert_ne!(
            ValidationOutcome::from_checks(vec![None, Some("x".to_string())]),
            ValidationOutcome::Valid
        );
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ValidationStatus::Error).unwrap(),
            json!("error")
        );
        assert_eq!(
            serde_json::to_value(ValidationStatus::Success).unwrap(),
            json!("success")
        );
    }

    #[tokio::test]
    async fn widget_component_reads_bound_value() {
        let registry = builtin_registry();
        let data: SharedData = Arc::new(Mutex::new(json!({"form": {"name": ""}})));
        let component = WidgetComponent::new(
            SpecNode::new("name", "mgText").with_config("required", json!(true)),
            vec!["form".to_string(), "name".to_string()],
            registry.lookup("mgText").unwrap(),
            Arc::clone(&data),
        );

        assert_eq!(component.value(), Some(json!("")));
        let outcome = component.validate().await.unwrap();
        assert_eq!(outcome.into_messages().len(), 1);

        data.lock().unwrap()["form"]["name"] = json!("Ada");
        assert_eq!(component.validate().await.unwrap(), ValidationOutcome::Valid);
    }

    #[test]
    fn status_round_trips_through_component() {
        let registry = builtin_registry();
        let component = WidgetComponent::new(
            SpecNode::new("name", "mgText"),
            vec!["name".to_string()],
            registry.lookup("mgText").unwrap(),
            Arc::new(Mutex::new(json!({}))),
        );
        assert_eq!(component.status(), None);
        component.set_status(ValidationStatus::Error);
        assert_eq!(component.status(), Some(ValidationStatus::Error));
    }
}
