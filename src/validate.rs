//! # Validation Aggregation
//!
//! Runs every live component's validator concurrently and combines the
//! results.  Each component is marked `success` or `error` once all
//! validators have finished; if any validator fails to run, nothing is
//! marked and the failure is returned.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;

use crate::component::{LiveComponent, ValidationStatus, ValidatorError};

/// One error message attributed to a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Id of the reporting component.
    pub id: String,
    /// The message.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.id, self.message)
    }
}

/// Why a form failed to validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateError {
    /// Validators ran and reported these errors, in component order.
    Invalid(Vec<ValidationError>),
    /// A validator could not run.
    Validator(ValidatorError),
}

impl ValidateError {
    /// The reported errors; empty when a validator failed to run.
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            ValidateError::Invalid(errors) => errors,
            ValidateError::Validator(_) => &[],
        }
    }
}

impl std::fmt::Display for ValidateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidateError::Invalid(errors) => {
                write!(f, "Form has {} validation error(s)", errors.len())
            }
            ValidateError::Validator(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ValidateError {}

impl From<ValidatorError> for ValidateError {
    fn from(e: ValidatorError) -> Self {
        ValidateError::Validator(e)
    }
}

/// Validates `components` and marks each with its status.
///
/// # Returns
/// * `Ok(())` - Every component reported no errors
/// * `Err(ValidateError::Invalid)` - The flattened errors of every failing
///   component, in component order
/// * `Err(ValidateError::Validator)` - A validator failed to run; no
///   component was marked
pub async fn validate_all(components: &[Arc<dyn LiveComponent>]) -> Result<(), ValidateError> {
    let outcomes = try_join_all(components.iter().map(|c| c.validate())).await?;

    let mut errors = Vec::new();
    for (component, outcome) in components.iter().zip(outcomes) {
        errors.extend(outcome.into_messages().into_iter().map(|message| ValidationError {
            id: component.id().to_string(),
            message,
        }));
    }

    // status is keyed by id, so components sharing an id share a status
    let failed: HashSet<&str> = errors.iter().map(|e| e.id.as_str()).collect();
    for component in components {
        if failed.contains(component.id()) {
            component.set_status(ValidationStatus::Error);
        } else {
            component.set_status(ValidationStatus::Success);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = errors.len(), "form failed validation");
        Err(ValidateError::Invalid(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ValidationOutcome;
    use crate::test_utils::test_helpers::ScriptedComponent;

    fn as_live(components: &[Arc<ScriptedComponent>]) -> Vec<Arc<dyn LiveComponent>> {
        components
            .iter()
            .map(|c| Arc::clone(c) as Arc<dyn LiveComponent>)
            .collect()
    }

    #[tokio::test]
    async fn empty_form_is_valid() {
        assert_eq!(validate_all(&[]).await, Ok(()));
    }

    #[tokio::test]
    async fn all_valid_marks_success() {
        let components = vec![
            Arc::new(ScriptedComponent::returning("a", ValidationOutcome::Valid)),
            Arc::new(ScriptedComponent::returning("b", ValidationOutcome::from(""))),
        ];
        assert_eq!(validate_all(&as_live(&components)).await, Ok(()));
        for c in &components {
            assert_eq!(c.status(), Some(ValidationStatus::Success));
        }
    }

    #[tokio::test]
    async fn errors_are_flattened_in_order() {
        let components = vec![
            Arc::new(ScriptedComponent::returning("a", ValidationOutcome::Valid)),
            Arc::new(ScriptedComponent::returning("b", ValidationOutcome::from("bad"))),
            Arc::new(ScriptedComponent::returning(
                "c",
                ValidationOutcome::Messages(vec![
                    Some("e1".to_string()),
                    None,
                    Some("e2".to_string()),
                ]),
            )),
        ];
        let err = validate_all(&as_live(&components)).await.unwrap_err();
        let errors: Vec<(String, String)> = err
            .errors()
            .iter()
            .map(|e| (e.id.clone(), e.message.clone()))
            .collect();
        assert_eq!(
            errors,
            vec![
                ("b".to_string(), "bad".to_string()),
                ("c".to_string(), "e1".to_string()),
                ("c".to_string(), "e2".to_string()),
            ]
        );
        assert_eq!(components[0].status(), Some(ValidationStatus::Success));
        assert_eq!(components[1].status(), Some(ValidationStatus::Error));
        assert_eq!(components[2].status(), Some(ValidationStatus::Error));
    }

    #[tokio::test]
    async fn components_sharing_an_id_share_a_status() {
        let components = vec![
            Arc::new(ScriptedComponent::returning("row", ValidationOutcome::Valid)),
            Arc::new(ScriptedComponent::returning("row", ValidationOutcome::from("bad"))),
        ];
        assert!(validate_all(&as_live(&components)).await.is_err());
        assert_eq!(components[0].status(), Some(ValidationStatus::Error));
        assert_eq!(components[1].status(), Some(ValidationStatus::Error));
    }

    #[tokio::test]
    async fn failing_validator_marks_nothing() {
        let components = vec![
            Arc::new(ScriptedComponent::returning("a", ValidationOutcome::from("bad"))),
            Arc::new(ScriptedComponent::failing("b", "backend unreachable")),
        ];
        let err = validate_all(&as_live(&components)).await.unwrap_err();
        assert_eq!(
            err,
            ValidateError::Validator(ValidatorError {
                id: "b".to_string(),
                reason: "backend unreachable".to_string(),
            })
        );
        assert!(err.errors().is_empty());
        assert!(components.iter().all(|c| c.status().is_none()));
    }
}
