#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::component::{LiveComponent, ValidationOutcome, ValidationStatus, ValidatorError};
    use crate::registry::WidgetRegistry;
    use crate::spec_node::SpecNode;

    /// Creates a fresh registry holding the built-in widgets
    pub fn builtin_registry() -> WidgetRegistry {
        crate::widgets::builtin_registry()
    }

    /// A small contact form: a required name, an email with a pattern and a
    /// nested address container
    pub fn contact_form() -> SpecNode {
        SpecNode::new("contact", "mgForm")
            .with_item(
                SpecNode::new("name", "mgText")
                    .with_config("title", json!("Name"))
                    .with_config("required", json!(true)),
            )
            .with_item(SpecNode::new("email", "mgText").with_config("pattern", json!("^[^@]+@[^@]+$")))
            .with_item(
                SpecNode::new("address", "mgContainer")
                    .with_item(SpecNode::new("street", "mgText"))
                    .with_item(SpecNode::new("city", "mgText")),
            )
    }

    /// A live component whose validator returns a canned result
    pub struct ScriptedComponent {
        id: String,
        result: Result<ValidationOutcome, String>,
        status: Mutex<Option<ValidationStatus>>,
    }

    impl ScriptedComponent {
        /// Validates to `outcome`
        pub fn returning(id: &str, outcome: ValidationOutcome) -> Self {
            Self {
                id: id.to_string(),
                result: Ok(outcome),
                status: Mutex::new(None),
            }
        }

        /// Fails to validate with `reason`
        pub fn failing(id: &str, reason: &str) -> Self {
            Self {
                id: id.to_string(),
                result: Err(reason.to_string()),
                status: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl LiveComponent for ScriptedComponent {
        fn id(&self) -> &str {
            &self.id
        }

        async fn validate(&self) -> Result<ValidationOutcome, ValidatorError> {
            tokio::task::yield_now().await;
            self.result.clone().map_err(|reason| ValidatorError {
                id: self.id.clone(),
                reason,
            })
        }

        fn set_status(&self, status: ValidationStatus) {
            *self.status.lock().unwrap() = Some(status);
        }

        fn status(&self) -> Option<ValidationStatus> {
            *self.status.lock().unwrap()
        }
    }
}
