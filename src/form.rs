//! # Form Context
//!
//! A [`FormContext`] ties one spec tree to the host's root data, a widget
//! registry and the index of live components.  Rendering layers pass it down
//! the widget tree: widgets ask it for their storage path and value, mount
//! themselves on render and unmount on teardown, and the form validates
//! through it on submit.
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use macgyver::{FormContext, SpecNode, widgets};
//! use serde_json::json;
//!
//! let spec = SpecNode::new("form", "mgForm")
//!     .with_item(SpecNode::new("name", "mgText").with_config("required", json!(true)));
//! let data = Arc::new(Mutex::new(json!({})));
//! let form = FormContext::new(spec, Arc::new(widgets::builtin_registry()), data);
//!
//! form.init_data();
//! assert_eq!(form.mount_tree(), 2);
//! assert_eq!(form.value_of("name"), Some(json!(null)));
//! ```

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::component::{LiveComponent, SharedData, ValidationStatus, WidgetComponent};
use crate::config::FormConfig;
use crate::errors::PathError;
use crate::path::{get_path, get_value, path_from_chain, set_value};
use crate::project::{merge_defaults, project};
use crate::registry::WidgetRegistry;
use crate::spec_node::SpecNode;
use crate::tree_search::{Query, TreeSearch};
use crate::validate::{ValidateError, validate_all};
use crate::widgets::register_builtin;

/// Shared state of one rendered form.
pub struct FormContext {
    spec: SpecNode,
    registry: Arc<WidgetRegistry>,
    data: SharedData,
    config: FormConfig,
    live: Mutex<Vec<Arc<dyn LiveComponent>>>,
}

impl std::fmt::Debug for FormContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormContext")
            .field("spec", &self.spec.id)
            .field("config", &self.config)
            .field("live", &self.live_components().len())
            .finish()
    }
}

impl FormContext {
    /// Creates a context with the default [`FormConfig`].
    pub fn new(spec: SpecNode, registry: Arc<WidgetRegistry>, data: SharedData) -> Self {
        Self {
            spec,
            registry,
            data,
            config: FormConfig::default(),
            live: Mutex::new(Vec::new()),
        }
    }

    /// Creates a context with its own registry, populated with the built-in
    /// widgets when the config asks for them.
    pub fn from_config(spec: SpecNode, data: SharedData, config: FormConfig) -> Self {
        let registry = WidgetRegistry::new();
        if config.builtin_widgets {
            register_builtin(&registry);
        }
        Self {
            spec,
            registry: Arc::new(registry),
            data,
            config,
            live: Mutex::new(Vec::new()),
        }
    }

    /// The spec this form renders.
    pub fn spec(&self) -> &SpecNode {
        &self.spec
    }

    /// The widget registry.
    pub fn registry(&self) -> &Arc<WidgetRegistry> {
        &self.registry
    }

    /// The shared root data.
    pub fn data(&self) -> &SharedData {
        &self.data
    }

    /// The form's settings.
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// A copy of the current root data.
    pub fn snapshot(&self) -> Value {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Seeds the root data with the projected shape of the spec.
    ///
    /// The shape is merged at the root node's own path, so existing values
    /// are never overwritten.
    pub fn init_data(&self) {
        let Some(shape) = project(Some(&self.spec), &self.registry, self.config.use_defaults) else {
            return;
        };
        let path = get_path(&self.spec, &self.spec);
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        let mut current = get_value(&data, &path).cloned().unwrap_or(Value::Null);
        merge_defaults(&mut current, shape);
        if let Err(e) = set_value(&mut data, &path, current) {
            tracing::warn!(error = %e, "could not seed form data");
        }
    }

    fn find(&self, id: &str) -> Option<&SpecNode> {
        TreeSearch::with_key("items").find(&self.spec, &Query::id(id))
    }

    /// The storage path of the node with this id, empty when there is none.
    pub fn path_of(&self, id: &str) -> Vec<String> {
        self.find(id)
            .map(|node| get_path(node, &self.spec))
            .unwrap_or_default()
    }

    /// A copy of the value bound to the node with this id.
    pub fn value_of(&self, id: &str) -> Option<Value> {
        let node = self.find(id)?;
        let path = get_path(node, &self.spec);
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        get_value(&data, &path).cloned()
    }

    /// Writes the value bound to the node with this id.
    pub fn set_value_of(&self, id: &str, value: Value) -> Result<(), PathError> {
        let node = self
            .find(id)
            .ok_or_else(|| PathError::NodeNotFound(id.to_string()))?;
        let path = get_path(node, &self.spec);
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        set_value(&mut data, &path, value)
    }

    /// Registers a live component, returning the one it replaced under the
    /// same id.
    pub fn mount(&self, component: Arc<dyn LiveComponent>) -> Option<Arc<dyn LiveComponent>> {
        let mut live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        match live.iter_mut().find(|c| c.id() == component.id()) {
            Some(slot) => Some(std::mem::replace(slot, component)),
            None => {
                tracing::debug!(id = component.id(), "mounting component");
                live.push(component);
                None
            }
        }
    }

    /// Removes a live component.
    pub fn unmount(&self, id: &str) -> Option<Arc<dyn LiveComponent>> {
        let mut live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        let position = live.iter().position(|c| c.id() == id)?;
        Some(live.remove(position))
    }

    /// Snapshot of the mounted components, in mount order.
    pub fn live_components(&self) -> Vec<Arc<dyn LiveComponent>> {
        self.live.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Mounts a [`WidgetComponent`] for every registered node outside array
    /// containers, returning how many new ids were mounted.  A node sharing
    /// an id with one mounted earlier replaces it and is not counted.
    ///
    /// A node whose bound value is undefined or null adopts its default
    /// first.  Rows of an array container are rendered per row and mounted by
    /// the host.
    pub fn mount_tree(&self) -> usize {
        let mut mounted = 0;
        let mut stack: Vec<Vec<&SpecNode>> = vec![vec![&self.spec]];
        while let Some(chain) = stack.pop() {
            let Some(node) = chain.last().copied() else {
                continue;
            };
            let Some(descriptor) = self.registry.lookup(&node.widget) else {
                tracing::warn!(widget = %node.widget, id = %node.id, "not mounting unknown widget");
                continue;
            };
            let path = match &node.mg_path {
                Some(mg_path) => mg_path.segments(),
                None => path_from_chain(&chain),
            };
            if let Some(default) = &node.default {
                let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
                if get_value(&data, &path).is_none_or(Value::is_null)
                    && let Err(e) = set_value(&mut data, &path, default.clone())
                {
                    tracing::warn!(id = %node.id, error = %e, "not adopting default");
                }
            }
            let replaced = self.mount(Arc::new(WidgetComponent::new(
                node.clone(),
                path,
                Arc::clone(&descriptor),
                Arc::clone(&self.data),
            )));
            if replaced.is_none() {
                mounted += 1;
            }

            if descriptor.is_container_array {
                continue;
            }
            for child in node.items.iter().rev() {
                let mut next = chain.clone();
                next.push(child);
                stack.push(next);
            }
        }
        mounted
    }

    /// Validates every mounted component.
    pub async fn validate(&self) -> Result<(), ValidateError> {
        let components = self.live_components();
        validate_all(&components).await
    }

    /// The last status written to the component with this id.
    pub fn status_of(&self, id: &str) -> Option<ValidationStatus> {
        let live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        live.iter().find(|c| c.id() == id).and_then(|c| c.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ValidationOutcome;
    use crate::test_utils::test_helpers::{ScriptedComponent, builtin_registry, contact_form};
    use serde_json::json;

    fn context(data: Value) -> FormContext {
        FormContext::new(
            contact_form(),
            Arc::new(builtin_registry()),
            Arc::new(Mutex::new(data)),
        )
    }

    #[test]
    fn init_data_seeds_under_root_id() {
        let form = context(json!({}));
        form.init_data();
        assert_eq!(
            form.snapshot(),
            json!({"contact": {
                "name": null,
                "email": null,
                "address": {"street": null, "city": null}
            }})
        );
    }

    #[test]
    fn init_data_keeps_existing_values() {
        let form = context(json!({"contact": {"name": "Ada", "address": {"city": "Paris"}}}));
        form.init_data();
        assert_eq!(form.value_of("name"), Some(json!("Ada")));
        assert_eq!(form.value_of("city"), Some(json!("Paris")));
        assert_eq!(form.value_of("street"), Some(Value::Null));
    }

    #[test]
    fn paths_and_values_by_id() {
        let form = context(json!({}));
        assert_eq!(form.path_of("street"), vec!["contact", "address", "street"]);
        assert!(form.path_of("ghost").is_empty());
        assert_eq!(form.value_of("ghost"), None);

        form.set_value_of("street", json!("Main")).unwrap();
        assert_eq!(form.value_of("street"), Some(json!("Main")));
        assert_eq!(
            form.set_value_of("ghost", json!(1)),
            Err(PathError::NodeNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn set_value_of_keeps_rows_on_named_segment() {
        let spec = SpecNode::new("form", "mgForm").with_item(
            SpecNode::new("note", "mgText")
                .with_mg_path(crate::spec_node::MgPath::Dotted("rows.note".to_string())),
        );
        let data = Arc::new(Mutex::new(json!({"rows": [1, 2]})));
        let form = FormContext::new(spec, Arc::new(builtin_registry()), data);
        assert_eq!(
            form.set_value_of("note", json!("x")),
            Err(PathError::NotAnIndex {
                segment: "note".to_string()
            })
        );
        assert_eq!(form.snapshot(), json!({"rows": [1, 2]}));
    }

    #[test]
    fn mount_and_unmount() {
        let form = context(json!({}));
        assert!(form.mount(Arc::new(ScriptedComponent::returning("a", ValidationOutcome::Valid))).is_none());
        assert!(form.mount(Arc::new(ScriptedComponent::returning("b", ValidationOutcome::Valid))).is_none());
        let replaced = form.mount(Arc::new(ScriptedComponent::returning("a", ValidationOutcome::from("x"))));
        assert_eq!(replaced.map(|c| c.id().to_string()), Some("a".to_string()));
        assert_eq!(form.live_components().len(), 2);

        assert!(form.unmount("a").is_some());
        assert!(form.unmount("a").is_none());
        let ids: Vec<String> = form
            .live_components()
            .iter()
            .map(|c| c.id().to_string())
            .collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn mount_tree_skips_table_rows_and_adopts_defaults() {
        let spec = SpecNode::new("order", "mgForm")
            .with_item(SpecNode::new("customer", "mgText").with_default(json!("walk-in")))
            .with_item(SpecNode::new("note", "mgText").with_default(json!("none")))
            .with_item(
                SpecNode::new("lines", "mgTable").with_item(SpecNode::new("qty", "mgNumber")),
            )
            .with_item(SpecNode::new("widget", "mgMystery"));
        let data = Arc::new(Mutex::new(json!({"order": {"note": "fragile"}})));
        let form = FormContext::new(spec, Arc::new(builtin_registry()), data);

        assert_eq!(form.mount_tree(), 4);
        assert_eq!(form.value_of("customer"), Some(json!("walk-in")));
        assert_eq!(form.value_of("note"), Some(json!("fragile")));
        assert!(form.live_components().iter().all(|c| c.id() != "qty"));
    }

    #[test]
    fn init_data_then_mount_tree_adopts_defaults() {
        let spec = SpecNode::new("order", "mgForm")
            .with_item(SpecNode::new("customer", "mgText").with_default(json!("walk-in")))
            .with_item(
                SpecNode::new("shipping", "mgContainer")
                    .with_item(SpecNode::new("method", "mgText").with_default(json!("post"))),
            );
        let data = Arc::new(Mutex::new(json!({})));
        let form = FormContext::new(spec, Arc::new(builtin_registry()), data);
        form.init_data();
        assert_eq!(form.value_of("method"), Some(Value::Null));

        form.mount_tree();
        assert_eq!(form.value_of("customer"), Some(json!("walk-in")));
        assert_eq!(form.value_of("method"), Some(json!("post")));
    }

    #[test]
    fn mount_tree_counts_live_components() {
        let spec = SpecNode::new("form", "mgForm")
            .with_item(SpecNode::new("", "mgContainer").with_item(SpecNode::new("a", "mgText")))
            .with_item(SpecNode::new("", "mgContainer").with_item(SpecNode::new("b", "mgText")));
        let form = FormContext::new(spec, Arc::new(builtin_registry()), Arc::new(Mutex::new(json!({}))));
        let mounted = form.mount_tree();
        assert_eq!(mounted, form.live_components().len());
        assert_eq!(mounted, 4);
    }

    #[tokio::test]
    async fn validate_marks_statuses() {
        let form = context(json!({}));
        form.init_data();
        form.mount_tree();

        let err = form.validate().await.unwrap_err();
        let ids: Vec<&str> = err.errors().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["name"]);
        assert_eq!(form.status_of("name"), Some(ValidationStatus::Error));
        assert_eq!(form.status_of("email"), Some(ValidationStatus::Success));

        form.set_value_of("name", json!("Ada")).unwrap();
        assert_eq!(form.validate().await, Ok(()));
        assert_eq!(form.status_of("name"), Some(ValidationStatus::Success));
        assert_eq!(form.status_of("ghost"), None);
    }

    #[test]
    fn from_config_without_builtins() {
        let config = FormConfig {
            builtin_widgets: false,
            use_defaults: false,
            ..FormConfig::default()
        };
        let form = FormContext::from_config(contact_form(), Arc::new(Mutex::new(json!({}))), config);
        assert!(form.registry().is_empty());
        assert_eq!(form.mount_tree(), 0);
    }
}
