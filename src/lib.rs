//! # MacGyver: A Spec-Tree Engine for Dynamic Forms
//!
//! A MacGyver form is described by a spec tree: a nested structure of nodes,
//! each naming a widget type and carrying that widget's configuration.  A
//! rendering layer walks the tree and draws widgets; this crate provides
//! everything that layer needs that is not drawing:
//!
//! - **Widget Registry**: widget types and their capabilities (container,
//!   array container, config schema, validator)
//! - **Tree Search**: locate nodes, their ancestor chains and their children in
//!   spec trees and other nested JSON
//! - **Path Resolution**: compute where in the form's data each widget stores
//!   its value, honouring `ignoreScope` and explicit `mgPath` overrides
//! - **Data Projection**: derive the skeleton data object a spec binds to
//! - **Validation Aggregation**: run every mounted widget's validator
//!   concurrently and write a pass/fail status back to each
//! - **Editing**: insert, move and remove nodes in an indexed [`SpecTree`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ FormContext (data, live components)     │
//! ├─────────────────────────────────────────┤
//! │ Validation aggregation (async)          │
//! ├─────────────────────────────────────────┤
//! │ Projection │ Path resolution │ Editing  │
//! ├─────────────────────────────────────────┤
//! │ Tree search │ Widget registry           │
//! ├─────────────────────────────────────────┤
//! │ Spec nodes (JSON / YAML)                │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage Examples
//!
//! ### Loading a Spec and Projecting its Data
//!
//! ```rust
//! # use macgyver::{SpecNode, project, widgets};
//! # use serde_json::json;
//! let spec = SpecNode::from_yaml_str(r#"
//! id: signup
//! type: mgForm
//! items:
//!   - id: email
//!     type: mgText
//!     required: true
//!   - id: prefs
//!     type: mgContainer
//!     items:
//!       - id: newsletter
//!         type: mgToggle
//! "#).unwrap();
//!
//! let registry = widgets::builtin_registry();
//! assert_eq!(
//!     project(Some(&spec), &registry, true),
//!     Some(json!({"email": null, "prefs": {"newsletter": null}}))
//! );
//! ```
//!
//! ### Searching a Tree
//!
//! ```rust
//! # use macgyver::{Query, TreeSearch};
//! # use serde_json::json;
//! let tree = json!({"id": "root", "children": [
//!     {"id": "a", "items": [{"id": "b"}]}
//! ]});
//! let search = TreeSearch::default();
//!
//! let chain = search.parents(&tree, &Query::id("b"));
//! let ids: Vec<&str> = chain.iter().map(|n| n["id"].as_str().unwrap()).collect();
//! assert_eq!(ids, vec!["root", "a", "b"]);
//! ```
//!
//! ### Validating a Form
//!
//! ```rust
//! # use std::sync::{Arc, Mutex};
//! # use macgyver::{FormContext, SpecNode, widgets};
//! # use serde_json::json;
//! # #[tokio::main]
//! # async fn main() {
//! let spec = SpecNode::new("form", "mgForm")
//!     .with_item(SpecNode::new("age", "mgNumber").with_config("min", json!(18)));
//! let data = Arc::new(Mutex::new(json!({"form": {"age": 12}})));
//! let form = FormContext::new(spec, Arc::new(widgets::builtin_registry()), data);
//! form.mount_tree();
//!
//! let err = form.validate().await.unwrap_err();
//! assert_eq!(err.errors()[0].message, "age must be at least 18");
//! # }
//! ```

#![deny(missing_docs)]
mod component;
mod config;
mod errors;
mod form;
mod path;
mod project;
mod registry;
mod spec_node;
mod spec_tree;
mod test_utils;
mod tree_search;
mod validate;
mod value_kind;

/// Command-line utilities shared by the macgyver binaries.
///
/// This module provides program termination, JSON output, log setup and the
/// structural lint run over spec files.
pub mod cli_utils;

/// The built-in widget set.
///
/// Layout widgets (`mgForm`, `mgContainer`, `mgTable`) and input widgets
/// with their validation rules.
pub mod widgets;

pub use component::{
    LiveComponent, SharedData, ValidationOutcome, ValidationStatus, ValidatorError,
    WidgetComponent,
};
pub use config::FormConfig;
pub use errors::{LoadError, PathError, TreeError};
pub use form::FormContext;
pub use path::{AncestorChain, get_path, get_value, join_path, path_from_chain, set_value};
pub use project::{merge_defaults, project};
pub use registry::{
    ConfigField, WidgetDescriptor, WidgetProperties, WidgetRegistry, WidgetValidator,
    kebab_case, start_case,
};
pub use spec_node::{MgPath, SpecNode};
pub use spec_tree::{NodeKey, SpecTree};
pub use tree_search::{Predicate, Query, TreeNode, TreeSearch};
pub use validate::{ValidateError, ValidationError, validate_all};
pub use value_kind::{
    ValueKind, ValueKindError, check_kind, check_node_config, check_tree_config, get_value_type,
};
