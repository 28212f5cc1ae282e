//! Configuration management for macgyver forms.
//!
//! A `FormConfig` controls how a form seeds its data and which widgets its
//! registry starts with.  It can be built in code or loaded from a JSON or YAML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{LoadError, load_by_extension};

/// Form-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormConfig {
    /// Whether the root projection adopts node defaults.
    pub use_defaults: bool,
    /// Whether a new registry is populated with the built-in widgets.
    pub builtin_widgets: bool,
}

impl FormConfig {
    /// Loads a config from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Returns
    /// * `Ok(FormConfig)` - The parsed configuration, with defaults for
    ///   omitted keys
    /// * `Err(LoadError)` - If the file can't be read or parsed
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        load_by_extension(path)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            use_defaults: true,
            builtin_widgets: true,
        }
    }
}
