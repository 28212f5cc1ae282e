//! Error types for macgyver operations.

/// Errors raised by structural mutations of a spec tree.
///
/// Lookups never produce these; a lookup miss is an empty result.  They are
/// reserved for mutations that cannot proceed without corrupting the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// No node with the given id exists in the tree.
    NodeNotFound(String),
    /// The parent of the node (or the requested parent) could not be found.
    ParentNotFound(String),
    /// A node with the same id already exists in the tree.
    DuplicateId(String),
    /// The move would place a node inside its own subtree.
    Cycle {
        /// The node being moved.
        node: String,
        /// The requested destination parent.
        target: String,
    },
    /// The root node cannot be removed or moved.
    RootImmutable,
    /// The widget type is not present in the registry.
    UnknownWidget(String),
    /// A node field was given a value it cannot hold.
    InvalidField {
        /// The field or config key being edited.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "Node not found: {}", id),
            Self::ParentNotFound(id) => write!(f, "Parent not found for node: {}", id),
            Self::DuplicateId(id) => write!(f, "Duplicate node id: {}", id),
            Self::Cycle { node, target } => {
                write!(f, "Cannot move '{}' into its own descendant '{}'", node, target)
            }
            Self::RootImmutable => write!(f, "The root node cannot be removed or moved"),
            Self::UnknownWidget(id) => write!(f, "Unknown widget type: {}", id),
            Self::InvalidField { key, reason } => write!(f, "Invalid value for '{}': {}", key, reason),
        }
    }
}

impl std::error::Error for TreeError {}

/// Errors raised when a value cannot be written at a storage path.
///
/// A failed write leaves the data unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// No node with the given id exists in the form.
    NodeNotFound(String),
    /// A segment addressing an existing array is not a number.
    NotAnIndex {
        /// The offending segment.
        segment: String,
    },
    /// A numeric segment lies beyond the end of an existing array.  Writing
    /// at the end appends; anything further is rejected.
    IndexOutOfRange {
        /// The offending segment.
        segment: String,
        /// Length of the array.
        len: usize,
    },
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "Node not found: {}", id),
            Self::NotAnIndex { segment } => {
                write!(f, "Segment '{}' does not index an array", segment)
            }
            Self::IndexOutOfRange { segment, len } => {
                write!(f, "Index {} is past the end of an array of {}", segment, len)
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Errors that can occur while loading a spec tree or a form configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Reading the source failed.
    IoError(String),
    /// The source was not valid JSON for the expected shape.
    JsonError(String),
    /// The source was not valid YAML for the expected shape.
    YamlError(String),
    /// The file extension does not name a supported format.
    UnsupportedFormat(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(msg) => write!(f, "IO error: {}", msg),
            Self::JsonError(msg) => write!(f, "JSON error: {}", msg),
            Self::YamlError(msg) => write!(f, "YAML error: {}", msg),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported format: {}", ext),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::IoError(e.to_string())
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::JsonError(e.to_string())
    }
}

impl From<serde_yml::Error> for LoadError {
    fn from(e: serde_yml::Error) -> Self {
        LoadError::YamlError(e.to_string())
    }
}

impl std::error::Error for LoadError {}

/// Reads a file and decodes it as JSON or YAML depending on its extension.
pub(crate) fn load_by_extension<T: serde::de::DeserializeOwned>(
    path: &std::path::Path,
) -> Result<T, LoadError> {
    let content = std::fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" => Ok(serde_json::from_str(&content)?),
        "yaml" | "yml" => Ok(serde_yml::from_str(&content)?),
        _ => Err(LoadError::UnsupportedFormat(ext)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_error_display() {
        assert_eq!(
            TreeError::NodeNotFound("name".to_string()).to_string(),
            "Node not found: name"
        );
        assert_eq!(
            TreeError::Cycle {
                node: "a".to_string(),
                target: "b".to_string()
            }
            .to_string(),
            "Cannot move 'a' into its own descendant 'b'"
        );
    }

    #[test]
    fn unsupported_extension() {
        let result: Result<serde_json::Value, LoadError> =
            load_by_extension(std::path::Path::new("Cargo.toml"));
        assert_eq!(
            result.unwrap_err(),
            LoadError::UnsupportedFormat("toml".to_string())
        );
    }
}
