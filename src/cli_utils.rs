use std::process;

use crate::registry::WidgetRegistry;
use crate::spec_node::SpecNode;
use crate::spec_tree::SpecTree;
use crate::tree_search::TreeSearch;
use crate::value_kind::check_tree_config;

/// Exits the program with an error message
pub fn exit_with_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exits the program with an error message and usage information
pub fn exit_with_usage_error(message: &str, usage: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("{}", usage);
    process::exit(1);
}

/// Prints formatted JSON with proper indentation
pub fn print_json<T>(value: &T) -> Result<(), serde_json::Error>
where
    T: serde::Serialize,
{
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a formatted JSON value or exits with error
pub fn print_json_or_exit<T>(value: &T, context: &str)
where
    T: serde::Serialize,
{
    if let Err(e) = print_json(value) {
        exit_with_error(&format!("Failed to format {} JSON: {}", context, e));
    }
}

/// Installs a stderr log subscriber.  `RUST_LOG` overrides the level, which
/// otherwise is `debug` when verbose and `warn` when not.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Finds structural problems in a spec: unknown widget types, children under
/// non-container widgets, repeated ids and config values of the wrong kind.
pub fn lint_spec(spec: &SpecNode, registry: &WidgetRegistry) -> Vec<String> {
    let mut problems = Vec::new();
    for node in TreeSearch::with_key("items").flatten(spec) {
        match registry.lookup(&node.widget) {
            None => problems.push(format!("'{}': unknown widget type '{}'", node.id, node.widget)),
            Some(widget) if !widget.is_container && !node.items.is_empty() => problems.push(format!(
                "'{}': widget '{}' cannot hold items",
                node.id, node.widget
            )),
            Some(_) => {}
        }
    }
    let tree = SpecTree::from_spec(spec.clone());
    problems.extend(
        tree.duplicate_ids()
            .into_iter()
            .map(|id| format!("'{}': id is used more than once", id)),
    );
    problems.extend(check_tree_config(spec, registry).iter().map(|e| e.to_string()));
    problems
}

/// Prints `<path> pass` or `<path> fail` followed by the problems.
pub fn report(path: &str, problems: &[String]) {
    if problems.is_empty() {
        println!("{} pass", path);
        return;
    }
    println!("{} fail", path);
    for problem in problems {
        println!("  {}", problem);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::{builtin_registry, contact_form};
    use serde_json::json;

    #[test]
    fn clean_spec_has_no_problems() {
        assert!(lint_spec(&contact_form(), &builtin_registry()).is_empty());
    }

    #[test]
    fn problems_are_collected() {
        let spec = SpecNode::new("form", "mgForm")
            .with_item(SpecNode::new("a", "mgText").with_item(SpecNode::new("b", "mgText")))
            .with_item(SpecNode::new("a", "mgWhatever"))
            .with_item(SpecNode::new("n", "mgNumber").with_config("min", json!("low")));
        let problems = lint_spec(&spec, &builtin_registry());
        assert_eq!(
            problems,
            vec![
                "'a': widget 'mgText' cannot hold items".to_string(),
                "'a': unknown widget type 'mgWhatever'".to_string(),
                "'a': id is used more than once".to_string(),
                "Config error at 'n.min': Type mismatch: expected number, got string".to_string(),
            ]
        );
    }
}
