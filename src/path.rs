//! # Storage Paths
//!
//! Every widget stores its value somewhere inside the form's root data.  The
//! location is a path of string segments computed from the node's ancestors:
//! each named ancestor contributes its id, while anonymous wrappers and
//! `ignoreScope` containers contribute nothing.  A node may bypass the walk
//! entirely with an explicit `mgPath`.
//!
//! ```rust
//! use macgyver::{SpecNode, get_path};
//!
//! let root = SpecNode::new("form", "mgForm").with_item(
//!     SpecNode::new("layout", "mgContainer")
//!         .ignoring_scope()
//!         .with_item(SpecNode::new("email", "mgText")),
//! );
//! let email = &root.items[0].items[0];
//! assert_eq!(get_path(email, &root), vec!["form", "email"]);
//! ```

use serde_json::{Map, Value};

use crate::errors::PathError;
use crate::spec_node::SpecNode;
use crate::tree_search::{Query, TreeSearch};

/// Something able to produce the root-to-node ancestor chain of a node.
pub trait AncestorChain {
    /// The chain from the root down to (and including) `node`, or an empty
    /// vector if `node` cannot be located.
    fn ancestor_chain<'a>(&'a self, node: &SpecNode) -> Vec<&'a SpecNode>;
}

/// A spec root locates `node` by identity when it is a reference into the
/// tree, and otherwise by id.  Anonymous nodes are only found by identity.
impl AncestorChain for SpecNode {
    fn ancestor_chain<'a>(&'a self, node: &SpecNode) -> Vec<&'a SpecNode> {
        let search = TreeSearch::with_key("items");
        let chain = search.parents(self, &|n: &SpecNode| std::ptr::eq(n, node));
        if !chain.is_empty() || node.id.is_empty() {
            return chain;
        }
        search.parents(self, &Query::id(&node.id))
    }
}

/// Computes the storage path of `node`.
///
/// An explicit `mgPath` wins.  Otherwise the ancestor chain is mapped to ids,
/// skipping ancestors that ignore scope and ancestors with empty ids.  The
/// node's own id is always kept when non-empty.
pub fn get_path(node: &SpecNode, chain: &impl AncestorChain) -> Vec<String> {
    if let Some(mg_path) = &node.mg_path {
        return mg_path.segments();
    }
    path_from_chain(&chain.ancestor_chain(node))
}

/// Maps a root-to-node chain to path segments.
pub fn path_from_chain(chain: &[&SpecNode]) -> Vec<String> {
    let Some((own, ancestors)) = chain.split_last() else {
        return Vec::new();
    };
    ancestors
        .iter()
        .filter(|a| !a.ignore_scope)
        .map(|a| a.id.as_str())
        .chain(std::iter::once(own.id.as_str()))
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
        .collect()
}

/// Joins path segments with `.`.
pub fn join_path(path: &[String]) -> String {
    path.join(".")
}

/// Reads the value stored at `path`, `None` when any segment is missing.
///
/// Array elements are addressed by numeric segments.
pub fn get_value<'a>(data: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(data, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Writes `value` at `path`, creating intermediate objects as needed.
///
/// Missing slots, nulls and scalars found along the path are replaced by
/// objects.  An existing array is never replaced: its segment must be an
/// index no further than its length, and an index equal to the length
/// appends.  Any other segment is an error and `data` is left untouched.
/// An empty path replaces `data`.
pub fn set_value(data: &mut Value, path: &[String], value: Value) -> Result<(), PathError> {
    let Some((last, parents)) = path.split_last() else {
        *data = value;
        return Ok(());
    };
    check_writable(data, path)?;
    let mut current = data;
    for segment in parents {
        current = child_slot(current, segment);
    }
    *child_slot(current, last) = value;
    Ok(())
}

// Only pre-existing arrays can reject a segment, so this runs before any write.
fn check_writable(data: &Value, path: &[String]) -> Result<(), PathError> {
    let mut current = data;
    for segment in path {
        current = match current {
            Value::Object(map) => match map.get(segment) {
                Some(next) => next,
                None => return Ok(()),
            },
            Value::Array(items) => {
                let index = segment.parse::<usize>().map_err(|_| PathError::NotAnIndex {
                    segment: segment.clone(),
                })?;
                match items.get(index) {
                    Some(next) => next,
                    None if index == items.len() => return Ok(()),
                    None => {
                        return Err(PathError::IndexOutOfRange {
                            segment: segment.clone(),
                            len: items.len(),
                        });
                    }
                }
            }
            _ => return Ok(()),
        };
    }
    Ok(())
}

fn child_slot<'a>(current: &'a mut Value, segment: &str) -> &'a mut Value {
    if !current.is_object() && !current.is_array() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Array(items) => {
            let index = segment.parse::<usize>().unwrap_or(items.len()).min(items.len());
            if index == items.len() {
                items.push(Value::Null);
            }
            &mut items[index]
        }
        Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
        _ => unreachable!("slot was made an object above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec_node::MgPath;
    use serde_json::json;

    fn segments(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> SpecNode {
        SpecNode::new("form", "mgForm")
            .with_item(
                SpecNode::new("scoped", "mgContainer")
                    .ignoring_scope()
                    .with_item(SpecNode::new("email", "mgText")),
            )
            .with_item(
                SpecNode::new("", "mgContainer").with_item(SpecNode::new("phone", "mgText")),
            )
            .with_item(
                SpecNode::new("address", "mgContainer")
                    .with_item(SpecNode::new("street", "mgText"))
                    .with_item(
                        SpecNode::new("city", "mgText")
                            .with_mg_path(MgPath::Dotted("foo.bar".to_string())),
                    ),
            )
    }

    #[test]
    fn explicit_dotted_path_wins() {
        let root = sample();
        let city = &root.items[2].items[1];
        assert_eq!(get_path(city, &root), vec!["foo", "bar"]);
    }

    #[test]
    fn explicit_segment_path_is_verbatim() {
        let root = sample();
        let node = SpecNode::new("street", "mgText")
            .with_mg_path(MgPath::Segments(segments(&["a.b", "c"])));
        assert_eq!(get_path(&node, &root), vec!["a.b", "c"]);
    }

    #[test]
    fn scope_ignoring_ancestor_is_skipped() {
        let root = sample();
        let email = &root.items[0].items[0];
        assert_eq!(get_path(email, &root), vec!["form", "email"]);
    }

    #[test]
    fn anonymous_ancestor_is_skipped() {
        let root = sample();
        let phone = &root.items[1].items[0];
        assert_eq!(get_path(phone, &root), vec!["form", "phone"]);
    }

    #[test]
    fn nested_named_containers() {
        let root = sample();
        let street = &root.items[2].items[0];
        assert_eq!(get_path(street, &root), vec!["form", "address", "street"]);
        assert_eq!(join_path(&get_path(street, &root)), "form.address.street");
    }

    #[test]
    fn scope_ignoring_node_keeps_own_id() {
        let root = sample();
        assert_eq!(get_path(&root.items[0], &root), vec!["form", "scoped"]);
    }

    #[test]
    fn missing_node_has_empty_path() {
        let root = sample();
        let stray = SpecNode::new("stray", "mgText");
        assert!(get_path(&stray, &root).is_empty());
    }

    #[test]
    fn get_value_walks_objects_and_arrays() {
        let data = json!({"form": {"rows": [{"x": 1}, {"x": 2}]}});
        assert_eq!(
            get_value(&data, &segments(&["form", "rows", "1", "x"])),
            Some(&json!(2))
        );
        assert_eq!(get_value(&data, &segments(&["form", "missing"])), None);
        assert_eq!(get_value(&data, &segments(&["form", "rows", "x"])), None);
        assert_eq!(get_value(&data, &[]), Some(&data));
    }

    #[test]
    fn set_value_creates_intermediate_objects() {
        let mut data = json!({"form": {"name": "Ada"}});
        set_value(&mut data, &segments(&["form", "address", "street"]), json!("Main")).unwrap();
        assert_eq!(
            data,
            json!({"form": {"name": "Ada", "address": {"street": "Main"}}})
        );
    }

    #[test]
    fn set_value_replaces_scalars_and_appends_rows() {
        let mut data = json!({"a": 5, "rows": [1]});
        set_value(&mut data, &segments(&["a", "b"]), json!(true)).unwrap();
        set_value(&mut data, &segments(&["rows", "0"]), json!(0)).unwrap();
        set_value(&mut data, &segments(&["rows", "1", "q"]), json!(3)).unwrap();
        assert_eq!(data, json!({"a": {"b": true}, "rows": [0, {"q": 3}]}));

        set_value(&mut data, &[], json!("root")).unwrap();
        assert_eq!(data, json!("root"));
    }

    #[test]
    fn set_value_rejects_far_indexes() {
        let mut data = json!({"rows": []});
        let err = set_value(&mut data, &segments(&["rows", "18446744073709551615"]), json!(1));
        assert_eq!(
            err,
            Err(PathError::IndexOutOfRange {
                segment: "18446744073709551615".to_string(),
                len: 0,
            })
        );
        assert!(set_value(&mut data, &segments(&["rows", "4000000000"]), json!(1)).is_err());
        assert!(set_value(&mut data, &segments(&["rows", "99999999999999999999999"]), json!(1)).is_err());
        assert_eq!(data, json!({"rows": []}));
    }

    #[test]
    fn set_value_keeps_rows_on_named_segment() {
        let mut data = json!({"rows": [{"q": 1}, {"q": 2}]});
        assert_eq!(
            set_value(&mut data, &segments(&["rows", "q"]), json!(5)),
            Err(PathError::NotAnIndex {
                segment: "q".to_string()
            })
        );
        assert_eq!(data, json!({"rows": [{"q": 1}, {"q": 2}]}));
    }

    #[test]
    fn anonymous_node_resolves_to_itself() {
        let root = SpecNode::new("form", "mgForm")
            .with_item(SpecNode::new("", "mgContainer").with_item(SpecNode::new("a", "mgText")))
            .with_item(
                SpecNode::new("box", "mgContainer")
                    .with_item(SpecNode::new("", "mgContainer").with_mg_path(MgPath::Dotted("x".to_string()))),
            );
        let second = &root.items[1].items[0];
        let chain = root.ancestor_chain(second);
        assert_eq!(chain.len(), 3);
        assert!(std::ptr::eq(chain[2], second));
        assert_eq!(chain[1].id, "box");

        let stray = SpecNode::new("", "mgContainer");
        assert!(root.ancestor_chain(&stray).is_empty());
    }
}
