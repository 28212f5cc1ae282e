//! # Tree Search
//!
//! Generic recursive search over ordered trees.  A node exposes its children
//! under one of a configurable list of keys; the first key present with a
//! non-empty sequence wins, and children stored under any other key are
//! invisible to the search.
//!
//! Searches are first-match: with duplicate ids, the first node found in the
//! traversal order is returned and the rest are silently ignored.
//!
//! ```rust
//! use macgyver::{Query, TreeSearch};
//! use serde_json::json;
//!
//! let tree = json!({
//!     "id": "root",
//!     "children": [
//!         {"id": "a", "children": [{"id": "a1"}]},
//!         {"id": "b"}
//!     ]
//! });
//! let search = TreeSearch::default();
//!
//! let chain = search.parents(&tree, &Query::id("a1"));
//! let ids: Vec<&str> = chain.iter().map(|n| n["id"].as_str().unwrap()).collect();
//! assert_eq!(ids, vec!["root", "a", "a1"]);
//!
//! assert_eq!(search.flatten(&tree).len(), 4);
//! assert!(search.find(&tree, &Query::id("zzz")).is_none());
//! ```

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::spec_node::SpecNode;

/// A node of an ordered tree.
pub trait TreeNode: Sized {
    /// The children stored under `key`, if that key holds a sequence.
    fn child_list(&self, key: &str) -> Option<&[Self]>;

    /// The value of a named field, for query matching.
    fn field(&self, key: &str) -> Option<Cow<'_, Value>>;

    /// The roots this value stands for when passed as a whole tree.
    fn as_roots(&self) -> &[Self] {
        std::slice::from_ref(self)
    }
}

impl TreeNode for Value {
    fn child_list(&self, key: &str) -> Option<&[Self]> {
        self.get(key).and_then(|c| c.as_array()).map(|c| c.as_slice())
    }

    fn field(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.get(key).map(Cow::Borrowed)
    }

    fn as_roots(&self) -> &[Self] {
        match self {
            Value::Array(roots) => roots.as_slice(),
            _ => std::slice::from_ref(self),
        }
    }
}

impl TreeNode for SpecNode {
    fn child_list(&self, key: &str) -> Option<&[Self]> {
        (key == "items").then_some(self.items.as_slice())
    }

    fn field(&self, key: &str) -> Option<Cow<'_, Value>> {
        SpecNode::field(self, key).map(Cow::Owned)
    }
}

/// A test applied to nodes during a search.
pub trait Predicate<N> {
    /// Returns true if `node` matches.
    fn test(&self, node: &N) -> bool;
}

impl<N, F> Predicate<N> for F
where
    F: Fn(&N) -> bool,
{
    fn test(&self, node: &N) -> bool {
        self(node)
    }
}

/// A structural "matches" query: a node matches when, for every key of the
/// query, it has that field with an equal value.  Other fields are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    fields: Map<String, Value>,
}

impl Query {
    /// Creates a query from a map of required field values.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Matches nodes with the given id.
    pub fn id(id: &str) -> Self {
        Self::default().and("id", Value::String(id.to_string()))
    }

    /// Adds a required field value and returns the query.
    pub fn and(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }
}

impl<N: TreeNode> Predicate<N> for Query {
    fn test(&self, node: &N) -> bool {
        self.fields
            .iter()
            .all(|(key, expected)| node.field(key).is_some_and(|actual| *actual == *expected))
    }
}

/// Search and traversal over trees whose children live under configurable
/// keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSearch {
    child_keys: Vec<String>,
}

impl Default for TreeSearch {
    fn default() -> Self {
        Self::new(["children", "items"])
    }
}

impl TreeSearch {
    /// Creates a search trying `child_keys` in order.
    pub fn new<I, S>(child_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            child_keys: child_keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a search using a single child key.
    pub fn with_key(key: &str) -> Self {
        Self::new([key])
    }

    /// The configured child keys, in lookup order.
    pub fn child_keys(&self) -> &[String] {
        &self.child_keys
    }

    fn child_list<'a, N: TreeNode>(&self, node: &'a N) -> Option<&'a [N]> {
        self.child_keys
            .iter()
            .filter_map(|key| node.child_list(key))
            .find(|children| !children.is_empty())
    }

    /// Returns true iff the node has a non-empty child sequence under a
    /// configured key.
    pub fn has_children<N: TreeNode>(&self, node: &N) -> bool {
        self.child_list(node).is_some()
    }

    /// Returns the first node matching `predicate`, or `None`.
    ///
    /// This is the last element of [`TreeSearch::parents`].
    pub fn find<'a, N, P>(&self, tree: &'a N, predicate: &P) -> Option<&'a N>
    where
        N: TreeNode,
        P: Predicate<N> + ?Sized,
    {
        self.parents(tree, predicate).pop()
    }

    /// Returns the ancestor chain of the first node matching `predicate`, root
    /// first and the match last, or an empty vector.
    ///
    /// Each level tests its immediate nodes before descending, and descends
    /// into branches in order; the first branch containing a match ends the
    /// search.
    pub fn parents<'a, N, P>(&self, tree: &'a N, predicate: &P) -> Vec<&'a N>
    where
        N: TreeNode,
        P: Predicate<N> + ?Sized,
    {
        match self.parents_in(tree.as_roots(), predicate) {
            Some(mut chain) => {
                chain.reverse();
                chain
            }
            None => Vec::new(),
        }
    }

    // Builds the chain leaf first.
    fn parents_in<'a, N, P>(&self, list: &'a [N], predicate: &P) -> Option<Vec<&'a N>>
    where
        N: TreeNode,
        P: Predicate<N> + ?Sized,
    {
        if let Some(hit) = list.iter().find(|node| predicate.test(node)) {
            return Some(vec![hit]);
        }
        for branch in list {
            let Some(children) = self.child_list(branch) else {
                continue;
            };
            if let Some(mut chain) = self.parents_in(children, predicate) {
                chain.push(branch);
                return Some(chain);
            }
        }
        None
    }

    /// Lists every node in depth-first pre-order, roots included.
    pub fn flatten<'a, N: TreeNode>(&self, tree: &'a N) -> Vec<&'a N> {
        let mut out = Vec::new();
        self.flatten_into(tree.as_roots(), &mut out);
        out
    }

    fn flatten_into<'a, N: TreeNode>(&self, list: &'a [N], out: &mut Vec<&'a N>) {
        for node in list {
            out.push(node);
            if let Some(children) = self.child_list(node) {
                self.flatten_into(children, out);
            }
        }
    }

    /// Lists descendants in pre-order.
    ///
    /// With a predicate, the first matching node is located and its
    /// descendants (excluding itself) are returned; a miss yields an empty
    /// vector.  Without one, every node of the tree is returned.
    pub fn children<'a, N: TreeNode>(
        &self,
        tree: &'a N,
        predicate: Option<&dyn Predicate<N>>,
    ) -> Vec<&'a N> {
        let Some(predicate) = predicate else {
            return self.flatten(tree);
        };
        let mut out = Vec::new();
        if let Some(children) = self.find(tree, predicate).and_then(|n| self.child_list(n)) {
            self.flatten_into(children, &mut out);
        }
        out
    }
}
