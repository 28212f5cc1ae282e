//! # Spec Tree Editing
//!
//! [`SpecTree`] holds a spec in an arena of slots addressed by [`NodeKey`],
//! each slot knowing its parent and its ordered children.  Editors use it to
//! insert, move, remove and reconfigure nodes without re-walking the whole
//! tree for every parent lookup.
//!
//! Ids resolve to the node a [`TreeSearch`](crate::TreeSearch) over the
//! plain spec finds first: each level's siblings are tested before any of
//! them is descended into.  Loaded trees may contain duplicate ids;
//! [`SpecTree::insert`] and [`SpecTree::update_config`] refuse to add more.
//!
//! ```rust
//! use macgyver::{SpecNode, SpecTree};
//!
//! let mut tree = SpecTree::from_spec(
//!     SpecNode::new("form", "mgForm").with_item(SpecNode::new("name", "mgText")),
//! );
//! tree.insert("form", 0, SpecNode::new("title", "mgHeading")).unwrap();
//! let removed = tree.remove("name").unwrap();
//!
//! assert_eq!(removed.id, "name");
//! assert_eq!(tree.to_spec().items[0].id, "title");
//! ```

use std::collections::HashSet;

use serde_json::Value;

use crate::errors::TreeError;
use crate::path::AncestorChain;
use crate::registry::WidgetRegistry;
use crate::spec_node::SpecNode;

/// Handle to a node stored in a [`SpecTree`].
///
/// Keys stay valid until their node is removed and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(usize);

#[derive(Debug, Clone)]
struct Slot {
    // items always empty; children live in `children`
    node: SpecNode,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

/// An editable spec tree.
#[derive(Debug, Clone)]
pub struct SpecTree {
    slots: Vec<Option<Slot>>,
    root: NodeKey,
}

impl SpecTree {
    /// Takes ownership of a spec and indexes every node.
    pub fn from_spec(spec: SpecNode) -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            root: NodeKey(0),
        };
        tree.root = tree.alloc(spec, None);
        tree
    }

    /// Rebuilds the nested spec.
    pub fn to_spec(&self) -> SpecNode {
        self.subtree(self.root).unwrap_or_else(|| SpecNode::new("", ""))
    }

    /// Key of the root node.
    pub fn root(&self) -> NodeKey {
        self.root
    }

    fn alloc(&mut self, mut spec: SpecNode, parent: Option<NodeKey>) -> NodeKey {
        let key = NodeKey(self.slots.len());
        let items = std::mem::take(&mut spec.items);
        self.slots.push(Some(Slot {
            node: spec,
            parent,
            children: Vec::with_capacity(items.len()),
        }));
        for item in items {
            let child = self.alloc(item, Some(key));
            if let Some(slot) = self.slot_mut(key) {
                slot.children.push(child);
            }
        }
        key
    }

    fn slot(&self, key: NodeKey) -> Option<&Slot> {
        self.slots.get(key.0).and_then(|s| s.as_ref())
    }

    fn slot_mut(&mut self, key: NodeKey) -> Option<&mut Slot> {
        self.slots.get_mut(key.0).and_then(|s| s.as_mut())
    }

    fn subtree(&self, key: NodeKey) -> Option<SpecNode> {
        let slot = self.slot(key)?;
        let mut node = slot.node.clone();
        node.items = slot
            .children
            .iter()
            .filter_map(|child| self.subtree(*child))
            .collect();
        Some(node)
    }

    /// Key of the node with the given id, testing siblings before
    /// descending.
    pub fn key_of(&self, id: &str) -> Option<NodeKey> {
        self.key_in(std::slice::from_ref(&self.root), id)
    }

    fn key_in(&self, list: &[NodeKey], id: &str) -> Option<NodeKey> {
        if let Some(hit) = list
            .iter()
            .find(|key| self.node(**key).is_some_and(|n| n.id == id))
        {
            return Some(*hit);
        }
        list.iter()
            .find_map(|key| self.key_in(self.children(*key), id))
    }

    /// The node's own fields.  Its `items` are always empty; use
    /// [`SpecTree::children`] to walk down.
    pub fn node(&self, key: NodeKey) -> Option<&SpecNode> {
        self.slot(key).map(|s| &s.node)
    }

    /// Looks a node up by id.
    pub fn node_by_id(&self, id: &str) -> Option<&SpecNode> {
        self.key_of(id).and_then(|key| self.node(key))
    }

    /// The node and its descendants as a nested spec.
    pub fn spec_of(&self, id: &str) -> Option<SpecNode> {
        self.key_of(id).and_then(|key| self.subtree(key))
    }

    /// Parent of a node; `None` for the root.
    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.slot(key).and_then(|s| s.parent)
    }

    /// Ordered children of a node.
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.slot(key).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    /// Returns true if the node has at least one child.
    pub fn has_children(&self, key: NodeKey) -> bool {
        !self.children(key).is_empty()
    }

    /// The chain from the root down to `key`, both included.
    pub fn ancestors(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut chain = Vec::new();
        let mut current = self.slot(key).map(|_| key);
        while let Some(k) = current {
            chain.push(k);
            current = self.parent(k);
        }
        chain.reverse();
        chain
    }

    /// Every node below `key` in pre-order, `key` excluded.
    pub fn descendants(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut all = self.preorder(key);
        if !all.is_empty() {
            all.remove(0);
        }
        all
    }

    /// Every node in pre-order, root first.
    pub fn flatten(&self) -> Vec<NodeKey> {
        self.preorder(self.root)
    }

    fn preorder(&self, start: NodeKey) -> Vec<NodeKey> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(key) = stack.pop() {
            if let Some(slot) = self.slot(key) {
                order.push(key);
                stack.extend(slot.children.iter().rev());
            }
        }
        order
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// A tree always holds its root.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-empty ids carried by more than one node, in pre-order of their
    /// second occurrence.
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for key in self.flatten() {
            let Some(node) = self.node(key) else { continue };
            if node.id.is_empty() {
                continue;
            }
            if !seen.insert(node.id.as_str()) && !duplicates.contains(&node.id) {
                duplicates.push(node.id.clone());
            }
        }
        duplicates
    }

    /// Inserts `node` (and its items) as a child of `parent_id`.
    ///
    /// An `index` past the end appends.  Fails if the parent is missing or
    /// any non-empty id in `node` is already used.
    pub fn insert(&mut self, parent_id: &str, index: usize, node: SpecNode) -> Result<NodeKey, TreeError> {
        let parent = self
            .key_of(parent_id)
            .ok_or_else(|| TreeError::ParentNotFound(parent_id.to_string()))?;
        let mut ids: HashSet<String> = self
            .flatten()
            .into_iter()
            .filter_map(|k| self.node(k).map(|n| n.id.clone()))
            .collect();
        let mut pending = vec![&node];
        while let Some(next) = pending.pop() {
            if !next.id.is_empty() && !ids.insert(next.id.clone()) {
                return Err(TreeError::DuplicateId(next.id.clone()));
            }
            pending.extend(next.items.iter());
        }
        let key = self.alloc(node, Some(parent));
        self.attach(parent, index, key);
        Ok(key)
    }

    fn attach(&mut self, parent: NodeKey, index: usize, key: NodeKey) {
        if let Some(slot) = self.slot_mut(parent) {
            let index = index.min(slot.children.len());
            slot.children.insert(index, key);
        }
        if let Some(slot) = self.slot_mut(key) {
            slot.parent = Some(parent);
        }
    }

    fn detach(&mut self, key: NodeKey) -> Result<NodeKey, TreeError> {
        let id = self.node(key).map(|n| n.id.clone()).unwrap_or_default();
        let parent = self.parent(key).ok_or(TreeError::ParentNotFound(id.clone()))?;
        let slot = self
            .slot_mut(parent)
            .ok_or_else(|| TreeError::ParentNotFound(id.clone()))?;
        let position = slot
            .children
            .iter()
            .position(|c| *c == key)
            .ok_or(TreeError::ParentNotFound(id))?;
        slot.children.remove(position);
        Ok(parent)
    }

    /// Creates a node of type `widget` under `parent_id`.
    ///
    /// The node receives a fresh id of the form `<widget><n>`, the defaults
    /// of the widget's config schema, and the defaults the parent's widget
    /// injects into its children.
    pub fn add_widget(
        &mut self,
        registry: &WidgetRegistry,
        parent_id: &str,
        widget: &str,
        index: usize,
    ) -> Result<NodeKey, TreeError> {
        let descriptor = registry
            .lookup(widget)
            .ok_or_else(|| TreeError::UnknownWidget(widget.to_string()))?;
        let parent = self
            .node_by_id(parent_id)
            .ok_or_else(|| TreeError::ParentNotFound(parent_id.to_string()))?;
        let inherited = registry
            .lookup(&parent.widget)
            .map(|p| p.config_children.clone())
            .unwrap_or_default();

        let mut node = SpecNode::new(self.fresh_id(widget), widget);
        for (key, field) in descriptor.config.iter().chain(inherited.iter()) {
            if let Some(default) = &field.default {
                node.config.insert(key.clone(), default.clone());
            }
        }
        tracing::debug!(id = %node.id, parent = parent_id, "adding widget");
        self.insert(parent_id, index, node)
    }

    fn fresh_id(&self, widget: &str) -> String {
        let used: HashSet<&str> = self
            .slots
            .iter()
            .flatten()
            .map(|s| s.node.id.as_str())
            .collect();
        (1..)
            .map(|n| format!("{}{}", widget, n))
            .find(|id| !used.contains(id.as_str()))
            .unwrap_or_else(|| widget.to_string())
    }

    /// Moves a node under `new_parent_id` at `index`, counted after the node
    /// left its old position.
    pub fn move_node(&mut self, id: &str, new_parent_id: &str, index: usize) -> Result<(), TreeError> {
        let key = self
            .key_of(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;
        if key == self.root {
            return Err(TreeError::RootImmutable);
        }
        let target = self
            .key_of(new_parent_id)
            .ok_or_else(|| TreeError::ParentNotFound(new_parent_id.to_string()))?;
        if self.ancestors(target).contains(&key) {
            return Err(TreeError::Cycle {
                node: id.to_string(),
                target: new_parent_id.to_string(),
            });
        }
        self.detach(key)?;
        self.attach(target, index, key);
        Ok(())
    }

    /// Removes a node and its subtree, returning them as a nested spec.
    ///
    /// Exactly one entry leaves the parent's child list; siblings keep their
    /// order.
    pub fn remove(&mut self, id: &str) -> Result<SpecNode, TreeError> {
        let key = self
            .key_of(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;
        if key == self.root {
            return Err(TreeError::RootImmutable);
        }
        let removed = self
            .subtree(key)
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;
        self.detach(key)?;
        for k in self.preorder(key) {
            if let Some(slot) = self.slots.get_mut(k.0) {
                *slot = None;
            }
        }
        Ok(removed)
    }

    /// Sets a field or config key on a node, returning the previous value.
    ///
    /// `id`, `type`, `ignoreScope`, `mgPath` and `default` edit the node's own
    /// fields; a null `mgPath` or `default` clears it.  A new `id` must not be
    /// in use elsewhere.  `items` cannot be set this way.  Any other key lands
    /// in the widget config.
    pub fn update_config(&mut self, id: &str, key: &str, value: Value) -> Result<Option<Value>, TreeError> {
        let node_key = self
            .key_of(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;
        if key == "id" {
            let new_id = value.as_str().ok_or_else(|| invalid(key, "expected a string"))?;
            if new_id != id && !new_id.is_empty() && self.key_of(new_id).is_some() {
                return Err(TreeError::DuplicateId(new_id.to_string()));
            }
        }
        let slot = self
            .slot_mut(node_key)
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;
        let node = &mut slot.node;
        let previous = node.field(key);
        match key {
            "id" => node.id = value.as_str().unwrap_or_default().to_string(),
            "type" => {
                node.widget = value
                    .as_str()
                    .ok_or_else(|| invalid(key, "expected a string"))?
                    .to_string();
            }
            "ignoreScope" => {
                node.ignore_scope = value.as_bool().ok_or_else(|| invalid(key, "expected a boolean"))?;
            }
            "mgPath" if value.is_null() => node.mg_path = None,
            "mgPath" => {
                let path = serde_json::from_value(value)
                    .map_err(|_| invalid(key, "expected a string or a list of strings"))?;
                node.mg_path = Some(path);
            }
            "default" if value.is_null() => node.default = None,
            "default" => node.default = Some(value),
            "items" => return Err(invalid(key, "children are edited with insert, move_node and remove")),
            _ => return Ok(node.config.insert(key.to_string(), value)),
        }
        Ok(previous)
    }
}

fn invalid(key: &str, reason: &str) -> TreeError {
    TreeError::InvalidField {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// A tree locates `node` by identity when it is a reference into the tree,
/// and otherwise by id.  Anonymous nodes are only found by identity.
impl AncestorChain for SpecTree {
    fn ancestor_chain<'a>(&'a self, node: &SpecNode) -> Vec<&'a SpecNode> {
        let by_identity = self
            .flatten()
            .into_iter()
            .find(|k| self.node(*k).is_some_and(|n| std::ptr::eq(n, node)));
        let key = match by_identity {
            Some(key) => key,
            None if node.id.is_empty() => return Vec::new(),
            None => match self.key_of(&node.id) {
                Some(key) => key,
                None => return Vec::new(),
            },
        };
        self.ancestors(key)
            .into_iter()
            .filter_map(|k| self.node(k))
            .collect()
    }
}
