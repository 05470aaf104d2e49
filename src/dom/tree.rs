//! Tree operations: insert, remove, walk, text content.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The element tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
/// Child order is document order.
#[derive(Debug)]
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: Option<NodeId>,
}

impl Dom {
    /// Create an empty DOM.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
        }
    }

    /// Insert a parentless node. The first one inserted becomes the root.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert a node as the last child of `parent`.
    ///
    /// If `parent` no longer exists the node is inserted parentless.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
            self.parent.insert(id, parent);
        }
        id
    }

    /// Remove a node and all its descendants.
    ///
    /// Returns the `NodeData` for the removed node, or `None` if it didn't exist.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
        }

        if self.root == Some(id) {
            self.root = None;
        }

        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_data = None;

        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            let data = self.nodes.remove(current);
            if current == id {
                removed_root_data = data;
            }
        }

        removed_root_data
    }

    /// Remove every child of `id` (and their subtrees).
    pub fn clear_children(&mut self, id: NodeId) {
        let kids = self.children(id).to_vec();
        for child in kids {
            self.remove(child);
        }
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no
    /// children or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the root, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.contains(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's data.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// The current root node, if set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes in the DOM.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the DOM is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the DOM contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start` (inclusive).
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut all = self.walk_depth_first(id);
        if !all.is_empty() {
            all.remove(0);
        }
        all
    }

    /// Every node reachable from the root, in document order.
    pub fn document_order(&self) -> Vec<NodeId> {
        self.root
            .map(|root| self.walk_depth_first(root))
            .unwrap_or_default()
    }

    /// Whether neither the node nor any ancestor is hidden.
    pub fn is_rendered(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            match self.get(node) {
                Some(data) if data.is_hidden() => return false,
                Some(_) => current = self.parent(node),
                None => return false,
            }
        }
        true
    }

    /// Concatenated text of all descendant text nodes, trimmed.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.walk_depth_first(id) {
            if let Some(text) = self.get(node).and_then(|d| d.text.as_deref()) {
                out.push_str(text);
            }
        }
        out.trim().to_owned()
    }

    /// Replace the children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if !self.contains(id) {
            return;
        }
        self.clear_children(id);
        self.insert_child(id, NodeData::text(text));
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a small test tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new("body").with_id("root"));
        let a = dom.insert_child(root, NodeData::new("nav").with_id("a"));
        let b = dom.insert_child(root, NodeData::new("main").with_id("b"));
        let c = dom.insert_child(a, NodeData::new("button").with_id("c"));
        let d = dom.insert_child(a, NodeData::new("span").with_id("d"));
        (dom, root, a, b, c, d)
    }

    #[test]
    fn insert_sets_root_once() {
        let mut dom = Dom::new();
        let first = dom.insert(NodeData::new("body"));
        let _second = dom.insert(NodeData::new("template"));
        assert_eq!(dom.root(), Some(first));
    }

    #[test]
    fn parent_child_relationships() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.parent(a), Some(root));
        assert_eq!(dom.parent(c), Some(a));
        assert_eq!(dom.parent(root), None);
        assert_eq!(dom.children(root), &[a, b]);
        assert_eq!(dom.children(a), &[c, d]);
    }

    #[test]
    fn insert_child_of_removed_parent_is_detached() {
        let (mut dom, _root, a, ..) = build_tree();
        dom.remove(a);
        let orphan = dom.insert_child(a, NodeData::new("span"));
        assert!(dom.contains(orphan));
        assert_eq!(dom.parent(orphan), None);
    }

    #[test]
    fn ancestors_and_inclusive_ancestor() {
        let (dom, root, a, b, c, _d) = build_tree();
        assert_eq!(dom.ancestors(c), vec![a, root]);
        assert!(dom.is_inclusive_ancestor(a, c));
        assert!(dom.is_inclusive_ancestor(c, c));
        assert!(!dom.is_inclusive_ancestor(b, c));
    }

    #[test]
    fn remove_subtree() {
        let (mut dom, root, a, b, c, d) = build_tree();
        dom.remove(a);
        assert!(!dom.contains(a));
        assert!(!dom.contains(c));
        assert!(!dom.contains(d));
        assert_eq!(dom.children(root), &[b]);
        assert_eq!(dom.len(), 2);
        assert!(dom.remove(a).is_none());
    }

    #[test]
    fn remove_root_clears_root() {
        let (mut dom, root, ..) = build_tree();
        dom.remove(root);
        assert!(dom.is_empty());
        assert_eq!(dom.root(), None);
    }

    #[test]
    fn walk_orders() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.walk_depth_first(root), vec![root, a, c, d, b]);
        assert_eq!(dom.descendants(a), vec![c, d]);
        assert_eq!(dom.document_order(), vec![root, a, c, d, b]);
    }

    #[test]
    fn is_rendered_checks_ancestors() {
        let (mut dom, _root, a, b, c, _d) = build_tree();
        assert!(dom.is_rendered(c));
        dom.get_mut(a).unwrap().set_hidden(true);
        assert!(!dom.is_rendered(c));
        assert!(dom.is_rendered(b));
    }

    #[test]
    fn text_content_and_set_text() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new("div"));
        let span = dom.insert_child(root, NodeData::new("span"));
        dom.insert_child(span, NodeData::text("  Intro to "));
        dom.insert_child(root, NodeData::text("Rust "));
        assert_eq!(dom.text_content(root), "Intro to Rust");

        dom.set_text(root, "Team");
        assert_eq!(dom.text_content(root), "Team");
        assert!(!dom.contains(span));
        assert_eq!(dom.children(root).len(), 1);
    }
}
