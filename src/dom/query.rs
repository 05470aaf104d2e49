//! DOM queries: by element id, by attribute, ancestor search.
//!
//! Every multi-result query returns nodes in document order, which the
//! controllers rely on for item navigation and "first trigger" defaults.

use super::node::{NodeData, NodeId};
use super::tree::Dom;

impl Dom {
    /// Find the first node in document order whose element id matches.
    pub fn query_by_id(&self, id: &str) -> Option<NodeId> {
        self.document_order()
            .into_iter()
            .find(|&node| self.get(node).and_then(|d| d.id.as_deref()) == Some(id))
    }

    /// All nodes carrying the attribute `name`, in document order.
    pub fn query_attr(&self, name: &str) -> Vec<NodeId> {
        self.query_all(|data| data.has_attr(name))
    }

    /// All nodes whose attribute `name` equals `value`, in document order.
    pub fn query_attr_eq(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.query_all(|data| data.attr(name) == Some(value))
    }

    /// First node whose attribute `name` equals `value`.
    pub fn find_attr_eq(&self, name: &str, value: &str) -> Option<NodeId> {
        self.document_order()
            .into_iter()
            .find(|&node| self.get(node).and_then(|d| d.attr(name)) == Some(value))
    }

    /// All nodes matching an arbitrary predicate, in document order.
    pub fn query_all(&self, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.document_order()
            .into_iter()
            .filter(|&node| self.get(node).is_some_and(&predicate))
            .collect()
    }

    /// Descendants of `root` (exclusive) matching a predicate, in document order.
    pub fn query_within(&self, root: NodeId, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&node| self.get(node).is_some_and(&predicate))
            .collect()
    }

    /// Nearest inclusive ancestor of `start` matching a predicate.
    pub fn closest(&self, start: NodeId, predicate: impl Fn(&NodeData) -> bool) -> Option<NodeId> {
        let mut current = Some(start);
        while let Some(node) = current {
            let data = self.get(node)?;
            if predicate(data) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Nearest inclusive ancestor carrying attribute `name`, with its value.
    pub fn closest_attr(&self, start: NodeId, name: &str) -> Option<(NodeId, String)> {
        let node = self.closest(start, |data| data.has_attr(name))?;
        let value = self.get(node)?.attr(name)?.to_owned();
        Some((node, value))
    }

    /// Read an attribute of a node, if both exist.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node)?.attr(name)
    }

    /// Set an attribute on a node. No-op for a missing node.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(data) = self.get_mut(node) {
            data.set_attr(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::node::NodeData;
    use crate::dom::tree::Dom;

    /// ```text
    ///  body
    ///  ├── div[data-select-root=plan]
    ///  │   ├── button#plan-trigger[data-select-trigger=plan]
    ///  │   └── div[data-select-content=plan]
    ///  │       ├── div[data-select-item][data-value=starter]
    ///  │       └── div[data-select-item][data-value=pro]
    ///  └── div[data-select-root=seats]
    /// ```
    fn build_query_tree() -> Dom {
        let mut dom = Dom::new();
        let body = dom.insert(NodeData::new("body"));
        let root = dom.insert_child(body, NodeData::new("div").with_attr("data-select-root", "plan"));
        dom.insert_child(
            root,
            NodeData::new("button")
                .with_id("plan-trigger")
                .with_attr("data-select-trigger", "plan"),
        );
        let content = dom.insert_child(root, NodeData::new("div").with_attr("data-select-content", "plan"));
        dom.insert_child(
            content,
            NodeData::new("div")
                .with_attr("data-select-item", "")
                .with_attr("data-value", "starter"),
        );
        dom.insert_child(
            content,
            NodeData::new("div")
                .with_attr("data-select-item", "")
                .with_attr("data-value", "pro"),
        );
        dom.insert_child(body, NodeData::new("div").with_attr("data-select-root", "seats"));
        dom
    }

    #[test]
    fn query_by_id_found_and_missing() {
        let dom = build_query_tree();
        let id = dom.query_by_id("plan-trigger").unwrap();
        assert_eq!(dom.get(id).unwrap().tag, "button");
        assert!(dom.query_by_id("nonexistent").is_none());
    }

    #[test]
    fn query_attr_document_order() {
        let dom = build_query_tree();
        let items = dom.query_attr("data-select-item");
        let values: Vec<_> = items.iter().map(|&n| dom.attr(n, "data-value").unwrap()).collect();
        assert_eq!(values, vec!["starter", "pro"]);
    }

    #[test]
    fn query_attr_eq_and_find() {
        let dom = build_query_tree();
        assert_eq!(dom.query_attr_eq("data-select-root", "seats").len(), 1);
        assert!(dom.find_attr_eq("data-select-root", "plan").is_some());
        assert!(dom.find_attr_eq("data-select-root", "nope").is_none());
    }

    #[test]
    fn query_within_excludes_root() {
        let dom = build_query_tree();
        let content = dom.find_attr_eq("data-select-content", "plan").unwrap();
        let found = dom.query_within(content, |d| d.has_attr("data-select-content") || d.has_attr("data-select-item"));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn closest_attr_walks_up() {
        let dom = build_query_tree();
        let pro = dom.find_attr_eq("data-value", "pro").unwrap();
        let (root, group) = dom.closest_attr(pro, "data-select-root").unwrap();
        assert_eq!(group, "plan");
        assert_eq!(dom.attr(root, "data-select-root"), Some("plan"));
        assert!(dom.closest_attr(pro, "data-tabs-root").is_none());
    }

    #[test]
    fn closest_is_inclusive() {
        let dom = build_query_tree();
        let pro = dom.find_attr_eq("data-value", "pro").unwrap();
        assert_eq!(dom.closest(pro, |d| d.has_attr("data-select-item")), Some(pro));
    }

    #[test]
    fn queries_on_empty_dom() {
        let dom = Dom::new();
        assert!(dom.query_by_id("x").is_none());
        assert!(dom.query_attr("x").is_empty());
        assert!(dom.query_all(|_| true).is_empty());
    }
}
