//! Node types: NodeId, NodeData.

use slotmap::new_key_type;

use crate::geometry::Region;

new_key_type! {
    /// Unique identifier for a DOM node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Tag name used for text nodes.
pub const TEXT_TAG: &str = "#text";

/// Tag name of the synthetic document root created by the markup loader.
pub const DOCUMENT_TAG: &str = "#document";

/// Class toggled by controllers to show/hide elements.
pub const HIDDEN_CLASS: &str = "hidden";

/// Data associated with a single DOM node.
///
/// `id` and `class` are kept out of the generic attribute list so lookups by
/// element id and class membership stay cheap; [`NodeData::attr`] and
/// [`NodeData::set_attr`] still accept them by name.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// Lower-case tag name (`"button"`, `"div"`), or [`TEXT_TAG`].
    pub tag: String,
    /// Optional unique element id.
    pub id: Option<String>,
    /// Class list, in source order.
    pub classes: Vec<String>,
    /// Remaining attributes, in source order.
    attributes: Vec<(String, String)>,
    /// Text content for text nodes.
    pub text: Option<String>,
    /// Whether this node participates in the tab order.
    pub focusable: bool,
    /// Whether this node is natively disabled.
    pub disabled: bool,
    /// Layout rectangle supplied by the host.
    pub rect: Region,
}

impl NodeData {
    /// Create a new element with the given tag and sensible defaults.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            attributes: Vec::new(),
            text: None,
            focusable: false,
            disabled: false,
            rect: Region::EMPTY,
        }
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        let mut data = Self::new(TEXT_TAG);
        data.text = Some(content.into());
        data
    }

    /// Set the element id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a single class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Set an attribute (builder).
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set whether this node can receive focus (builder).
    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    /// Set whether this node is disabled (builder).
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the layout rectangle (builder).
    pub fn with_rect(mut self, rect: Region) -> Self {
        self.rect = rect;
        self
    }

    /// Whether this is a text node.
    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    /// Check whether this node has a given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a class. No-op if already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Remove a class. No-op if not present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Read an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        match name {
            "id" => self.id.as_deref(),
            _ => self
                .attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
        }
    }

    /// Whether an attribute is present (any value, including empty).
    pub fn has_attr(&self, name: &str) -> bool {
        match name {
            "id" => self.id.is_some(),
            "class" => !self.classes.is_empty(),
            _ => self.attributes.iter().any(|(n, _)| n == name),
        }
    }

    /// Set an attribute, replacing any previous value in place.
    ///
    /// `id` updates [`NodeData::id`]; `class` replaces the class list.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match name {
            "id" => self.id = Some(value),
            "class" => {
                self.classes.clear();
                for class in value.split_whitespace() {
                    self.add_class(class);
                }
            }
            _ => {
                if let Some(slot) = self.attributes.iter_mut().find(|(n, _)| n == name) {
                    slot.1 = value;
                } else {
                    self.attributes.push((name.to_owned(), value));
                }
            }
        }
    }

    /// Remove an attribute, returning its old value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.take(),
            _ => {
                let pos = self.attributes.iter().position(|(n, _)| n == name)?;
                Some(self.attributes.remove(pos).1)
            }
        }
    }

    /// Iterate over generic attributes (excluding `id` and `class`).
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Whether this node is hidden by class or the `hidden` attribute.
    pub fn is_hidden(&self) -> bool {
        self.has_class(HIDDEN_CLASS) || self.has_attr("hidden")
    }

    /// Show or hide this node via the [`HIDDEN_CLASS`] class.
    pub fn set_hidden(&mut self, hidden: bool) {
        if hidden {
            self.add_class(HIDDEN_CLASS);
        } else {
            self.remove_class(HIDDEN_CLASS);
            self.remove_attr("hidden");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults() {
        let data = NodeData::new("button");
        assert_eq!(data.tag, "button");
        assert!(data.id.is_none());
        assert!(data.classes.is_empty());
        assert!(!data.focusable);
        assert!(!data.disabled);
        assert!(!data.is_hidden());
        assert_eq!(data.rect, Region::EMPTY);
    }

    #[test]
    fn text_node() {
        let data = NodeData::text("Starter");
        assert!(data.is_text());
        assert_eq!(data.text.as_deref(), Some("Starter"));
    }

    #[test]
    fn builder_with_class_dedup() {
        let data = NodeData::new("div").with_class("card").with_class("card");
        assert_eq!(data.classes, vec!["card"]);
    }

    #[test]
    fn set_attr_replaces_in_place() {
        let mut data = NodeData::new("div")
            .with_attr("data-state", "closed")
            .with_attr("data-side", "top");
        data.set_attr("data-state", "open");
        let attrs: Vec<_> = data.attributes().collect();
        assert_eq!(attrs, vec![("data-state", "open"), ("data-side", "top")]);
    }

    #[test]
    fn id_and_class_are_routed_to_fields() {
        let mut data = NodeData::new("div");
        data.set_attr("id", "enroll");
        data.set_attr("class", "btn  btn-primary btn");
        assert_eq!(data.attr("id"), Some("enroll"));
        assert_eq!(data.classes, vec!["btn", "btn-primary"]);
        assert_eq!(data.attributes().count(), 0);
        assert!(data.has_attr("class"));
    }

    #[test]
    fn remove_attr_returns_old_value() {
        let mut data = NodeData::new("div").with_attr("data-return-focus", "t1");
        assert_eq!(data.remove_attr("data-return-focus").as_deref(), Some("t1"));
        assert!(data.remove_attr("data-return-focus").is_none());
        assert!(!data.has_attr("data-return-focus"));
    }

    #[test]
    fn empty_attribute_is_present() {
        let data = NodeData::new("div").with_attr("data-dropdown-item", "");
        assert!(data.has_attr("data-dropdown-item"));
        assert_eq!(data.attr("data-dropdown-item"), Some(""));
    }

    #[test]
    fn hidden_class_and_attribute() {
        let mut data = NodeData::new("div").with_attr("hidden", "");
        assert!(data.is_hidden());
        data.set_hidden(false);
        assert!(!data.is_hidden());
        data.set_hidden(true);
        assert!(data.has_class(HIDDEN_CLASS));
        assert!(data.is_hidden());
    }

    #[test]
    fn node_id_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<NodeId>();
    }
}
