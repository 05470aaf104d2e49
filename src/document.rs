//! Document: the element tree plus everything the host reads back.
//!
//! [`Document`] owns the DOM, the focused element, the viewport size, the
//! body scroll-lock flag, generated element ids and pending navigation
//! requests. Controllers mutate it; the host inspects it.

use tracing::{debug, trace};

use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::geometry::{Region, Size};

/// Attribute projected onto the document root while scroll is locked.
pub const SCROLL_LOCK_ATTR: &str = "data-scroll-locked";

/// A focus move recorded for the runtime to turn into focus events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    pub from: Option<NodeId>,
    pub to: Option<NodeId>,
}

/// The live document a runtime operates on.
#[derive(Debug)]
pub struct Document {
    /// The element tree.
    pub dom: Dom,
    focused: Option<NodeId>,
    hovered: Option<NodeId>,
    viewport: Size,
    scroll_locked: bool,
    next_generated_id: u64,
    navigations: Vec<String>,
    focus_changes: Vec<FocusChange>,
}

impl Document {
    /// Wrap a DOM with the given viewport size.
    pub fn new(dom: Dom, viewport: Size) -> Self {
        Self {
            dom,
            focused: None,
            hovered: None,
            viewport,
            scroll_locked: false,
            next_generated_id: 0,
            navigations: Vec::new(),
            focus_changes: Vec::new(),
        }
    }

    // ── Focus ────────────────────────────────────────────────────────

    /// The focused element, if it still exists.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused.filter(|&id| self.dom.contains(id))
    }

    /// Element id of the focused element.
    pub fn focused_id(&self) -> Option<&str> {
        self.focused().and_then(|id| self.dom.get(id)?.id.as_deref())
    }

    /// Move focus to `node`. Returns `false` if the node does not exist.
    ///
    /// Programmatic focus accepts any element; only the tab order is
    /// restricted to tabbable elements.
    pub fn focus(&mut self, node: NodeId) -> bool {
        if !self.dom.contains(node) {
            trace!("focus target no longer exists");
            return false;
        }
        let from = self.focused();
        if from != Some(node) {
            self.focused = Some(node);
            self.focus_changes.push(FocusChange { from, to: Some(node) });
        }
        true
    }

    /// Clear focus.
    pub fn blur(&mut self) {
        if let Some(from) = self.focused() {
            self.focus_changes.push(FocusChange { from: Some(from), to: None });
        }
        self.focused = None;
    }

    /// Drain focus moves recorded since the last call.
    pub fn take_focus_changes(&mut self) -> Vec<FocusChange> {
        std::mem::take(&mut self.focus_changes)
    }

    // ── Hover ────────────────────────────────────────────────────────

    /// The element under the pointer.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered.filter(|&id| self.dom.contains(id))
    }

    /// Record the element under the pointer.
    pub fn set_hovered(&mut self, node: Option<NodeId>) {
        self.hovered = node;
    }

    // ── Ids ──────────────────────────────────────────────────────────

    /// Look up an element by its element id.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.dom.query_by_id(id)
    }

    /// Return the element id of `node`, generating `<prefix>-<n>` if it has none.
    pub fn ensure_id(&mut self, node: NodeId, prefix: &str) -> Option<String> {
        if let Some(existing) = self.dom.get(node)?.id.clone() {
            return Some(existing);
        }
        let id = loop {
            self.next_generated_id += 1;
            let candidate = format!("{prefix}-{}", self.next_generated_id);
            if self.dom.query_by_id(&candidate).is_none() {
                break candidate;
            }
        };
        self.dom.get_mut(node)?.id = Some(id.clone());
        debug!(id = %id, "generated element id");
        Some(id)
    }

    // ── Viewport ─────────────────────────────────────────────────────

    /// The viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Update the viewport size.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.viewport = Size::new(width, height);
    }

    /// Set the layout rectangle of a node.
    pub fn set_rect(&mut self, node: NodeId, rect: Region) {
        if let Some(data) = self.dom.get_mut(node) {
            data.rect = rect;
        }
    }

    /// Deepest rendered element whose rectangle contains `(x, y)`.
    ///
    /// Later elements in document order paint over earlier ones, so the last
    /// match wins.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<NodeId> {
        self.dom
            .document_order()
            .into_iter()
            .filter(|&id| {
                self.dom
                    .get(id)
                    .is_some_and(|d| !d.is_text() && !d.rect.is_empty() && d.rect.contains(x, y))
            })
            .filter(|&id| self.dom.is_rendered(id))
            .last()
    }

    // ── Scroll lock ──────────────────────────────────────────────────

    /// Whether body scrolling is locked.
    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Lock body scrolling. Idempotent.
    pub fn lock_scroll(&mut self) {
        if !self.scroll_locked {
            debug!("scroll locked");
        }
        self.scroll_locked = true;
        if let Some(root) = self.dom.root() {
            self.dom.set_attr(root, SCROLL_LOCK_ATTR, "true");
        }
    }

    /// Release the body scroll lock.
    pub fn unlock_scroll(&mut self) {
        if self.scroll_locked {
            debug!("scroll unlocked");
        }
        self.scroll_locked = false;
        if let Some(root) = self.dom.root() {
            if let Some(data) = self.dom.get_mut(root) {
                data.remove_attr(SCROLL_LOCK_ATTR);
            }
        }
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Request navigation to `url`. The host performs it.
    pub fn navigate(&mut self, url: impl Into<String>) {
        let url = url.into();
        debug!(url = %url, "navigation requested");
        self.navigations.push(url);
    }

    /// Navigation requests not yet taken by the host.
    pub fn pending_navigations(&self) -> &[String] {
        &self.navigations
    }

    /// Take all pending navigation requests.
    pub fn take_navigations(&mut self) -> Vec<String> {
        std::mem::take(&mut self.navigations)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Dom::new(), Size::ZERO)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::NodeData;

    fn doc() -> (Document, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let body = dom.insert(NodeData::new("body").with_rect(Region::new(0, 0, 100, 50)));
        let card = dom.insert_child(body, NodeData::new("div").with_rect(Region::new(10, 10, 40, 20)));
        let button = dom.insert_child(
            card,
            NodeData::new("button")
                .focusable(true)
                .with_rect(Region::new(12, 12, 10, 3)),
        );
        (Document::new(dom, Size::new(100, 50)), body, card, button)
    }

    // ── Focus ────────────────────────────────────────────────────────

    #[test]
    fn focus_records_changes() {
        let (mut doc, _body, card, button) = doc();
        assert!(doc.focus(button));
        assert!(doc.focus(button));
        doc.focus(card);
        doc.blur();
        let changes = doc.take_focus_changes();
        assert_eq!(
            changes,
            vec![
                FocusChange { from: None, to: Some(button) },
                FocusChange { from: Some(button), to: Some(card) },
                FocusChange { from: Some(card), to: None },
            ]
        );
        assert!(doc.take_focus_changes().is_empty());
    }

    #[test]
    fn focus_removed_node_fails() {
        let (mut doc, _body, card, button) = doc();
        doc.focus(button);
        doc.dom.remove(card);
        assert!(doc.focused().is_none());
        assert!(!doc.focus(button));
    }

    // ── Ids ──────────────────────────────────────────────────────────

    #[test]
    fn ensure_id_generates_once() {
        let (mut doc, _body, _card, button) = doc();
        let id = doc.ensure_id(button, "dialog-trigger").unwrap();
        assert_eq!(id, "dialog-trigger-1");
        assert_eq!(doc.ensure_id(button, "dialog-trigger").as_deref(), Some("dialog-trigger-1"));
        assert_eq!(doc.element_by_id("dialog-trigger-1"), Some(button));
    }

    #[test]
    fn ensure_id_skips_taken_ids() {
        let (mut doc, _body, card, button) = doc();
        doc.dom.get_mut(card).unwrap().id = Some("popover-trigger-1".into());
        let id = doc.ensure_id(button, "popover-trigger").unwrap();
        assert_eq!(id, "popover-trigger-2");
    }

    // ── Hit testing ──────────────────────────────────────────────────

    #[test]
    fn hit_test_prefers_deepest() {
        let (doc, body, card, button) = doc();
        assert_eq!(doc.hit_test(13, 13), Some(button));
        assert_eq!(doc.hit_test(30, 25), Some(card));
        assert_eq!(doc.hit_test(90, 45), Some(body));
        assert_eq!(doc.hit_test(500, 500), None);
    }

    #[test]
    fn hit_test_skips_hidden() {
        let (mut doc, _body, card, _button) = doc();
        doc.dom.get_mut(card).unwrap().set_hidden(true);
        assert_ne!(doc.hit_test(13, 13), Some(card));
    }

    // ── Scroll lock / navigation ─────────────────────────────────────

    #[test]
    fn scroll_lock_projects_onto_root() {
        let (mut doc, body, ..) = doc();
        doc.lock_scroll();
        doc.lock_scroll();
        assert!(doc.is_scroll_locked());
        assert_eq!(doc.dom.attr(body, SCROLL_LOCK_ATTR), Some("true"));
        doc.unlock_scroll();
        assert!(!doc.is_scroll_locked());
        assert_eq!(doc.dom.attr(body, SCROLL_LOCK_ATTR), None);
    }

    #[test]
    fn navigations_are_taken_once() {
        let (mut doc, ..) = doc();
        doc.navigate("/courses/new");
        assert_eq!(doc.pending_navigations(), ["/courses/new".to_owned()]);
        assert_eq!(doc.take_navigations(), vec!["/courses/new".to_owned()]);
        assert!(doc.pending_navigations().is_empty());
    }

    #[test]
    fn resize_updates_viewport() {
        let mut doc = Document::default();
        doc.resize(120, 40);
        assert_eq!(doc.viewport(), Size::new(120, 40));
    }
}
