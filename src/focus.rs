//! Tab order within a scope.
//!
//! [`FocusChain`] maintains the tab order of the tabbable elements under a
//! scope (the whole document, or a modal's content panel for the focus trap).
//! Focus cycles through the chain forwards (Tab) or backwards (Shift+Tab).

use crate::dom::node::NodeId;
use crate::dom::tree::Dom;

/// Whether a node takes part in sequential (Tab) navigation: focusable,
/// not disabled, rendered, and not opted out with a negative `tabindex`.
pub fn is_tabbable(dom: &Dom, node: NodeId) -> bool {
    let Some(data) = dom.get(node) else {
        return false;
    };
    if !data.focusable || data.disabled {
        return false;
    }
    let negative_tabindex = data
        .attr("tabindex")
        .and_then(|v| v.trim().parse::<i32>().ok())
        .is_some_and(|v| v < 0);
    !negative_tabindex && dom.is_rendered(node)
}

/// An ordered list of tabbable nodes for tab navigation.
///
/// The chain is a snapshot: build it, move once, discard. Focus cycles
/// through the chain and wraps at both ends.
#[derive(Debug, Default)]
pub struct FocusChain {
    /// Tabbable nodes in tab order (depth-first).
    nodes: Vec<NodeId>,
    /// Index of the currently focused node, or `None` if focus is outside.
    current: Option<usize>,
}

impl FocusChain {
    /// Create a new, empty focus chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the chain from the tabbable descendants of `scope`.
    ///
    /// `focused` positions the cursor if it is part of the chain.
    pub fn within(dom: &Dom, scope: NodeId, focused: Option<NodeId>) -> Self {
        let nodes: Vec<NodeId> = dom
            .descendants(scope)
            .into_iter()
            .filter(|&n| is_tabbable(dom, n))
            .collect();
        let current = focused.and_then(|f| nodes.iter().position(|&n| n == f));
        Self { nodes, current }
    }

    /// Build the chain for the whole document.
    pub fn document(dom: &Dom, focused: Option<NodeId>) -> Self {
        match dom.root() {
            Some(root) => {
                let mut chain = Self::within(dom, root, focused);
                if is_tabbable(dom, root) {
                    chain.nodes.insert(0, root);
                    chain.current = focused.and_then(|f| chain.nodes.iter().position(|&n| n == f));
                }
                chain
            }
            None => Self::new(),
        }
    }

    /// The node the cursor is on, if any.
    pub fn current_node(&self) -> Option<NodeId> {
        self.current.and_then(|idx| self.nodes.get(idx).copied())
    }

    /// The first node of the chain.
    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Move to the next node. Wraps around.
    ///
    /// Returns the newly focused node, or `None` if the chain is empty.
    pub fn focus_next(&mut self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            return None;
        }
        let next = match self.current {
            Some(idx) => (idx + 1) % self.nodes.len(),
            None => 0,
        };
        self.current = Some(next);
        self.nodes.get(next).copied()
    }

    /// Move to the previous node. Wraps around.
    ///
    /// Returns the newly focused node, or `None` if the chain is empty.
    pub fn focus_previous(&mut self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            return None;
        }
        let prev = match self.current {
            Some(0) | None => self.nodes.len() - 1,
            Some(idx) => idx - 1,
        };
        self.current = Some(prev);
        self.nodes.get(prev).copied()
    }

    /// Number of nodes in the chain.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
