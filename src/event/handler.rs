//! Event queue and bubble path computation.
//!
//! [`EventDispatcher`] holds events waiting to be dispatched. Listeners may
//! enqueue follow-up events (a keyboard activation becomes a click) which the
//! runtime drains after the current event finishes, so dispatch never
//! re-enters a listener. `bubble_path` computes the chain from a node up to
//! the root, used to derive pointer enter/leave pairs.

use std::collections::VecDeque;

use super::dom_event::DomEvent;
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;

// ---------------------------------------------------------------------------
// EventDispatcher
// ---------------------------------------------------------------------------

/// FIFO queue of pending document events.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    queue: VecDeque<DomEvent>,
}

impl EventDispatcher {
    /// Create a new, empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an event for dispatch.
    pub fn push(&mut self, event: DomEvent) {
        self.queue.push_back(event);
    }

    /// Take the next pending event.
    pub fn pop(&mut self) -> Option<DomEvent> {
        self.queue.pop_front()
    }

    /// Number of pending events.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Compute the bubble path from `start` up to the root (inclusive).
    ///
    /// Returns `[start, parent, grandparent, ..., root]`.
    /// If `start` does not exist in the DOM, returns an empty vec.
    pub fn bubble_path(dom: &Dom, start: NodeId) -> Vec<NodeId> {
        if !dom.contains(start) {
            return Vec::new();
        }
        let mut path = vec![start];
        path.extend(dom.ancestors(start));
        path
    }

    /// Elements left and entered when the pointer moves from `from` to `to`.
    ///
    /// Returns `(left, entered)`: `left` innermost first, `entered` outermost
    /// first, mirroring `mouseleave`/`mouseenter` ordering.
    pub fn hover_transition(
        dom: &Dom,
        from: Option<NodeId>,
        to: Option<NodeId>,
    ) -> (Vec<NodeId>, Vec<NodeId>) {
        let old_path = from.map(|n| Self::bubble_path(dom, n)).unwrap_or_default();
        let new_path = to.map(|n| Self::bubble_path(dom, n)).unwrap_or_default();
        let left = old_path
            .iter()
            .copied()
            .filter(|n| !new_path.contains(n))
            .collect();
        let mut entered: Vec<NodeId> = new_path
            .iter()
            .copied()
            .filter(|n| !old_path.contains(n))
            .collect();
        entered.reverse();
        (left, entered)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
