//! Dialog and AlertDialog.
//!
//! Both families share one controller and one open-order stack; the last
//! entry is the topmost modal, the only one Escape and the Tab trap act on.
//! Opening locks page scroll; the lock is released once no modal root in the
//! document is open. Focus returns to the element recorded in
//! `data-return-focus` when the modal closes.

use tracing::{debug, trace};

use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::event::dom_event::{DomEvent, EventKind};
use crate::event::input::Key;
use crate::focus::FocusChain;
use crate::widget::attrs::{node_disabled, project_visibility, role_attr, DATA_RETURN_FOCUS, DATA_STATE, STATE_CLOSED, STATE_OPEN};
use crate::widget::state::{DismissPolicy, OpenEvent, OpenState};
use crate::widget::traits::{Context, Controller};

// ---------------------------------------------------------------------------
// ModalFamily
// ---------------------------------------------------------------------------

/// Which modal kind a group belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalFamily {
    /// Dismissible by every gesture unless the root opts out.
    Dialog,
    /// Closes only through its close or action elements unless the root opts in.
    AlertDialog,
}

impl ModalFamily {
    pub const ALL: [ModalFamily; 2] = [ModalFamily::Dialog, ModalFamily::AlertDialog];

    /// Role segment of the attribute names.
    pub fn role(self) -> &'static str {
        match self {
            ModalFamily::Dialog => "dialog",
            ModalFamily::AlertDialog => "alert-dialog",
        }
    }

    pub fn default_policy(self) -> DismissPolicy {
        match self {
            ModalFamily::Dialog => DismissPolicy::ALWAYS,
            ModalFamily::AlertDialog => DismissPolicy::EXPLICIT_ONLY,
        }
    }

    fn attr(self, part: &str) -> String {
        role_attr(self.role(), part)
    }

    fn root(self, dom: &Dom, group: &str) -> Option<NodeId> {
        dom.find_attr_eq(&self.attr("root"), group)
    }

    fn content(self, dom: &Dom, group: &str) -> Option<NodeId> {
        dom.find_attr_eq(&self.attr("content"), group)
    }

    /// Dismissal policy declared on the root, over the family defaults.
    pub fn policy(self, dom: &Dom, root: NodeId) -> DismissPolicy {
        dom.get(root)
            .map(|data| DismissPolicy::from_node(data, self.default_policy()))
            .unwrap_or_else(|| self.default_policy())
    }
}

/// Whether any dialog or alert-dialog root in the document is open.
fn any_root_open(dom: &Dom) -> bool {
    ModalFamily::ALL.iter().any(|family| {
        dom.query_attr(&family.attr("root"))
            .into_iter()
            .any(|root| OpenState::from_attr(dom.attr(root, DATA_STATE)).is_open())
    })
}

// ---------------------------------------------------------------------------
// ModalController
// ---------------------------------------------------------------------------

/// Listener for `data-dialog-*` and `data-alert-dialog-*` markup.
#[derive(Debug, Default)]
pub struct ModalController {
    stack: Vec<(ModalFamily, String)>,
}

impl ModalController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `group`, returning focus to the currently focused element on close.
    pub fn open(&mut self, cx: &mut Context<'_>, family: ModalFamily, group: &str) -> bool {
        let opener = cx.doc.focused();
        self.apply(cx, family, group, OpenEvent::Open, opener)
    }

    pub fn close(&mut self, cx: &mut Context<'_>, family: ModalFamily, group: &str) -> bool {
        self.apply(cx, family, group, OpenEvent::Close, None)
    }

    pub fn is_open(&self, dom: &Dom, family: ModalFamily, group: &str) -> bool {
        family
            .root(dom, group)
            .is_some_and(|root| OpenState::from_attr(dom.attr(root, DATA_STATE)).is_open())
    }

    /// The most recently opened modal that is still open.
    pub fn topmost(&self) -> Option<(ModalFamily, &str)> {
        self.stack.last().map(|(family, group)| (*family, group.as_str()))
    }

    /// Number of open modals.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Drop stack entries whose root was closed behind our back.
    fn prune(&mut self, dom: &Dom) {
        self.stack
            .retain(|(family, group)| family.root(dom, group).is_some_and(|root| {
                OpenState::from_attr(dom.attr(root, DATA_STATE)).is_open()
            }));
    }

    fn apply(
        &mut self,
        cx: &mut Context<'_>,
        family: ModalFamily,
        group: &str,
        event: OpenEvent,
        opener: Option<NodeId>,
    ) -> bool {
        let dom = &cx.doc.dom;
        let (Some(root), Some(content)) = (family.root(dom, group), family.content(dom, group)) else {
            trace!(role = family.role(), group, "no root or content for group");
            return false;
        };
        let current = OpenState::from_attr(dom.attr(root, DATA_STATE));
        let next = current.transition(event, family.policy(dom, root));
        if next == current {
            trace!(role = family.role(), group, ?event, "modal state unchanged");
            return false;
        }
        match next {
            OpenState::Open => self.show(cx, family, group, root, content, opener),
            OpenState::Closed => self.hide(cx, family, group, root, content),
        }
        true
    }

    fn project(dom: &mut Dom, family: ModalFamily, group: &str, root: NodeId, content: NodeId, state: OpenState) {
        let (value, visible) = match state {
            OpenState::Open => (STATE_OPEN, true),
            OpenState::Closed => (STATE_CLOSED, false),
        };
        project_visibility(dom, root, value, visible);
        project_visibility(dom, content, value, visible);
        for overlay in dom.query_attr_eq(&family.attr("overlay"), group) {
            project_visibility(dom, overlay, value, visible);
        }
    }

    fn show(
        &mut self,
        cx: &mut Context<'_>,
        family: ModalFamily,
        group: &str,
        root: NodeId,
        content: NodeId,
        opener: Option<NodeId>,
    ) {
        if let Some(opener) = opener {
            let prefix = format!("{}-trigger", family.role());
            if let Some(id) = cx.doc.ensure_id(opener, &prefix) {
                cx.doc.dom.set_attr(root, DATA_RETURN_FOCUS, id);
            }
        }
        Self::project(&mut cx.doc.dom, family, group, root, content, OpenState::Open);
        cx.doc.lock_scroll();

        self.stack.retain(|(f, g)| !(*f == family && g == group));
        self.stack.push((family, group.to_owned()));
        debug!(role = family.role(), group, depth = self.stack.len(), "modal opened");

        let target = FocusChain::within(&cx.doc.dom, content, None).first().unwrap_or(content);
        cx.doc.focus(target);
    }

    fn hide(&mut self, cx: &mut Context<'_>, family: ModalFamily, group: &str, root: NodeId, content: NodeId) {
        Self::project(&mut cx.doc.dom, family, group, root, content, OpenState::Closed);
        self.stack.retain(|(f, g)| !(*f == family && g == group));
        if !any_root_open(&cx.doc.dom) {
            cx.doc.unlock_scroll();
        }
        let return_to = cx
            .doc
            .dom
            .get_mut(root)
            .and_then(|data| data.remove_attr(DATA_RETURN_FOCUS));
        debug!(role = family.role(), group, depth = self.stack.len(), "modal closed");
        match return_to.and_then(|id| cx.doc.element_by_id(&id)) {
            Some(trigger) => {
                cx.doc.focus(trigger);
            }
            None => {
                trace!(role = family.role(), group, "no focus to restore");
                if cx.doc.focused().is_some_and(|focused| cx.doc.dom.is_inclusive_ancestor(root, focused)) {
                    cx.doc.blur();
                }
            }
        }
    }

    fn on_click(&mut self, cx: &mut Context<'_>, target: NodeId) {
        for family in ModalFamily::ALL {
            let dom = &cx.doc.dom;
            if let Some((trigger, group)) = dom.closest_attr(target, &family.attr("trigger")) {
                if !node_disabled(dom, trigger) {
                    self.apply(cx, family, &group, OpenEvent::Open, Some(trigger));
                }
                return;
            }
            let closer = dom
                .closest_attr(target, &family.attr("close"))
                .or_else(|| dom.closest_attr(target, &family.attr("action")));
            if let Some((_, group)) = closer {
                self.apply(cx, family, &group, OpenEvent::Close, None);
                return;
            }
            if let Some((_, group)) = dom.closest_attr(target, &family.attr("overlay")) {
                let inside_content = family
                    .content(dom, &group)
                    .is_some_and(|content| dom.is_inclusive_ancestor(content, target));
                if !inside_content {
                    self.apply(cx, family, &group, OpenEvent::OverlayClick, None);
                    return;
                }
            }
        }
    }

    fn on_escape(&mut self, cx: &mut Context<'_>, event: &mut DomEvent) {
        self.prune(&cx.doc.dom);
        let Some((family, group)) = self.stack.last().cloned() else {
            return;
        };
        if self.apply(cx, family, &group, OpenEvent::Escape, None) {
            event.stop_propagation();
            event.prevent_default();
        }
    }

    /// Keep Tab inside the topmost modal's content.
    fn trap_tab(&mut self, cx: &mut Context<'_>, event: &mut DomEvent, backward: bool) {
        self.prune(&cx.doc.dom);
        let Some((family, group)) = self.stack.last().cloned() else {
            return;
        };
        let Some(content) = family.content(&cx.doc.dom, &group) else {
            return;
        };
        let mut chain = FocusChain::within(&cx.doc.dom, content, cx.doc.focused());
        let next = if backward { chain.focus_previous() } else { chain.focus_next() };
        cx.doc.focus(next.unwrap_or(content));
        event.prevent_default();
    }
}

impl Controller for ModalController {
    fn name(&self) -> &'static str {
        "modal"
    }

    /// Sync roots declared open in markup onto the stack and the scroll lock.
    fn hydrate(&mut self, cx: &mut Context<'_>) {
        for family in ModalFamily::ALL {
            let attr = family.attr("root");
            for root in cx.doc.dom.query_attr(&attr) {
                let dom = &cx.doc.dom;
                let Some(group) = dom.attr(root, &attr).map(str::to_owned) else {
                    continue;
                };
                let state = OpenState::from_attr(dom.attr(root, DATA_STATE));
                match family.content(dom, &group) {
                    Some(content) => Self::project(&mut cx.doc.dom, family, &group, root, content, state),
                    None => project_visibility(&mut cx.doc.dom, root, state.as_str(), state.is_open()),
                }
                if state.is_open() && !self.stack.iter().any(|(f, g)| *f == family && *g == group) {
                    self.stack.push((family, group));
                }
            }
        }
        self.prune(&cx.doc.dom);
        if any_root_open(&cx.doc.dom) {
            cx.doc.lock_scroll();
        }
    }

    fn capture(&mut self, cx: &mut Context<'_>, event: &mut DomEvent) {
        if self.stack.is_empty() {
            return;
        }
        if let EventKind::KeyDown(key) = &event.kind {
            if key.is_tab() {
                let backward = key.is_backward_tab();
                self.trap_tab(cx, event, backward);
            }
        }
    }

    fn handle(&mut self, cx: &mut Context<'_>, event: &mut DomEvent) {
        match &event.kind {
            EventKind::Click => {
                if let Some(target) = event.target {
                    self.on_click(cx, target);
                }
            }
            EventKind::KeyDown(key) if key.code == Key::Escape => self.on_escape(cx, event),
            _ => {}
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
