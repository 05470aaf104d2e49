//! Tooltip: delayed show on hover or focus, delayed hide on leave or blur.
//!
//! Every enter/leave reschedules the tooltip's single pending timer, so a
//! pointer that re-enters before the close delay elapses keeps the tooltip
//! open. Escape hides every tooltip at once and lets the key continue to
//! other widgets.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, trace};

use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::event::dom_event::{DomEvent, EventKind};
use crate::event::input::Key;
use crate::position::{Align, Placement, Side};
use crate::timer::{TimerAction, TimerId};
use crate::widget::attrs::{project_visibility, role_attr, DATA_STATE, STATE_CLOSED, STATE_OPEN};
use crate::widget::state::OpenState;
use crate::widget::traits::{Context, Controller};
use crate::widgets::disclosure::place_panel;

pub const TOOLTIP_PLACEMENT: Placement = Placement::new(Side::Top, Align::Center);

fn trigger_attr() -> String {
    role_attr("tooltip", "trigger")
}

fn content_attr() -> String {
    role_attr("tooltip", "content")
}

fn content(dom: &Dom, group: &str) -> Option<NodeId> {
    dom.find_attr_eq(&content_attr(), group)
}

/// Listener for `data-tooltip-*` markup.
#[derive(Debug, Default)]
pub struct TooltipController {
    pending: HashMap<String, TimerId>,
    anchors: HashMap<String, NodeId>,
}

impl TooltipController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the tooltip for `group` is showing.
    pub fn is_open(&self, dom: &Dom, group: &str) -> bool {
        content(dom, group).is_some_and(|c| OpenState::from_attr(dom.attr(c, DATA_STATE)).is_open())
    }

    /// Whether a show or hide is scheduled for `group`.
    pub fn is_pending(&self, group: &str) -> bool {
        self.pending.contains_key(group)
    }

    fn reschedule(&mut self, cx: &mut Context<'_>, group: String, action: TimerAction, delay: Duration) {
        if let Some(old) = self.pending.remove(&group) {
            cx.timers.cancel(old);
        }
        let id = cx.timers.schedule(delay, action);
        self.pending.insert(group, id);
    }

    fn enter(&mut self, cx: &mut Context<'_>, trigger: NodeId, group: String) {
        trace!(group = %group, "tooltip show scheduled");
        self.anchors.insert(group.clone(), trigger);
        let delay = cx.config.tooltip_open_delay;
        self.reschedule(cx, group.clone(), TimerAction::TooltipOpen(group), delay);
    }

    fn leave(&mut self, cx: &mut Context<'_>, group: String) {
        trace!(group = %group, "tooltip hide scheduled");
        let delay = cx.config.tooltip_close_delay;
        self.reschedule(cx, group.clone(), TimerAction::TooltipClose(group), delay);
    }

    fn show(&mut self, cx: &mut Context<'_>, group: &str) {
        let Some(panel) = content(&cx.doc.dom, group) else {
            trace!(group, "no tooltip content for group");
            return;
        };
        project_visibility(&mut cx.doc.dom, panel, STATE_OPEN, true);
        self.position(cx, group, panel);
        debug!(group, "tooltip opened");
    }

    fn hide(&mut self, cx: &mut Context<'_>, group: &str) {
        self.anchors.remove(group);
        if let Some(panel) = content(&cx.doc.dom, group) {
            project_visibility(&mut cx.doc.dom, panel, STATE_CLOSED, false);
            debug!(group, "tooltip closed");
        }
    }

    fn position(&self, cx: &mut Context<'_>, group: &str, panel: NodeId) {
        let anchor = self
            .anchors
            .get(group)
            .copied()
            .filter(|&n| cx.doc.dom.contains(n))
            .or_else(|| cx.doc.dom.find_attr_eq(&trigger_attr(), group));
        if let Some(trigger) = anchor {
            let gap = cx.config.tooltip_gap;
            place_panel(cx, trigger, panel, TOOLTIP_PLACEMENT, gap);
        }
    }

    fn open_groups(&self, dom: &Dom) -> Vec<String> {
        let attr = content_attr();
        dom.query_attr(&attr)
            .into_iter()
            .filter(|&n| OpenState::from_attr(dom.attr(n, DATA_STATE)).is_open())
            .filter_map(|n| dom.attr(n, &attr).map(str::to_owned))
            .collect()
    }

    /// Hide every tooltip and drop every pending timer.
    fn dismiss_all(&mut self, cx: &mut Context<'_>) {
        for (_, id) in self.pending.drain() {
            cx.timers.cancel(id);
        }
        self.anchors.clear();
        for group in self.open_groups(&cx.doc.dom) {
            self.hide(cx, &group);
        }
    }

    fn reflow(&mut self, cx: &mut Context<'_>) {
        for group in self.open_groups(&cx.doc.dom) {
            if let Some(panel) = content(&cx.doc.dom, &group) {
                self.position(cx, &group, panel);
            }
        }
    }
}

impl Controller for TooltipController {
    fn name(&self) -> &'static str {
        "tooltip"
    }

    fn hydrate(&mut self, cx: &mut Context<'_>) {
        let attr = content_attr();
        for panel in cx.doc.dom.query_attr(&attr) {
            let state = OpenState::from_attr(cx.doc.dom.attr(panel, DATA_STATE));
            project_visibility(&mut cx.doc.dom, panel, state.as_str(), state.is_open());
        }
        let dom = &cx.doc.dom;
        self.anchors.retain(|_, trigger| dom.contains(*trigger));
        self.reflow(cx);
    }

    fn handle(&mut self, cx: &mut Context<'_>, event: &mut DomEvent) {
        let attr = trigger_attr();
        match &event.kind {
            EventKind::PointerEnter => {
                let own = event
                    .target
                    .and_then(|t| cx.doc.dom.attr(t, &attr).map(|g| (t, g.to_owned())));
                if let Some((trigger, group)) = own {
                    self.enter(cx, trigger, group);
                }
            }
            EventKind::FocusIn => {
                if let Some((trigger, group)) = event.target.and_then(|t| cx.doc.dom.closest_attr(t, &attr)) {
                    self.enter(cx, trigger, group);
                }
            }
            EventKind::PointerLeave => {
                let group = event.target.and_then(|t| cx.doc.dom.attr(t, &attr).map(str::to_owned));
                if let Some(group) = group {
                    self.leave(cx, group);
                }
            }
            EventKind::FocusOut => {
                if let Some((_, group)) = event.target.and_then(|t| cx.doc.dom.closest_attr(t, &attr)) {
                    self.leave(cx, group);
                }
            }
            EventKind::KeyDown(key) if key.code == Key::Escape => self.dismiss_all(cx),
            EventKind::Resize | EventKind::Scroll => self.reflow(cx),
            _ => {}
        }
    }

    fn on_timer(&mut self, cx: &mut Context<'_>, action: &TimerAction) -> bool {
        match action {
            TimerAction::TooltipOpen(group) => {
                self.pending.remove(group);
                self.show(cx, group);
                true
            }
            TimerAction::TooltipClose(group) => {
                self.pending.remove(group);
                self.hide(cx, group);
                true
            }
            _ => false,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::event::input::KeyEvent;
    use crate::geometry::{Region, Size};
    use crate::markup::parse;
    use crate::widget::fixture::Fixture;

    const MARKUP: &str = r#"<body>
        <button id="save" data-tooltip-trigger="save">Save</button>
        <div id="save-tip" data-tooltip-content="save" data-state="closed">Save changes</div>
        <button id="undo" data-tooltip-trigger="undo">Undo</button>
        <div id="undo-tip" data-tooltip-content="undo" data-state="closed">Undo last edit</div>
    </body>"#;

    fn fixture() -> (Fixture, TooltipController) {
        let mut fx = Fixture::new(Document::new(parse(MARKUP).unwrap(), Size::new(800, 600)));
        let mut tooltip = TooltipController::new();
        tooltip.hydrate(&mut fx.cx());
        (fx, tooltip)
    }

    fn node(fx: &Fixture, id: &str) -> NodeId {
        fx.doc.element_by_id(id).unwrap()
    }

    fn send(fx: &mut Fixture, tooltip: &mut TooltipController, kind: EventKind, target: Option<NodeId>) {
        let mut event = DomEvent::new(kind, target);
        tooltip.handle(&mut fx.cx(), &mut event);
    }

    /// Fire every timer due within `ms` of the current time.
    fn advance(fx: &mut Fixture, tooltip: &mut TooltipController, ms: u64) {
        let until = fx.timers.now() + Duration::from_millis(ms);
        while let Some((_, action)) = fx.timers.pop_due(until) {
            tooltip.on_timer(&mut fx.cx(), &action);
        }
        fx.timers.advance_to(until);
    }

    #[test]
    fn hydrate_hides_content() {
        let (fx, _tooltip) = fixture();
        assert!(fx.doc.dom.get(node(&fx, "save-tip")).unwrap().is_hidden());
    }

    #[test]
    fn opens_after_delay() {
        let (mut fx, mut tooltip) = fixture();
        let save = node(&fx, "save");
        send(&mut fx, &mut tooltip, EventKind::PointerEnter, Some(save));
        advance(&mut fx, &mut tooltip, 249);
        assert!(!tooltip.is_open(&fx.doc.dom, "save"));
        advance(&mut fx, &mut tooltip, 1);
        assert!(tooltip.is_open(&fx.doc.dom, "save"));
        assert!(!fx.doc.dom.get(node(&fx, "save-tip")).unwrap().is_hidden());
    }

    #[test]
    fn leave_before_delay_cancels_open() {
        let (mut fx, mut tooltip) = fixture();
        let save = node(&fx, "save");
        send(&mut fx, &mut tooltip, EventKind::PointerEnter, Some(save));
        advance(&mut fx, &mut tooltip, 100);
        send(&mut fx, &mut tooltip, EventKind::PointerLeave, Some(save));
        advance(&mut fx, &mut tooltip, 500);
        assert!(!tooltip.is_open(&fx.doc.dom, "save"));
        assert!(fx.timers.is_empty());
    }

    #[test]
    fn reentry_within_close_delay_keeps_open() {
        let (mut fx, mut tooltip) = fixture();
        let save = node(&fx, "save");
        send(&mut fx, &mut tooltip, EventKind::PointerEnter, Some(save));
        advance(&mut fx, &mut tooltip, 250);
        send(&mut fx, &mut tooltip, EventKind::PointerLeave, Some(save));
        advance(&mut fx, &mut tooltip, 50);
        send(&mut fx, &mut tooltip, EventKind::PointerEnter, Some(save));
        advance(&mut fx, &mut tooltip, 100);
        assert!(tooltip.is_open(&fx.doc.dom, "save"));
        assert_eq!(fx.timers.len(), 1);
    }

    #[test]
    fn anchors_released_on_close_and_rehydrate() {
        let (mut fx, mut tooltip) = fixture();
        let save = node(&fx, "save");
        send(&mut fx, &mut tooltip, EventKind::PointerEnter, Some(save));
        advance(&mut fx, &mut tooltip, 250);
        send(&mut fx, &mut tooltip, EventKind::PointerLeave, Some(save));
        advance(&mut fx, &mut tooltip, 80);
        assert!(tooltip.anchors.is_empty());

        let undo = node(&fx, "undo");
        send(&mut fx, &mut tooltip, EventKind::PointerEnter, Some(undo));
        fx.doc.dom.remove(undo);
        tooltip.hydrate(&mut fx.cx());
        assert!(tooltip.anchors.is_empty());
    }

    #[test]
    fn focus_schedules_like_hover() {
        let (mut fx, mut tooltip) = fixture();
        let undo = node(&fx, "undo");
        send(&mut fx, &mut tooltip, EventKind::FocusIn, Some(undo));
        advance(&mut fx, &mut tooltip, 250);
        assert!(tooltip.is_open(&fx.doc.dom, "undo"));
        send(&mut fx, &mut tooltip, EventKind::FocusOut, Some(undo));
        advance(&mut fx, &mut tooltip, 80);
        assert!(!tooltip.is_open(&fx.doc.dom, "undo"));
    }

    #[test]
    fn escape_closes_all_and_propagates() {
        let (mut fx, mut tooltip) = fixture();
        let (save, undo) = (node(&fx, "save"), node(&fx, "undo"));
        send(&mut fx, &mut tooltip, EventKind::PointerEnter, Some(save));
        send(&mut fx, &mut tooltip, EventKind::FocusIn, Some(undo));
        advance(&mut fx, &mut tooltip, 250);
        send(&mut fx, &mut tooltip, EventKind::PointerLeave, Some(save));

        let mut event = DomEvent::key_down(Some(undo), KeyEvent::plain(Key::Escape));
        tooltip.handle(&mut fx.cx(), &mut event);
        assert!(!event.is_propagation_stopped());
        assert!(!tooltip.is_open(&fx.doc.dom, "save"));
        assert!(!tooltip.is_open(&fx.doc.dom, "undo"));
        assert!(!tooltip.is_pending("save"));
        assert!(fx.timers.is_empty());
    }

    #[test]
    fn positions_above_trigger_centered() {
        let (mut fx, mut tooltip) = fixture();
        let (save, tip) = (node(&fx, "save"), node(&fx, "save-tip"));
        fx.doc.set_rect(save, Region::new(100, 200, 40, 20));
        fx.doc.set_rect(tip, Region::new(0, 0, 80, 30));
        send(&mut fx, &mut tooltip, EventKind::PointerEnter, Some(save));
        advance(&mut fx, &mut tooltip, 250);
        assert_eq!(fx.doc.dom.get(tip).unwrap().rect, Region::new(80, 160, 80, 30));
        assert_eq!(fx.doc.dom.attr(tip, "style"), Some("top: 160px; left: 80px"));
    }
}
