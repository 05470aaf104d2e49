//! Popover: a trigger-anchored panel with arbitrary content.

use crate::dom::node::NodeId;
use crate::event::dom_event::{DomEvent, EventKind};
use crate::event::input::Key;
use crate::position::{Align, Placement, Side};
use crate::widget::attrs::{node_disabled, role_attr};
use crate::widget::traits::{Context, Controller};
use crate::widgets::disclosure::Family;

pub const POPOVER: Family = Family {
    role: "popover",
    has_items: false,
    placement: Placement::new(Side::Bottom, Align::Start),
};

/// Listener for `data-popover-*` markup.
#[derive(Debug, Default)]
pub struct PopoverController;

impl PopoverController {
    pub fn new() -> Self {
        Self
    }

    pub fn open(&mut self, cx: &mut Context<'_>, group: &str) -> bool {
        POPOVER.open(cx, group, None)
    }

    pub fn close(&mut self, cx: &mut Context<'_>, group: &str) -> bool {
        POPOVER.close(cx, group)
    }

    pub fn toggle(&mut self, cx: &mut Context<'_>, group: &str) -> bool {
        POPOVER.toggle(cx, group, None)
    }

    fn on_click(&mut self, cx: &mut Context<'_>, target: Option<NodeId>) {
        POPOVER.close_outside(cx, target);
        let Some(target) = target else {
            return;
        };
        let dom = &cx.doc.dom;
        if let Some((trigger, group)) = dom.closest_attr(target, &POPOVER.trigger_attr()) {
            if !node_disabled(dom, trigger) {
                POPOVER.toggle(cx, &group, Some(trigger));
            }
        } else if let Some((_, group)) = dom.closest_attr(target, &role_attr("popover", "close")) {
            POPOVER.close(cx, &group);
        }
    }
}

impl Controller for PopoverController {
    fn name(&self) -> &'static str {
        "popover"
    }

    fn hydrate(&mut self, cx: &mut Context<'_>) {
        POPOVER.hydrate(cx);
    }

    fn handle(&mut self, cx: &mut Context<'_>, event: &mut DomEvent) {
        match &event.kind {
            EventKind::Click => self.on_click(cx, event.target),
            EventKind::KeyDown(key) if key.code == Key::Escape => {
                POPOVER.escape(cx, event);
            }
            EventKind::Resize | EventKind::Scroll => POPOVER.reflow(cx),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::event::input::KeyEvent;
    use crate::geometry::Size;
    use crate::markup::parse;
    use crate::widget::fixture::Fixture;

    const MARKUP: &str = r#"<body>
        <button id="share" data-popover-trigger="share">Share</button>
        <div id="share-panel" data-popover-content="share" data-state="closed">
            <p>Invite link</p>
            <input id="link" type="text" value="https://example.test/join">
            <button id="done" data-popover-close="share">Done</button>
        </div>
        <div id="empty-panel" data-popover-content="empty" data-state="closed"><p>Nothing to focus</p></div>
    </body>"#;

    fn fixture() -> (Fixture, PopoverController) {
        let mut fx = Fixture::new(Document::new(parse(MARKUP).unwrap(), Size::new(800, 600)));
        let mut popover = PopoverController::new();
        popover.hydrate(&mut fx.cx());
        (fx, popover)
    }

    #[test]
    fn open_focuses_first_focusable() {
        let (mut fx, mut popover) = fixture();
        assert!(popover.open(&mut fx.cx(), "share"));
        assert_eq!(fx.doc.focused_id(), Some("link"));
    }

    #[test]
    fn open_without_focusable_focuses_panel() {
        let (mut fx, mut popover) = fixture();
        popover.open(&mut fx.cx(), "empty");
        assert_eq!(fx.doc.focused_id(), Some("empty-panel"));
    }

    #[test]
    fn close_element_closes_and_returns_focus() {
        let (mut fx, mut popover) = fixture();
        popover.open(&mut fx.cx(), "share");
        let done = fx.doc.element_by_id("done").unwrap();
        let mut event = DomEvent::click(done);
        popover.handle(&mut fx.cx(), &mut event);
        assert!(!POPOVER.is_open(&fx.doc.dom, "share"));
        assert_eq!(fx.doc.focused_id(), Some("share"));
    }

    #[test]
    fn escape_closes() {
        let (mut fx, mut popover) = fixture();
        popover.toggle(&mut fx.cx(), "share");
        let mut event = DomEvent::key_down(fx.doc.focused(), KeyEvent::plain(Key::Escape));
        popover.handle(&mut fx.cx(), &mut event);
        assert!(event.is_propagation_stopped());
        assert!(!POPOVER.is_open(&fx.doc.dom, "share"));
    }

    #[test]
    fn click_inside_keeps_open() {
        let (mut fx, mut popover) = fixture();
        popover.open(&mut fx.cx(), "share");
        let link = fx.doc.element_by_id("link").unwrap();
        let mut event = DomEvent::click(link);
        popover.handle(&mut fx.cx(), &mut event);
        assert!(POPOVER.is_open(&fx.doc.dom, "share"));
    }
}
