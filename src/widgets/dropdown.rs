//! Dropdown menu: trigger, panel, actionable items.
//!
//! Items may carry `data-href` (a navigation request) and
//! `data-toast-title`/`data-toast-description` (a toast); both fire before the
//! menu closes and focus returns to the trigger.

use tracing::{debug, trace};

use crate::dom::node::NodeId;
use crate::event::dom_event::{DomEvent, EventKind};
use crate::event::input::{Key, KeyEvent};
use crate::position::{Align, Placement, Side};
use crate::widget::attrs::{node_disabled, DATA_HREF, DATA_TOAST_DESCRIPTION, DATA_TOAST_TITLE};
use crate::widget::traits::{Context, Controller};
use crate::widgets::disclosure::Family;
use crate::widgets::toast::ToastRequest;

pub const DROPDOWN: Family = Family {
    role: "dropdown",
    has_items: true,
    placement: Placement::new(Side::Bottom, Align::Start),
};

/// Listener for `data-dropdown-*` markup.
#[derive(Debug, Default)]
pub struct DropdownController;

impl DropdownController {
    pub fn new() -> Self {
        Self
    }

    pub fn open(&mut self, cx: &mut Context<'_>, group: &str) -> bool {
        DROPDOWN.open(cx, group, None)
    }

    pub fn close(&mut self, cx: &mut Context<'_>, group: &str) -> bool {
        DROPDOWN.close(cx, group)
    }

    pub fn toggle(&mut self, cx: &mut Context<'_>, group: &str) -> bool {
        DROPDOWN.toggle(cx, group, None)
    }

    /// Run an item's side effects, then close its menu.
    fn activate(&mut self, cx: &mut Context<'_>, item: NodeId, group: &str) {
        if node_disabled(&cx.doc.dom, item) {
            trace!(group, "disabled item ignored");
            return;
        }
        let dom = &cx.doc.dom;
        let href = dom.attr(item, DATA_HREF).map(str::to_owned);
        let toast = dom.attr(item, DATA_TOAST_TITLE).map(|title| {
            let request = ToastRequest::new(title);
            match dom.attr(item, DATA_TOAST_DESCRIPTION) {
                Some(description) => request.with_description(description),
                None => request,
            }
        });
        debug!(group, "dropdown item activated");
        if let Some(request) = toast {
            cx.toasts.publish(request);
        }
        if let Some(href) = href {
            cx.doc.navigate(href);
        }
        DROPDOWN.close(cx, group);
    }

    fn on_click(&mut self, cx: &mut Context<'_>, target: Option<NodeId>) {
        DROPDOWN.close_outside(cx, target);
        let Some(target) = target else {
            return;
        };
        let dom = &cx.doc.dom;
        if let Some((trigger, group)) = dom.closest_attr(target, &DROPDOWN.trigger_attr()) {
            if !node_disabled(dom, trigger) {
                DROPDOWN.toggle(cx, &group, Some(trigger));
            }
            return;
        }
        let item_attr = DROPDOWN.item_attr();
        let Some(item) = dom.closest(target, |d| d.has_attr(&item_attr)) else {
            return;
        };
        if let Some((_, group)) = dom.closest_attr(item, &DROPDOWN.content_attr()) {
            if DROPDOWN.is_open(dom, &group) {
                self.activate(cx, item, &group);
            }
        }
    }

    fn on_key(&mut self, cx: &mut Context<'_>, event: &mut DomEvent, key: KeyEvent) {
        if key.code == Key::Escape {
            DROPDOWN.escape(cx, event);
            return;
        }
        let Some(target) = event.target else {
            return;
        };
        let dom = &cx.doc.dom;
        if let Some((trigger, group)) = dom.closest_attr(target, &DROPDOWN.trigger_attr()) {
            if DROPDOWN.trigger_key(cx, trigger, &group, &key) {
                event.prevent_default();
            }
            return;
        }
        if let Some((content, group)) = dom.closest_attr(target, &DROPDOWN.content_attr()) {
            if DROPDOWN.is_open(dom, &group) && DROPDOWN.item_key(cx, content, &key) {
                event.prevent_default();
            }
        }
    }
}

impl Controller for DropdownController {
    fn name(&self) -> &'static str {
        "dropdown"
    }

    fn hydrate(&mut self, cx: &mut Context<'_>) {
        DROPDOWN.hydrate(cx);
    }

    fn handle(&mut self, cx: &mut Context<'_>, event: &mut DomEvent) {
        match &event.kind {
            EventKind::Click => self.on_click(cx, event.target),
            EventKind::KeyDown(key) => {
                let key = *key;
                self.on_key(cx, event, key);
            }
            EventKind::Resize | EventKind::Scroll => DROPDOWN.reflow(cx),
            _ => {}
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
    use crate::geometry::Size;
    use crate::markup::parse;
    use crate::widget::attrs::DATA_STATE;
    use crate::widget::fixture::Fixture;

    const MARKUP: &str = r#"<body>
        <button id="actions-btn" data-dropdown-trigger="actions">Actions</button>
        <div data-dropdown-content="actions" data-state="closed">
            <div data-dropdown-item tabindex="-1" data-href="/courses/new">New course</div>
            <div data-dropdown-item tabindex="-1" data-toast-title="Copied" data-toast-description="Link copied">Copy link</div>
            <div data-dropdown-item tabindex="-1" disabled data-href="/danger">Delete</div>
        </div>
        <span id="outside">x</span>
    </body>"#;

    fn fixture() -> (Fixture, DropdownController) {
        let mut fx = Fixture::new(Document::new(parse(MARKUP).unwrap(), Size::new(800, 600)));
        let mut menu = DropdownController::new();
        menu.hydrate(&mut fx.cx());
        (fx, menu)
    }

    fn item(fx: &Fixture, label: &str) -> NodeId {
        fx.doc
            .dom
            .query_attr("data-dropdown-item")
            .into_iter()
            .find(|&n| fx.doc.dom.text_content(n) == label)
            .unwrap()
    }

    fn click(fx: &mut Fixture, menu: &mut DropdownController, target: NodeId) {
        let mut event = DomEvent::click(target);
        menu.handle(&mut fx.cx(), &mut event);
    }

    fn panel_state(fx: &Fixture) -> Option<String> {
        let content = DROPDOWN.content(&fx.doc.dom, "actions").unwrap();
        fx.doc.dom.attr(content, DATA_STATE).map(str::to_owned)
    }

    #[test]
    fn hydrate_hides_closed_panel() {
        let (fx, _menu) = fixture();
        let content = DROPDOWN.content(&fx.doc.dom, "actions").unwrap();
        assert!(fx.doc.dom.get(content).unwrap().is_hidden());
    }

    #[test]
    fn trigger_click_toggles() {
        let (mut fx, mut menu) = fixture();
        let trigger = fx.doc.element_by_id("actions-btn").unwrap();
        click(&mut fx, &mut menu, trigger);
        assert_eq!(panel_state(&fx).as_deref(), Some("open"));
        click(&mut fx, &mut menu, trigger);
        assert_eq!(panel_state(&fx).as_deref(), Some("closed"));
    }

    #[test]
    fn href_item_navigates_then_closes() {
        let (mut fx, mut menu) = fixture();
        menu.open(&mut fx.cx(), "actions");
        let new_course = item(&fx, "New course");
        click(&mut fx, &mut menu, new_course);
        assert_eq!(fx.doc.take_navigations(), vec!["/courses/new".to_owned()]);
        assert_eq!(panel_state(&fx).as_deref(), Some("closed"));
        assert_eq!(fx.doc.focused_id(), Some("actions-btn"));
    }

    #[test]
    fn toast_item_publishes() {
        let (mut fx, mut menu) = fixture();
        let inbox = fx.toasts.subscribe();
        menu.open(&mut fx.cx(), "actions");
        let copy = item(&fx, "Copy link");
        click(&mut fx, &mut menu, copy);
        let published = fx.toasts.drain(inbox);
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, "Copied");
        assert_eq!(published[0].description.as_deref(), Some("Link copied"));
    }

    #[test]
    fn disabled_item_is_inert() {
        let (mut fx, mut menu) = fixture();
        menu.open(&mut fx.cx(), "actions");
        let delete = item(&fx, "Delete");
        click(&mut fx, &mut menu, delete);
        assert!(fx.doc.pending_navigations().is_empty());
        assert_eq!(panel_state(&fx).as_deref(), Some("open"));
    }

    #[test]
    fn arrow_down_on_trigger_opens() {
        let (mut fx, mut menu) = fixture();
        let trigger = fx.doc.element_by_id("actions-btn").unwrap();
        let mut event = DomEvent::key_down(Some(trigger), KeyEvent::plain(Key::Down));
        menu.handle(&mut fx.cx(), &mut event);
        assert!(event.is_default_prevented());
        assert_eq!(panel_state(&fx).as_deref(), Some("open"));
        assert_eq!(fx.doc.focused(), Some(item(&fx, "New course")));
    }

    #[test]
    fn escape_closes_and_stops_propagation() {
        let (mut fx, mut menu) = fixture();
        menu.open(&mut fx.cx(), "actions");
        let focused = fx.doc.focused();
        let mut event = DomEvent::key_down(focused, KeyEvent::plain(Key::Escape));
        menu.handle(&mut fx.cx(), &mut event);
        assert!(event.is_propagation_stopped());
        assert_eq!(panel_state(&fx).as_deref(), Some("closed"));
        assert_eq!(fx.doc.focused_id(), Some("actions-btn"));
    }

    #[test]
    fn escape_with_nothing_open_propagates() {
        let (mut fx, mut menu) = fixture();
        let mut event = DomEvent::key_down(None, KeyEvent::plain(Key::Escape));
        menu.handle(&mut fx.cx(), &mut event);
        assert!(!event.is_propagation_stopped());
    }

    #[test]
    fn outside_click_closes() {
        let (mut fx, mut menu) = fixture();
        menu.open(&mut fx.cx(), "actions");
        let outside = fx.doc.element_by_id("outside").unwrap();
        click(&mut fx, &mut menu, outside);
        assert_eq!(panel_state(&fx).as_deref(), Some("closed"));
    }
}
