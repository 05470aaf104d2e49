//! Select: a dropdown whose items carry values.
//!
//! Choosing an item writes `data-value` on the `data-select-root`, refreshes
//! the `data-select-value` label, mirrors the value into the root's
//! `input[name=<data-name>]` and marks the chosen item active.

use tracing::{debug, trace};

use crate::dom::node::NodeId;
use crate::event::dom_event::{DomEvent, EventKind};
use crate::event::input::{Key, KeyEvent};
use crate::position::{Align, Placement, Side};
use crate::widget::attrs::{
    node_disabled, role_attr, ARIA_SELECTED, DATA_NAME, DATA_STATE, DATA_VALUE, STATE_ACTIVE, STATE_INACTIVE,
};
use crate::widget::traits::{Context, Controller};
use crate::widgets::disclosure::Family;

pub const SELECT: Family = Family {
    role: "select",
    has_items: true,
    placement: Placement::new(Side::Bottom, Align::Start),
};

/// Listener for `data-select-*` markup.
#[derive(Debug, Default)]
pub struct SelectController;

impl SelectController {
    pub fn new() -> Self {
        Self
    }

    pub fn open(&mut self, cx: &mut Context<'_>, group: &str) -> bool {
        SELECT.open(cx, group, None)
    }

    pub fn close(&mut self, cx: &mut Context<'_>, group: &str) -> bool {
        SELECT.close(cx, group)
    }

    pub fn toggle(&mut self, cx: &mut Context<'_>, group: &str) -> bool {
        SELECT.toggle(cx, group, None)
    }

    /// Current value of the select root for `group`.
    pub fn value<'d>(&self, cx: &'d Context<'_>, group: &str) -> Option<&'d str> {
        let dom = &cx.doc.dom;
        let root = dom.find_attr_eq(&role_attr("select", "root"), group)?;
        dom.attr(root, DATA_VALUE)
    }

    /// Choose the item whose `data-value` is `value`. Returns `false` if no
    /// such item exists.
    pub fn select_value(&mut self, cx: &mut Context<'_>, group: &str, value: &str) -> bool {
        let Some(item) = item_with_value(cx, group, value) else {
            trace!(group, value, "no select item with value");
            return false;
        };
        commit(cx, group, item);
        true
    }

    fn on_click(&mut self, cx: &mut Context<'_>, target: Option<NodeId>) {
        SELECT.close_outside(cx, target);
        let Some(target) = target else {
            return;
        };
        let dom = &cx.doc.dom;
        if let Some((trigger, group)) = dom.closest_attr(target, &SELECT.trigger_attr()) {
            if !node_disabled(dom, trigger) {
                SELECT.toggle(cx, &group, Some(trigger));
            }
            return;
        }
        let item_attr = SELECT.item_attr();
        let Some(item) = dom.closest(target, |d| d.has_attr(&item_attr)) else {
            return;
        };
        let Some((_, group)) = dom.closest_attr(item, &SELECT.content_attr()) else {
            return;
        };
        if !SELECT.is_open(dom, &group) || node_disabled(dom, item) {
            return;
        }
        commit(cx, &group, item);
        SELECT.close(cx, &group);
    }

    fn on_key(&mut self, cx: &mut Context<'_>, event: &mut DomEvent, key: KeyEvent) {
        if key.code == Key::Escape {
            SELECT.escape(cx, event);
            return;
        }
        let Some(target) = event.target else {
            return;
        };
        let dom = &cx.doc.dom;
        if let Some((trigger, group)) = dom.closest_attr(target, &SELECT.trigger_attr()) {
            if SELECT.trigger_key(cx, trigger, &group, &key) {
                event.prevent_default();
            }
            return;
        }
        if let Some((content, group)) = dom.closest_attr(target, &SELECT.content_attr()) {
            if SELECT.is_open(dom, &group) && SELECT.item_key(cx, content, &key) {
                event.prevent_default();
            }
        }
    }
}

fn item_with_value(cx: &Context<'_>, group: &str, value: &str) -> Option<NodeId> {
    let dom = &cx.doc.dom;
    let content = SELECT.content(dom, group)?;
    let item_attr = SELECT.item_attr();
    dom.query_within(content, |d| d.has_attr(&item_attr) && d.attr(DATA_VALUE) == Some(value))
        .into_iter()
        .next()
}

/// Write the chosen item's value and label everywhere they are projected.
fn commit(cx: &mut Context<'_>, group: &str, chosen: NodeId) {
    let dom = &mut cx.doc.dom;
    let label = dom.text_content(chosen);
    let value = dom.attr(chosen, DATA_VALUE).map(str::to_owned).unwrap_or_else(|| label.clone());

    if let Some(root) = dom.find_attr_eq(&role_attr("select", "root"), group) {
        dom.set_attr(root, DATA_VALUE, value.as_str());
        if let Some(name) = dom.attr(root, DATA_NAME).map(str::to_owned) {
            let input = dom
                .query_within(root, |d| d.tag == "input" && d.attr("name") == Some(name.as_str()))
                .into_iter()
                .next();
            match input {
                Some(input) => dom.set_attr(input, "value", value.as_str()),
                None => trace!(group, name = %name, "no form input to mirror select value"),
            }
        }
    }

    for label_node in dom.query_attr_eq(&role_attr("select", "value"), group) {
        dom.set_text(label_node, label.as_str());
    }

    if let Some(content) = SELECT.content(dom, group) {
        let item_attr = SELECT.item_attr();
        for item in dom.query_within(content, |d| d.has_attr(&item_attr)) {
            let active = item == chosen;
            if let Some(data) = dom.get_mut(item) {
                data.set_attr(DATA_STATE, if active { STATE_ACTIVE } else { STATE_INACTIVE });
                data.set_attr(ARIA_SELECTED, if active { "true" } else { "false" });
            }
        }
    }
    debug!(group, value = %value, "select value committed");
}

impl Controller for SelectController {
    fn name(&self) -> &'static str {
        "select"
    }

    /// Default every root without a value to its first item, then sync.
    fn hydrate(&mut self, cx: &mut Context<'_>) {
        SELECT.hydrate(cx);
        let root_attr = role_attr("select", "root");
        for root in cx.doc.dom.query_attr(&root_attr) {
            let dom = &cx.doc.dom;
            let Some(group) = dom.attr(root, &root_attr).map(str::to_owned) else {
                continue;
            };
            let declared = dom.attr(root, DATA_VALUE).filter(|v| !v.is_empty()).map(str::to_owned);
            let chosen = match declared {
                Some(value) => item_with_value(cx, &group, &value),
                None => SELECT.content(dom, &group).and_then(|content| {
                    let item_attr = SELECT.item_attr();
                    dom.query_within(content, |d| d.has_attr(&item_attr)).into_iter().next()
                }),
            };
            if let Some(item) = chosen {
                commit(cx, &group, item);
            }
        }
    }

    fn handle(&mut self, cx: &mut Context<'_>, event: &mut DomEvent) {
        match &event.kind {
            EventKind::Click => self.on_click(cx, event.target),
            EventKind::KeyDown(key) => {
                let key = *key;
                self.on_key(cx, event, key);
            }
            EventKind::Resize | EventKind::Scroll => SELECT.reflow(cx),
            _ => {}
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
