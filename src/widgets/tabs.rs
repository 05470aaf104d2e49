//! Tabs: one active trigger per group, roving tabindex, matching panel shown.

use tracing::{debug, trace};

use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::event::dom_event::{DomEvent, EventKind};
use crate::event::input::{Key, KeyEvent};
use crate::widget::attrs::{
    node_disabled, project_visibility, role_attr, ARIA_SELECTED, DATA_STATE, DATA_VALUE, STATE_ACTIVE,
    STATE_INACTIVE, TABINDEX,
};
use crate::widget::traits::{Context, Controller};

fn root_attr() -> String {
    role_attr("tabs", "root")
}

fn trigger_attr() -> String {
    role_attr("tabs", "trigger")
}

fn content_attr() -> String {
    role_attr("tabs", "content")
}

fn triggers(dom: &Dom, group: &str) -> Vec<NodeId> {
    dom.query_attr_eq(&trigger_attr(), group)
}

fn trigger_with_value(dom: &Dom, group: &str, value: &str) -> Option<NodeId> {
    triggers(dom, group)
        .into_iter()
        .find(|&t| dom.attr(t, DATA_VALUE) == Some(value))
}

/// Listener for `data-tabs-*` markup.
#[derive(Debug, Default)]
pub struct TabsController;

impl TabsController {
    pub fn new() -> Self {
        Self
    }

    /// Active value of `group`.
    pub fn value<'d>(&self, dom: &'d Dom, group: &str) -> Option<&'d str> {
        let root = dom.find_attr_eq(&root_attr(), group)?;
        dom.attr(root, DATA_VALUE)
    }

    /// Activate the trigger whose `data-value` is `value`. Returns `false`
    /// if there is no such trigger or it is disabled.
    pub fn select(&mut self, cx: &mut Context<'_>, group: &str, value: &str) -> bool {
        match trigger_with_value(&cx.doc.dom, group, value) {
            Some(trigger) if !node_disabled(&cx.doc.dom, trigger) => {
                activate(cx, group, value);
                true
            }
            _ => {
                trace!(group, value, "no enabled tab with value");
                false
            }
        }
    }

    fn on_click(&mut self, cx: &mut Context<'_>, target: Option<NodeId>) {
        let Some(target) = target else {
            return;
        };
        let dom = &cx.doc.dom;
        let Some((trigger, group)) = dom.closest_attr(target, &trigger_attr()) else {
            return;
        };
        if node_disabled(dom, trigger) {
            return;
        }
        if let Some(value) = dom.attr(trigger, DATA_VALUE).map(str::to_owned) {
            activate(cx, &group, &value);
        }
    }

    /// Arrow keys move focus among enabled triggers; activation waits for
    /// Enter/Space or a click.
    fn on_key(&mut self, cx: &mut Context<'_>, event: &mut DomEvent, key: KeyEvent) {
        let Some(target) = event.target else {
            return;
        };
        let dom = &cx.doc.dom;
        let Some((trigger, group)) = dom.closest_attr(target, &trigger_attr()) else {
            return;
        };
        let enabled: Vec<NodeId> = triggers(dom, &group)
            .into_iter()
            .filter(|&t| !node_disabled(dom, t))
            .collect();
        let Some(last) = enabled.len().checked_sub(1) else {
            return;
        };
        let current = enabled.iter().position(|&t| t == trigger);
        let next = match key.code {
            Key::Right => current.map_or(0, |i| if i == last { 0 } else { i + 1 }),
            Key::Left => current.map_or(last, |i| if i == 0 { last } else { i - 1 }),
            Key::Home => 0,
            Key::End => last,
            _ => return,
        };
        cx.doc.focus(enabled[next]);
        event.prevent_default();
    }
}

/// Project `value` as the active tab of `group`.
fn activate(cx: &mut Context<'_>, group: &str, value: &str) {
    let dom = &mut cx.doc.dom;
    if let Some(root) = dom.find_attr_eq(&root_attr(), group) {
        dom.set_attr(root, DATA_VALUE, value);
    }
    for trigger in triggers(dom, group) {
        let active = dom.attr(trigger, DATA_VALUE) == Some(value);
        if let Some(data) = dom.get_mut(trigger) {
            data.set_attr(DATA_STATE, if active { STATE_ACTIVE } else { STATE_INACTIVE });
            data.set_attr(ARIA_SELECTED, if active { "true" } else { "false" });
            data.set_attr(TABINDEX, if active { "0" } else { "-1" });
        }
    }
    for panel in dom.query_attr_eq(&content_attr(), group) {
        let active = dom.attr(panel, DATA_VALUE) == Some(value);
        project_visibility(dom, panel, if active { STATE_ACTIVE } else { STATE_INACTIVE }, active);
    }
    debug!(group, value, "tab activated");
}

impl Controller for TabsController {
    fn name(&self) -> &'static str {
        "tabs"
    }

    /// Activate the root's declared value when a trigger carries it,
    /// otherwise the first enabled trigger.
    fn hydrate(&mut self, cx: &mut Context<'_>) {
        let attr = root_attr();
        for root in cx.doc.dom.query_attr(&attr) {
            let dom = &cx.doc.dom;
            let Some(group) = dom.attr(root, &attr).map(str::to_owned) else {
                continue;
            };
            let declared = dom
                .attr(root, DATA_VALUE)
                .filter(|v| trigger_with_value(dom, &group, v).is_some())
                .map(str::to_owned);
            let value = declared.or_else(|| {
                triggers(dom, &group)
                    .into_iter()
                    .find(|&t| !node_disabled(dom, t))
                    .and_then(|t| dom.attr(t, DATA_VALUE).map(str::to_owned))
            });
            match value {
                Some(value) => activate(cx, &group, &value),
                None => trace!(group = %group, "tabs group without triggers"),
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
            _ => {}
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
