//! Shared machinery for trigger-anchored panels: dropdown, select, popover.
//!
//! A [`Family`] names the role attributes of one widget kind and implements
//! open/close/toggle, outside-click and Escape dismissal, item navigation and
//! reflow against the document. At most one instance per family is open.

use tracing::{debug, trace};

use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::event::dom_event::DomEvent;
use crate::event::input::{Key, KeyEvent};
use crate::focus::FocusChain;
use crate::geometry::Region;
use crate::position::{compute_position, Placement};
use crate::widget::attrs::{
    self, is_disabled, project_visibility, role_attr, ARIA_EXPANDED, DATA_ALIGN, DATA_RETURN_FOCUS, DATA_SIDE,
    DATA_STATE, STYLE,
};
use crate::widget::state::{DismissPolicy, OpenEvent, OpenState};
use crate::widget::traits::Context;

// ---------------------------------------------------------------------------
// Positioning
// ---------------------------------------------------------------------------

/// Position `panel` against `trigger`, honoring the panel's `data-side` and
/// `data-align`, and project the result as its rect and inline style.
pub fn place_panel(cx: &mut Context<'_>, trigger: NodeId, panel: NodeId, defaults: Placement, gap: i32) {
    let dom = &cx.doc.dom;
    let (Some(trigger_data), Some(panel_data)) = (dom.get(trigger), dom.get(panel)) else {
        return;
    };
    let placement = defaults.with_overrides(panel_data.attr(DATA_SIDE), panel_data.attr(DATA_ALIGN));
    let size = panel_data.rect.size();
    let origin = compute_position(
        trigger_data.rect,
        size,
        cx.doc.viewport(),
        placement,
        gap,
        cx.config.viewport_padding,
    );
    if let Some(data) = cx.doc.dom.get_mut(panel) {
        data.rect = Region::new(origin.x, origin.y, size.width, size.height);
        data.set_attr(STYLE, format!("top: {}px; left: {}px", origin.y, origin.x));
    }
}

// ---------------------------------------------------------------------------
// Family
// ---------------------------------------------------------------------------

/// One disclosure widget kind.
#[derive(Debug, Clone, Copy)]
pub struct Family {
    /// Role segment of the attribute names (`"dropdown"`).
    pub role: &'static str,
    /// Whether the panel contains `data-{role}-item` elements.
    pub has_items: bool,
    /// Placement used when the panel declares none.
    pub placement: Placement,
}

impl Family {
    pub fn trigger_attr(&self) -> String {
        role_attr(self.role, "trigger")
    }

    pub fn content_attr(&self) -> String {
        role_attr(self.role, "content")
    }

    pub fn item_attr(&self) -> String {
        role_attr(self.role, "item")
    }

    /// The panel for `group`.
    pub fn content(&self, dom: &Dom, group: &str) -> Option<NodeId> {
        dom.find_attr_eq(&self.content_attr(), group)
    }

    /// Every trigger for `group`, in document order.
    pub fn triggers(&self, dom: &Dom, group: &str) -> Vec<NodeId> {
        dom.query_attr_eq(&self.trigger_attr(), group)
    }

    /// Group ids whose panel is open.
    pub fn open_groups(&self, dom: &Dom) -> Vec<String> {
        let attr = self.content_attr();
        dom.query_attr(&attr)
            .into_iter()
            .filter(|&n| OpenState::from_attr(dom.attr(n, DATA_STATE)).is_open())
            .filter_map(|n| dom.attr(n, &attr).map(str::to_owned))
            .collect()
    }

    pub fn is_open(&self, dom: &Dom, group: &str) -> bool {
        self.content(dom, group)
            .is_some_and(|c| OpenState::from_attr(dom.attr(c, DATA_STATE)).is_open())
    }

    /// Enabled, rendered items inside `content`, in document order.
    pub fn items(&self, dom: &Dom, content: NodeId) -> Vec<NodeId> {
        if !self.has_items {
            return Vec::new();
        }
        let attr = self.item_attr();
        dom.query_within(content, |d| d.has_attr(&attr) && !is_disabled(d))
            .into_iter()
            .filter(|&n| dom.is_rendered(n))
            .collect()
    }

    /// The trigger a panel anchors to: the recorded opener, else the first trigger.
    fn anchor(&self, dom: &Dom, group: &str, content: NodeId) -> Option<NodeId> {
        dom.attr(content, DATA_RETURN_FOCUS)
            .and_then(|id| dom.query_by_id(id))
            .or_else(|| self.triggers(dom, group).into_iter().next())
    }

    fn project_triggers(&self, dom: &mut Dom, group: &str, state: OpenState) {
        for trigger in self.triggers(dom, group) {
            if let Some(data) = dom.get_mut(trigger) {
                data.set_attr(ARIA_EXPANDED, if state.is_open() { "true" } else { "false" });
                data.set_attr(DATA_STATE, state.as_str());
            }
        }
    }

    // ── Open / close ─────────────────────────────────────────────────

    /// Apply `event` to `group`. Returns `true` if the state changed.
    pub fn apply(&self, cx: &mut Context<'_>, group: &str, event: OpenEvent, opener: Option<NodeId>) -> bool {
        let Some(content) = self.content(&cx.doc.dom, group) else {
            trace!(role = self.role, group, "no panel for group");
            return false;
        };
        let current = OpenState::from_attr(cx.doc.dom.attr(content, DATA_STATE));
        let policy = cx
            .doc
            .dom
            .get(content)
            .map_or(DismissPolicy::ALWAYS, |data| DismissPolicy::from_node(data, DismissPolicy::ALWAYS));
        let next = current.transition(event, policy);
        if next == current {
            return false;
        }
        match next {
            OpenState::Open => self.show(cx, group, content, opener),
            OpenState::Closed => {
                // An outside click that focused another element keeps it.
                let return_focus = match event {
                    OpenEvent::OutsideClick => cx
                        .doc
                        .focused()
                        .is_none_or(|focused| cx.doc.dom.is_inclusive_ancestor(content, focused)),
                    _ => true,
                };
                self.hide(cx, group, content, return_focus);
            }
        }
        true
    }

    pub fn open(&self, cx: &mut Context<'_>, group: &str, opener: Option<NodeId>) -> bool {
        self.apply(cx, group, OpenEvent::Open, opener)
    }

    /// Close and return focus to the trigger.
    pub fn close(&self, cx: &mut Context<'_>, group: &str) -> bool {
        self.apply(cx, group, OpenEvent::Close, None)
    }

    pub fn toggle(&self, cx: &mut Context<'_>, group: &str, opener: Option<NodeId>) -> bool {
        self.apply(cx, group, OpenEvent::Toggle, opener)
    }

    fn show(&self, cx: &mut Context<'_>, group: &str, content: NodeId, opener: Option<NodeId>) {
        for other in self.open_groups(&cx.doc.dom) {
            if other != group {
                if let Some(panel) = self.content(&cx.doc.dom, &other) {
                    self.hide(cx, &other, panel, false);
                }
            }
        }

        let opener = opener.or_else(|| self.triggers(&cx.doc.dom, group).into_iter().next());
        if let Some(trigger) = opener {
            let prefix = format!("{}-trigger", self.role);
            if let Some(id) = cx.doc.ensure_id(trigger, &prefix) {
                cx.doc.dom.set_attr(content, DATA_RETURN_FOCUS, id);
            }
        }

        project_visibility(&mut cx.doc.dom, content, attrs::STATE_OPEN, true);
        self.project_triggers(&mut cx.doc.dom, group, OpenState::Open);
        if let Some(trigger) = opener {
            let gap = cx.config.floating_gap;
            place_panel(cx, trigger, content, self.placement, gap);
        }
        debug!(role = self.role, group, "opened");

        let target = self
            .items(&cx.doc.dom, content)
            .into_iter()
            .next()
            .or_else(|| FocusChain::within(&cx.doc.dom, content, None).first())
            .unwrap_or(content);
        cx.doc.focus(target);
    }

    fn hide(&self, cx: &mut Context<'_>, group: &str, content: NodeId, return_focus: bool) {
        let anchor = self.anchor(&cx.doc.dom, group, content);
        project_visibility(&mut cx.doc.dom, content, attrs::STATE_CLOSED, false);
        self.project_triggers(&mut cx.doc.dom, group, OpenState::Closed);
        if let Some(data) = cx.doc.dom.get_mut(content) {
            data.remove_attr(DATA_RETURN_FOCUS);
        }
        debug!(role = self.role, group, return_focus, "closed");
        if return_focus {
            if let Some(trigger) = anchor {
                cx.doc.focus(trigger);
            }
        }
    }

    // ── Dismissal ────────────────────────────────────────────────────

    /// Close every open panel the click landed outside of. Focus returns to
    /// the trigger unless the click focused something else.
    pub fn close_outside(&self, cx: &mut Context<'_>, target: Option<NodeId>) {
        for group in self.open_groups(&cx.doc.dom) {
            let dom = &cx.doc.dom;
            let inside = target.is_some_and(|t| {
                self.content(dom, &group)
                    .is_some_and(|c| dom.is_inclusive_ancestor(c, t))
                    || self
                        .triggers(dom, &group)
                        .into_iter()
                        .any(|trigger| dom.is_inclusive_ancestor(trigger, t))
            });
            if !inside {
                self.apply(cx, &group, OpenEvent::OutsideClick, None);
            }
        }
    }

    /// Escape: close the open panel and keep the event from reaching
    /// enclosing widgets. Returns `true` if something closed.
    pub fn escape(&self, cx: &mut Context<'_>, event: &mut DomEvent) -> bool {
        let mut closed = false;
        for group in self.open_groups(&cx.doc.dom) {
            closed |= self.apply(cx, &group, OpenEvent::Escape, None);
        }
        if closed {
            event.stop_propagation();
            event.prevent_default();
        }
        closed
    }

    // ── Keyboard ─────────────────────────────────────────────────────

    /// ArrowDown on a trigger: open, or move into an already open panel.
    pub fn trigger_key(&self, cx: &mut Context<'_>, trigger: NodeId, group: &str, key: &KeyEvent) -> bool {
        if key.code != Key::Down || attrs::node_disabled(&cx.doc.dom, trigger) {
            return false;
        }
        if !self.open(cx, group, Some(trigger)) {
            if let Some(content) = self.content(&cx.doc.dom, group) {
                if let Some(&first) = self.items(&cx.doc.dom, content).first() {
                    cx.doc.focus(first);
                }
            }
        }
        true
    }

    /// Arrow/Home/End/typeahead among the items of an open panel.
    pub fn item_key(&self, cx: &mut Context<'_>, content: NodeId, key: &KeyEvent) -> bool {
        let dom = &cx.doc.dom;
        let items = self.items(dom, content);
        let Some(last) = items.len().checked_sub(1) else {
            return false;
        };
        let current = cx
            .doc
            .focused()
            .and_then(|f| items.iter().position(|&item| dom.is_inclusive_ancestor(item, f)));
        let next = match key.code {
            Key::Down => current.map_or(0, |i| (i + 1).min(last)),
            Key::Up => current.map_or(last, |i| i.saturating_sub(1)),
            Key::Home => 0,
            Key::End => last,
            _ => match key.printable() {
                Some(c) => match typeahead(dom, &items, c) {
                    Some(idx) => idx,
                    None => return true,
                },
                None => return false,
            },
        };
        cx.doc.focus(items[next]);
        true
    }

    // ── Hydration / reflow ───────────────────────────────────────────

    /// Project markup-declared state: hide closed panels, sync triggers.
    pub fn hydrate(&self, cx: &mut Context<'_>) {
        let attr = self.content_attr();
        for content in cx.doc.dom.query_attr(&attr) {
            let Some(group) = cx.doc.dom.attr(content, &attr).map(str::to_owned) else {
                continue;
            };
            let state = OpenState::from_attr(cx.doc.dom.attr(content, DATA_STATE));
            project_visibility(&mut cx.doc.dom, content, state.as_str(), state.is_open());
            self.project_triggers(&mut cx.doc.dom, &group, state);
        }
        self.reflow(cx);
    }

    /// Reposition every open panel.
    pub fn reflow(&self, cx: &mut Context<'_>) {
        for group in self.open_groups(&cx.doc.dom) {
            let Some(content) = self.content(&cx.doc.dom, &group) else {
                continue;
            };
            if let Some(trigger) = self.anchor(&cx.doc.dom, &group, content) {
                let gap = cx.config.floating_gap;
                place_panel(cx, trigger, content, self.placement, gap);
            }
        }
    }
}

/// Index of the first item whose text starts with `c`, case-insensitively.
pub fn typeahead(dom: &Dom, items: &[NodeId], c: char) -> Option<usize> {
    let needle: String = c.to_lowercase().collect();
    items
        .iter()
        .position(|&item| dom.text_content(item).to_lowercase().starts_with(&needle))
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
    use crate::position::{Align, Side};
    use crate::widget::fixture::Fixture;

    const MENU: Family = Family {
        role: "dropdown",
        has_items: true,
        placement: Placement::new(Side::Bottom, Align::Start),
    };

    const MARKUP: &str = r#"<body>
        <button id="a-btn" data-dropdown-trigger="a">A</button>
        <div data-dropdown-content="a" data-state="closed" class="hidden">
            <div data-dropdown-item tabindex="-1">Edit</div>
            <div data-dropdown-item tabindex="-1" data-disabled>Archive</div>
            <div data-dropdown-item tabindex="-1">Delete</div>
        </div>
        <button data-dropdown-trigger="b">B</button>
        <div data-dropdown-content="b" data-state="closed" class="hidden"></div>
        <button data-dropdown-trigger="c">C</button>
        <div data-dropdown-content="c" data-state="closed" class="hidden" data-dismissible="false"></div>
        <p id="elsewhere">text</p>
    </body>"#;

    fn fixture() -> Fixture {
        let mut doc = Document::new(parse(MARKUP).unwrap(), Size::new(400, 300));
        let trigger = doc.element_by_id("a-btn").unwrap();
        doc.set_rect(trigger, Region::new(20, 20, 60, 20));
        let content = doc.dom.find_attr_eq("data-dropdown-content", "a").unwrap();
        doc.set_rect(content, Region::new(0, 0, 120, 90));
        Fixture::new(doc)
    }

    fn content(fx: &Fixture, group: &str) -> NodeId {
        fx.doc.dom.find_attr_eq("data-dropdown-content", group).unwrap()
    }

    #[test]
    fn open_projects_state_positions_and_focuses_first_item() {
        let mut fx = fixture();
        assert!(MENU.open(&mut fx.cx(), "a", None));
        let panel = content(&fx, "a");
        let dom = &fx.doc.dom;
        assert_eq!(dom.attr(panel, DATA_STATE), Some("open"));
        assert!(!dom.get(panel).unwrap().is_hidden());
        assert_eq!(dom.attr(panel, STYLE), Some("top: 48px; left: 20px"));
        let trigger = fx.doc.element_by_id("a-btn").unwrap();
        assert_eq!(dom.attr(trigger, ARIA_EXPANDED), Some("true"));
        assert_eq!(fx.doc.dom.text_content(fx.doc.focused().unwrap()), "Edit");
    }

    #[test]
    fn opening_one_closes_the_other() {
        let mut fx = fixture();
        MENU.open(&mut fx.cx(), "a", None);
        MENU.open(&mut fx.cx(), "b", None);
        assert!(!MENU.is_open(&fx.doc.dom, "a"));
        assert!(MENU.is_open(&fx.doc.dom, "b"));
        assert_eq!(MENU.open_groups(&fx.doc.dom), vec!["b".to_owned()]);
    }

    #[test]
    fn close_returns_focus_to_opener() {
        let mut fx = fixture();
        MENU.open(&mut fx.cx(), "a", None);
        assert!(MENU.close(&mut fx.cx(), "a"));
        assert_eq!(fx.doc.focused_id(), Some("a-btn"));
        assert_eq!(fx.doc.dom.attr(content(&fx, "a"), DATA_RETURN_FOCUS), None);
        assert!(!MENU.close(&mut fx.cx(), "a"));
    }

    #[test]
    fn outside_click_on_text_returns_focus_to_trigger() {
        let mut fx = fixture();
        MENU.open(&mut fx.cx(), "a", None);
        let elsewhere = fx.doc.element_by_id("elsewhere").unwrap();
        fx.doc.blur();
        MENU.close_outside(&mut fx.cx(), Some(elsewhere));
        assert!(!MENU.is_open(&fx.doc.dom, "a"));
        assert_eq!(fx.doc.focused_id(), Some("a-btn"));
    }

    #[test]
    fn outside_click_on_focusable_keeps_its_focus() {
        let mut fx = fixture();
        MENU.open(&mut fx.cx(), "a", None);
        let other = fx.doc.dom.find_attr_eq("data-dropdown-trigger", "b").unwrap();
        fx.doc.focus(other);
        MENU.close_outside(&mut fx.cx(), Some(other));
        assert!(!MENU.is_open(&fx.doc.dom, "a"));
        assert_eq!(fx.doc.focused(), Some(other));
    }

    #[test]
    fn non_dismissible_panel_ignores_outside_click() {
        let mut fx = fixture();
        MENU.open(&mut fx.cx(), "c", None);
        let elsewhere = fx.doc.element_by_id("elsewhere").unwrap();
        MENU.close_outside(&mut fx.cx(), Some(elsewhere));
        assert!(MENU.is_open(&fx.doc.dom, "c"));
        assert!(MENU.close(&mut fx.cx(), "c"));
    }

    #[test]
    fn click_inside_panel_is_not_outside() {
        let mut fx = fixture();
        MENU.open(&mut fx.cx(), "a", None);
        let panel = content(&fx, "a");
        MENU.close_outside(&mut fx.cx(), Some(panel));
        assert!(MENU.is_open(&fx.doc.dom, "a"));
    }

    #[test]
    fn item_navigation_clamps_and_skips_disabled() {
        let mut fx = fixture();
        MENU.open(&mut fx.cx(), "a", None);
        let panel = content(&fx, "a");
        let down = KeyEvent::plain(Key::Down);
        MENU.item_key(&mut fx.cx(), panel, &down);
        assert_eq!(fx.doc.dom.text_content(fx.doc.focused().unwrap()), "Delete");
        MENU.item_key(&mut fx.cx(), panel, &down);
        assert_eq!(fx.doc.dom.text_content(fx.doc.focused().unwrap()), "Delete");
        MENU.item_key(&mut fx.cx(), panel, &KeyEvent::plain(Key::Home));
        assert_eq!(fx.doc.dom.text_content(fx.doc.focused().unwrap()), "Edit");
        MENU.item_key(&mut fx.cx(), panel, &KeyEvent::plain(Key::Up));
        assert_eq!(fx.doc.dom.text_content(fx.doc.focused().unwrap()), "Edit");
    }

    #[test]
    fn typeahead_is_case_insensitive() {
        let mut fx = fixture();
        MENU.open(&mut fx.cx(), "a", None);
        let panel = content(&fx, "a");
        MENU.item_key(&mut fx.cx(), panel, &KeyEvent::plain(Key::Char('D')));
        assert_eq!(fx.doc.dom.text_content(fx.doc.focused().unwrap()), "Delete");
        // Disabled items never match.
        MENU.item_key(&mut fx.cx(), panel, &KeyEvent::plain(Key::Char('a')));
        assert_eq!(fx.doc.dom.text_content(fx.doc.focused().unwrap()), "Delete");
    }

    #[test]
    fn unknown_group_is_a_no_op() {
        let mut fx = fixture();
        assert!(!MENU.open(&mut fx.cx(), "missing", None));
        assert!(!MENU.close(&mut fx.cx(), "missing"));
        assert!(fx.doc.focused().is_none());
    }

    #[test]
    fn reflow_follows_trigger() {
        let mut fx = fixture();
        MENU.open(&mut fx.cx(), "a", None);
        let trigger = fx.doc.element_by_id("a-btn").unwrap();
        fx.doc.set_rect(trigger, Region::new(100, 50, 60, 20));
        MENU.reflow(&mut fx.cx());
        assert_eq!(fx.doc.dom.attr(content(&fx, "a"), STYLE), Some("top: 78px; left: 100px"));
    }
}
