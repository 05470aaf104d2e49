//! Attribute contract shared by the controllers.
//!
//! Role attributes follow `data-{role}-{part}="<group id>"`; the group id ties
//! a trigger to its content. State is projected onto `data-state` and the
//! `hidden` class.

use crate::dom::node::{NodeData, NodeId};
use crate::dom::tree::Dom;

pub const DATA_STATE: &str = "data-state";
pub const STATE_OPEN: &str = "open";
pub const STATE_CLOSED: &str = "closed";
pub const STATE_ACTIVE: &str = "active";
pub const STATE_INACTIVE: &str = "inactive";

pub const DATA_RETURN_FOCUS: &str = "data-return-focus";
pub const DATA_SIDE: &str = "data-side";
pub const DATA_ALIGN: &str = "data-align";
pub const DATA_DISABLED: &str = "data-disabled";
pub const DATA_VALUE: &str = "data-value";
pub const DATA_NAME: &str = "data-name";
pub const DATA_HREF: &str = "data-href";
pub const DATA_TOAST_TITLE: &str = "data-toast-title";
pub const DATA_TOAST_DESCRIPTION: &str = "data-toast-description";
pub const DATA_DISMISSIBLE: &str = "data-dismissible";
pub const DATA_CLOSE_ON_ESC: &str = "data-close-on-esc";
pub const DATA_CLOSE_ON_OVERLAY: &str = "data-close-on-overlay";

pub const ARIA_EXPANDED: &str = "aria-expanded";
pub const ARIA_SELECTED: &str = "aria-selected";
pub const TABINDEX: &str = "tabindex";
pub const STYLE: &str = "style";

/// `data-{role}-{part}`.
pub fn role_attr(role: &str, part: &str) -> String {
    format!("data-{role}-{part}")
}

/// Parse a boolean-string attribute.
///
/// A present attribute with an empty value counts as `true`, like an HTML
/// boolean attribute. Unrecognized values fall back to `default`.
pub fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(str::trim) {
        Some("" | "true") => true,
        Some("false") => false,
        _ => default,
    }
}

/// Whether an element is disabled natively or through `data-disabled`.
pub fn is_disabled(data: &NodeData) -> bool {
    data.disabled || (data.has_attr(DATA_DISABLED) && parse_bool(data.attr(DATA_DISABLED), true))
}

/// Whether `node` exists and is disabled.
pub fn node_disabled(dom: &Dom, node: NodeId) -> bool {
    dom.get(node).is_some_and(is_disabled)
}

/// Write `data-state` and toggle the hidden class.
pub fn project_visibility(dom: &mut Dom, node: NodeId, state: &str, visible: bool) {
    if let Some(data) = dom.get_mut(node) {
        data.set_attr(DATA_STATE, state);
        data.set_hidden(!visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_attr_format() {
        assert_eq!(role_attr("alert-dialog", "root"), "data-alert-dialog-root");
    }

    #[test]
    fn bool_parsing() {
        assert!(parse_bool(Some(""), false));
        assert!(parse_bool(Some("true"), false));
        assert!(!parse_bool(Some("false"), true));
        assert!(parse_bool(Some("maybe"), true));
        assert!(!parse_bool(None, false));
    }

    #[test]
    fn disabled_variants() {
        assert!(is_disabled(&NodeData::new("button").disabled(true)));
        assert!(is_disabled(&NodeData::new("div").with_attr(DATA_DISABLED, "")));
        assert!(!is_disabled(&NodeData::new("div").with_attr(DATA_DISABLED, "false")));
        assert!(!is_disabled(&NodeData::new("div")));
    }

    #[test]
    fn visibility_projection() {
        let mut dom = Dom::new();
        let panel = dom.insert(NodeData::new("div").with_class("hidden"));
        project_visibility(&mut dom, panel, STATE_OPEN, true);
        assert_eq!(dom.attr(panel, DATA_STATE), Some("open"));
        assert!(!dom.get(panel).unwrap().is_hidden());
        project_visibility(&mut dom, panel, STATE_CLOSED, false);
        assert!(dom.get(panel).unwrap().is_hidden());
    }
}
