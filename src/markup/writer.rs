//! Serialize a [`Dom`] back to markup.
//!
//! Output is compact (no added whitespace). Attributes are written in the
//! order `id`, `class`, then the rest in insertion order; empty attribute
//! values are written bare.

use crate::dom::node::{NodeId, DOCUMENT_TAG};
use crate::dom::tree::Dom;
use crate::markup::parser::VOID_ELEMENTS;

/// Serialize the whole document.
pub fn to_markup(dom: &Dom) -> String {
    dom.root().map(|root| node_to_markup(dom, root)).unwrap_or_default()
}

/// Serialize `node` and its subtree. A `#document` node serializes as its
/// children.
pub fn node_to_markup(dom: &Dom, node: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, node, &mut out);
    out
}

fn write_node(dom: &Dom, node: NodeId, out: &mut String) {
    let Some(data) = dom.get(node) else {
        return;
    };
    if data.is_text() {
        if let Some(text) = &data.text {
            out.push_str(&escape(text, false));
        }
        return;
    }
    if data.tag == DOCUMENT_TAG {
        for &child in dom.children(node) {
            write_node(dom, child, out);
        }
        return;
    }

    out.push('<');
    out.push_str(&data.tag);
    if let Some(id) = &data.id {
        write_attr(out, "id", id);
    }
    if !data.classes.is_empty() {
        write_attr(out, "class", &data.classes.join(" "));
    }
    for (name, value) in data.attributes() {
        write_attr(out, name, value);
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&data.tag.as_str()) {
        return;
    }
    for &child in dom.children(node) {
        write_node(dom, child, out);
    }
    out.push_str("</");
    out.push_str(&data.tag);
    out.push('>');
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    if !value.is_empty() {
        out.push_str("=\"");
        out.push_str(&escape(value, true));
        out.push('"');
    }
}

fn escape(text: &str, in_attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
