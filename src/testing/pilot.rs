//! Pilot: programmatic interaction with a headless runtime.
//!
//! The `Pilot` wraps a [`Runtime`] built from markup and provides methods to
//! simulate user input by element id (clicks, hovers, key presses), advance
//! the virtual clock, and read back the attributes the controllers project.

use std::time::Duration;

use crate::config::RuntimeConfig;
use crate::dom::node::NodeId;
use crate::event::input::{InputEvent, Key, KeyEvent, Modifiers, MouseAction, MouseBtn, MouseEvent};
use crate::geometry::{Region, Size};
use crate::markup::{node_to_markup, to_markup, MarkupError};
use crate::runtime::Runtime;

/// Viewport used when none is given.
pub const DEFAULT_VIEWPORT: Size = Size::new(1024, 768);

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless runtime driver for testing.
///
/// # Examples
///
/// ```
/// use gilt_headless::testing::Pilot;
///
/// let mut pilot = Pilot::new(r#"
///     <button id="open" data-popover-trigger="p">Open</button>
///     <div id="panel" data-popover-content="p" data-state="closed"><a href="/x" id="link">x</a></div>
/// "#).unwrap();
/// pilot.click("open");
/// assert_eq!(pilot.state("panel").as_deref(), Some("open"));
/// assert_eq!(pilot.focused_id().as_deref(), Some("link"));
/// ```
pub struct Pilot {
    runtime: Runtime,
}

impl Pilot {
    /// Parse `markup` and set up a runtime with the default viewport and config.
    pub fn new(markup: &str) -> Result<Self, MarkupError> {
        Self::with_config(markup, DEFAULT_VIEWPORT, RuntimeConfig::default())
    }

    /// Parse `markup` with an explicit viewport and config.
    pub fn with_config(markup: &str, viewport: Size, config: RuntimeConfig) -> Result<Self, MarkupError> {
        Ok(Self {
            runtime: Runtime::from_markup_with(markup, viewport, config)?,
        })
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Click the element with id `id`. Returns `false` if there is none.
    pub fn click(&mut self, id: &str) -> bool {
        match self.node(id) {
            Some(node) => {
                self.runtime.click(node);
                true
            }
            None => false,
        }
    }

    /// Simulate a left-button mouse press at (x, y).
    pub fn click_at(&mut self, x: u16, y: u16) {
        self.mouse(MouseAction::Down(MouseBtn::Left), x, y);
    }

    /// Move the pointer onto the element with id `id`.
    pub fn hover(&mut self, id: &str) -> bool {
        match self.node(id) {
            Some(node) => {
                self.runtime.hover(Some(node));
                true
            }
            None => false,
        }
    }

    /// Simulate pointer motion to (x, y).
    pub fn hover_at(&mut self, x: u16, y: u16) {
        self.mouse(MouseAction::Moved, x, y);
    }

    /// Move the pointer off the document.
    pub fn unhover(&mut self) {
        self.runtime.hover(None);
    }

    /// Simulate a key press with no modifiers.
    pub fn press_key(&mut self, key: Key) {
        self.runtime.handle_input(InputEvent::Key(KeyEvent::new(key, Modifiers::NONE)));
    }

    /// Simulate a key press with the given modifiers.
    pub fn press_key_with(&mut self, key: Key, modifiers: Modifiers) {
        self.runtime.handle_input(InputEvent::Key(KeyEvent::new(key, modifiers)));
    }

    /// Press each character of `text` in turn.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.press_key(Key::Char(ch));
        }
    }

    /// Focus the element with id `id` directly.
    pub fn focus(&mut self, id: &str) -> bool {
        match self.node(id) {
            Some(node) => self.runtime.focus(node),
            None => false,
        }
    }

    /// Simulate a terminal resize.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.runtime.handle_input(InputEvent::Resize { width, height });
    }

    /// Simulate a page scroll.
    pub fn scroll(&mut self) {
        self.runtime.scroll();
    }

    fn mouse(&mut self, kind: MouseAction, x: u16, y: u16) {
        self.runtime.handle_input(InputEvent::Mouse(MouseEvent {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
        }));
    }

    // ── Time ─────────────────────────────────────────────────────────

    /// Advance the virtual clock by `ms` milliseconds.
    pub fn advance_ms(&mut self, ms: u64) {
        self.runtime.advance(Duration::from_millis(ms));
    }

    // ── Layout ───────────────────────────────────────────────────────

    /// Give the element with id `id` a layout rectangle.
    pub fn set_rect(&mut self, id: &str, rect: Region) -> bool {
        match self.node(id) {
            Some(node) => {
                self.runtime.doc.set_rect(node, rect);
                true
            }
            None => false,
        }
    }

    /// Layout rectangle of the element with id `id`.
    pub fn rect(&self, id: &str) -> Option<Region> {
        self.node(id)
            .and_then(|node| self.runtime.doc.dom.get(node))
            .map(|data| data.rect)
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Look up an element by id.
    pub fn node(&self, id: &str) -> Option<NodeId> {
        self.runtime.doc.element_by_id(id)
    }

    /// Attribute `name` of the element with id `id`.
    pub fn attr(&self, id: &str, name: &str) -> Option<String> {
        self.node(id)
            .and_then(|node| self.runtime.doc.dom.attr(node, name))
            .map(str::to_owned)
    }

    /// `data-state` of the element with id `id`.
    pub fn state(&self, id: &str) -> Option<String> {
        self.attr(id, "data-state")
    }

    /// Whether the element with id `id` carries the hidden class.
    pub fn is_hidden(&self, id: &str) -> bool {
        self.node(id)
            .and_then(|node| self.runtime.doc.dom.get(node))
            .is_some_and(|data| data.is_hidden())
    }

    /// Text content of the element with id `id`.
    pub fn text(&self, id: &str) -> Option<String> {
        self.node(id).map(|node| self.runtime.doc.dom.text_content(node))
    }

    /// Element id of the focused element.
    pub fn focused_id(&self) -> Option<String> {
        self.runtime.doc.focused_id().map(str::to_owned)
    }

    /// Serialize the whole document.
    pub fn markup(&self) -> String {
        to_markup(&self.runtime.doc.dom)
    }

    /// Serialize the element with id `id` and its subtree.
    pub fn markup_of(&self, id: &str) -> Option<String> {
        self.node(id).map(|node| node_to_markup(&self.runtime.doc.dom, node))
    }

    /// Borrow the underlying runtime immutably.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Borrow the underlying runtime mutably.
    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtime
    }
}

// ===========================================================================
// Tests
// ===========================================================================
