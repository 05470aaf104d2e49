//! Targeted document events.
//!
//! A [`DomEvent`] is what controllers see: an [`EventKind`] plus the element
//! it was dispatched at. Listeners may cancel the runtime's default action
//! with [`DomEvent::prevent_default`] or keep later listeners from seeing the
//! event with [`DomEvent::stop_propagation`].

use crate::dom::node::NodeId;
use crate::event::input::KeyEvent;
use crate::widgets::toast::ToastRequest;

/// Name of the custom event that publishes a toast.
pub const TOAST_EVENT: &str = "ui:toast";

// ---------------------------------------------------------------------------
// CustomEvent
// ---------------------------------------------------------------------------

/// Application-defined events dispatched at the window.
#[derive(Debug, Clone)]
pub enum CustomEvent {
    /// `ui:toast`: publish a notification without a reference to the viewport.
    Toast(ToastRequest),
}

impl CustomEvent {
    /// The event name as seen by markup authors.
    pub fn name(&self) -> &'static str {
        match self {
            CustomEvent::Toast(_) => TOAST_EVENT,
        }
    }
}

// ---------------------------------------------------------------------------
// EventKind / Phase
// ---------------------------------------------------------------------------

/// What happened.
#[derive(Debug, Clone)]
pub enum EventKind {
    /// Primary activation of the target (mouse press or synthesized from
    /// Enter/Space on a button).
    Click,
    /// Key pressed while the target had focus.
    KeyDown(KeyEvent),
    /// Pointer entered the target (non-bubbling, like `mouseenter`).
    PointerEnter,
    /// Pointer left the target (non-bubbling, like `mouseleave`).
    PointerLeave,
    /// The target received focus.
    FocusIn,
    /// The target lost focus.
    FocusOut,
    /// The viewport changed size.
    Resize,
    /// The page scrolled.
    Scroll,
    /// An application-defined event.
    Custom(CustomEvent),
}

/// Which listener pass is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    Capture,
    #[default]
    Bubble,
}

// ---------------------------------------------------------------------------
// DomEvent
// ---------------------------------------------------------------------------

/// An event dispatched at an element (or at the window when `target` is `None`).
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub kind: EventKind,
    pub target: Option<NodeId>,
    pub phase: Phase,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    /// Create an event of the given kind.
    pub fn new(kind: EventKind, target: Option<NodeId>) -> Self {
        Self {
            kind,
            target,
            phase: Phase::Bubble,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Click on `target`.
    pub fn click(target: NodeId) -> Self {
        Self::new(EventKind::Click, Some(target))
    }

    /// Key press at `target` (the focused element, if any).
    pub fn key_down(target: Option<NodeId>, key: KeyEvent) -> Self {
        Self::new(EventKind::KeyDown(key), target)
    }

    /// Window-level event without a target.
    pub fn window(kind: EventKind) -> Self {
        Self::new(kind, None)
    }

    /// The key, for `KeyDown` events.
    pub fn key(&self) -> Option<&KeyEvent> {
        match &self.kind {
            EventKind::KeyDown(key) => Some(key),
            _ => None,
        }
    }

    /// Cancel the runtime's default action for this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Keep later listeners from seeing this event.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether the default action was cancelled.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Whether propagation was stopped.
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
