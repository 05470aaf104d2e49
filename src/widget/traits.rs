//! Controller trait: hydrate, listen, fire timers.
//!
//! A controller is one widget family's document-level listener. It holds no
//! references to elements: every handler resolves its widget from the event
//! target by ancestor search, reads state from attributes and writes the new
//! state back. Whatever a controller needs from the runtime arrives through
//! [`Context`].

use crate::config::RuntimeConfig;
use crate::document::Document;
use crate::event::dom_event::DomEvent;
use crate::timer::{TimerAction, TimerQueue};
use crate::widgets::toast::ToastBus;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Borrowed runtime state handed to every controller call.
pub struct Context<'a> {
    pub doc: &'a mut Document,
    pub timers: &'a mut TimerQueue,
    pub toasts: &'a mut ToastBus,
    pub config: &'a RuntimeConfig,
}

// ---------------------------------------------------------------------------
// Controller trait
// ---------------------------------------------------------------------------

/// A widget family's listener set.
///
/// Object-safe: the runtime keeps controllers behind `&mut dyn Controller`
/// and calls them in registration order.
pub trait Controller {
    /// Registry key, also used in log output (`"dialog"`, `"tabs"`).
    fn name(&self) -> &'static str;

    /// Re-apply markup-derived initial state. Runs on every setup pass.
    fn hydrate(&mut self, _cx: &mut Context<'_>) {}

    /// Capture-phase listener. Runs before any bubble listener.
    fn capture(&mut self, _cx: &mut Context<'_>, _event: &mut DomEvent) {}

    /// Bubble-phase listener.
    fn handle(&mut self, cx: &mut Context<'_>, event: &mut DomEvent);

    /// A timer fired. Returns `true` if this controller owned it.
    fn on_timer(&mut self, _cx: &mut Context<'_>, _action: &TimerAction) -> bool {
        false
    }

    /// Runs after each dispatch cycle, once the event queue is empty.
    fn flush(&mut self, _cx: &mut Context<'_>) {}
}
