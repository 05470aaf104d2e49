//! Event system: raw input, targeted document events, dispatch queue.

pub mod dom_event;
pub mod handler;
pub mod input;

pub use dom_event::{CustomEvent, DomEvent, EventKind, Phase, TOAST_EVENT};
pub use handler::EventDispatcher;
pub use input::{InputEvent, Key, KeyEvent, Modifiers, MouseAction, MouseBtn, MouseEvent};
