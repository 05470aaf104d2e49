//! # gilt-headless
//!
//! A headless, attribute-driven runtime for interactive widgets in
//! server-rendered markup.
//!
//! Markup declares widgets with `data-{role}-{part}="<group id>"` attributes;
//! the runtime attaches one controller per widget kind, routes input to them
//! and projects state back as attributes (`data-state`, `aria-*`, the `hidden`
//! class, inline position styles). Nothing is rendered; the host reads the
//! document.
//!
//! ## Core Systems
//!
//! - **[`dom`]**: slotmap-backed element arena with attribute queries
//! - **[`markup`]**: logos-tokenized markup loader and serializer
//! - **[`document`]**: focus, hover, viewport, scroll lock, generated ids
//! - **[`event`]**: input events, targeted document events, the event queue
//! - **[`widget`]**: controller trait, attribute contract, open/closed state machine
//! - **[`widgets`]**: Dialog/AlertDialog, Dropdown, Select, Popover, Tooltip, Tabs, Toasts
//! - **[`position`]**: floating panel placement with viewport clamping
//! - **[`timer`]**: virtual-clock timer queue for delays
//! - **[`runtime`]**: the runtime tying everything together
//! - **[`driver`]**: tokio event loop over an input channel
//! - **[`testing`]**: headless `Pilot` for driving a runtime by element id

// Foundation
pub mod config;
pub mod geometry;

// Core systems
pub mod document;
pub mod dom;
pub mod focus;
pub mod markup;
pub mod position;
pub mod timer;

// Controllers
pub mod init;
pub mod widget;
pub mod widgets;

// Events
pub mod event;

// Runtime
pub mod driver;
pub mod runtime;

// Testing
pub mod testing;

pub use config::RuntimeConfig;
pub use markup::MarkupError;
pub use runtime::Runtime;
