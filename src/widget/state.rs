//! Open/closed state machine shared by modals and disclosures.
//!
//! State lives in the document (`data-state`); [`OpenState::from_attr`] reads
//! it, [`OpenState::transition`] decides the next state, and the controller
//! projects the result back. A [`DismissPolicy`] gates the dismissal events.

use crate::dom::node::NodeData;

use super::attrs::{parse_bool, DATA_CLOSE_ON_ESC, DATA_CLOSE_ON_OVERLAY, DATA_DISMISSIBLE, STATE_CLOSED, STATE_OPEN};

/// Whether a widget instance is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenState {
    #[default]
    Closed,
    Open,
}

/// What was requested of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenEvent {
    /// Trigger activation or programmatic open.
    Open,
    /// Trigger activation on a toggling widget.
    Toggle,
    /// Explicit close: close/action element, item selection, programmatic.
    Close,
    /// Escape key.
    Escape,
    /// Click outside the panel and its trigger.
    OutsideClick,
    /// Click on a modal overlay.
    OverlayClick,
}

impl OpenState {
    /// Read `data-state`. Anything other than `open` is closed.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some(STATE_OPEN) => OpenState::Open,
            _ => OpenState::Closed,
        }
    }

    /// The `data-state` value.
    pub fn as_str(self) -> &'static str {
        match self {
            OpenState::Open => STATE_OPEN,
            OpenState::Closed => STATE_CLOSED,
        }
    }

    pub fn is_open(self) -> bool {
        self == OpenState::Open
    }

    /// Next state for `event` under `policy`.
    pub fn transition(self, event: OpenEvent, policy: DismissPolicy) -> Self {
        match (self, event) {
            (_, OpenEvent::Open) => OpenState::Open,
            (OpenState::Open, OpenEvent::Toggle) => OpenState::Closed,
            (OpenState::Closed, OpenEvent::Toggle) => OpenState::Open,
            (_, OpenEvent::Close) => OpenState::Closed,
            (OpenState::Open, OpenEvent::Escape) if policy.allows_escape() => OpenState::Closed,
            (OpenState::Open, OpenEvent::OutsideClick) if policy.dismissible => OpenState::Closed,
            (OpenState::Open, OpenEvent::OverlayClick) if policy.close_on_overlay => OpenState::Closed,
            (state, _) => state,
        }
    }
}

// ---------------------------------------------------------------------------
// DismissPolicy
// ---------------------------------------------------------------------------

/// Which dismissal gestures may close a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissPolicy {
    pub dismissible: bool,
    pub close_on_esc: bool,
    pub close_on_overlay: bool,
}

impl DismissPolicy {
    /// Every gesture closes. Dialog and disclosure default.
    pub const ALWAYS: DismissPolicy = DismissPolicy {
        dismissible: true,
        close_on_esc: true,
        close_on_overlay: true,
    };

    /// Only explicit close/action elements close. Alert-dialog default.
    pub const EXPLICIT_ONLY: DismissPolicy = DismissPolicy {
        dismissible: false,
        close_on_esc: false,
        close_on_overlay: false,
    };

    /// Read the policy attributes, falling back to `defaults` per field.
    pub fn from_node(data: &NodeData, defaults: DismissPolicy) -> Self {
        Self {
            dismissible: parse_bool(data.attr(DATA_DISMISSIBLE), defaults.dismissible),
            close_on_esc: parse_bool(data.attr(DATA_CLOSE_ON_ESC), defaults.close_on_esc),
            close_on_overlay: parse_bool(data.attr(DATA_CLOSE_ON_OVERLAY), defaults.close_on_overlay),
        }
    }

    /// Escape closes only when both `dismissible` and `close_on_esc` hold.
    pub fn allows_escape(self) -> bool {
        self.dismissible && self.close_on_esc
    }
}
