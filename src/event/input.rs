//! Raw input types wrapping crossterm for decoupling.
//!
//! Defines [`InputEvent`], [`KeyEvent`], [`MouseEvent`] and supporting types.
//! Hosts that sit on a terminal convert crossterm events with the `From`
//! impls; browser or test hosts construct them directly.

use std::ops::{BitAnd, BitOr};

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Keyboard key, decoupled from crossterm. Space arrives as `Char(' ')`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Modifier key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const ALT: Modifiers = Modifiers(4);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether no modifier bits are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitAnd for Modifiers {
    type Output = Modifiers;
    fn bitand(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// KeyEvent
// ---------------------------------------------------------------------------

/// A keyboard event with key and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event.
    pub fn new(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key event with no modifiers.
    pub fn plain(code: Key) -> Self {
        Self::new(code, Modifiers::NONE)
    }

    /// Whether this is Tab or Shift+Tab (BackTab).
    pub fn is_tab(&self) -> bool {
        matches!(self.code, Key::Tab | Key::BackTab)
    }

    /// Whether focus should move backwards for a Tab press.
    pub fn is_backward_tab(&self) -> bool {
        self.code == Key::BackTab || (self.code == Key::Tab && self.modifiers.contains(Modifiers::SHIFT))
    }

    /// Whether this key activates a focused control (Enter or Space).
    pub fn is_activation(&self) -> bool {
        matches!(self.code, Key::Enter | Key::Char(' '))
    }

    /// The character for typeahead: a single printable, non-space character
    /// typed without Ctrl or Alt.
    pub fn printable(&self) -> Option<char> {
        match self.code {
            Key::Char(c)
                if !c.is_whitespace()
                    && !c.is_control()
                    && !self.modifiers.contains(Modifiers::CTRL)
                    && !self.modifiers.contains(Modifiers::ALT) =>
            {
                Some(c)
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// MouseBtn / MouseAction / MouseEvent
// ---------------------------------------------------------------------------

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

/// Mouse action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    Down(MouseBtn),
    Up(MouseBtn),
    Drag(MouseBtn),
    Moved,
    ScrollUp,
    ScrollDown,
}

/// A mouse event with action, position, and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub kind: MouseAction,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
}

// ---------------------------------------------------------------------------
// InputEvent
// ---------------------------------------------------------------------------

/// Untargeted input, before hit-testing and focus resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize { width: u16, height: u16 },
}

// ---------------------------------------------------------------------------
// From<crossterm> conversions
// ---------------------------------------------------------------------------

/// Convert crossterm key modifiers to our `Modifiers`.
fn convert_modifiers(m: crossterm::event::KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if m.contains(crossterm::event::KeyModifiers::SHIFT) {
        out = out | Modifiers::SHIFT;
    }
    if m.contains(crossterm::event::KeyModifiers::CONTROL) {
        out = out | Modifiers::CTRL;
    }
    if m.contains(crossterm::event::KeyModifiers::ALT) {
        out = out | Modifiers::ALT;
    }
    out
}

/// Map a crossterm key code. Codes the runtime has no use for yield `None`.
fn convert_key_code(code: crossterm::event::KeyCode) -> Option<Key> {
    use crossterm::event::KeyCode;
    let key = match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::F(n) => Key::F(n),
        _ => return None,
    };
    Some(key)
}

/// Convert a crossterm mouse button to our `MouseBtn`.
fn convert_mouse_button(b: crossterm::event::MouseButton) -> MouseBtn {
    match b {
        crossterm::event::MouseButton::Left => MouseBtn::Left,
        crossterm::event::MouseButton::Right => MouseBtn::Right,
        crossterm::event::MouseButton::Middle => MouseBtn::Middle,
    }
}

/// Convert a crossterm `Event` into our `InputEvent`.
///
/// Returns `None` for key releases, unsupported key codes, horizontal
/// scrolling, focus and paste events.
pub fn try_from_crossterm(event: crossterm::event::Event) -> Option<InputEvent> {
    use crossterm::event::{Event, KeyEventKind, MouseEventKind};
    match event {
        Event::Key(ke) if ke.kind != KeyEventKind::Release => {
            let code = convert_key_code(ke.code)?;
            Some(InputEvent::Key(KeyEvent::new(code, convert_modifiers(ke.modifiers))))
        }
        Event::Mouse(me) => {
            let kind = match me.kind {
                MouseEventKind::Down(b) => MouseAction::Down(convert_mouse_button(b)),
                MouseEventKind::Up(b) => MouseAction::Up(convert_mouse_button(b)),
                MouseEventKind::Drag(b) => MouseAction::Drag(convert_mouse_button(b)),
                MouseEventKind::Moved => MouseAction::Moved,
                MouseEventKind::ScrollUp => MouseAction::ScrollUp,
                MouseEventKind::ScrollDown => MouseAction::ScrollDown,
                _ => return None,
            };
            Some(InputEvent::Mouse(MouseEvent {
                kind,
                x: me.column,
                y: me.row,
                modifiers: convert_modifiers(me.modifiers),
            }))
        }
        Event::Resize(w, h) => Some(InputEvent::Resize { width: w, height: h }),
        _ => None,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
