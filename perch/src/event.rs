//! Input events routed to overlays.
//!
//! Just enough of the host's input model to dismiss popups: pointer presses
//! for barrier taps and the escape key.

use crate::primitives::Point;

/// Mouse button types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Mouse event types.
#[derive(Debug, Clone)]
pub enum MouseEvent {
    /// Mouse button pressed.
    ButtonPressed {
        button: MouseButton,
        position: Point,
    },
    /// Mouse button released.
    ButtonReleased {
        button: MouseButton,
        position: Point,
    },
    /// Mouse cursor moved.
    CursorMoved {
        position: Point,
    },
}

impl MouseEvent {
    pub fn position(&self) -> Point {
        match self {
            MouseEvent::ButtonPressed { position, .. }
            | MouseEvent::ButtonReleased { position, .. }
            | MouseEvent::CursorMoved { position } => *position,
        }
    }

    /// A press of any button; taps on the barrier are recognised on press.
    pub fn is_press(&self) -> bool {
        matches!(self, MouseEvent::ButtonPressed { .. })
    }
}

/// Named keys (non-character keys) overlays care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Escape,
    Enter,
    Tab,
    Unknown,
}

/// A keyboard key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A named (special) key.
    Named(NamedKey),
    /// A character key.
    Character(String),
}

/// A key event (pressed or released).
#[derive(Debug, Clone)]
pub enum KeyEvent {
    Pressed { key: Key },
    Released { key: Key },
}

impl KeyEvent {
    pub fn is_escape_press(&self) -> bool {
        matches!(self, KeyEvent::Pressed { key: Key::Named(NamedKey::Escape) })
    }
}
