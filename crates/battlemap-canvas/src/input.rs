//! Abstract input events.
//!
//! The engine never reads hardware. Hosts translate their native events into
//! [`InputEvent`] values in screen coordinates and deliver them either at
//! canvas level ([`crate::Session::handle_event`]) or, while a global
//! interaction is armed, at window level ([`crate::Session::handle_window_event`]).

use crate::geometry::Point;

/// Pointer buttons the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Keys the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Escape,
    Enter,
    Home,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { position: Point, button: MouseButton },
    PointerMove { position: Point },
    PointerUp { position: Point, button: MouseButton },
    /// The pointer left the tracked container.
    PointerLeave,
    /// `delta_y < 0` is a scroll up, which zooms in.
    Wheel { position: Point, delta_y: f64 },
    KeyDown { key: Key },
    KeyUp { key: Key },
}

impl InputEvent {
    /// Screen position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::PointerDown { position, .. }
            | InputEvent::PointerMove { position }
            | InputEvent::PointerUp { position, .. }
            | InputEvent::Wheel { position, .. } => Some(*position),
            _ => None,
        }
    }
}
