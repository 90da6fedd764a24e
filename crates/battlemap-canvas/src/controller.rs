//! Viewport controller: wheel zoom toward the pointer, panning and recenter.
//!
//! Panning can be driven three ways: the pan tool with the left button, the
//! left button while space is held, or the middle button on its own. A middle
//! button release frequently happens outside the canvas, so a middle-button
//! pan arms window-level tracking; the host must forward window events while
//! [`ViewportController::wants_window_events`] is true and may detach its
//! listeners once it turns false.

use crate::geometry::Point;
use crate::input::MouseButton;
use crate::viewport::Viewport;

/// What started the current pan drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanSource {
    Tool,
    Space,
    MiddleButton,
}

/// Tracks pointer deltas for an active pan.
#[derive(Debug, Clone, Copy)]
struct PanDrag {
    source: PanSource,
    last: Point,
}

impl PanDrag {
    fn update(&mut self, pos: Point) -> (f64, f64) {
        let delta = (pos.x - self.last.x, pos.y - self.last.y);
        self.last = pos;
        delta
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    viewport: Viewport,
    pan_tool_active: bool,
    space_held: bool,
    drag: Option<PanDrag>,
    window_listeners_armed: bool,
}

impl ViewportController {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn set_pan_tool_active(&mut self, active: bool) {
        self.pan_tool_active = active;
        if !active && matches!(self.drag, Some(PanDrag { source: PanSource::Tool, .. })) {
            self.drag = None;
        }
    }

    pub fn is_space_held(&self) -> bool {
        self.space_held
    }

    /// True when a left-button press would start a pan.
    pub fn left_button_pans(&self) -> bool {
        self.pan_tool_active || self.space_held
    }

    pub fn is_panning(&self) -> bool {
        self.drag.is_some()
    }

    pub fn pan_source(&self) -> Option<PanSource> {
        self.drag.map(|d| d.source)
    }

    /// Whether the host should currently deliver window-level pointer events.
    pub fn wants_window_events(&self) -> bool {
        self.window_listeners_armed
    }

    /// Applies a wheel event; `delta_y < 0` zooms in.
    pub fn wheel(&mut self, position: Point, delta_y: f64) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        self.viewport.zoom_at(position, -delta_y.signum());
        tracing::trace!("Wheel zoom -> {}", self.viewport);
    }

    pub fn space_down(&mut self) {
        self.space_held = true;
    }

    pub fn space_up(&mut self) {
        self.space_held = false;
        if matches!(self.drag, Some(PanDrag { source: PanSource::Space, .. })) {
            self.drag = None;
        }
    }

    /// Handles a canvas-level button press. Returns true if the press started a pan.
    pub fn pointer_down(&mut self, position: Point, button: MouseButton) -> bool {
        let source = match button {
            MouseButton::Middle => PanSource::MiddleButton,
            MouseButton::Left if self.pan_tool_active => PanSource::Tool,
            MouseButton::Left if self.space_held => PanSource::Space,
            _ => return false,
        };
        self.drag = Some(PanDrag {
            source,
            last: position,
        });
        if source == PanSource::MiddleButton {
            self.window_listeners_armed = true;
            tracing::debug!("Middle-button pan armed window listeners");
        }
        true
    }

    /// Handles a canvas-level move. Returns true if it panned.
    pub fn pointer_move(&mut self, position: Point) -> bool {
        match self.drag.as_mut() {
            Some(drag) => {
                let (dx, dy) = drag.update(position);
                self.viewport.pan_by(dx, dy);
                true
            }
            None => false,
        }
    }

    /// Handles a canvas-level release. Returns true if it ended a pan.
    pub fn pointer_up(&mut self, position: Point, button: MouseButton) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let ends = match drag.source {
            PanSource::MiddleButton => button == MouseButton::Middle,
            PanSource::Tool | PanSource::Space => button == MouseButton::Left,
        };
        if !ends {
            return false;
        }
        self.pointer_move(position);
        self.end_pan();
        true
    }

    /// Pointer left the canvas. Middle-button pans keep going on window events.
    pub fn pointer_leave(&mut self) {
        if let Some(drag) = self.drag {
            if drag.source != PanSource::MiddleButton {
                self.drag = None;
            }
        }
    }

    /// Window-level move, delivered only while listeners are armed.
    pub fn window_pointer_move(&mut self, position: Point) -> bool {
        if !self.window_listeners_armed {
            return false;
        }
        self.pointer_move(position)
    }

    /// Window-level release, delivered only while listeners are armed.
    pub fn window_pointer_up(&mut self, button: MouseButton) -> bool {
        if !self.window_listeners_armed || button != MouseButton::Middle {
            return false;
        }
        self.end_pan();
        true
    }

    fn end_pan(&mut self) {
        self.drag = None;
        if self.window_listeners_armed {
            self.window_listeners_armed = false;
            tracing::debug!("Pan finished, window listeners released");
        }
    }

    /// Fits the map into view, or frames an empty canvas when there is no map.
    pub fn recenter(&mut self, map_size: Option<(f64, f64)>) {
        match map_size {
            Some((width, height)) => self.viewport.fit_map(width, height),
            None => self.viewport.reset(),
        }
        tracing::info!("Recentered view: {}", self.viewport);
    }
}
