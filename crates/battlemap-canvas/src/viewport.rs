//! Viewport and coordinate transformation for map rendering.
//!
//! Handles conversion between screen coordinates (pointer space) and canvas
//! coordinates (map pixel space). Manages zoom and pan operations with proper
//! coordinate mapping.

use std::fmt;

use battlemap_core::constants::{EMPTY_CANVAS_SIZE, MAX_ZOOM, MIN_ZOOM, RECENTER_FILL, ZOOM_STEP};
use serde::{Deserialize, Serialize};

use crate::geometry::{self, GridCell, GridSize, Point, ViewTransform};

/// Zoom and pan as persisted on the encounter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

/// Represents the viewport transformation state (zoom and pan).
#[derive(Debug, Clone)]
pub struct Viewport {
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    viewport_width: f64,
    viewport_height: f64,
}

impl Viewport {
    /// Creates a new viewport with initial dimensions, 1:1 zoom and no pan.
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            viewport_width,
            viewport_height,
        }
    }

    /// Gets the viewport width.
    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    /// Gets the viewport height.
    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Sets the viewport dimensions (typically called when the window resizes).
    ///
    /// Non-positive or non-finite sizes are ignored.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.viewport_width = width;
            self.viewport_height = height;
        } else {
            tracing::warn!("Ignoring invalid viewport size {}x{}", width, height);
        }
    }

    /// Gets the current zoom level (1.0 = 100%).
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the zoom level, clamped to [`MIN_ZOOM`, `MAX_ZOOM`].
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Gets the pan offset (X coordinate).
    pub fn pan_x(&self) -> f64 {
        self.pan_x
    }

    /// Gets the pan offset (Y coordinate).
    pub fn pan_y(&self) -> f64 {
        self.pan_y
    }

    pub fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    /// Sets the pan offset.
    pub fn set_pan(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.pan_x = x;
            self.pan_y = y;
        }
    }

    /// Pans by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.set_pan(self.pan_x + dx, self.pan_y + dy);
    }

    /// Converts screen coordinates to canvas coordinates.
    ///
    /// Formula:
    /// ```text
    /// canvas_x = (screen_x - pan_x) / zoom
    /// canvas_y = (screen_y - pan_y) / zoom
    /// ```
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        geometry::screen_to_canvas(screen, self.zoom, self.pan())
    }

    /// Converts canvas coordinates to screen coordinates.
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        geometry::canvas_to_screen(canvas, self.zoom, self.pan())
    }

    /// Returns the full transform stack for a given grid size.
    pub fn transform(&self, grid: GridSize) -> ViewTransform {
        ViewTransform::new(self.zoom, self.pan(), grid)
    }

    /// Grid cell under the centre of the viewport.
    pub fn center_cell(&self, grid: GridSize) -> GridCell {
        let center = Point::new(self.viewport_width / 2.0, self.viewport_height / 2.0);
        self.transform(grid).screen_to_grid(center)
    }

    /// Zooms so the canvas point under `pointer` stays under it.
    ///
    /// `direction > 0` zooms in by [`ZOOM_STEP`], `direction < 0` zooms out.
    pub fn zoom_at(&mut self, pointer: Point, direction: f64) {
        if direction == 0.0 || !direction.is_finite() || !pointer.is_finite() {
            return;
        }
        let anchor = self.screen_to_canvas(pointer);
        let scaled = if direction > 0.0 {
            self.zoom * ZOOM_STEP
        } else {
            self.zoom / ZOOM_STEP
        };
        let new_zoom = scaled.clamp(MIN_ZOOM, MAX_ZOOM);

        // pan' = P - canvas_point * zoom'
        self.zoom = new_zoom;
        self.pan_x = pointer.x - anchor.x * new_zoom;
        self.pan_y = pointer.y - anchor.y * new_zoom;
    }

    /// Fits a map of the given pixel size into the viewport and centres it.
    pub fn fit_map(&mut self, map_width: f64, map_height: f64) {
        if map_width <= 0.0 || map_height <= 0.0 {
            self.reset();
            return;
        }

        let scale_x = self.viewport_width / map_width;
        let scale_y = self.viewport_height / map_height;
        let new_zoom = (scale_x.min(scale_y).min(1.0) * RECENTER_FILL).clamp(MIN_ZOOM, MAX_ZOOM);

        self.zoom = new_zoom;
        self.pan_x = (self.viewport_width - map_width * new_zoom) / 2.0;
        self.pan_y = (self.viewport_height - map_height * new_zoom) / 2.0;
    }

    /// Resets to 1:1 zoom, centring a nominal empty canvas area.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = (self.viewport_width - EMPTY_CANVAS_SIZE) / 2.0;
        self.pan_y = (self.viewport_height - EMPTY_CANVAS_SIZE) / 2.0;
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            zoom: self.zoom,
            pan_x: self.pan_x,
            pan_y: self.pan_y,
        }
    }

    /// Restores a persisted view, clamping zoom into range.
    pub fn apply_view_state(&mut self, state: &ViewState) {
        self.set_zoom(state.zoom);
        self.set_pan(state.pan_x, state.pan_y);
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2}x | Pan: ({:.1}, {:.1})",
            self.zoom, self.pan_x, self.pan_y
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1200.0, 800.0)
    }
}
