//! Shared numeric limits and defaults.

/// Smallest allowed viewport zoom.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest allowed viewport zoom.
pub const MAX_ZOOM: f64 = 3.0;

/// Multiplicative zoom factor applied per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

/// Fraction of the viewport the map occupies after a recenter.
pub const RECENTER_FILL: f64 = 0.9;

/// Side length of the nominal canvas framed by a recenter when no map is loaded.
pub const EMPTY_CANVAS_SIZE: f64 = 1000.0;

/// Default grid cell size in canvas pixels.
pub const DEFAULT_GRID_SIZE: u32 = 50;

/// Feet covered by one grid cell of movement.
pub const FEET_PER_CELL: u32 = 5;

/// Minimum presentation bounds width/height in canvas pixels.
pub const MIN_PRESENTATION_SIZE: f64 = 100.0;

/// Screen-space radius (pixels) of a presentation bounds resize handle.
pub const HANDLE_HIT_RADIUS: f64 = 10.0;

/// Drags shorter than this (canvas pixels) never produce a fog area.
pub const FOG_DRAG_THRESHOLD: f64 = 5.0;

/// Default fog colour as `#rrggbb`.
pub const DEFAULT_FOG_COLOR: &str = "#000000";

/// Default fog opacity.
pub const DEFAULT_FOG_OPACITY: f32 = 0.85;

/// Default fog brush radius in canvas pixels.
pub const DEFAULT_BRUSH_RADIUS: f64 = 40.0;

/// Default interval between fog brush stamps while the button is held.
pub const DEFAULT_BRUSH_INTERVAL_MS: u64 = 50;

/// Delay used to coalesce snapshot pushes to the presentation surface.
pub const MIRROR_COALESCE_MS: u64 = 100;

/// Screen-space distance (pixels) within which a click closes a fog polygon.
pub const POLYGON_CLOSE_RADIUS: f64 = 10.0;
