//! Coordinate spaces and the transforms between them.
//!
//! Three spaces are involved in every pointer interaction:
//!
//! ```text
//! screen  (pixels reported by the input device, (0,0) top-left of the view)
//!   │  canvas = (screen - pan) / zoom
//!   ▼
//! canvas  (the map image's own pixels, independent of zoom/pan)
//!   │  cell = floor(canvas / grid_size)
//!   ▼
//! grid    (integer cells, each grid_size canvas pixels wide)
//! ```
//!
//! All functions here are pure. A zero grid size is unrepresentable: the only
//! way to obtain a [`GridSize`] is through [`GridSize::new`], which rejects it,
//! so the transforms can never divide by zero.

use battlemap_core::constants::DEFAULT_GRID_SIZE;
use battlemap_core::{GeometryError, Result};
use serde::{Deserialize, Serialize};

/// A point in screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An integer grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Number of king moves between two cells.
    pub fn chebyshev_distance(&self, other: &GridCell) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }
}

impl std::fmt::Display for GridCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Grid cell size in canvas pixels, guaranteed positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct GridSize(u32);

impl GridSize {
    /// Validates a raw grid size.
    pub fn new(size: u32) -> Result<Self> {
        if size == 0 {
            return Err(GeometryError::InvalidGridSize { size: 0 }.into());
        }
        Ok(Self(size))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.0)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self(DEFAULT_GRID_SIZE)
    }
}

impl From<GridSize> for u32 {
    fn from(size: GridSize) -> Self {
        size.0
    }
}

impl TryFrom<u32> for GridSize {
    type Error = battlemap_core::Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds the rectangle spanned by two opposite corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        Self::new(min_x, min_y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when the rectangle has positive, finite extent.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Converts a screen point to canvas space.
pub fn screen_to_canvas(screen: Point, zoom: f64, pan: Point) -> Point {
    Point::new((screen.x - pan.x) / zoom, (screen.y - pan.y) / zoom)
}

/// Converts a canvas point to screen space.
pub fn canvas_to_screen(canvas: Point, zoom: f64, pan: Point) -> Point {
    Point::new(canvas.x * zoom + pan.x, canvas.y * zoom + pan.y)
}

/// Returns the grid cell containing a canvas point.
pub fn canvas_to_grid(canvas: Point, grid: GridSize) -> GridCell {
    let size = grid.as_f64();
    GridCell::new(
        (canvas.x / size).floor() as i32,
        (canvas.y / size).floor() as i32,
    )
}

/// Returns the canvas-space centre of a grid cell.
pub fn grid_to_canvas(cell: GridCell, grid: GridSize) -> Point {
    let size = grid.as_f64();
    Point::new(
        f64::from(cell.x) * size + size / 2.0,
        f64::from(cell.y) * size + size / 2.0,
    )
}

/// Bundles the parameters needed to move between all three spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f64,
    pub pan: Point,
    pub grid: GridSize,
}

impl ViewTransform {
    pub fn new(zoom: f64, pan: Point, grid: GridSize) -> Self {
        Self { zoom, pan, grid }
    }

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        screen_to_canvas(screen, self.zoom, self.pan)
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        canvas_to_screen(canvas, self.zoom, self.pan)
    }

    pub fn screen_to_grid(&self, screen: Point) -> GridCell {
        canvas_to_grid(self.screen_to_canvas(screen), self.grid)
    }

    /// Screen position of a cell's centre.
    pub fn grid_to_screen(&self, cell: GridCell) -> Point {
        self.canvas_to_screen(grid_to_canvas(cell, self.grid))
    }

    /// Screen-space size of one grid cell.
    pub fn cell_screen_size(&self) -> f64 {
        self.grid.as_f64() * self.zoom
    }
}
