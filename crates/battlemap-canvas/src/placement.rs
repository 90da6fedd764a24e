//! Token placement: find the nearest free grid cell inside the active bounds.
//!
//! The search itself ([`spiral_search`]) knows nothing about tokens; callers
//! hand it a start cell, a bounding region and an `is_free` predicate.
//! Placement never fails. When every cell reachable within the step budget is
//! taken, the clamped start cell is returned even though it is occupied.

use std::collections::HashSet;

use crate::geometry::{GridCell, GridSize, Rect};

/// Inclusive cell range tokens may be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl PlacementBounds {
    /// Creates bounds, swapping inverted edges.
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Every cell that overlaps the map, partially covered edge cells included.
    pub fn from_map(map_width: f64, map_height: f64, grid: GridSize) -> Self {
        Self::from_rect(&Rect::new(0.0, 0.0, map_width, map_height), grid)
    }

    /// Every cell that overlaps a canvas rectangle.
    pub fn from_rect(rect: &Rect, grid: GridSize) -> Self {
        let size = grid.as_f64();
        let min_x = (rect.x / size).floor().max(0.0) as i32;
        let min_y = (rect.y / size).floor().max(0.0) as i32;
        let max_x = ((rect.right() / size).ceil() as i32 - 1).max(min_x);
        let max_y = ((rect.bottom() / size).ceil() as i32 - 1).max(min_y);
        Self::new(min_x, min_y, max_x, max_y)
    }

    /// Columns covered.
    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x) as u32 + 1
    }

    /// Rows covered.
    pub fn height(&self) -> u32 {
        (self.max_y - self.min_y) as u32 + 1
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        cell.x >= self.min_x && cell.x <= self.max_x && cell.y >= self.min_y && cell.y <= self.max_y
    }

    pub fn clamp(&self, cell: GridCell) -> GridCell {
        GridCell::new(
            cell.x.clamp(self.min_x, self.max_x),
            cell.y.clamp(self.min_y, self.max_y),
        )
    }

    pub fn center(&self) -> GridCell {
        GridCell::new(
            self.min_x + (self.max_x - self.min_x) / 2,
            self.min_y + (self.max_y - self.min_y) / 2,
        )
    }
}

const SPIRAL_DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Square spiral walk from `start` (right, down, left, up; the leg grows
/// every two turns) returning the first in-bounds cell `is_free` accepts.
///
/// At most `bounds.width() * bounds.height()` steps are taken. Falls back to
/// the clamped start cell when nothing is found.
pub fn spiral_search<F>(start: GridCell, bounds: &PlacementBounds, is_free: F) -> GridCell
where
    F: Fn(GridCell) -> bool,
{
    let start = bounds.clamp(start);
    if is_free(start) {
        return start;
    }

    let budget = u64::from(bounds.width()) * u64::from(bounds.height());
    let mut cell = start;
    let mut direction = 0usize;
    let mut leg_length = 1u32;
    let mut leg_progress = 0u32;
    let mut turns = 0u32;

    for _ in 0..budget {
        let (dx, dy) = SPIRAL_DIRECTIONS[direction];
        cell = GridCell::new(cell.x + dx, cell.y + dy);
        if bounds.contains(cell) && is_free(cell) {
            return cell;
        }

        leg_progress += 1;
        if leg_progress == leg_length {
            leg_progress = 0;
            direction = (direction + 1) % SPIRAL_DIRECTIONS.len();
            turns += 1;
            if turns % 2 == 0 {
                leg_length += 1;
            }
        }
    }

    tracing::debug!("Spiral search exhausted from {}, reusing start cell", start);
    start
}

/// Picks the bounds new tokens must land in.
///
/// A non-degenerate presentation rectangle wins when the player view is
/// active; otherwise the whole map is used.
pub fn active_bounds(
    map_width: f64,
    map_height: f64,
    grid: GridSize,
    presentation: Option<&Rect>,
) -> PlacementBounds {
    match presentation.filter(|r| r.is_valid()) {
        Some(rect) => PlacementBounds::from_rect(rect, grid),
        None => PlacementBounds::from_map(map_width, map_height, grid),
    }
}

/// Inputs that decide where the search starts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlacementHint {
    /// The last cell the user clicked.
    pub last_click: Option<GridCell>,
    /// Cell under the viewport centre; only consulted outside presentation mode.
    pub viewport_center: Option<GridCell>,
    /// Whether bounds came from the presentation rectangle.
    pub presentation: bool,
}

/// Start cell priority: clicked cell inside bounds, then (map mode, no click
/// yet) the viewport centre, then the bounds centre.
pub fn start_cell(bounds: &PlacementBounds, hint: &PlacementHint) -> GridCell {
    match hint.last_click {
        Some(cell) if bounds.contains(cell) => cell,
        None if !hint.presentation => hint.viewport_center.unwrap_or_else(|| bounds.center()),
        _ => bounds.center(),
    }
}

/// Resolves a placement against a set of occupied anchor cells.
pub fn resolve_placement(
    bounds: &PlacementBounds,
    hint: &PlacementHint,
    occupied: &HashSet<GridCell>,
) -> GridCell {
    let start = start_cell(bounds, hint);
    spiral_search(start, bounds, |cell| !occupied.contains(&cell))
}

/// Finds a cell for a copy of the token at `source`.
pub fn resolve_duplicate(
    source: GridCell,
    bounds: &PlacementBounds,
    occupied: &HashSet<GridCell>,
) -> GridCell {
    spiral_search(source, bounds, |cell| !occupied.contains(&cell))
}
