//! Movement measurement between two grid cells.
//!
//! Diagonal steps count the same as orthogonal ones, so the path is a
//! straight Chebyshev walk and its cost is the number of steps taken.

use battlemap_core::constants::FEET_PER_CELL;
use smallvec::SmallVec;

use crate::geometry::{self, GridCell, GridSize, Point};

/// Cells visited from start to end, both inclusive.
pub type CellPath = SmallVec<[GridCell; 16]>;

/// Steps `sign(dx), sign(dy)` from `start` until both deltas reach zero.
pub fn chebyshev_path(start: GridCell, end: GridCell) -> CellPath {
    let mut path = CellPath::new();
    let mut cell = start;
    path.push(cell);
    while cell != end {
        cell = GridCell::new(
            cell.x + (end.x - cell.x).signum(),
            cell.y + (end.y - cell.y).signum(),
        );
        path.push(cell);
    }
    path
}

/// Feet covered by a path of `path_len` cells.
pub fn distance_feet(path_len: usize) -> u32 {
    let steps = u32::try_from(path_len.saturating_sub(1)).unwrap_or(u32::MAX);
    steps.saturating_mul(FEET_PER_CELL)
}

/// What the renderer draws while a measurement is live.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureOverlay {
    pub path: CellPath,
    /// Canvas-space centres of every cell on the path.
    pub waypoints: Vec<Point>,
    pub distance_feet: u32,
    pub label: String,
}

/// Tracks one measure gesture.
#[derive(Debug, Clone, Default)]
pub struct MovementMeasurer {
    start: Option<GridCell>,
    end: Option<GridCell>,
}

impl MovementMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    pub fn start(&mut self, cell: GridCell) {
        tracing::debug!("Measurement started at {}", cell);
        self.start = Some(cell);
        self.end = Some(cell);
    }

    pub fn update(&mut self, cell: GridCell) {
        if self.start.is_some() {
            self.end = Some(cell);
        }
    }

    /// Ends the gesture. The overlay is discarded.
    pub fn end(&mut self) {
        self.start = None;
        self.end = None;
    }

    /// Current overlay; `None` when idle or when start and end coincide.
    pub fn overlay(&self, grid: GridSize) -> Option<MeasureOverlay> {
        let (start, end) = (self.start?, self.end?);
        if start == end {
            return None;
        }
        let path = chebyshev_path(start, end);
        let distance_feet = distance_feet(path.len());
        let waypoints = path
            .iter()
            .map(|cell| geometry::grid_to_canvas(*cell, grid))
            .collect();
        Some(MeasureOverlay {
            path,
            waypoints,
            distance_feet,
            label: format!("{} ft", distance_feet),
        })
    }
}
