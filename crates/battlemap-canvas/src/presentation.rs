//! Presentation bounds: the map crop mirrored to the player display.
//!
//! While the user drags the body or a corner handle the editor holds a
//! pending rectangle. Renderers draw [`BoundsEditor::bounds`], which prefers
//! the pending value; the committed rectangle only changes on release.

use battlemap_core::constants::{HANDLE_HIT_RADIUS, MIN_PRESENTATION_SIZE};

use crate::geometry::{Point, Rect};

/// Corner resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Handle {
    pub const ALL: [Handle; 4] = [
        Handle::NorthWest,
        Handle::NorthEast,
        Handle::SouthWest,
        Handle::SouthEast,
    ];

    /// Position of this handle on `rect`.
    pub fn position(&self, rect: &Rect) -> Point {
        match self {
            Handle::NorthWest => Point::new(rect.x, rect.y),
            Handle::NorthEast => Point::new(rect.right(), rect.y),
            Handle::SouthWest => Point::new(rect.x, rect.bottom()),
            Handle::SouthEast => Point::new(rect.right(), rect.bottom()),
        }
    }

    /// The corner that stays put while this handle is dragged.
    pub fn opposite(&self) -> Handle {
        match self {
            Handle::NorthWest => Handle::SouthEast,
            Handle::NorthEast => Handle::SouthWest,
            Handle::SouthWest => Handle::NorthEast,
            Handle::SouthEast => Handle::NorthWest,
        }
    }

    fn moves_right_edge(&self) -> bool {
        matches!(self, Handle::NorthEast | Handle::SouthEast)
    }

    fn moves_bottom_edge(&self) -> bool {
        matches!(self, Handle::SouthWest | Handle::SouthEast)
    }
}

/// What a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsHit {
    Handle(Handle),
    Body,
}

/// Smallest allowed presentation size for a map: `MIN_PRESENTATION_SIZE`,
/// or the map dimension itself when the map is smaller.
pub fn min_size(map_width: f64, map_height: f64) -> (f64, f64) {
    (
        MIN_PRESENTATION_SIZE.min(map_width),
        MIN_PRESENTATION_SIZE.min(map_height),
    )
}

/// Half the map, centred, but never below the minimum size.
pub fn default_bounds(map_width: f64, map_height: f64) -> Rect {
    let (min_w, min_h) = min_size(map_width, map_height);
    let width = (map_width / 2.0).max(min_w);
    let height = (map_height / 2.0).max(min_h);
    Rect::new(
        (map_width - width) / 2.0,
        (map_height - height) / 2.0,
        width,
        height,
    )
}

/// Forces a rectangle inside the map with at least the minimum size.
pub fn clamp_to_map(rect: &Rect, map_width: f64, map_height: f64) -> Rect {
    let (min_w, min_h) = min_size(map_width, map_height);
    let width = rect.width.clamp(min_w, map_width.max(min_w));
    let height = rect.height.clamp(min_h, map_height.max(min_h));
    Rect::new(
        rect.x.clamp(0.0, (map_width - width).max(0.0)),
        rect.y.clamp(0.0, (map_height - height).max(0.0)),
        width,
        height,
    )
}

/// One axis of a corner resize. `moves_max` is true when the dragged edge is
/// the right/bottom one. Returns `(origin, extent)`.
fn resize_axis(fixed: f64, pointer: f64, moves_max: bool, min: f64, map: f64) -> (f64, f64) {
    if moves_max {
        let extent = (pointer - fixed).clamp(min, (map - fixed).max(min));
        (fixed, extent)
    } else {
        let extent = (fixed - pointer).clamp(min, fixed.max(min));
        (fixed - extent, extent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Edit {
    Idle,
    Moving { grab: Point },
    Resizing { handle: Handle, fixed: Point },
}

/// Interactive editor for the presentation rectangle.
#[derive(Debug, Clone)]
pub struct BoundsEditor {
    map_width: f64,
    map_height: f64,
    committed: Option<Rect>,
    pending: Option<Rect>,
    edit: Edit,
}

impl BoundsEditor {
    pub fn new(map_width: f64, map_height: f64, committed: Option<Rect>) -> Self {
        let committed = committed
            .filter(Rect::is_valid)
            .map(|r| clamp_to_map(&r, map_width, map_height));
        Self {
            map_width,
            map_height,
            committed,
            pending: None,
            edit: Edit::Idle,
        }
    }

    /// Map dimensions changed; re-clamps the committed rectangle.
    pub fn set_map_size(&mut self, map_width: f64, map_height: f64) {
        self.map_width = map_width;
        self.map_height = map_height;
        self.cancel();
        if let Some(rect) = self.committed {
            self.committed = Some(clamp_to_map(&rect, map_width, map_height));
        }
    }

    pub fn committed(&self) -> Option<Rect> {
        self.committed
    }

    /// What to draw: the pending preview if an edit is live, otherwise the committed rect.
    pub fn bounds(&self) -> Option<Rect> {
        self.pending.or(self.committed)
    }

    pub fn is_editing(&self) -> bool {
        self.edit != Edit::Idle
    }

    /// Replaces the committed rectangle outright (clamped).
    pub fn set_committed(&mut self, rect: Option<Rect>) {
        self.cancel();
        self.committed = rect
            .filter(Rect::is_valid)
            .map(|r| clamp_to_map(&r, self.map_width, self.map_height));
    }

    /// Commits [`default_bounds`] if nothing is set yet. Returns the new
    /// rectangle when one was created.
    pub fn ensure_default(&mut self) -> Option<Rect> {
        if self.committed.is_some() {
            return None;
        }
        let rect = default_bounds(self.map_width, self.map_height);
        tracing::info!(
            "Created default presentation bounds {:.0}x{:.0} at ({:.0}, {:.0})",
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );
        self.committed = Some(rect);
        Some(rect)
    }

    /// Handles are tested first, within a radius that stays constant on screen.
    pub fn hit_test(&self, at: Point, zoom: f64) -> Option<BoundsHit> {
        let rect = self.bounds()?;
        let radius = HANDLE_HIT_RADIUS / zoom.max(f64::EPSILON);
        Handle::ALL
            .into_iter()
            .find(|h| h.position(&rect).distance_to(&at) <= radius)
            .map(BoundsHit::Handle)
            .or_else(|| rect.contains(at).then_some(BoundsHit::Body))
    }

    /// Starts an edit if the press hits the rectangle. Returns true when it did.
    pub fn begin(&mut self, at: Point, zoom: f64) -> bool {
        let Some(rect) = self.committed else {
            return false;
        };
        self.edit = match self.hit_test(at, zoom) {
            Some(BoundsHit::Handle(handle)) => Edit::Resizing {
                handle,
                fixed: handle.opposite().position(&rect),
            },
            Some(BoundsHit::Body) => Edit::Moving {
                grab: Point::new(at.x - rect.x, at.y - rect.y),
            },
            None => return false,
        };
        self.pending = Some(rect);
        tracing::debug!("Presentation bounds edit started: {:?}", self.edit);
        true
    }

    /// Recomputes the pending rectangle for a pointer position.
    pub fn update(&mut self, at: Point) {
        let Some(current) = self.pending else {
            return;
        };
        let (min_w, min_h) = min_size(self.map_width, self.map_height);
        let next = match self.edit {
            Edit::Idle => return,
            Edit::Moving { grab } => Rect::new(
                (at.x - grab.x).clamp(0.0, (self.map_width - current.width).max(0.0)),
                (at.y - grab.y).clamp(0.0, (self.map_height - current.height).max(0.0)),
                current.width,
                current.height,
            ),
            Edit::Resizing { handle, fixed } => {
                let px = at.x.clamp(0.0, self.map_width);
                let py = at.y.clamp(0.0, self.map_height);
                let (x, width) =
                    resize_axis(fixed.x, px, handle.moves_right_edge(), min_w, self.map_width);
                let (y, height) =
                    resize_axis(fixed.y, py, handle.moves_bottom_edge(), min_h, self.map_height);
                Rect::new(x, y, width, height)
            }
        };
        self.pending = Some(next);
    }

    /// Ends the edit and commits the pending rectangle.
    pub fn finish(&mut self, at: Point) -> Option<Rect> {
        if !self.is_editing() {
            return None;
        }
        self.update(at);
        self.edit = Edit::Idle;
        let rect = self.pending.take()?;
        self.committed = Some(rect);
        tracing::debug!(
            "Presentation bounds committed: {:.0}x{:.0} at ({:.0}, {:.0})",
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );
        Some(rect)
    }

    /// Drops the pending preview without committing.
    pub fn cancel(&mut self) {
        self.edit = Edit::Idle;
        self.pending = None;
    }
}
