//! Interactive fog tools.
//!
//! Each gesture keeps its in-progress geometry as a pending preview. Nothing
//! reaches [`super::FogState`] until the gesture finishes; a cancelled gesture
//! (pointer leaving the canvas, Escape) leaves no trace.

use std::time::{Duration, Instant};

use battlemap_core::constants::{
    DEFAULT_BRUSH_INTERVAL_MS, DEFAULT_BRUSH_RADIUS, FOG_DRAG_THRESHOLD,
};

use super::area::FogShape;
use super::state::FogOperation;
use crate::geometry::{Point, Rect};

/// Shape produced by the active fog tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FogToolShape {
    Rectangle,
    Circle,
    Polygon,
    Brush,
}

/// A fog tool: what to do and with which shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FogTool {
    pub operation: FogOperation,
    pub shape: FogToolShape,
}

impl FogTool {
    pub fn new(operation: FogOperation, shape: FogToolShape) -> Self {
        Self { operation, shape }
    }
}

/// Tunables for the fog gestures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogToolSettings {
    pub drag_threshold: f64,
    pub brush_radius: f64,
    pub brush_interval: Duration,
}

impl Default for FogToolSettings {
    fn default() -> Self {
        Self {
            drag_threshold: FOG_DRAG_THRESHOLD,
            brush_radius: DEFAULT_BRUSH_RADIUS,
            brush_interval: Duration::from_millis(DEFAULT_BRUSH_INTERVAL_MS),
        }
    }
}

#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    Dragging {
        shape: FogToolShape,
        start: Point,
        current: Point,
    },
    Polygon {
        vertices: Vec<Point>,
    },
    Brushing {
        stamps: Vec<Point>,
        pointer: Point,
        next_stamp: Instant,
    },
}

/// State machine behind the fog tools.
#[derive(Debug, Clone, Default)]
pub struct FogGesture {
    settings: FogToolSettings,
    gesture: Gesture,
}

impl FogGesture {
    pub fn new(settings: FogToolSettings) -> Self {
        Self {
            settings,
            gesture: Gesture::Idle,
        }
    }

    pub fn settings(&self) -> &FogToolSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: FogToolSettings) {
        self.settings = settings;
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Starts a rectangle, circle or brush gesture. Polygon clicks go through
    /// [`FogGesture::polygon_click`].
    pub fn begin(&mut self, shape: FogToolShape, at: Point, now: Instant) {
        self.gesture = match shape {
            FogToolShape::Rectangle | FogToolShape::Circle => Gesture::Dragging {
                shape,
                start: at,
                current: at,
            },
            FogToolShape::Brush => Gesture::Brushing {
                stamps: vec![at],
                pointer: at,
                next_stamp: now + self.settings.brush_interval,
            },
            FogToolShape::Polygon => return,
        };
        tracing::debug!("Fog {:?} gesture started at ({:.1}, {:.1})", shape, at.x, at.y);
    }

    pub fn update(&mut self, at: Point) {
        match &mut self.gesture {
            Gesture::Dragging { current, .. } => *current = at,
            Gesture::Brushing { pointer, .. } => *pointer = at,
            Gesture::Idle | Gesture::Polygon { .. } => {}
        }
    }

    /// Lays down at most one brush stamp once the interval has elapsed.
    ///
    /// The pointer is fixed for the duration of a tick, so intervals missed
    /// between ticks collapse into one stamp. A zero interval stamps on every
    /// tick.
    pub fn tick(&mut self, now: Instant) {
        let spacing = self.settings.brush_radius / 4.0;
        let interval = self.settings.brush_interval;
        if let Gesture::Brushing {
            stamps,
            pointer,
            next_stamp,
        } = &mut self.gesture
        {
            if now < *next_stamp {
                return;
            }
            let moved = stamps
                .last()
                .is_none_or(|last| last.distance_to(pointer) >= spacing);
            if moved {
                stamps.push(*pointer);
            }
            *next_stamp = now + interval;
        }
    }

    /// Ends a drag or brush gesture, returning the shapes to commit.
    ///
    /// Drags shorter than the threshold in either dimension produce nothing.
    pub fn finish(&mut self, at: Point) -> Vec<FogShape> {
        self.update(at);
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging {
                shape,
                start,
                current,
            } => self.drag_shape(shape, start, current).into_iter().collect(),
            Gesture::Brushing { stamps, .. } => stamps
                .into_iter()
                .map(|p| FogShape::circle(p, self.settings.brush_radius))
                .collect(),
            polygon @ Gesture::Polygon { .. } => {
                self.gesture = polygon;
                Vec::new()
            }
            Gesture::Idle => Vec::new(),
        }
    }

    fn drag_shape(&self, shape: FogToolShape, start: Point, end: Point) -> Option<FogShape> {
        let threshold = self.settings.drag_threshold;
        match shape {
            FogToolShape::Rectangle => {
                let rect = Rect::from_corners(start, end);
                (rect.width >= threshold && rect.height >= threshold)
                    .then(|| FogShape::rectangle(rect))
            }
            FogToolShape::Circle => {
                let radius = start.distance_to(&end);
                (radius >= threshold).then(|| FogShape::circle(start, radius))
            }
            FogToolShape::Polygon | FogToolShape::Brush => None,
        }
    }

    /// Adds a polygon vertex. Clicking within `close_radius` of the first
    /// vertex closes the polygon and returns it.
    pub fn polygon_click(&mut self, at: Point, close_radius: f64) -> Option<FogShape> {
        match &mut self.gesture {
            Gesture::Polygon { vertices } => {
                let closes = vertices.len() >= 3
                    && vertices
                        .first()
                        .is_some_and(|first| first.distance_to(&at) <= close_radius);
                if closes {
                    return self.close_polygon();
                }
                vertices.push(at);
                None
            }
            _ => {
                self.gesture = Gesture::Polygon { vertices: vec![at] };
                None
            }
        }
    }

    /// Closes the pending polygon. Fewer than three vertices are discarded.
    pub fn close_polygon(&mut self) -> Option<FogShape> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Polygon { vertices } if vertices.len() >= 3 => {
                let shape = FogShape::Polygon { points: vertices };
                shape.validate().ok().map(|_| shape)
            }
            Gesture::Polygon { .. } => None,
            other => {
                self.gesture = other;
                None
            }
        }
    }

    /// Abandons a drag or brush stroke. A polygon under construction survives,
    /// since its vertices are placed by discrete clicks.
    pub fn cancel_stroke(&mut self) {
        if matches!(
            self.gesture,
            Gesture::Dragging { .. } | Gesture::Brushing { .. }
        ) {
            tracing::debug!("Fog stroke cancelled");
            self.gesture = Gesture::Idle;
        }
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self.gesture, Gesture::Polygon { .. })
    }

    /// Abandons whatever is in progress.
    pub fn cancel(&mut self) {
        if self.is_active() {
            tracing::debug!("Fog gesture cancelled");
        }
        self.gesture = Gesture::Idle;
    }

    /// Shapes to draw as an uncommitted preview.
    pub fn preview(&self) -> Vec<FogShape> {
        match &self.gesture {
            Gesture::Idle => Vec::new(),
            Gesture::Dragging {
                shape,
                start,
                current,
            } => match shape {
                FogToolShape::Circle => vec![FogShape::circle(*start, start.distance_to(current))],
                _ => vec![FogShape::rectangle(Rect::from_corners(*start, *current))],
            },
            Gesture::Polygon { vertices } => vec![FogShape::Polygon {
                points: vertices.clone(),
            }],
            Gesture::Brushing { stamps, .. } => stamps
                .iter()
                .map(|p| FogShape::circle(*p, self.settings.brush_radius))
                .collect(),
        }
    }
}
