//! Fog areas: immutable, timestamped shapes.

use battlemap_core::{FogError, Result};
use serde::{Deserialize, Serialize};
use tiny_skia::{Path, PathBuilder};
use uuid::Uuid;

use crate::geometry::{Point, Rect};

/// Geometry of a single fog operation, in canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FogShape {
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// `x`/`y` is the centre.
    Circle { x: f64, y: f64, radius: f64 },
    Polygon { points: Vec<Point> },
}

impl FogShape {
    pub fn rectangle(rect: Rect) -> Self {
        FogShape::Rectangle {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }

    pub fn circle(center: Point, radius: f64) -> Self {
        FogShape::Circle {
            x: center.x,
            y: center.y,
            radius,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FogShape::Rectangle { .. } => "rectangle",
            FogShape::Circle { .. } => "circle",
            FogShape::Polygon { .. } => "polygon",
        }
    }

    /// Rejects shapes with non-finite coordinates or no positive extent.
    pub fn validate(&self) -> Result<()> {
        let degenerate = |reason: &str| -> Result<()> {
            Err(FogError::Degenerate {
                kind: self.kind_name().to_string(),
                reason: reason.to_string(),
            }
            .into())
        };

        match self {
            FogShape::Rectangle {
                x,
                y,
                width,
                height,
            } => {
                if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
                    return degenerate("non-finite geometry");
                }
                if *width <= 0.0 || *height <= 0.0 {
                    return degenerate("width and height must be positive");
                }
            }
            FogShape::Circle { x, y, radius } => {
                if !(x.is_finite() && y.is_finite() && radius.is_finite()) {
                    return degenerate("non-finite geometry");
                }
                if *radius <= 0.0 {
                    return degenerate("radius must be positive");
                }
            }
            FogShape::Polygon { points } => {
                if points.len() < 3 {
                    return degenerate("polygon needs at least three vertices");
                }
                if points.iter().any(|p| !p.is_finite()) {
                    return degenerate("non-finite geometry");
                }
                if polygon_area(points).abs() <= f64::EPSILON {
                    return degenerate("polygon encloses no area");
                }
            }
        }
        Ok(())
    }

    /// Axis-aligned bounds of the shape.
    pub fn bounds(&self) -> Rect {
        match self {
            FogShape::Rectangle {
                x,
                y,
                width,
                height,
            } => Rect::new(*x, *y, *width, *height),
            FogShape::Circle { x, y, radius } => {
                Rect::new(x - radius, y - radius, radius * 2.0, radius * 2.0)
            }
            FogShape::Polygon { points } => {
                let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
                let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
                for p in points {
                    min_x = min_x.min(p.x);
                    min_y = min_y.min(p.y);
                    max_x = max_x.max(p.x);
                    max_y = max_y.max(p.y);
                }
                Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
            }
        }
    }

    /// Exact point-in-shape test (even-odd rule for polygons).
    pub fn contains(&self, p: Point) -> bool {
        match self {
            FogShape::Rectangle { .. } => self.bounds().contains(p),
            FogShape::Circle { x, y, radius } => p.distance_to(&Point::new(*x, *y)) <= *radius,
            FogShape::Polygon { points } => {
                if points.is_empty() {
                    return false;
                }
                let mut inside = false;
                let mut j = points.len() - 1;
                for i in 0..points.len() {
                    let (a, b) = (points[i], points[j]);
                    if (a.y > p.y) != (b.y > p.y)
                        && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x
                    {
                        inside = !inside;
                    }
                    j = i;
                }
                inside
            }
        }
    }

    /// Builds the tiny-skia fill path for compositing.
    pub fn to_path(&self) -> Option<Path> {
        match self {
            FogShape::Rectangle {
                x,
                y,
                width,
                height,
            } => tiny_skia::Rect::from_xywh(*x as f32, *y as f32, *width as f32, *height as f32)
                .map(PathBuilder::from_rect),
            FogShape::Circle { x, y, radius } => {
                PathBuilder::from_circle(*x as f32, *y as f32, *radius as f32)
            }
            FogShape::Polygon { points } => {
                let mut pb = PathBuilder::new();
                let (first, rest) = points.split_first()?;
                pb.move_to(first.x as f32, first.y as f32);
                for p in rest {
                    pb.line_to(p.x as f32, p.y as f32);
                }
                pb.close();
                pb.finish()
            }
        }
    }
}

/// Signed shoelace area.
fn polygon_area(points: &[Point]) -> f64 {
    let mut sum = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// An immutable fog operation record.
///
/// `created_at` (milliseconds) orders replay during compositing. Areas without
/// a timestamp are refused when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawFogArea")]
pub struct FogArea {
    id: Uuid,
    #[serde(flatten)]
    shape: FogShape,
    created_at: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFogArea {
    id: Uuid,
    #[serde(flatten)]
    shape: FogShape,
    created_at: Option<u64>,
}

impl TryFrom<RawFogArea> for FogArea {
    type Error = battlemap_core::Error;

    fn try_from(raw: RawFogArea) -> Result<Self> {
        let created_at = raw.created_at.ok_or_else(|| FogError::MissingTimestamp {
            id: raw.id.to_string(),
        })?;
        Self::with_id(raw.id, raw.shape, created_at)
    }
}

impl FogArea {
    /// Creates an area with a fresh id after validating its geometry.
    pub fn new(shape: FogShape, created_at: u64) -> Result<Self> {
        Self::with_id(Uuid::new_v4(), shape, created_at)
    }

    pub fn with_id(id: Uuid, shape: FogShape, created_at: u64) -> Result<Self> {
        shape.validate()?;
        Ok(Self {
            id,
            shape,
            created_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn shape(&self) -> &FogShape {
        &self.shape
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }
}
