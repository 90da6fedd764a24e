//! Reference renderer for the canvas and the player view.
//! Draws the map backdrop, grid, tokens, fog raster and overlays into an image
//! buffer using tiny-skia.
//!
//! Hosts with their own drawing surface only need the transform parameters
//! and [`FogRaster`]; this module exists for headless output and tests.

use battlemap_core::{GeometryError, Result};
use image::RgbaImage;
use tiny_skia::{
    Color, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

use crate::encounter::{Encounter, TokenKind};
use crate::fog::FogRaster;
use crate::geometry::Rect;
use crate::measure::MeasureOverlay;
use crate::viewport::Viewport;

fn bg_color() -> Color {
    Color::from_rgba8(30, 30, 30, 255)
}
fn map_color() -> Color {
    Color::from_rgba8(120, 110, 90, 255)
}
fn grid_color() -> Color {
    Color::from_rgba8(0, 0, 0, 80)
}
fn token_color(kind: TokenKind) -> Color {
    match kind {
        TokenKind::Player => Color::from_rgba8(52, 152, 219, 255),
        TokenKind::Monster => Color::from_rgba8(231, 76, 60, 255),
        TokenKind::Npc => Color::from_rgba8(46, 204, 113, 255),
    }
}
fn bounds_color() -> Color {
    Color::from_rgba8(255, 235, 59, 255)
}
fn measure_color() -> Color {
    Color::from_rgba8(255, 255, 255, 220)
}

/// Converts a premultiplied pixmap into a straight-alpha image.
pub fn pixmap_to_image(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let mut image = RgbaImage::new(width, pixmap.height());
    for (i, px) in pixmap.pixels().iter().enumerate() {
        let c = px.demultiply();
        let i = i as u32;
        image.put_pixel(
            i % width,
            i / width,
            image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]),
        );
    }
    image
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height).ok_or_else(|| {
        GeometryError::InvalidViewportSize {
            width: f64::from(width),
            height: f64::from(height),
        }
        .into()
    })
}

/// Draws the map, grid, tokens and fog with `transform` mapping canvas to pixels.
fn draw_scene(pixmap: &mut Pixmap, encounter: &Encounter, fog: Option<&FogRaster>, transform: Transform, zoom: f32) {
    let Some(map) = encounter.map.as_ref() else {
        return;
    };
    let (map_w, map_h) = (map.width as f32, map.height as f32);

    let mut paint = Paint::default();
    paint.anti_alias = true;

    if let Some(rect) = tiny_skia::Rect::from_xywh(0.0, 0.0, map_w, map_h) {
        paint.set_color(map_color());
        pixmap.fill_rect(rect, &paint, transform, None);
    }

    let cell = map.grid().as_f64() as f32;
    if map.show_grid {
        let mut pb = PathBuilder::new();
        let mut x = 0.0;
        while x <= map_w {
            pb.move_to(x, 0.0);
            pb.line_to(x, map_h);
            x += cell;
        }
        let mut y = 0.0;
        while y <= map_h {
            pb.move_to(0.0, y);
            pb.line_to(map_w, y);
            y += cell;
        }
        if let Some(path) = pb.finish() {
            paint.set_color(grid_color());
            let stroke = Stroke {
                width: 1.0 / zoom.max(f32::EPSILON),
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, transform, None);
        }
    }

    for token in &encounter.tokens {
        let span = token.size_in_cells() as f32 * cell;
        let cx = token.grid_x as f32 * cell + span / 2.0;
        let cy = token.grid_y as f32 * cell + span / 2.0;
        if let Some(path) = PathBuilder::from_circle(cx, cy, span * 0.4) {
            paint.set_color(token_color(token.kind));
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
    }

    if let Some(raster) = fog {
        pixmap.draw_pixmap(0, 0, raster.pixmap().as_ref(), &PixmapPaint::default(), transform, None);
    }
}

/// Renders what the DM sees through `viewport`.
pub fn render_view(
    encounter: &Encounter,
    fog: Option<&FogRaster>,
    viewport: &Viewport,
    bounds: Option<Rect>,
    measurement: Option<&MeasureOverlay>,
) -> Result<RgbaImage> {
    let width = viewport.viewport_width().max(1.0).round() as u32;
    let height = viewport.viewport_height().max(1.0).round() as u32;
    let mut pixmap = new_pixmap(width, height)?;
    pixmap.fill(bg_color());

    let zoom = viewport.zoom() as f32;
    // screen = canvas * zoom + pan
    let transform = Transform::from_scale(zoom, zoom)
        .post_translate(viewport.pan_x() as f32, viewport.pan_y() as f32);

    draw_scene(&mut pixmap, encounter, fog, transform, zoom);

    let mut paint = Paint::default();
    paint.anti_alias = true;
    let stroke = Stroke {
        width: 2.0 / zoom.max(f32::EPSILON),
        ..Default::default()
    };

    if let Some(rect) = bounds.and_then(|b| {
        tiny_skia::Rect::from_xywh(b.x as f32, b.y as f32, b.width as f32, b.height as f32)
    }) {
        paint.set_color(bounds_color());
        let path = PathBuilder::from_rect(rect);
        pixmap.stroke_path(&path, &paint, &stroke, transform, None);
    }

    if let Some(overlay) = measurement {
        let mut pb = PathBuilder::new();
        let mut points = overlay.waypoints.iter();
        if let Some(first) = points.next() {
            pb.move_to(first.x as f32, first.y as f32);
            for p in points {
                pb.line_to(p.x as f32, p.y as f32);
            }
        }
        if let Some(path) = pb.finish() {
            paint.set_color(measure_color());
            pixmap.stroke_path(&path, &paint, &stroke, transform, None);
        }
    }

    Ok(pixmap_to_image(&pixmap))
}

/// Renders the presentation crop at 1:1 scale, as the player display shows it.
pub fn render_presentation(
    encounter: &Encounter,
    fog: Option<&FogRaster>,
    bounds: Rect,
) -> Result<RgbaImage> {
    if !bounds.is_valid() {
        return Err(GeometryError::InvalidViewportSize {
            width: bounds.width,
            height: bounds.height,
        }
        .into());
    }
    let width = bounds.width.round().max(1.0) as u32;
    let height = bounds.height.round().max(1.0) as u32;
    let mut pixmap = new_pixmap(width, height)?;
    pixmap.fill(bg_color());

    let transform = Transform::from_translate(-bounds.x as f32, -bounds.y as f32);
    draw_scene(&mut pixmap, encounter, fog, transform, 1.0);

    tracing::debug!(
        "Rendered presentation crop {}x{} at ({:.0}, {:.0})",
        width,
        height,
        bounds.x,
        bounds.y
    );
    Ok(pixmap_to_image(&pixmap))
}
