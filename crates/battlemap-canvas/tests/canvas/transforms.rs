use battlemap_canvas::geometry::{canvas_to_grid, grid_to_canvas, screen_to_canvas};
use battlemap_canvas::{GridCell, GridSize, Point, ViewTransform, Viewport};
use proptest::prelude::*;

#[test]
fn test_screen_to_canvas_undoes_zoom_and_pan() {
    let canvas = screen_to_canvas(Point::new(250.0, 130.0), 2.0, Point::new(50.0, 30.0));
    assert_eq!(canvas, Point::new(100.0, 50.0));
}

#[test]
fn test_grid_to_canvas_is_cell_centre() {
    let grid = GridSize::new(50).unwrap();
    assert_eq!(grid_to_canvas(GridCell::new(2, 3), grid), Point::new(125.0, 175.0));
    assert_eq!(canvas_to_grid(Point::new(149.9, 150.0), grid), GridCell::new(2, 3));
}

#[test]
fn test_zoom_clamped_at_both_ends() {
    let mut viewport = Viewport::new(800.0, 600.0);
    for _ in 0..100 {
        viewport.zoom_at(Point::new(400.0, 300.0), 1.0);
    }
    assert_eq!(viewport.zoom(), 3.0);
    for _ in 0..200 {
        viewport.zoom_at(Point::new(400.0, 300.0), -1.0);
    }
    assert!((viewport.zoom() - 0.1).abs() < 1e-12);
}

#[test]
fn test_recenter_fits_map_with_margin() {
    let mut viewport = Viewport::new(1000.0, 800.0);
    viewport.fit_map(2000.0, 1000.0);
    assert!((viewport.zoom() - 0.45).abs() < 1e-9);
    assert!((viewport.pan_x() - 50.0).abs() < 1e-9);
    assert!((viewport.pan_y() - 175.0).abs() < 1e-9);
}

#[test]
fn test_recenter_never_magnifies_small_maps() {
    let mut viewport = Viewport::new(1000.0, 800.0);
    viewport.fit_map(200.0, 100.0);
    assert!((viewport.zoom() - 0.9).abs() < 1e-9);
}

#[test]
fn test_reset_frames_empty_canvas() {
    let mut viewport = Viewport::new(1000.0, 800.0);
    viewport.set_zoom(2.5);
    viewport.reset();
    assert_eq!(viewport.zoom(), 1.0);
    assert_eq!(viewport.pan(), Point::new(0.0, -100.0));
}

proptest! {
    #[test]
    fn prop_grid_round_trip(
        zoom in 0.1f64..=3.0,
        pan_x in -2000.0f64..2000.0,
        pan_y in -2000.0f64..2000.0,
        size in 1u32..200,
        x in -500i32..500,
        y in -500i32..500,
    ) {
        let grid = GridSize::new(size).unwrap();
        let transform = ViewTransform::new(zoom, Point::new(pan_x, pan_y), grid);
        let cell = GridCell::new(x, y);
        let screen = transform.grid_to_screen(cell);
        prop_assert_eq!(transform.screen_to_grid(screen), cell);
    }

    #[test]
    fn prop_wheel_keeps_point_under_pointer(
        zoom in 0.1f64..=3.0,
        pan_x in -1000.0f64..1000.0,
        pan_y in -1000.0f64..1000.0,
        px in 0.0f64..1200.0,
        py in 0.0f64..800.0,
        zoom_in in any::<bool>(),
    ) {
        let mut viewport = Viewport::new(1200.0, 800.0);
        viewport.set_zoom(zoom);
        viewport.set_pan(pan_x, pan_y);
        let pointer = Point::new(px, py);
        let before = viewport.screen_to_canvas(pointer);

        viewport.zoom_at(pointer, if zoom_in { 1.0 } else { -1.0 });

        let after = viewport.screen_to_canvas(pointer);
        let tolerance = 1e-6 * before.x.abs().max(before.y.abs()).max(1.0);
        prop_assert!((before.x - after.x).abs() < tolerance);
        prop_assert!((before.y - after.y).abs() < tolerance);
        prop_assert!(viewport.zoom() >= 0.1 && viewport.zoom() <= 3.0);
    }
}
