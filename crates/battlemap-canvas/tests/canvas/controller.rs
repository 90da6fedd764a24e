use battlemap_canvas::{MouseButton, PanSource, Point, Viewport, ViewportController};

fn controller() -> ViewportController {
    ViewportController::new(Viewport::new(1000.0, 800.0))
}

#[test]
fn test_wheel_up_zooms_in_toward_pointer() {
    let mut ctl = controller();
    let pointer = Point::new(300.0, 200.0);
    ctl.wheel(pointer, -120.0);
    assert!((ctl.viewport().zoom() - 1.1).abs() < 1e-12);
    let anchored = ctl.viewport().screen_to_canvas(pointer);
    assert!((anchored.x - 300.0).abs() < 1e-9);
    assert!((anchored.y - 200.0).abs() < 1e-9);
}

#[test]
fn test_zero_wheel_delta_is_ignored() {
    let mut ctl = controller();
    ctl.wheel(Point::new(10.0, 10.0), 0.0);
    assert_eq!(ctl.viewport().zoom(), 1.0);
    assert_eq!(ctl.viewport().pan(), Point::new(0.0, 0.0));
}

#[test]
fn test_left_button_pans_only_with_tool_or_space() {
    let mut ctl = controller();
    assert!(!ctl.pointer_down(Point::new(0.0, 0.0), MouseButton::Left));

    ctl.set_pan_tool_active(true);
    assert!(ctl.pointer_down(Point::new(0.0, 0.0), MouseButton::Left));
    assert_eq!(ctl.pan_source(), Some(PanSource::Tool));
    ctl.pointer_move(Point::new(30.0, -10.0));
    assert!(ctl.pointer_up(Point::new(30.0, -10.0), MouseButton::Left));
    assert_eq!(ctl.viewport().pan(), Point::new(30.0, -10.0));
    assert!(!ctl.wants_window_events());
}

#[test]
fn test_middle_pan_survives_leaving_canvas() {
    let mut ctl = controller();
    assert!(ctl.pointer_down(Point::new(100.0, 100.0), MouseButton::Middle));
    assert!(ctl.wants_window_events());

    ctl.pointer_leave();
    assert!(ctl.is_panning());

    assert!(ctl.window_pointer_move(Point::new(160.0, 120.0)));
    assert_eq!(ctl.viewport().pan(), Point::new(60.0, 20.0));

    assert!(ctl.window_pointer_up(MouseButton::Middle));
    assert!(!ctl.is_panning());
    assert!(!ctl.wants_window_events());
    assert!(!ctl.window_pointer_move(Point::new(500.0, 500.0)));
    assert_eq!(ctl.viewport().pan(), Point::new(60.0, 20.0));
}

#[test]
fn test_leaving_canvas_ends_tool_pan() {
    let mut ctl = controller();
    ctl.set_pan_tool_active(true);
    ctl.pointer_down(Point::new(0.0, 0.0), MouseButton::Left);
    ctl.pointer_leave();
    assert!(!ctl.is_panning());
}

#[test]
fn test_recenter_without_map_uses_unit_zoom() {
    let mut ctl = controller();
    ctl.wheel(Point::new(0.0, 0.0), -1.0);
    ctl.recenter(None);
    assert_eq!(ctl.viewport().zoom(), 1.0);
    assert_eq!(ctl.viewport().pan(), Point::new(0.0, -100.0));
}
