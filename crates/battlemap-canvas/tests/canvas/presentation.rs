use battlemap_canvas::presentation::{clamp_to_map, default_bounds};
use battlemap_canvas::{BoundsEditor, BoundsHit, Handle, Point, Rect};

fn editor() -> BoundsEditor {
    BoundsEditor::new(1000.0, 1000.0, Some(Rect::new(100.0, 100.0, 300.0, 300.0)))
}

#[test]
fn test_nw_handle_past_se_stops_at_min_size() {
    let mut editor = editor();
    assert!(editor.begin(Point::new(100.0, 100.0), 1.0));
    editor.update(Point::new(600.0, 600.0));
    let rect = editor.finish(Point::new(600.0, 600.0)).unwrap();

    assert_eq!(rect.width, 100.0);
    assert_eq!(rect.height, 100.0);
    assert_eq!(rect.right(), 400.0, "fixed SE corner must not move");
    assert_eq!(rect.bottom(), 400.0);
}

#[test]
fn test_se_resize_clamped_to_map() {
    let mut editor = editor();
    editor.begin(Point::new(400.0, 400.0), 1.0);
    let rect = editor.finish(Point::new(5000.0, 5000.0)).unwrap();
    assert_eq!(rect, Rect::new(100.0, 100.0, 900.0, 900.0));
}

#[test]
fn test_ne_resize_keeps_sw_corner() {
    let mut editor = editor();
    editor.begin(Point::new(400.0, 100.0), 1.0);
    let rect = editor.finish(Point::new(250.0, -50.0)).unwrap();
    assert_eq!(rect, Rect::new(100.0, 0.0, 150.0, 400.0));
}

#[test]
fn test_body_drag_clamped_inside_map() {
    let mut editor = editor();
    assert!(editor.begin(Point::new(250.0, 250.0), 1.0));
    editor.update(Point::new(-500.0, 2000.0));
    assert_eq!(editor.bounds(), Some(Rect::new(0.0, 700.0, 300.0, 300.0)));
}

#[test]
fn test_preview_committed_only_on_release() {
    let mut editor = editor();
    editor.begin(Point::new(250.0, 250.0), 1.0);
    editor.update(Point::new(300.0, 250.0));

    assert_eq!(editor.committed(), Some(Rect::new(100.0, 100.0, 300.0, 300.0)));
    assert_eq!(editor.bounds(), Some(Rect::new(150.0, 100.0, 300.0, 300.0)));

    editor.finish(Point::new(300.0, 250.0));
    assert_eq!(editor.committed(), Some(Rect::new(150.0, 100.0, 300.0, 300.0)));
    assert!(!editor.is_editing());
}

#[test]
fn test_cancel_discards_preview() {
    let mut editor = editor();
    editor.begin(Point::new(250.0, 250.0), 1.0);
    editor.update(Point::new(500.0, 500.0));
    editor.cancel();
    assert_eq!(editor.bounds(), Some(Rect::new(100.0, 100.0, 300.0, 300.0)));
    assert!(editor.finish(Point::new(0.0, 0.0)).is_none());
}

#[test]
fn test_press_outside_does_not_start_edit() {
    let mut editor = editor();
    assert!(!editor.begin(Point::new(800.0, 800.0), 1.0));
    assert!(!editor.is_editing());
}

#[test]
fn test_hit_test_prefers_handles() {
    let editor = editor();
    assert_eq!(
        editor.hit_test(Point::new(395.0, 405.0), 1.0),
        Some(BoundsHit::Handle(Handle::SouthEast))
    );
    assert_eq!(editor.hit_test(Point::new(200.0, 200.0), 1.0), Some(BoundsHit::Body));
    assert_eq!(editor.hit_test(Point::new(50.0, 50.0), 1.0), None);
}

#[test]
fn test_min_size_follows_small_maps() {
    let rect = clamp_to_map(&Rect::new(-10.0, 10.0, 20.0, 20.0), 60.0, 400.0);
    assert_eq!(rect, Rect::new(0.0, 10.0, 60.0, 100.0));
}

#[test]
fn test_ensure_default_only_once() {
    let mut editor = BoundsEditor::new(800.0, 600.0, None);
    assert_eq!(editor.ensure_default(), Some(default_bounds(800.0, 600.0)));
    assert_eq!(editor.ensure_default(), None);
    assert_eq!(editor.committed(), Some(Rect::new(200.0, 150.0, 400.0, 300.0)));
}
